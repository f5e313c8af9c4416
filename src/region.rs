//! Anonymous memory mappings backing an `Array`.

use std::{
    ffi::c_void,
    num::NonZeroUsize,
    os::fd::BorrowedFd,
    ptr::NonNull,
};

use nix::{
    errno::Errno,
    sys::mman::{
        mmap,
        mremap,
        munmap,
        MapFlags,
        MRemapFlags,
        ProtFlags,
    },
};

use crate::errors::{
    Error,
    Result,
};

/// Smallest page size Linux hands out; mappings are always aligned to at least this.
pub(crate) const MIN_PAGE: usize = 1 << 12;

/// Rounds `bytes` up to the next multiple of `N`. `N` is a power of two.
pub(crate) fn round_to<const N: usize>(bytes: usize) -> Result<usize> {
    bytes
        .checked_add(N - 1)
        .map(|padded| padded & !(N - 1))
        .ok_or(Error::CapacityOverflow)
}

pub(crate) fn map(byte_len: usize) -> Result<NonNull<c_void>> {
    let length = NonZeroUsize::new(byte_len).ok_or(Error::CapacityOverflow)?;
    let raw = unsafe{mmap(
        None,
        length,
        ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
        MapFlags::MAP_PRIVATE | MapFlags::MAP_ANONYMOUS,
        None::<BorrowedFd>,
        0
    )}.map_err(Error::MmapFail)?;
    NonNull::new(raw).ok_or(Error::MmapFail(Errno::ENOMEM))
}

/// Moves the mapping at `base` to one of `new_len` bytes. The first `old_len`
/// bytes keep their contents and order; `base` is invalid afterwards.
pub(crate) fn remap(base: NonNull<c_void>, old_len: usize, new_len: usize) -> Result<NonNull<c_void>> {
    let raw = unsafe{mremap(
        base.as_ptr(),
        old_len,
        new_len,
        MRemapFlags::MREMAP_MAYMOVE,
        None
    )}.map_err(Error::MremapFail)?;
    NonNull::new(raw).ok_or(Error::MremapFail(Errno::ENOMEM))
}

pub(crate) fn unmap(base: NonNull<c_void>, byte_len: usize) -> nix::Result<()> {
    unsafe{munmap(base.as_ptr(), byte_len)}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_granule() {
        assert_eq!(round_to::<4096>(1), Ok(4096));
        assert_eq!(round_to::<4096>(4096), Ok(4096));
        assert_eq!(round_to::<4096>(4097), Ok(8192));
        assert_eq!(round_to::<64>(65), Ok(128));
        assert_eq!(round_to::<4096>(usize::MAX), Err(Error::CapacityOverflow));
    }

    #[test]
    fn remap_keeps_contents() {
        let base = map(MIN_PAGE).unwrap();
        unsafe{base.as_ptr().cast::<u8>().write_bytes(0xAB, MIN_PAGE)};
        let moved = remap(base, MIN_PAGE, MIN_PAGE * 4).unwrap();
        let bytes = unsafe{std::slice::from_raw_parts(moved.as_ptr().cast::<u8>(), MIN_PAGE)};
        assert!(bytes.iter().all(|byte| *byte == 0xAB));
        unmap(moved, MIN_PAGE * 4).unwrap();
    }
}
