//! A growable, index-checked array backed by anonymous memory mappings.
//!
//! [`Array`] keeps its live elements contiguous at the start of a mapping and
//! doubles its capacity when an insertion would overflow it. Structural
//! operations come in two flavours, see [`Transform`] and [`Carve`].


mod errors;
mod ops;
mod region;

pub use errors::{
    Error,
    Result,
};
pub use ops::{
    Carve,
    Transform,
};

use std::{
    slice,
    fmt::{
        self,
        Debug,
        Display,
        Formatter,
    },
    marker::PhantomData,
    ptr::{
        self,
        NonNull,
    },
    mem::{
        self,
        align_of,
        size_of,
    },
    ops::{
        Index,
        IndexMut,
    },
};

use log::{
    debug,
    trace,
    warn,
};

/// Growable array whose buffer is mapped in multiples of `N` bytes.
///
/// `N` must be a power of two no smaller than the alignment of `T`.
pub struct Array<T, const N: usize = 4096>{
    elem_len: usize,
    elem_capacity: usize,
    byte_capacity: usize,
    start: NonNull<T>,
    phantom: PhantomData<T>,
}

impl<T, const N: usize> Array<T, N> {

    const LAYOUT_OK: () = assert!(
        N.is_power_of_two() && align_of::<T>() <= N && align_of::<T>() <= region::MIN_PAGE,
        "granule must be a power of two covering the element alignment"
    );

    /// Empty array with capacity 0. Nothing is mapped until the first insertion.
    pub fn new() -> Self {
        let () = Self::LAYOUT_OK;
        Self{
            elem_len: 0,
            elem_capacity: 0,
            byte_capacity: 0,
            start: NonNull::dangling(),
            phantom: PhantomData,
        }
    }

    /// Empty array with room for exactly `capacity` elements.
    ///
    /// Fails with [`Error::InvalidArgument`] when `capacity` elements of `T`
    /// would not fit in an `isize`.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if Self::byte_len_for(capacity).is_none() {
            return Err(Error::InvalidArgument{capacity});
        }
        let mut array = Self::new();
        array.resize_buffer(capacity)?;
        Ok(array)
    }

    /// Builds an array with the same capacity as `other` holding clones of its elements.
    pub fn copy_of(other: &Self) -> Result<Self> where T: Clone {
        let mut array = Self::with_capacity(other.elem_capacity)?;
        array.extend_from_slice(other.as_slice())?;
        Ok(array)
    }

    pub fn from_slice(items: &[T]) -> Result<Self> where T: Clone {
        let mut array = Self::with_capacity(items.len())?;
        array.extend_from_slice(items)?;
        Ok(array)
    }

    fn byte_len_for(capacity: usize) -> Option<usize> {
        capacity
            .checked_mul(size_of::<T>())
            .filter(|bytes| *bytes <= isize::MAX as usize)
    }

    /// Raises the logical capacity to `new_capacity`, remapping only when the
    /// current mapping cannot hold it.
    fn resize_buffer(&mut self, new_capacity: usize) -> Result<()> {
        debug_assert!(new_capacity >= self.elem_capacity);
        if size_of::<T>() == 0 {
            self.elem_capacity = new_capacity;
            return Ok(());
        }
        let needed = Self::byte_len_for(new_capacity).ok_or(Error::CapacityOverflow)?;
        if needed <= self.byte_capacity {
            debug!(
                "capacity {} -> {} fits in 0x{:X} mapped bytes",
                self.elem_capacity, new_capacity, self.byte_capacity
            );
            self.elem_capacity = new_capacity;
            return Ok(());
        }
        let new_byte_capacity = region::round_to::<N>(needed)?;
        let base = if self.byte_capacity == 0 {
            region::map(new_byte_capacity)?
        } else {
            region::remap(self.start.cast(), self.byte_capacity, new_byte_capacity)?
        };
        trace!(
            "capacity {} -> {}, mapping 0x{:X} -> 0x{:X} bytes",
            self.elem_capacity, new_capacity, self.byte_capacity, new_byte_capacity
        );
        self.start = base.cast();
        self.byte_capacity = new_byte_capacity;
        self.elem_capacity = new_capacity;
        Ok(())
    }

    fn grow(&mut self) -> Result<()> {
        let new_capacity = match self.elem_capacity {
            0 => 1,
            capacity => capacity.checked_mul(2).ok_or(Error::CapacityOverflow)?,
        };
        self.resize_buffer(new_capacity)
    }

    fn check_index(&self, index:usize) -> Result<()> {
        if index >= self.elem_len {
            return Err(Error::OutOfRangeIndex{index, len: self.elem_len});
        }
        Ok(())
    }

    /// Accepts the half-open range `from..to` when `from <= to <= len`.
    pub(crate) fn check_range(&self, from:usize, to:usize) -> Result<()> {
        if from > to || to > self.elem_len {
            return Err(Error::OutOfRange{from, to, len: self.elem_len});
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.elem_len
    }

    pub fn is_empty(&self) -> bool {
        self.elem_len == 0
    }

    pub fn capacity(&self) -> usize {
        self.elem_capacity
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe{slice::from_raw_parts(self.start.as_ptr(), self.elem_len)}
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe{slice::from_raw_parts_mut(self.start.as_ptr(), self.elem_len)}
    }

    pub fn get(&self, index:usize) -> Result<&T> {
        self.check_index(index)?;
        Ok(&self.as_slice()[index])
    }

    pub fn get_mut(&mut self, index:usize) -> Result<&mut T> {
        self.check_index(index)?;
        Ok(&mut self.as_mut_slice()[index])
    }

    /// Stores `value` at `index` and hands back the value it replaced.
    pub fn set(&mut self, index:usize, value:T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(mem::replace(slot, value))
    }

    /// Appends `value`, doubling the capacity first if the array is full.
    pub fn push(&mut self, value:T) -> Result<()> {
        if self.elem_len == self.elem_capacity {
            self.grow()?;
        }
        unsafe{self.start.as_ptr().add(self.elem_len).write(value)};
        self.elem_len += 1;
        Ok(())
    }

    /// Inserts `value` at `index`, shifting `index..len` one slot to the right.
    /// `index == len` appends.
    pub fn insert_at(&mut self, index:usize, value:T) -> Result<()> {
        if index > self.elem_len {
            return Err(Error::OutOfRangeIndex{index, len: self.elem_len});
        }
        if self.elem_len == self.elem_capacity {
            self.grow()?;
        }
        unsafe{
            let slot = self.start.as_ptr().add(index);
            ptr::copy(slot, slot.add(1), self.elem_len - index);
            slot.write(value);
        }
        self.elem_len += 1;
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting the tail one slot left.
    pub fn remove(&mut self, index:usize) -> Result<T> {
        self.check_index(index)?;
        let value = unsafe{
            let slot = self.start.as_ptr().add(index);
            let value = slot.read();
            ptr::copy(slot.add(1), slot, self.elem_len - index - 1);
            value
        };
        self.elem_len -= 1;
        Ok(value)
    }

    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<()> where T: Clone {
        for item in items {
            self.push(item.clone())?;
        }
        Ok(())
    }

    /// Moves `from..to` into a new array sized to fit it and closes the gap.
    /// The receiver is untouched when validation or the allocation fails.
    pub(crate) fn take_range(&mut self, from:usize, to:usize) -> Result<Self> {
        self.check_range(from, to)?;
        let count = to - from;
        let mut taken = Self::with_capacity(count)?;
        unsafe{
            let base = self.start.as_ptr();
            ptr::copy_nonoverlapping(base.add(from), taken.start.as_ptr(), count);
            ptr::copy(base.add(to), base.add(from), self.elem_len - to);
        }
        taken.elem_len = count;
        self.elem_len -= count;
        Ok(taken)
    }

    pub fn low_index(&self) -> usize {
        0
    }

    /// Last valid index, or `None` when the array is empty.
    pub fn high_index(&self) -> Option<usize> {
        self.elem_len.checked_sub(1)
    }

    pub fn index_in_range(&self, index:usize) -> bool {
        self.high_index()
            .map_or(false, |high| self.low_index() <= index && index <= high)
    }
}

impl<T, const N: usize> Default for Array<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for Array<T, N> {
    fn drop(&mut self) {
        unsafe{ptr::drop_in_place(self.as_mut_slice() as *mut [T])};
        if self.byte_capacity > 0 {
            if let Err(errno) = region::unmap(self.start.cast(), self.byte_capacity) {
                warn!("munmap of 0x{:X} bytes failed: {errno}", self.byte_capacity);
            }
        }
    }
}

impl<T, const N: usize> Index<usize> for Array<T, N> {
    type Output = T;

    fn index(&self, index:usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Array<T, N> {

    fn index_mut(&mut self, index:usize) -> &mut Self::Output {
        &mut self.as_mut_slice()[index]
    }
}

impl<T:PartialEq, const N: usize> PartialEq for Array<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T:Eq, const N: usize> Eq for Array<T, N> {}

impl<T:Display, const N: usize> Display for Array<T, N> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("[")?;
        for (position, elem) in self.as_slice().iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{elem}")?;
        }
        f.write_str("]")
    }
}

impl<T:Debug, const N: usize> Debug for Array<T, N> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Array")
           .field("elem_len", &self.elem_len)
           .field("elem_capacity", &self.elem_capacity)
           .field("byte_capacity", &format!("0x{:X}", self.byte_capacity))
           .field("content", &self.as_slice())
           .finish()
    }
}
