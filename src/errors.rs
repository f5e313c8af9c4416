use thiserror::Error;
use nix::errno::Errno;


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error{
    #[error("index {index} is out of range for length {len}")]
    OutOfRangeIndex{
        index: usize,
        len: usize,
    },
    #[error("range {from}..{to} is out of range for length {len}")]
    OutOfRange{
        from: usize,
        to: usize,
        len: usize,
    },
    #[error("capacity of {capacity} elements cannot be mapped")]
    InvalidArgument{
        capacity: usize,
    },
    #[error("capacity overflow")]
    CapacityOverflow,
    #[error("call to mmap failed")]
    MmapFail(#[source] Errno),
    #[error("call to mremap failed")]
    MremapFail(#[source] Errno),
}

pub type Result<T> = std::result::Result<T, Error>;
