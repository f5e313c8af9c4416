//! Structural operations on [`Array`].
//!
//! [`Transform`] builds a new array and leaves the receiver alone.
//! [`Carve`] moves a range out of the receiver into a new array, so the
//! receiver shrinks by exactly the length of the returned array.
//!
//! All ranges are half-open. `from == to` is a valid empty range; `from > to`
//! or `to > len` is [`Error::OutOfRange`](crate::Error::OutOfRange).

use crate::{
    Array,
    errors::{
        Error,
        Result,
    },
};

pub trait Transform: Sized {
    /// `self` followed by `other`. `other` may be `self`.
    fn append(&self, other: &Self) -> Result<Self>;

    /// `self[..index]`, then `other`, then `self[index..]`. `index` may equal the length.
    fn insert(&self, index: usize, other: &Self) -> Result<Self>;

    /// Copy of `self[from..to]`.
    fn sublist(&self, from: usize, to: usize) -> Result<Self>;

    /// Copy of `self` without `self[from..to]`.
    fn delete(&self, from: usize, to: usize) -> Result<Self>;
}

pub trait Carve: Sized {
    /// Removes `from..to` from the receiver and returns it.
    fn extract(&mut self, from: usize, to: usize) -> Result<Self>;

    /// Returns `self[..index]`; the receiver keeps `self[index..]`.
    fn split_prefix(&mut self, index: usize) -> Result<Self>;

    /// Returns `self[index..]`; the receiver keeps `self[..index]`.
    fn split_suffix(&mut self, index: usize) -> Result<Self>;
}

fn joined_capacity(left: usize, right: usize) -> Result<usize> {
    left.checked_add(right).ok_or(Error::CapacityOverflow)
}

impl<T: Clone, const N: usize> Transform for Array<T, N> {
    fn append(&self, other: &Self) -> Result<Self> {
        let mut joined = Self::with_capacity(joined_capacity(self.len(), other.len())?)?;
        joined.extend_from_slice(self.as_slice())?;
        joined.extend_from_slice(other.as_slice())?;
        Ok(joined)
    }

    fn insert(&self, index: usize, other: &Self) -> Result<Self> {
        if index > self.len() {
            return Err(Error::OutOfRangeIndex{index, len: self.len()});
        }
        let (head, tail) = self.as_slice().split_at(index);
        let mut joined = Self::with_capacity(joined_capacity(self.len(), other.len())?)?;
        joined.extend_from_slice(head)?;
        joined.extend_from_slice(other.as_slice())?;
        joined.extend_from_slice(tail)?;
        Ok(joined)
    }

    fn sublist(&self, from: usize, to: usize) -> Result<Self> {
        self.check_range(from, to)?;
        Self::from_slice(&self.as_slice()[from..to])
    }

    fn delete(&self, from: usize, to: usize) -> Result<Self> {
        self.check_range(from, to)?;
        let items = self.as_slice();
        let mut rest = Self::with_capacity(items.len() - (to - from))?;
        rest.extend_from_slice(&items[..from])?;
        rest.extend_from_slice(&items[to..])?;
        Ok(rest)
    }
}

impl<T, const N: usize> Carve for Array<T, N> {
    fn extract(&mut self, from: usize, to: usize) -> Result<Self> {
        self.take_range(from, to)
    }

    fn split_prefix(&mut self, index: usize) -> Result<Self> {
        if index > self.len() {
            return Err(Error::OutOfRangeIndex{index, len: self.len()});
        }
        self.take_range(0, index)
    }

    fn split_suffix(&mut self, index: usize) -> Result<Self> {
        if index > self.len() {
            return Err(Error::OutOfRangeIndex{index, len: self.len()});
        }
        let len = self.len();
        self.take_range(index, len)
    }
}
