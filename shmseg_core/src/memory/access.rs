//! Access mode markers for [`SharedMemory`](super::SharedMemory).
//!
//! The mode is part of the handle's type, so a read-only mapping never hands out
//! `&mut` views: the mutable accessors only exist on `SharedMemory<ReadWrite>`.

mod sealed {
    pub trait Sealed {}
}

/// Access mode of a segment handle. Implemented only by [`ReadWrite`] and [`ReadOnly`].
pub trait AccessMode: sealed::Sealed + Send + Sync + 'static {
    /// Open the object with `O_RDONLY` and map it with `PROT_READ` only.
    const READ_ONLY: bool;
}

/// Read-write access (the default).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadWrite;

/// Read-only access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOnly;

impl sealed::Sealed for ReadWrite {}
impl sealed::Sealed for ReadOnly {}

impl AccessMode for ReadWrite {
    const READ_ONLY: bool = false;
}

impl AccessMode for ReadOnly {
    const READ_ONLY: bool = true;
}
