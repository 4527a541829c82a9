//! # Named shared memory segments
//!
//! This module provides the segment handle and its supporting types:
//!
//! - **SharedMemory**: a named POSIX shared memory object mapped into this process
//! - **ReadWrite / ReadOnly**: access mode markers carried in the handle's type
//! - **CreateOptions**: size, exclusivity and permission bits for the create path
//! - **platform**: where the shm namespace is visible in the filesystem
//!
//! ## Ownership
//!
//! The handle that created a segment unlinks its name when dropped. Handles that
//! attached only unmap and close. Mappings held by other handles stay valid after
//! the name is gone, but no new handle can attach.
//!
//! ## Synchronization
//!
//! None. Processes sharing a segment must coordinate access themselves.

pub mod access;
pub mod options;
pub mod platform;
pub mod shared_memory;

pub use access::{AccessMode, ReadOnly, ReadWrite};
pub use options::{CreateOptions, DEFAULT_MODE, PERMISSION_MASK};
pub use platform::*;
pub use shared_memory::SharedMemory;

// Cross-handle tests are in the tests/ directory
