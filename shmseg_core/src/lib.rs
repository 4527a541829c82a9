//! # SHMSEG Core
//!
//! Named POSIX shared memory segments for inter-process communication.
//!
//! One process creates (or sizes) a segment by name, others attach to it, and every
//! handle sees the same bytes. This crate provides:
//!
//! - **SharedMemory**: create/attach, owner-aware cleanup on drop, bounds-checked
//!   typed access
//! - **Access modes**: `ReadWrite` and `ReadOnly` handles; only read-write handles
//!   hand out mutable views
//! - **Config**: TOML description of a segment
//! - **Version**: library and build metadata
//!
//! ## Quick Start
//!
//! ```no_run
//! use shmseg_core::{CreateOptions, SharedMemory};
//!
//! let owner = SharedMemory::create("/seg_a", CreateOptions::new().with_size(256))?;
//!
//! let mut peer = SharedMemory::connect("/seg_a")?;
//! assert_eq!(peer.size(), 256);
//! *peer.at_mut::<i32>(5)? = 0x42;
//!
//! assert_eq!(*owner.at::<i32>(5)?, 0x42);
//! assert!(owner.at::<i32>(256).is_err());
//!
//! drop(owner); // unlinks "/seg_a"
//! assert!(SharedMemory::connect("/seg_a").is_err());
//! # Ok::<(), shmseg_core::ShmError>(())
//! ```

#[cfg(not(unix))]
compile_error!("shmseg_core requires POSIX shared memory (shm_open/mmap)");

pub mod config;
pub mod error;
pub mod memory;
pub mod version;

// Re-export commonly used types for easy access
pub use config::SegmentConfig;
pub use error::{ShmError, ShmResult};
pub use memory::{AccessMode, CreateOptions, ReadOnly, ReadWrite, SharedMemory};

// Element types for typed access
pub use bytemuck::{Pod, Zeroable};
