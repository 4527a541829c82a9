//! SHMSEG Manager Library
//!
//! Command implementations behind the `shmseg` binary.

pub mod commands;
