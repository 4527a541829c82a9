//! `shmseg version`

use colored::*;
use shmseg_core::memory::platform::platform_name;
use shmseg_core::version;

/// Print library, build and platform information
pub fn run_version() {
    println!("{}", version::lib_info().cyan().bold());
    println!("  {:<10} {}", "built:", version::lib_date());
    println!("  {:<10} {}", "commit:", version::git_hash());
    println!("  {:<10} {}", "platform:", platform_name());
}
