//! Build and version information
//!
//! `SHMSEG_BUILD_DATE` and `SHMSEG_GIT_HASH` are set by the build script.

const UNKNOWN: &str = "unknown";

pub fn lib_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

pub fn lib_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// `"<name> <version> - rustc on <os>/<arch>"`
pub fn lib_info() -> String {
    format!(
        "{} {} - rustc on {}/{}",
        lib_name(),
        lib_version(),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Date and time the library was compiled (UTC)
pub fn lib_date() -> &'static str {
    option_env!("SHMSEG_BUILD_DATE").unwrap_or(UNKNOWN)
}

/// Short git commit hash of the build, if it was built from a checkout
pub fn git_hash() -> &'static str {
    option_env!("SHMSEG_GIT_HASH").unwrap_or(UNKNOWN)
}
