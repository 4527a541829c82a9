// Where the platform's shared memory namespace is visible in the filesystem
//
// Linux: /dev/shm (tmpfs - every shm_open object shows up as a file)
// FreeBSD/macOS: objects live in a kernel namespace with no filesystem view

use std::path::PathBuf;

/// Filesystem path of the shared memory object `name`, if the platform exposes one.
///
/// Names follow POSIX convention (`/name`); the leading slash is dropped:
/// - Linux: `/dev/shm/<name>`
/// - elsewhere: `None`
pub fn shm_object_path(name: &str) -> Option<PathBuf> {
    let name = name.trim_start_matches('/');
    if name.is_empty() {
        return None;
    }

    #[cfg(target_os = "linux")]
    {
        Some(PathBuf::from("/dev/shm").join(name))
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Whether the object `name` currently exists, when that can be observed.
///
/// Returns `None` on platforms without a filesystem view of the namespace.
pub fn shm_object_exists(name: &str) -> Option<bool> {
    shm_object_path(name).map(|path| path.exists())
}

/// Check if we're running on a platform with a filesystem-visible shm namespace
pub fn has_native_shm() -> bool {
    #[cfg(target_os = "linux")]
    {
        true
    }

    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

/// Get platform name for logging/diagnostics
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "Linux"
    }

    #[cfg(target_os = "macos")]
    {
        "macOS"
    }

    #[cfg(target_os = "freebsd")]
    {
        "FreeBSD"
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "freebsd")))]
    {
        "Unix"
    }
}
