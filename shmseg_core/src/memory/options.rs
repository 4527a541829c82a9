use serde::{Deserialize, Serialize};

/// Permission bits that `shm_open` honours (owner/group/other rwx).
pub const PERMISSION_MASK: u32 = 0o777;

/// Permission bits used when none are given: owner read/write.
pub const DEFAULT_MODE: u32 = 0o600;

/// Parameters of the create-or-resize constructor.
///
/// ```
/// use shmseg_core::CreateOptions;
///
/// let options = CreateOptions::new().with_size(4096).with_mode(0o660);
/// assert!(options.exclusive);
/// assert_eq!(options.permission_bits(), 0o660);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOptions {
    /// Size in bytes the object is truncated/extended to. 0 keeps the current size.
    pub size: usize,
    /// Fail with `EEXIST` when the object already exists.
    ///
    /// With `exclusive == false` every creator of the same name owns teardown, so two
    /// non-exclusive creators racing on one name may unlink it while the other still
    /// relies on it.
    pub exclusive: bool,
    /// Permission bits for a newly created object. Bits above `0o777` are ignored.
    pub mode: u32,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            size: 0,
            exclusive: true,
            mode: DEFAULT_MODE,
        }
    }
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// `mode` reduced to the bits passed to `shm_open`.
    pub fn permission_bits(&self) -> u32 {
        self.mode & PERMISSION_MASK
    }
}
