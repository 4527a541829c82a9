//! Error types for shared memory segments

use std::io;

/// Errors produced while creating, attaching to or indexing a segment.
///
/// Failures during teardown are never surfaced here; `Drop` logs them instead.
#[derive(Debug, thiserror::Error)]
pub enum ShmError {
    /// A caller-supplied argument was rejected before any OS call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An OS call (`shm_open`, `fstat`, `ftruncate`, `mmap`) failed.
    #[error("{op} failed for shared memory '{name}': {source}")]
    System {
        op: &'static str,
        name: String,
        #[source]
        source: io::Error,
    },

    /// A bounds-checked access reached past the end of the mapping.
    #[error(
        "index {index} out of range: element size {element_size} exceeds mapped size {size}"
    )]
    OutOfRange {
        index: usize,
        element_size: usize,
        size: usize,
    },

    /// A segment configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type ShmResult<T> = Result<T, ShmError>;

impl ShmError {
    pub(crate) fn system(op: &'static str, name: &str, source: io::Error) -> Self {
        Self::System {
            op,
            name: name.to_string(),
            source,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Raw `errno` of a [`ShmError::System`] error, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::System { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_error_names_operation_and_segment() {
        let err = ShmError::system("shm_open", "seg_a", io::Error::from_raw_os_error(libc::ENOENT));
        let message = err.to_string();
        assert!(message.contains("shm_open"));
        assert!(message.contains("'seg_a'"));
        assert_eq!(err.raw_os_error(), Some(libc::ENOENT));
        assert!(err.is_system());
    }

    #[test]
    fn test_error_kind_predicates() {
        let oor = ShmError::OutOfRange {
            index: 256,
            element_size: 4,
            size: 256,
        };
        assert!(oor.is_out_of_range());
        assert!(!oor.is_system());
        assert_eq!(oor.raw_os_error(), None);

        let invalid = ShmError::InvalidArgument("name is empty".into());
        assert!(invalid.is_invalid_argument());
        assert!(!invalid.is_out_of_range());
    }
}
