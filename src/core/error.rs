//! Curation errors.
//!
//! These are caller mistakes (bad index from UI wiring, nonsense interval),
//! not runtime conditions worth retrying. Callers log them and move on.

/// Errors raised by FrameSequence / SelectionSet / Curation mutators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurationError {
    /// Index outside `[0, len)`
    OutOfRange { index: usize, len: usize },
    /// Preview interval must be at least 1 ms
    InvalidInterval(u64),
}

impl std::fmt::Display for CurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurationError::OutOfRange { index, len } => {
                write!(f, "Frame index {} out of range (sequence length {})", index, len)
            }
            CurationError::InvalidInterval(ms) => write!(f, "Invalid preview interval: {} ms", ms),
        }
    }
}

impl std::error::Error for CurationError {}

/// Check `index < len`, producing `OutOfRange` otherwise.
#[inline]
pub(crate) fn check_index(index: usize, len: usize) -> Result<(), CurationError> {
    if index < len {
        Ok(())
    } else {
        Err(CurationError::OutOfRange { index, len })
    }
}
