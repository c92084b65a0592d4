/// Errors raised while decoding or building fragment bodies.
///
/// Reassembly itself never fails; protocol violations reset the reassembler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
    /// The body is too short for the fragment header.
    #[error("fragment truncated (need {needed} bytes, have {available})")]
    Truncated { needed: usize, available: usize },

    /// A header field does not fit its bit width.
    #[error("fragment {field} {value} out of range (max {max})")]
    FieldOutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },

    /// Splitting needs a chunk size of at least one byte.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

pub type Result<T> = std::result::Result<T, FragmentError>;
