//! # Batch Error Types
//!
//! Structured error handling for batch runs using thiserror. A transform that
//! declines an element is not an error; it is reported as `Ok(None)` by the
//! transform and simply skipped by the aggregator.

use thiserror::Error;

/// Errors that can end a batch run
///
/// Generic over the transform's own error type so callers get their original
/// error back without boxing.
#[derive(Debug, Error)]
pub enum BatchError<E> {
    /// The transform failed for the element at `index`; the batch was aborted
    /// and no partial results were kept.
    #[error("Transform failed at element {index}: {source}")]
    TransformFailure {
        index: usize,
        #[source]
        source: E,
    },

    /// The surrounding context cancelled the batch after `processed` elements
    /// had been fully transformed.
    #[error("Batch cancelled after {processed} elements")]
    Cancelled { processed: usize },
}

impl<E> BatchError<E> {
    /// Create a transform failure for the element at `index`
    pub fn transform_failure(index: usize, source: E) -> Self {
        Self::TransformFailure { index, source }
    }

    /// Create a cancellation error
    pub fn cancelled(processed: usize) -> Self {
        Self::Cancelled { processed }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn is_transform_failure(&self) -> bool {
        matches!(self, Self::TransformFailure { .. })
    }

    /// Index of the element whose transform failed, if any
    pub fn failed_index(&self) -> Option<usize> {
        match self {
            Self::TransformFailure { index, .. } => Some(*index),
            Self::Cancelled { .. } => None,
        }
    }

    /// Unwrap the transform's own error, discarding cancellation
    pub fn into_transform_error(self) -> Option<E> {
        match self {
            Self::TransformFailure { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }
}

pub type BatchResult<T, E> = std::result::Result<T, BatchError<E>>;
