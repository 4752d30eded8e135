//! Error types for infern

use thiserror::Error;

/// Result type alias using infern's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during operator planning.
///
/// Both classes are detected when a plan is constructed, never during
/// execution; the execution loops assume validated geometry and run
/// branch-free. When the `geometry-checks` feature is disabled no validation
/// runs at all and the caller owns correctness.
#[derive(Error, Debug)]
pub enum Error {
    /// A job's output rectangle, channel alignment, or window placement is
    /// unusable. Fatal to the operator instantiation: no plan is produced.
    #[error("invalid job geometry (job {job}): {reason}")]
    InvalidJobGeometry {
        /// Index of the offending job in the submitted partition
        job: usize,
        /// What the job violated
        reason: String,
    },

    /// A tensor's channel count violates the hardware's minimum group-width
    /// divisibility requirement. Detected before any stride arithmetic.
    #[error("invalid channel count: {tensor} tensor has {channels} channels, must be a multiple of {divisor}")]
    InvalidChannelCount {
        /// Which tensor ("input" or "output")
        tensor: &'static str,
        /// The offending channel count
        channels: usize,
        /// Required divisor
        divisor: usize,
    },
}

impl Error {
    /// Create an invalid-job-geometry error
    pub(crate) fn job_geometry(job: usize, reason: impl Into<String>) -> Self {
        Self::InvalidJobGeometry {
            job,
            reason: reason.into(),
        }
    }
}
