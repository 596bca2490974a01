//! # Error Types
//!
//! All error types for salt derivation and address prediction.

use thiserror::Error;

/// Errors from deployment planning and prediction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// A required string field is empty or a required address is zero.
    #[error("config invalid: {0}")]
    ConfigInvalid(String),

    /// Init code exceeds the deployable size limit.
    #[error("init code size exceeded: {size} > {max} bytes")]
    CodeSizeExceeded {
        /// Actual init-code size.
        size: usize,
        /// Maximum deployable size.
        max: usize,
    },

    /// Init code is empty; an empty payload has no content address.
    #[error("init code is empty")]
    EmptyInitCode,
}

impl DeployError {
    /// Returns true for configuration errors (bad plan fields or payloads),
    /// which are caller mistakes rather than runtime conditions.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigInvalid(_) | Self::CodeSizeExceeded { .. } | Self::EmptyInitCode
        )
    }
}
