use thiserror::Error;

/// The error type for `smaat-unet` operations.
///
/// Every variant is raised either while building a model from its
/// configuration or at the start of a forward call. Nothing is retried.
#[derive(Error, Debug)]
pub enum UNetError {
    /// Error for when an invalid model configuration is provided.
    /// This can happen if configuration parameters are logically inconsistent.
    #[error("Invalid model configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// Error for when an input tensor has an invalid shape.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },

    /// Error for when loading model weights fails.
    #[error("Failed to load weights: {reason}")]
    WeightLoadingFailed {
        /// The reason for the weight loading failure.
        reason: String,
    },

    /// Error for when writing a checkpoint or its configuration fails.
    #[error("Failed to save weights: {reason}")]
    WeightSavingFailed {
        /// The reason for the saving failure.
        reason: String,
    },
}

/// A specialized `Result` type for `smaat-unet` operations.
pub type UNetResult<T> = Result<T, UNetError>;
