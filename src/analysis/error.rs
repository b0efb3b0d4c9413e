use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("invalid image: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("model call failed: {0}")]
    Model(String),

    #[error("model returned no usable probabilities")]
    EmptyPrediction,

    /// The model and the class label list are out of sync; an operator error.
    #[error("predicted class {index} is out of range for {len} class labels; model and label list are out of sync")]
    ConfigMismatch { index: usize, len: usize },
}
