use thiserror::Error;

/// Failures of a render layer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The embedded shader did not compile. Fatal to the layer.
    #[error("{layer}: shader compilation failed: {message}")]
    ShaderCompile { layer: &'static str, message: String },

    /// `draw` was called before a successful `create`.
    #[error("{layer}: draw called before create")]
    NotCreated { layer: &'static str },

    #[error("{layer}: {message}")]
    InvalidInput { layer: &'static str, message: String },
}
