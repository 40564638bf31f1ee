//! Error types for the non-Vulkan layers.

use thiserror::Error;

/// Error type shared by the window and application layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Window creation or management errors
    #[error("Window error: {0}")]
    Window(String),
}

/// Result type alias using the demo's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_error_carries_message() {
        let err = Error::Window("no display".to_string());
        assert_eq!(err.to_string(), "Window error: no display");
    }
}
