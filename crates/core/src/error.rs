//! Error types shared by every gallery engine and panel.

use thiserror::Error;

/// Errors produced by engine and panel operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or overflowed) when sizing a surface or grid.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// Input data failed validation at an API boundary (empty or too-short
    /// sequences, zero capacities, malformed parameters).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A grid coordinate was outside the valid domain.
    #[error("cell ({x}, {y}) out of bounds for grid of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A requested parameter name was not found in the params object.
    #[error("parameter not found: {0}")]
    ParamNotFound(String),

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed or looked up.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// No panel is registered under the given name.
    #[error("unknown panel: {0}")]
    UnknownPanel(String),

    /// Filesystem or encoding failure while writing a snapshot.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = EngineError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_input_includes_reason() {
        let msg = EngineError::invalid_input("ema requires at least one sample").to_string();
        assert!(msg.contains("at least one sample"), "got: {msg}");
    }

    #[test]
    fn out_of_bounds_includes_coordinates_and_dimensions() {
        let err = EngineError::OutOfBounds {
            x: 41,
            y: 17,
            width: 40,
            height: 20,
        };
        let msg = format!("{err}");
        assert!(msg.contains("41"), "missing x in: {msg}");
        assert!(msg.contains("17"), "missing y in: {msg}");
        assert!(msg.contains("40"), "missing width in: {msg}");
        assert!(msg.contains("20"), "missing height in: {msg}");
    }

    #[test]
    fn param_type_mismatch_includes_all_fields() {
        let err = EngineError::ParamTypeMismatch {
            name: "scale".into(),
            expected: "number".into(),
            got: "string".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("scale"), "missing param name in: {msg}");
        assert!(msg.contains("number"), "missing expected type in: {msg}");
        assert!(msg.contains("string"), "missing got type in: {msg}");
    }

    #[test]
    fn unknown_panel_includes_name() {
        let msg = EngineError::UnknownPanel("mandelbrot".into()).to_string();
        assert!(msg.contains("mandelbrot"), "got: {msg}");
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
