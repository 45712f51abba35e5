//! Error taxonomy for the message history library
//!
//! Construction-time problems (duplicate type names, throwing detectors)
//! surface as real errors to the caller. Render-time problems never escape
//! `Component::render`; they are converted into an inline error display,
//! with `RenderError` only crossing the renderer → dispatch boundary.

use thiserror::Error;

/// Boxed error produced by caller-supplied detector functions.
pub type DetectorError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by registry mutations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The requested type name collides with a built-in or an already
    /// registered custom type. The earlier registration stays intact.
    #[error("component type '{0}' already exists")]
    DuplicateType(String),
}

/// Errors raised while resolving a component type for a content value.
///
/// Resolution itself is total (TEXT is the terminal fallback), so the only
/// failure mode is a custom detector erroring out mid-scan.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A registered detector returned an error. Propagated unmodified to
    /// whoever triggered component construction.
    #[error("detector for component type '{type_name}' failed: {source}")]
    Detector {
        type_name: String,
        #[source]
        source: DetectorError,
    },
}

/// Errors raised by `Message::call` when invoking a registered builder method.
#[derive(Debug, Error)]
pub enum MethodError {
    #[error("no registered component method named '{0}'")]
    Unknown(String),
}

/// Failure reported by a renderer (custom or built-in).
///
/// Never escapes `Component::render`: the dispatch site catches it and runs
/// the inline-error + debug-panel path instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{0}")]
    Message(String),

    /// Content shape does not fit the resolved type's built-in routine,
    /// e.g. text forced to TABLE via `is_table`.
    #[error("content of type '{content}' cannot be rendered as '{component}'")]
    UnsupportedContent {
        content: &'static str,
        component: String,
    },

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl RenderError {
    /// Convenience constructor for ad-hoc renderer failures.
    pub fn msg(message: impl Into<String>) -> Self {
        RenderError::Message(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_type_message_names_the_type() {
        let err = RegistryError::DuplicateType("video".to_string());
        assert_eq!(err.to_string(), "component type 'video' already exists");
    }

    #[test]
    fn test_render_error_msg_roundtrip() {
        let err = RenderError::msg("boom");
        assert_eq!(err.to_string(), "boom");
    }
}
