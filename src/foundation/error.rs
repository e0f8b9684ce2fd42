/// Convenience result type used across fluxstage.
pub type FluxResult<T> = Result<T, FluxError>;

/// Top-level error taxonomy used by setup-time APIs.
///
/// Nothing in the per-frame path returns these; frame ticks degrade and log instead.
#[derive(thiserror::Error, Debug)]
pub enum FluxError {
    /// Invalid step, script, mesh or scene configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Parameters that would make per-frame evaluation divide by zero or produce NaN.
    #[error("numeric error: {0}")]
    Numeric(String),

    /// Operation not allowed in the current lifecycle state.
    #[error("state error: {0}")]
    State(String),

    /// `play` was asked for a script name that was never registered.
    #[error("unknown transition script '{0}'")]
    UnknownScript(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FluxError {
    /// Build a [`FluxError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`FluxError::Numeric`] value.
    pub fn numeric(msg: impl Into<String>) -> Self {
        Self::Numeric(msg.into())
    }

    /// Build a [`FluxError::State`] value.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`FluxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for FluxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
