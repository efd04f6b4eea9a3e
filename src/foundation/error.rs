/// Convenience result type used across svgraph.
pub type SvgraphResult<T> = Result<T, SvgraphError>;

/// Top-level error taxonomy used by document, render and filter APIs.
#[derive(thiserror::Error, Debug)]
pub enum SvgraphError {
    /// The document is not well-formed XML. Fatal for the load.
    #[error("parse error: {0}")]
    Parse(String),

    /// A malformed attribute value. Recovered locally by callers that treat the attribute as
    /// absent; only the attribute helpers surface it.
    #[error("attribute error: {0}")]
    Attribute(String),

    /// A render request named an identifier that is not registered.
    #[error("not found: {0}")]
    NotFound(String),

    /// A resource guard tripped (nesting, reference chain, surface size, kernel size).
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Surface allocation failure or a corrupted layer stack.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid filter primitive configuration.
    #[error("filter error: {0}")]
    Filter(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SvgraphError {
    /// Build a [`SvgraphError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`SvgraphError::Attribute`] value.
    pub fn attribute(msg: impl Into<String>) -> Self {
        Self::Attribute(msg.into())
    }

    /// Build a [`SvgraphError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`SvgraphError::Limit`] value.
    pub fn limit(msg: impl Into<String>) -> Self {
        Self::Limit(msg.into())
    }

    /// Build a [`SvgraphError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SvgraphError::Filter`] value.
    pub fn filter(msg: impl Into<String>) -> Self {
        Self::Filter(msg.into())
    }

    /// Errors that abort only the subtree or primitive that raised them.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Limit(_) | Self::Filter(_) | Self::Attribute(_) | Self::NotFound(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
