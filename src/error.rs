//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the pointpick crate.
#[derive(Debug)]
pub enum PickError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// A shader program, vertex buffer or render target could not be
    /// created.
    ResourceCreation {
        /// What was being allocated (e.g. "offscreen target").
        resource: &'static str,
        /// Why the allocation was refused.
        reason: String,
    },
    /// Reading a pixel back from the bound target failed.
    Readback(String),
    /// The point dataset violates an id invariant.
    InvalidDataset(String),
    /// Options that would break picking, such as a pickable background.
    InvalidOptions(String),
    /// A handle did not refer to a live surface resource.
    UnknownHandle(&'static str),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl PickError {
    pub(crate) fn resource(
        resource: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::ResourceCreation {
            resource,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::ResourceCreation { resource, reason } => {
                write!(f, "failed to create {resource}: {reason}")
            }
            Self::Readback(msg) => write!(f, "pixel readback failed: {msg}"),
            Self::InvalidDataset(msg) => write!(f, "invalid dataset: {msg}"),
            Self::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
            Self::UnknownHandle(kind) => write!(f, "unknown {kind} handle"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for PickError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for PickError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for PickError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
