//! Errors raised while building chests or loading templates.

use thiserror::Error;

/// Errors returned by chest construction and template loading.
///
/// Lookups never produce these: a missing chest or a chest of another type is
/// a plain `None`.
#[derive(Debug, Error)]
pub enum ChestError {
    /// A persisted record carried a chest type tag no variant answers to.
    #[error("unknown chest type: {0}")]
    UnknownVariant(String),

    /// A record or placement referenced a template missing from the catalog.
    #[error("unknown chest template: {0}")]
    UnknownTemplate(String),

    /// A template failed validation.
    #[error("invalid chest template {name}: {reason}")]
    InvalidTemplate {
        /// The template's configured name.
        name: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}
