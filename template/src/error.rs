//! Template errors.
//!
//! A template error is a defect in the template body (or in the resolver that
//! serves it) and aborts rendering.

use thiserror::Error;

/// Failure reported by a [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The resolver has no such key.
    #[error("unknown key \"{0}\"")]
    UnknownKey(String),
    /// The key exists but the arguments are unusable.
    #[error("invalid arguments for \"{key}\": {message}")]
    InvalidArguments { key: String, message: String },
}

/// Errors from rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// `[[[` without `]]]` on the same line.
    #[error("line {line}: \"[[[\" not followed by \"]]]\" on the same line")]
    UnterminatedDirective { line: usize },

    /// A directive starting with a keyword the engine doesn't know.
    #[error("line {line}: unknown directive keyword \"{keyword}\"")]
    UnknownDirectiveKeyword { line: usize, keyword: String },

    /// Unmatched or unclosed conditional or alignment directives, and
    /// conditionals with a missing or extra argument.
    #[error("line {line}: {message}")]
    StructuralImbalance { line: usize, message: String },

    /// A key with an opening parenthesis but no closing one, or no key at all.
    #[error("line {line}: malformed key \"{key}\"")]
    MalformedKey { line: usize, key: String },

    /// The resolver rejected a key.
    #[error("line {line}: can't expand \"{key}\": {source}")]
    Resolve {
        line: usize,
        key: String,
        #[source]
        source: ResolveError,
    },
}

/// Convenience alias for results with [`TemplateError`].
pub type Result<T> = std::result::Result<T, TemplateError>;
