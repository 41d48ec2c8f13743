//! Error type for help-file processing.
//!
//! Every failure while scanning, parsing or deducing a help file is a
//! [`HelpFileError`]: an [`ErrorKind`], a message, the definition line(s) it
//! concerns and, once known, the file name. Processing is fail-fast, so a
//! document produces at most one error.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a [`HelpFileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A definition block is not closed, or a property is not `Key: Value`.
    MalformedDefinition,
    /// A property key is not in the legal key set.
    UnknownProperty,
    /// Flag text could not be tokenized.
    IllegalFlagSyntax,
    /// `Type` or `ValueType` has an illegal value.
    IllegalTypeValue,
    /// A quoted literal is not closed.
    MissingClosingToken,
    /// A property value (count, values, visibility) is malformed.
    InvalidPropertyValue,
    /// Two properties, or two definitions, contradict each other.
    ConflictingProperty,
    /// Options writing to one member declare different counts.
    ConflictingCount,
    /// No single value type fits the member's literals.
    AmbiguousOrInvalidType,
    /// The default value is not allowed or has the wrong shape.
    IllegalDefaultValue,
    /// A property that is required in this context is missing or empty.
    MissingRequiredProperty,
    /// An `Index` is not a number or out of range.
    InvalidIndex,
    /// Two arguments declare the same `Index`.
    DuplicateIndex,
    /// The help file could not be read.
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedDefinition => "malformed definition",
            Self::UnknownProperty => "unknown property",
            Self::IllegalFlagSyntax => "illegal flag syntax",
            Self::IllegalTypeValue => "illegal type value",
            Self::MissingClosingToken => "missing closing token",
            Self::InvalidPropertyValue => "invalid property value",
            Self::ConflictingProperty => "conflicting property",
            Self::ConflictingCount => "conflicting count",
            Self::AmbiguousOrInvalidType => "ambiguous or invalid type",
            Self::IllegalDefaultValue => "illegal default value",
            Self::MissingRequiredProperty => "missing required property",
            Self::InvalidIndex => "invalid index",
            Self::DuplicateIndex => "duplicate index",
            Self::Io => "I/O error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A help-file error with source context.
///
/// Formats as `FILE[LINES] Error: MESSAGE`, dropping the parts that are not
/// known.
///
/// # Examples
///
/// ```
/// use helpspec_core::{ErrorKind, HelpFileError};
///
/// let err = HelpFileError::new(ErrorKind::DuplicateIndex, "Two arguments can't have the same index.")
///     .with_lines([4, 9])
///     .with_file("app.help");
/// assert_eq!(
///     err.to_string(),
///     "app.help[4, 9] Error: Two arguments can't have the same index."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}Error: {message}", location(.file_name, .lines))]
pub struct HelpFileError {
    pub kind: ErrorKind,
    pub message: String,
    /// Definition lines the error concerns (1-based, ascending).
    pub lines: Vec<usize>,
    pub file_name: Option<String>,
}

impl HelpFileError {
    /// Creates an error without location.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            lines: Vec::new(),
            file_name: None,
        }
    }

    /// Attaches a single line.
    pub fn at_line(self, line: usize) -> Self {
        self.with_lines([line])
    }

    /// Attaches the lines of every contributing definition. Existing lines
    /// are kept; lines are sorted and deduplicated.
    pub fn with_lines(mut self, lines: impl IntoIterator<Item = usize>) -> Self {
        self.lines.extend(lines);
        self.lines.sort_unstable();
        self.lines.dedup();
        self
    }

    /// Attaches the file name.
    pub fn with_file(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// The lines joined as `"4, 9"`.
    pub fn lines_text(&self) -> String {
        join_lines(&self.lines)
    }
}

fn join_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn location(file_name: &Option<String>, lines: &[usize]) -> String {
    match (file_name, lines.is_empty()) {
        (Some(file), false) => format!("{file}[{}] ", join_lines(lines)),
        (Some(file), true) => format!("{file} "),
        (None, false) => format!("[{}] ", join_lines(lines)),
        (None, true) => String::new(),
    }
}

/// Convenience alias for results with [`HelpFileError`].
pub type Result<T> = std::result::Result<T, HelpFileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_without_context() {
        let err = HelpFileError::new(ErrorKind::UnknownProperty, "Unknown property name: foo");
        assert_eq!(err.to_string(), "Error: Unknown property name: foo");
    }

    #[test]
    fn test_error_with_file_only() {
        let err = HelpFileError::new(ErrorKind::MissingRequiredProperty, "There is no help option.")
            .with_file("tool.help");
        assert_eq!(err.to_string(), "tool.help Error: There is no help option.");
    }

    #[test]
    fn test_lines_are_sorted_and_deduplicated() {
        let err = HelpFileError::new(ErrorKind::ConflictingCount, "conflict")
            .at_line(12)
            .with_lines([3, 12, 5]);
        assert_eq!(err.lines, vec![3, 5, 12]);
        assert_eq!(err.to_string(), "[3, 5, 12] Error: conflict");
    }
}
