//! Annotated help-text parsing.
//!
//! A help file is ordinary help text in which every option and argument is
//! wrapped in a definition block:
//!
//! ```text
//! Usage: tool [options] <file>
//!
//!   ${-v, --verbose}$       Print more.
//!   ${-n N, --count=N | Values: [1..10]}$  Repeat N times.
//!   ${<file>}$              The input.
//! ${| Text: --secret | Visible: false}$
//! ```
//!
//! This crate scans such a file, parses the `Key: Value` properties of each
//! block and deduces a consistent model: one [`Member`] per target field, each
//! owning the [`Argument`]s that write to it, with counts, delimiters, value
//! types, kinds, indices and defaults filled in.
//!
//! # Main entry points
//!
//! - [`parse_help_text`]: parse help text held in memory.
//! - [`parse_help_file`]: read and parse a help file.
//! - [`ModelResolver`]: expose a parsed document to
//!   [`helpspec_template`] templates.
//! - [`output::format_document`]: dump a document as JSON, YAML or a summary.
//!
//! # Example
//!
//! ```
//! use helpspec_core::{MemberKind, ParserConfig, ValueType};
//! use helpspec_parser::parse_help_text;
//!
//! let help = "\
//! Usage: tool [options] <file>
//!   ${-h, --help}$     Show help.
//!   ${-n N, --count=N}$  Repeat N times.
//!   ${<file>}$         The input.
//! ";
//!
//! let doc = parse_help_text(help, &ParserConfig::default()).unwrap();
//! assert!(doc.text.contains("  -n N, --count=N  Repeat N times."));
//!
//! let help_member = doc.member("help").unwrap();
//! assert_eq!(help_member.kind, MemberKind::Help);
//!
//! let file = doc.member("file").unwrap();
//! assert_eq!(file.arguments[0].index, Some(0));
//! assert_eq!(file.value_type, ValueType::String);
//! ```

mod deduce;
pub mod output;
mod properties;
mod resolver;
mod scanner;
mod session;

use std::path::Path;

use helpspec_core::{Argument, ErrorKind, HelpFileError, Member, ParserConfig, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use resolver::{MemberField, ModelKey, ModelResolver};
pub use session::Session;

/// The result of parsing a help document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpDocument {
    /// The help text with every definition replaced by its visible text.
    pub text: String,
    /// Members sorted by name.
    pub members: Vec<Member>,
    /// 0-based lines of `text` that begin with a visible definition.
    pub definition_lines: Vec<usize>,
}

impl HelpDocument {
    /// Every argument, in document order.
    pub fn arguments(&self) -> Vec<&Argument> {
        let mut arguments: Vec<&Argument> = self
            .members
            .iter()
            .flat_map(|member| member.arguments.iter())
            .collect();
        arguments.sort_by_key(|arg| arg.ordinal);
        arguments
    }

    /// Option-like arguments, in document order.
    pub fn options(&self) -> Vec<&Argument> {
        self.arguments()
            .into_iter()
            .filter(|arg| arg.is_option())
            .collect()
    }

    /// Positional arguments, in document order.
    pub fn positionals(&self) -> Vec<&Argument> {
        self.arguments()
            .into_iter()
            .filter(|arg| !arg.is_option())
            .collect()
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.name == name)
    }

    /// The member an argument belongs to.
    pub fn member_of(&self, argument: &Argument) -> Option<&Member> {
        argument
            .member_index
            .and_then(|index| self.members.get(index))
    }
}

/// Parses help text with a fresh [`Session`].
///
/// # Errors
///
/// Returns the first [`HelpFileError`] found in the text.
pub fn parse_help_text(text: &str, config: &ParserConfig) -> Result<HelpDocument> {
    Session::new(config).parse_document(text)
}

/// Reads and parses a help file. Errors carry the file name.
///
/// # Errors
///
/// Returns a [`HelpFileError`] of kind [`ErrorKind::Io`] when the file can't
/// be read, or the first error found in its text.
pub fn parse_help_file(path: impl AsRef<Path>, config: &ParserConfig) -> Result<HelpDocument> {
    let path = path.as_ref();
    let file_name = path.display().to_string();
    debug!(file = %file_name, "parsing help file");
    let text = std::fs::read_to_string(path).map_err(|err| {
        HelpFileError::new(ErrorKind::Io, format!("can't read file: {err}")).with_file(&file_name)
    })?;
    parse_help_text(&text, config).map_err(|err| err.with_file(file_name))
}
