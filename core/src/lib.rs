//! Core model for annotated help-text documents.
//!
//! This crate defines the types shared by the help-file parser and the code
//! that renders it:
//!
//! - [`Argument`]: one option flag-set or positional slot of the help file.
//! - [`Member`]: all arguments writing to the same target, i.e. one field of
//!   the generated result.
//! - [`CountRange`] / [`Bound`]: occurrence and delimiter counts.
//! - [`ValueConstraint`]: legal values from the `Values` property.
//! - [`HelpFileError`]: a located error with an [`ErrorKind`].
//! - [`ParserConfig`]: definition tokens and dialect switches.
//!
//! # Example
//!
//! ```
//! use helpspec_core::*;
//!
//! let count = CountRange::parse("1..").unwrap();
//! assert_eq!(count.max, Bound::Unbounded);
//!
//! let config = ParserConfig {
//!     default_rule: DefaultValueRule::ListKind,
//!     ..ParserConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

mod config;
mod count;
mod error;
mod types;
mod values;

pub use config::{
    ConfigError, DEFAULT_DEFINITION_END, DEFAULT_DEFINITION_START, DEFAULT_SEPARATOR,
    DefaultValueRule, ParserConfig, PropertyDialect, Syntax,
};
pub use count::{Bound, CountParseError, CountRange};
pub use error::{ErrorKind, HelpFileError, Result};
pub use types::{Argument, Member, MemberKind, ValueType};
pub use values::{Limit, ValueConstraint, ValuesParseError};
