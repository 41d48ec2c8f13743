//! Line-oriented template expansion.
//!
//! Templates are plain text with directives in triple brackets:
//!
//! - `[[[key]]]` and `[[[key(a, b)]]]` expand a key through a [`Resolver`].
//! - `[[[IF key]]]`, `[[[ELIF key]]]`, `[[[ELSE]]]` and `[[[ENDIF]]]` select
//!   text. Conditions nested in a branch that is not taken are never resolved.
//! - `[[[>]]]`, `[[[|]]]` and `[[[<]]]` push, re-emit and pop a column
//!   alignment, so continuation lines can be lined up under an earlier column.
//!
//! A conditional directive alone on its line removes that line from the
//! output. When a key resolves to several lines, the continuation lines are
//! indented to the column where the key was expanded.
//!
//! # Example
//!
//! ```
//! use helpspec_template::{Context, ResolveError, Value, render};
//!
//! let resolver = |key: &str, _args: &[String], _context: &Context| -> Result<Value, ResolveError> {
//!     match key {
//!         "checks" => Ok(Value::Lines(vec!["a &&".into(), "b".into()])),
//!         "strict" => Ok(Value::Bool(true)),
//!         _ => Err(ResolveError::UnknownKey(key.to_string())),
//!     }
//! };
//! let template = "[[[IF strict]]]\nif ([[[checks]]])\n[[[ENDIF]]]";
//! assert_eq!(render(template, &resolver).unwrap(), "if (a &&\n    b)");
//! ```

mod error;
mod processor;
mod resolver;
mod token;

pub use error::{ResolveError, Result, TemplateError};
pub use processor::{render, render_lines};
pub use resolver::{Context, MapResolver, Resolver, Value};
