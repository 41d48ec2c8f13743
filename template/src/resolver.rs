//! The protocol between the template engine and the code that supplies values.

use std::collections::BTreeMap;
use std::fmt;

use crate::ResolveError;

/// What a key expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    /// A fragment inserted at the cursor. Embedded newlines start new lines
    /// without alignment.
    Text(String),
    /// Lines inserted at the cursor; continuation lines are aligned with the
    /// column where the expansion started.
    Lines(Vec<String>),
}

impl Value {
    /// Truthiness used by `IF` and `ELIF`: `false`, `0`, empty text and an
    /// empty line list are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Text(s) => !s.is_empty(),
            Self::Lines(lines) => !lines.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Lines(lines) => f.write_str(&lines.join("\n")),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::Lines(value)
    }
}

/// Cursor position handed to the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Leading whitespace of the current output line.
    pub indentation: String,
    /// Current column (in characters) of the output line.
    pub column: usize,
}

impl Context {
    /// The indentation extended with spaces up to the column.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpspec_template::Context;
    ///
    /// let context = Context { indentation: "\t".to_string(), column: 4 };
    /// assert_eq!(context.alignment(), "\t   ");
    /// ```
    pub fn alignment(&self) -> String {
        let width = self.indentation.chars().count();
        let mut alignment = self.indentation.clone();
        alignment.push_str(&" ".repeat(self.column.saturating_sub(width)));
        alignment
    }
}

/// Supplies values for template keys.
///
/// `resolve` receives the key, the arguments written in parentheses after it
/// (already split on commas and trimmed) and the cursor context. Plain keys
/// ignore the arguments and context; computed keys use them to produce text
/// that fits the position.
pub trait Resolver {
    fn resolve(&self, key: &str, args: &[String], context: &Context)
    -> Result<Value, ResolveError>;
}

impl<F> Resolver for F
where
    F: Fn(&str, &[String], &Context) -> Result<Value, ResolveError>,
{
    fn resolve(
        &self,
        key: &str,
        args: &[String],
        context: &Context,
    ) -> Result<Value, ResolveError> {
        self(key, args, context)
    }
}

/// A resolver backed by a fixed table of plain values.
///
/// # Examples
///
/// ```
/// use helpspec_template::{MapResolver, render};
///
/// let resolver = MapResolver::new()
///     .with("name", "tool")
///     .with("verbose", true);
/// let text = render("[[[IF verbose]]]loud [[[ENDIF]]][[[name]]]", &resolver).unwrap();
/// assert_eq!(text, "loud tool");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: BTreeMap<String, Value>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }
}

impl Resolver for MapResolver {
    fn resolve(&self, key: &str, _args: &[String], _context: &Context) -> Result<Value, ResolveError> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownKey(key.to_string()))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MapResolver {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for (key, value) in iter {
            resolver.insert(key, value);
        }
        resolver
    }
}
