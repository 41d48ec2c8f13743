//! Legal-value constraints from the `Values` property.
//!
//! A constraint list is a whitespace separated sequence of exact literals and
//! ranges. `[0..10)` accepts 0 up to but not including 10, `(0..` accepts
//! anything above 0 and `"fast" "slow"` accepts two string literals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One end of a range constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// The literal as written in the help file.
    pub literal: String,
    /// Whether the literal itself is accepted.
    pub inclusive: bool,
}

impl Limit {
    fn new(literal: &str, inclusive: bool) -> Self {
        Self {
            literal: literal.to_string(),
            inclusive,
        }
    }
}

/// A single legal-value constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueConstraint {
    /// Exactly this literal.
    Exact(String),
    /// Values between two limits; at least one limit is present.
    Range {
        lower: Option<Limit>,
        upper: Option<Limit>,
    },
}

/// Errors from [`ValueConstraint::parse_list`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValuesParseError {
    /// A string literal has no closing quote.
    #[error("values contain an unterminated string: {0}")]
    UnterminatedQuote(String),
    /// `..` without any limit.
    #[error("range without limits in values: \"{0}\"")]
    EmptyRange(String),
}

impl ValueConstraint {
    /// Every literal mentioned by the constraint.
    pub fn literals(&self) -> Vec<&str> {
        match self {
            Self::Exact(value) => vec![value.as_str()],
            Self::Range { lower, upper } => lower
                .iter()
                .chain(upper.iter())
                .map(|limit| limit.literal.as_str())
                .collect(),
        }
    }

    /// The lowest accepted literal, if the constraint includes it.
    pub fn inclusive_lower(&self) -> Option<&str> {
        match self {
            Self::Exact(value) => Some(value.as_str()),
            Self::Range {
                lower: Some(limit), ..
            } if limit.inclusive => Some(limit.literal.as_str()),
            Self::Range { .. } => None,
        }
    }

    /// Parses the text of a `Values` property.
    ///
    /// # Errors
    ///
    /// Returns [`ValuesParseError`] when a quote is left open or a range has
    /// neither a lower nor an upper limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpspec_core::ValueConstraint;
    ///
    /// let values = ValueConstraint::parse_list("[0.0..5.0) 10").unwrap();
    /// assert_eq!(values.len(), 2);
    /// assert_eq!(values[0].inclusive_lower(), Some("0.0"));
    /// assert_eq!(values[1], ValueConstraint::Exact("10".to_string()));
    /// ```
    pub fn parse_list(text: &str) -> Result<Vec<Self>, ValuesParseError> {
        tokenize(text)?
            .into_iter()
            .map(|token| Self::parse_token(&token))
            .collect()
    }

    fn parse_token(token: &str) -> Result<Self, ValuesParseError> {
        if is_quoted(token) {
            return Ok(Self::Exact(token.to_string()));
        }
        let Some((start, end)) = token.split_once("..") else {
            return Ok(Self::Exact(token.to_string()));
        };

        let lower_inclusive = !start.starts_with('(');
        let start = start.trim_start_matches(['[', '(']);
        let upper_inclusive = !end.ends_with(')');
        let end = end.trim_end_matches([']', ')']);

        if start.is_empty() && end.is_empty() {
            return Err(ValuesParseError::EmptyRange(token.to_string()));
        }
        Ok(Self::Range {
            lower: (!start.is_empty()).then(|| Limit::new(start, lower_inclusive)),
            upper: (!end.is_empty()).then(|| Limit::new(end, upper_inclusive)),
        })
    }
}

fn is_quoted(token: &str) -> bool {
    token.len() > 1 && token.starts_with('"') && token.ends_with('"') && token.matches('"').count() == 2
}

fn tokenize(text: &str) -> Result<Vec<String>, ValuesParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in text.chars() {
        if c == '"' {
            quoted = !quoted;
            current.push(c);
        } else if c.is_whitespace() && !quoted {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }

    if quoted {
        return Err(ValuesParseError::UnterminatedQuote(current));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}
