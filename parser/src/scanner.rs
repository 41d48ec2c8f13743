//! Definition scanner.
//!
//! Finds the `${ ... }$` blocks of a help document, replaces each block by its
//! visible text and collects the raw block bodies for the property parser.

use helpspec_core::{ErrorKind, HelpFileError, Result, Syntax};
use tracing::debug;

use crate::properties::split_single;

/// The body of one definition block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawDefinition {
    /// Line of the opening token (1-based).
    pub(crate) line: usize,
    /// Everything between the opening and closing tokens.
    pub(crate) body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Scanned {
    /// The document with every block replaced by its visible text.
    pub(crate) text: String,
    pub(crate) definitions: Vec<RawDefinition>,
    /// 0-based lines of `text` that start with a visible definition.
    pub(crate) definition_lines: Vec<usize>,
}

pub(crate) fn scan(text: &str, syntax: &Syntax) -> Result<Scanned> {
    let start_token = syntax.definition_start.as_str();
    let end_token = syntax.definition_end.as_str();
    if start_token.is_empty() || end_token.is_empty() {
        return Err(HelpFileError::new(
            ErrorKind::InvalidPropertyValue,
            "Definition tokens can't be empty",
        ));
    }

    let mut output = String::with_capacity(text.len());
    let mut definitions = Vec::new();
    let mut definition_lines = Vec::new();
    let mut line = 1;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find(start_token) {
        let start = pos + offset;
        let preceding = &text[pos..start];
        output.push_str(preceding);
        line += preceding.matches('\n').count();

        let body_start = start + start_token.len();
        let missing_end = || {
            HelpFileError::new(
                ErrorKind::MalformedDefinition,
                format!("Definition seems to be missing a closing \"{end_token}\""),
            )
            .at_line(line)
        };
        let body_len = text[body_start..].find(end_token).ok_or_else(missing_end)?;
        let body = &text[body_start..body_start + body_len];
        if body.contains(start_token) {
            return Err(missing_end());
        }
        let mut end = body_start + body_len + end_token.len();

        let visible = split_single(body, &syntax.separator)
            .into_iter()
            .next()
            .unwrap_or_default();
        if !visible.is_empty() && at_line_start(&output) {
            definition_lines.push(output.matches('\n').count());
        }

        definitions.push(RawDefinition {
            line,
            body: body.to_string(),
        });
        line += body.matches('\n').count();

        if visible.is_empty()
            && (output.is_empty() || output.ends_with('\n'))
            && text[end..].starts_with('\n')
        {
            end += 1;
            line += 1;
        }
        output.push_str(visible);
        pos = end;
    }
    output.push_str(&text[pos..]);

    debug!(definitions = definitions.len(), "scanned help text");
    Ok(Scanned {
        text: output,
        definitions,
        definition_lines,
    })
}

fn at_line_start(output: &str) -> bool {
    let tail = match output.rfind('\n') {
        Some(i) => &output[i + 1..],
        None => output,
    };
    tail.chars().all(char::is_whitespace)
}
