//! Template tokenizer.
//!
//! Directives are written `[[[...]]]` and must close on the line they open.
//! Each template line ends with a [`Token::Newline`], including the last one.

use crate::{Result, TemplateError};

pub(crate) const DIRECTIVE_START: &str = "[[[";
pub(crate) const DIRECTIVE_END: &str = "]]]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Text(String),
    Newline,
    Expand(String),
    If(String),
    Elif(String),
    Else,
    EndIf,
    PushAlignment,
    Align,
    PopAlignment,
}

/// A token and the 1-based template line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spanned {
    pub(crate) line: usize,
    pub(crate) token: Token,
}

pub(crate) fn tokenize(template: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    for (i, text) in template.split('\n').enumerate() {
        let line = i + 1;
        let mut rest = text;
        while let Some(start) = rest.find(DIRECTIVE_START) {
            if start > 0 {
                tokens.push(Spanned {
                    line,
                    token: Token::Text(rest[..start].to_string()),
                });
            }
            let body_start = start + DIRECTIVE_START.len();
            let Some(len) = rest[body_start..].find(DIRECTIVE_END) else {
                return Err(TemplateError::UnterminatedDirective { line });
            };
            let body = &rest[body_start..body_start + len];
            tokens.push(Spanned {
                line,
                token: classify(body, line)?,
            });
            rest = &rest[body_start + len + DIRECTIVE_END.len()..];
        }
        if !rest.is_empty() {
            tokens.push(Spanned {
                line,
                token: Token::Text(rest.to_string()),
            });
        }
        tokens.push(Spanned {
            line,
            token: Token::Newline,
        });
    }
    Ok(tokens)
}

fn classify(body: &str, line: usize) -> Result<Token> {
    let trimmed = body.trim();
    let token = match trimmed {
        ">" => Token::PushAlignment,
        "|" => Token::Align,
        "<" => Token::PopAlignment,
        "ELSE" => Token::Else,
        "ENDIF" => Token::EndIf,
        "IF" | "ELIF" => {
            return Err(TemplateError::StructuralImbalance {
                line,
                message: format!("{trimmed} requires a condition key"),
            });
        }
        "" => {
            return Err(TemplateError::MalformedKey {
                line,
                key: body.to_string(),
            });
        }
        _ => {
            if let Some(key) = trimmed.strip_prefix("IF ") {
                Token::If(key.trim().to_string())
            } else if let Some(key) = trimmed.strip_prefix("ELIF ") {
                Token::Elif(key.trim().to_string())
            } else {
                let name = trimmed.split('(').next().unwrap_or(trimmed);
                if let Some(keyword) = name
                    .split_whitespace()
                    .next()
                    .filter(|_| name.contains(char::is_whitespace))
                {
                    return Err(match keyword {
                        "ELSE" | "ENDIF" => TemplateError::StructuralImbalance {
                            line,
                            message: format!("{keyword} takes no argument"),
                        },
                        _ => TemplateError::UnknownDirectiveKeyword {
                            line,
                            keyword: keyword.to_string(),
                        },
                    });
                }
                Token::Expand(trimmed.to_string())
            }
        }
    };
    Ok(token)
}
