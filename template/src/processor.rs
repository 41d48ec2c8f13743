//! Template expansion.

use tracing::{debug, trace};

use crate::token::{Spanned, Token, tokenize};
use crate::{Context, Resolver, Result, TemplateError, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Text is emitted.
    Active,
    /// No branch taken yet; a later `ELIF` or `ELSE` may activate.
    Inactive,
    /// A branch was taken, or the enclosing scope is not active.
    Done,
}

struct Processor<'r, R: Resolver + ?Sized> {
    resolver: &'r R,
    lines: Vec<String>,
    current: String,
    scopes: Vec<Scope>,
    alignments: Vec<String>,
}

impl<'r, R: Resolver + ?Sized> Processor<'r, R> {
    fn new(resolver: &'r R) -> Self {
        Self {
            resolver,
            lines: Vec::new(),
            current: String::new(),
            scopes: vec![Scope::Active],
            alignments: Vec::new(),
        }
    }

    fn run(mut self, tokens: Vec<Spanned>) -> Result<Vec<String>> {
        let mut last_line = 1;
        let mut skip_newline = false;

        for Spanned { line, token } in tokens {
            last_line = line;
            if std::mem::take(&mut skip_newline) && token == Token::Newline {
                self.current.clear();
                continue;
            }

            match token {
                Token::If(key) => {
                    self.handle_if(&key, line)?;
                    skip_newline = self.line_is_blank();
                }
                Token::EndIf => {
                    self.close_scope(line)?;
                    skip_newline = self.line_is_blank();
                }
                Token::Newline => self.handle_newline(),
                _ if self.top() == Scope::Done => {}
                Token::Elif(key) => {
                    self.handle_elif(&key, line)?;
                    skip_newline = self.line_is_blank();
                }
                Token::Else => {
                    self.handle_else(line)?;
                    skip_newline = self.line_is_blank();
                }
                _ if self.top() == Scope::Inactive => {}
                Token::Text(text) => self.add_text(&text),
                Token::Expand(key) => self.handle_expand(&key, line)?,
                Token::PushAlignment => {
                    let alignment = self.context().alignment();
                    self.alignments.push(alignment);
                }
                Token::Align => self.align(line)?,
                Token::PopAlignment => {
                    if self.alignments.pop().is_none() {
                        return Err(imbalance(line, "alignment pop without a matching push"));
                    }
                }
            }
        }

        let open = self.scopes.len() - 1;
        if open != 0 {
            return Err(imbalance(
                last_line,
                format!("number of IFs without closing ENDIFs: {open}"),
            ));
        }
        debug!(lines = self.lines.len(), "rendered template");
        Ok(self.lines)
    }

    fn top(&self) -> Scope {
        self.scopes.last().copied().unwrap_or(Scope::Active)
    }

    fn line_is_blank(&self) -> bool {
        self.current.trim().is_empty()
    }

    fn context(&self) -> Context {
        Context {
            indentation: self
                .current
                .chars()
                .take_while(|c| matches!(c, ' ' | '\t'))
                .collect(),
            column: self.current.chars().count(),
        }
    }

    fn evaluate(&self, directive: &str, line: usize) -> Result<Value> {
        let (key, args) = split_key(directive, line)?;
        trace!(line, key, "resolving key");
        self.resolver
            .resolve(key, &args, &self.context())
            .map_err(|source| TemplateError::Resolve {
                line,
                key: key.to_string(),
                source,
            })
    }

    fn handle_if(&mut self, key: &str, line: usize) -> Result<()> {
        let scope = if self.top() != Scope::Active {
            Scope::Done
        } else if self.evaluate(key, line)?.is_truthy() {
            Scope::Active
        } else {
            Scope::Inactive
        };
        self.scopes.push(scope);
        Ok(())
    }

    fn handle_elif(&mut self, key: &str, line: usize) -> Result<()> {
        let next = match self.enclosed_scope(line, "ELIF")? {
            Scope::Active => Scope::Done,
            Scope::Inactive if self.evaluate(key, line)?.is_truthy() => Scope::Active,
            other => other,
        };
        self.set_top(next);
        Ok(())
    }

    fn handle_else(&mut self, line: usize) -> Result<()> {
        let next = match self.enclosed_scope(line, "ELSE")? {
            Scope::Active => Scope::Done,
            Scope::Inactive => Scope::Active,
            Scope::Done => Scope::Done,
        };
        self.set_top(next);
        Ok(())
    }

    fn close_scope(&mut self, line: usize) -> Result<()> {
        self.enclosed_scope(line, "ENDIF")?;
        self.scopes.pop();
        Ok(())
    }

    fn enclosed_scope(&self, line: usize, keyword: &str) -> Result<Scope> {
        if self.scopes.len() == 1 {
            return Err(imbalance(line, format!("{keyword} must be preceded by IF")));
        }
        Ok(self.top())
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.scopes.last_mut() {
            *top = scope;
        }
    }

    fn handle_newline(&mut self) {
        if self.top() == Scope::Active {
            self.finish_line();
        }
    }

    fn handle_expand(&mut self, key: &str, line: usize) -> Result<()> {
        match self.evaluate(key, line)? {
            Value::Lines(lines) => self.add_lines(&lines),
            value => self.add_text(&value.to_string()),
        }
        Ok(())
    }

    fn align(&mut self, line: usize) -> Result<()> {
        let Some(alignment) = self.alignments.last() else {
            return Err(imbalance(line, "alignment mark without a matching push"));
        };
        let column = self.current.chars().count();
        let padding: String = alignment.chars().skip(column).collect();
        self.current.push_str(&padding);
        Ok(())
    }

    fn add_text(&mut self, text: &str) {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            self.current.push_str(first);
        }
        for part in parts {
            self.finish_line();
            self.current.push_str(part);
        }
    }

    fn add_lines(&mut self, lines: &[String]) {
        let Some((first, rest)) = lines.split_first() else {
            return;
        };
        let alignment = self.context().alignment();
        self.current.push_str(first);
        for line in rest {
            self.finish_line();
            self.current.push_str(&alignment);
            self.current.push_str(line);
        }
    }

    fn finish_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line.trim_end().to_string());
    }
}

fn imbalance(line: usize, message: impl Into<String>) -> TemplateError {
    TemplateError::StructuralImbalance {
        line,
        message: message.into(),
    }
}

/// Splits `name(a, b)` into the name and its trimmed arguments.
fn split_key(directive: &str, line: usize) -> Result<(&str, Vec<String>)> {
    let malformed = || TemplateError::MalformedKey {
        line,
        key: directive.to_string(),
    };
    let (name, args) = match directive.split_once('(') {
        None => (directive.trim(), Vec::new()),
        Some((name, rest)) => {
            let inner = rest.split_once(')').ok_or_else(malformed)?.0;
            let args = if inner.trim().is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(|arg| arg.trim().to_string()).collect()
            };
            (name.trim(), args)
        }
    };
    if name.is_empty() {
        return Err(malformed());
    }
    Ok((name, args))
}

/// Renders a template into output lines.
///
/// # Errors
///
/// Returns a [`TemplateError`] when the template is structurally invalid or
/// the resolver rejects a key.
pub fn render_lines<R: Resolver + ?Sized>(template: &str, resolver: &R) -> Result<Vec<String>> {
    let tokens = tokenize(template)?;
    Processor::new(resolver).run(tokens)
}

/// Renders a template into text, lines joined with `\n`.
///
/// # Errors
///
/// See [`render_lines`].
pub fn render<R: Resolver + ?Sized>(template: &str, resolver: &R) -> Result<String> {
    Ok(render_lines(template, resolver)?.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapResolver;

    #[test]
    fn test_split_key_arguments() {
        assert_eq!(split_key("plain", 1).unwrap(), ("plain", Vec::new()));
        assert_eq!(
            split_key("wrap(80, ,)", 1).unwrap(),
            ("wrap", vec!["80".to_string(), String::new(), String::new()])
        );
        assert_eq!(split_key("empty()", 1).unwrap(), ("empty", Vec::new()));
        assert_eq!(
            split_key("open(1, 2", 3),
            Err(TemplateError::MalformedKey {
                line: 3,
                key: "open(1, 2".to_string()
            })
        );
    }

    #[test]
    fn test_elif_chain_takes_first_true_branch() {
        let resolver = MapResolver::new().with("a", false).with("b", true).with("c", true);
        let text = render(
            "[[[IF a]]]A[[[ELIF b]]]B[[[ELIF c]]]C[[[ELSE]]]D[[[ENDIF]]]",
            &resolver,
        )
        .unwrap();
        assert_eq!(text, "B");
    }

    #[test]
    fn test_text_with_newlines_starts_unaligned_lines() {
        let resolver = MapResolver::new().with("body", "one\ntwo");
        let lines = render_lines("    [[[body]]];", &resolver).unwrap();
        assert_eq!(lines, vec!["    one", "two;"]);
    }

    #[test]
    fn test_alignment_mark_pads_to_pushed_column() {
        let resolver = MapResolver::new();
        let lines = render_lines("  call([[[>]]]a,\n[[[|]]]b)[[[<]]]", &resolver).unwrap();
        assert_eq!(lines, vec!["  call(a,", "       b)"]);
    }
}
