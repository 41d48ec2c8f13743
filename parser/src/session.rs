//! Per-document processing state.

use helpspec_core::{ErrorKind, HelpFileError, ParserConfig, Result};

use crate::HelpDocument;

/// State of one parse run: the configuration and the counters that number
/// unnamed arguments and options.
///
/// Counters are never shared between sessions, so parsing the same text with
/// two fresh sessions yields identical documents.
///
/// # Examples
///
/// ```
/// use helpspec_core::ParserConfig;
/// use helpspec_parser::Session;
///
/// let config = ParserConfig::default();
/// let mut session = Session::new(&config);
/// let doc = session.parse_document("${<file>}$ input file").unwrap();
/// assert_eq!(doc.members[0].name, "file");
/// assert_eq!(session.argument_counter(), 1);
/// ```
#[derive(Debug)]
pub struct Session<'c> {
    config: &'c ParserConfig,
    argument_counter: usize,
    option_counter: usize,
}

impl<'c> Session<'c> {
    pub fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            argument_counter: 0,
            option_counter: 0,
        }
    }

    pub fn config(&self) -> &'c ParserConfig {
        self.config
    }

    /// Positional arguments seen so far.
    pub fn argument_counter(&self) -> usize {
        self.argument_counter
    }

    /// Options seen so far.
    pub fn option_counter(&self) -> usize {
        self.option_counter
    }

    /// Returns the next positional sequence number.
    pub(crate) fn next_argument(&mut self) -> usize {
        let n = self.argument_counter;
        self.argument_counter += 1;
        n
    }

    /// Returns the next option sequence number.
    pub(crate) fn next_option(&mut self) -> usize {
        let n = self.option_counter;
        self.option_counter += 1;
        n
    }

    /// Scans `text` and deduces its model.
    ///
    /// # Errors
    ///
    /// Returns the first [`HelpFileError`] found in the document, or an
    /// [`InvalidPropertyValue`](ErrorKind::InvalidPropertyValue) error when
    /// the configuration fails [`ParserConfig::validate`].
    pub fn parse_document(&mut self, text: &str) -> Result<HelpDocument> {
        self.config
            .validate()
            .map_err(|err| HelpFileError::new(ErrorKind::InvalidPropertyValue, err.to_string()))?;
        let scanned = crate::scanner::scan(text, &self.config.syntax)?;
        let members = crate::deduce::deduce(&scanned.definitions, self)?;
        Ok(HelpDocument {
            text: scanned.text,
            members,
            definition_lines: scanned.definition_lines,
        })
    }
}
