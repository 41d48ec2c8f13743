//! Property parser.
//!
//! Turns the body of one definition block into a [`PropertySet`]: the visible
//! text, the explicit `Key: Value` properties and the properties implied by
//! the visible text (flags, placeholder, member name, positional count).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use helpspec_core::{
    ErrorKind, HelpFileError, MemberKind, PropertyDialect, Result, ValueConstraint, ValueType,
    ValuesParseError,
};
use regex::Regex;
use tracing::trace;

use crate::Session;

/// Characters that can't be part of a generated name.
static NAME_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"[\s'!"#$%&/()=?+*@.:,;<>^`\-\[\]{}]+"##).expect("static regex must compile")
});

/// The closed set of property keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum PropertyKey {
    Action,
    ArgumentType,
    Callback,
    Condition,
    ConditionMessage,
    Count,
    Default,
    Delimiter,
    DelimiterCount,
    Flags,
    Include,
    Index,
    MemberName,
    MetaVariable,
    Text,
    Type,
    Value,
    ValueType,
    Values,
    Visible,
}

const CANONICAL_KEYS: [PropertyKey; 20] = [
    PropertyKey::Action,
    PropertyKey::ArgumentType,
    PropertyKey::Callback,
    PropertyKey::Condition,
    PropertyKey::ConditionMessage,
    PropertyKey::Count,
    PropertyKey::Default,
    PropertyKey::Delimiter,
    PropertyKey::DelimiterCount,
    PropertyKey::Flags,
    PropertyKey::Include,
    PropertyKey::Index,
    PropertyKey::MemberName,
    PropertyKey::MetaVariable,
    PropertyKey::Text,
    PropertyKey::Type,
    PropertyKey::Value,
    PropertyKey::ValueType,
    PropertyKey::Values,
    PropertyKey::Visible,
];

const CLASSIC_ALIASES: &[(&str, PropertyKey)] = &[
    ("argument", PropertyKey::MetaVariable),
    ("argumenttype", PropertyKey::ArgumentType),
    ("cond", PropertyKey::Condition),
    ("condmessage", PropertyKey::ConditionMessage),
    ("condmsg", PropertyKey::ConditionMessage),
    ("conditionmessage", PropertyKey::ConditionMessage),
    ("del", PropertyKey::Delimiter),
    ("delcount", PropertyKey::DelimiterCount),
    ("delimitercount", PropertyKey::DelimiterCount),
    ("member", PropertyKey::MemberName),
    ("membername", PropertyKey::MemberName),
    ("metavariable", PropertyKey::MetaVariable),
    ("valuetype", PropertyKey::ValueType),
    ("vtype", PropertyKey::ValueType),
];

const EXTENDED_ALIASES: &[(&str, PropertyKey)] = &[
    ("arg", PropertyKey::MetaVariable),
    ("arg_type", PropertyKey::ArgumentType),
    ("argtype", PropertyKey::ArgumentType),
    ("argumenttype", PropertyKey::ArgumentType),
    ("call", PropertyKey::Callback),
    ("cond", PropertyKey::Condition),
    ("mem", PropertyKey::MemberName),
    ("member", PropertyKey::MemberName),
    ("membername", PropertyKey::MemberName),
    ("metavar", PropertyKey::MetaVariable),
    ("metavariable", PropertyKey::MetaVariable),
    ("sep", PropertyKey::Delimiter),
    ("separator", PropertyKey::Delimiter),
    ("sep_count", PropertyKey::DelimiterCount),
    ("sepcount", PropertyKey::DelimiterCount),
    ("separator_count", PropertyKey::DelimiterCount),
    ("separatorcount", PropertyKey::DelimiterCount),
    ("val", PropertyKey::Value),
    ("vals", PropertyKey::Values),
    ("vtype", PropertyKey::ValueType),
];

impl PropertyKey {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::ArgumentType => "argument_type",
            Self::Callback => "callback",
            Self::Condition => "condition",
            Self::ConditionMessage => "condition_message",
            Self::Count => "count",
            Self::Default => "default",
            Self::Delimiter => "delimiter",
            Self::DelimiterCount => "delimiter_count",
            Self::Flags => "flags",
            Self::Include => "include",
            Self::Index => "index",
            Self::MemberName => "member_name",
            Self::MetaVariable => "meta_variable",
            Self::Text => "text",
            Self::Type => "type",
            Self::Value => "value",
            Self::ValueType => "value_type",
            Self::Values => "values",
            Self::Visible => "visible",
        }
    }

    /// Resolves a case-folded key through the dialect's alias table.
    pub(crate) fn lookup(name: &str, dialect: PropertyDialect) -> Option<Self> {
        if let Some(key) = CANONICAL_KEYS.into_iter().find(|key| key.as_str() == name) {
            return Some(key);
        }
        let aliases = match dialect {
            PropertyDialect::Classic => CLASSIC_ALIASES,
            PropertyDialect::Extended => EXTENDED_ALIASES,
        };
        aliases
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, key)| *key)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) type Properties = BTreeMap<PropertyKey, String>;

/// Everything known about one definition before deduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PropertySet {
    pub(crate) line: usize,
    /// Visible text, exactly as written.
    pub(crate) text: String,
    /// Display name.
    pub(crate) name: String,
    /// Sequence number among positional arguments.
    pub(crate) autoindex: Option<usize>,
    implied: Properties,
    explicit: Properties,
}

impl PropertySet {
    /// An explicit property, else the implied one.
    pub(crate) fn get(&self, key: PropertyKey) -> Option<&str> {
        self.explicit
            .get(&key)
            .or_else(|| self.implied.get(&key))
            .map(String::as_str)
    }

    pub(crate) fn is_explicit(&self, key: PropertyKey) -> bool {
        self.explicit.contains_key(&key)
    }

    pub(crate) fn is_option(&self) -> bool {
        self.get(PropertyKey::Flags).is_some()
    }
}

/// Splits on `separator`, treating a run of two or more separators as
/// literal text. An empty separator leaves `text` whole.
pub(crate) fn split_single<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return vec![text];
    }
    let mut fields = Vec::new();
    let mut start = 0;
    let mut search = 0;
    while let Some(offset) = text[search..].find(separator) {
        let index = search + offset;
        let mut next = index + separator.len();
        while text[next..].starts_with(separator) {
            next += separator.len();
        }
        if next == index + separator.len() {
            fields.push(&text[start..index]);
            start = next;
        }
        search = next;
    }
    fields.push(&text[start..]);
    fields
}

/// Parses one definition body.
pub(crate) fn parse_definition(
    body: &str,
    line: usize,
    session: &mut Session<'_>,
) -> Result<PropertySet> {
    let config = session.config();
    let mut fields = split_single(body, &config.syntax.separator).into_iter();
    let text = fields.next().unwrap_or_default();
    let explicit = parse_fields(fields, config.dialect)?;

    let stripped = explicit
        .get(&PropertyKey::Text)
        .map(String::as_str)
        .unwrap_or(text)
        .trim();
    let (implied, autoindex) = if let Some(flags) = explicit.get(&PropertyKey::Flags) {
        let flags: Vec<&str> = flags.split_whitespace().collect();
        let n = session.next_option();
        let mut implied = Properties::new();
        implied.insert(PropertyKey::MemberName, option_name(&flags, n));
        (implied, None)
    } else if is_option(stripped) {
        (option_properties(stripped, session)?, None)
    } else {
        let n = session.next_argument();
        (positional_properties(stripped, n), Some(n))
    };

    if explicit.contains_key(&PropertyKey::Index) && autoindex.is_none() {
        return Err(HelpFileError::new(
            ErrorKind::ConflictingProperty,
            "Options can't have the index property.",
        ));
    }

    let name = implied
        .get(&PropertyKey::MemberName)
        .cloned()
        .unwrap_or_default();
    trace!(line, name = %name, "parsed definition");
    Ok(PropertySet {
        line,
        text: text.to_string(),
        name,
        autoindex,
        implied,
        explicit,
    })
}

fn parse_fields<'a>(
    fields: impl Iterator<Item = &'a str>,
    dialect: PropertyDialect,
) -> Result<Properties> {
    let mut properties = Properties::new();
    for field in fields {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        let Some((name, value)) = field.split_once(':') else {
            return Err(HelpFileError::new(
                ErrorKind::MalformedDefinition,
                format!("Property \"{field}\" is not of the form \"Key: Value\"."),
            ));
        };
        let name = name.trim();
        let Some(key) = PropertyKey::lookup(&name.to_lowercase(), dialect) else {
            return Err(HelpFileError::new(
                ErrorKind::UnknownProperty,
                format!("Unknown property name: {name}"),
            ));
        };
        let value = value.trim();
        match properties.get(&key) {
            Some(existing) if existing != value => {
                return Err(HelpFileError::new(
                    ErrorKind::ConflictingProperty,
                    format!("Multiple definitions of property {key}: \"{existing}\" and \"{value}\""),
                ));
            }
            _ => {
                properties.insert(key, value.to_string());
            }
        }
    }
    validate_fields(&properties)?;
    Ok(properties)
}

fn validate_fields(properties: &Properties) -> Result<()> {
    for (key, value) in properties {
        match key {
            PropertyKey::Flags => {
                if let Some(flag) = value.split_whitespace().find(|flag| !is_legal_flag(flag)) {
                    return Err(HelpFileError::new(
                        ErrorKind::IllegalFlagSyntax,
                        format!("\"{flag}\" is an illegal flag (it contains =)"),
                    ));
                }
            }
            PropertyKey::Type if MemberKind::parse_name(value).is_none() => {
                return Err(HelpFileError::new(
                    ErrorKind::IllegalTypeValue,
                    format!("{value} is an illegal value for the type property"),
                ));
            }
            PropertyKey::ValueType if ValueType::parse_name(value).is_none() => {
                return Err(HelpFileError::new(
                    ErrorKind::IllegalTypeValue,
                    format!("{value} is an illegal value for the value_type property"),
                ));
            }
            PropertyKey::Visible if parse_bool(value).is_none() => {
                return Err(HelpFileError::new(
                    ErrorKind::InvalidPropertyValue,
                    format!("Visible must be true or false, not \"{value}\"."),
                ));
            }
            PropertyKey::Values => {
                parse_values(value)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Parses a `Values` property.
pub(crate) fn parse_values(text: &str) -> Result<Vec<ValueConstraint>> {
    ValueConstraint::parse_list(text).map_err(|err| {
        let kind = match err {
            ValuesParseError::UnterminatedQuote(_) => ErrorKind::MissingClosingToken,
            ValuesParseError::EmptyRange(_) => ErrorKind::InvalidPropertyValue,
        };
        HelpFileError::new(kind, format!("Invalid values property: {err}"))
    })
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn is_legal_flag(flag: &str) -> bool {
    flag.chars().count() <= 2 || !(flag.starts_with(['-', '/']) && flag.contains('='))
}

/// Text starting with `-` or `/` followed by a non-space character.
pub(crate) fn is_option(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('-' | '/'), Some(c)) if !c.is_whitespace()
    )
}

/// Splits option text into flags and the captured placeholder.
///
/// `--flag=VALUE`, `--flag VALUE` and bare `--flag` are accepted; trailing
/// commas are ignored.
pub(crate) fn parse_flags(text: &str) -> Result<(Vec<String>, Option<String>)> {
    let mut flags = Vec::new();
    let mut placeholder = None;
    let mut after_flag = false;

    for word in text.split_whitespace() {
        let word = word.strip_suffix(',').unwrap_or(word);
        if word.is_empty() {
            continue;
        }
        if word.starts_with(['-', '/']) {
            match word.find('=') {
                Some(index) if index > 1 && !word.starts_with("--=") => {
                    flags.push(word[..index].to_string());
                    let value = &word[index + 1..];
                    placeholder = Some(if value.is_empty() { "VALUE" } else { value }.to_string());
                    after_flag = false;
                }
                _ => {
                    flags.push(word.to_string());
                    after_flag = true;
                }
            }
        } else if after_flag {
            placeholder = Some(word.to_string());
            after_flag = false;
        } else {
            return Err(HelpFileError::new(
                ErrorKind::IllegalFlagSyntax,
                format!("Invalid option: {word}"),
            ));
        }
    }
    Ok((flags, placeholder))
}

/// Replaces punctuation and whitespace runs with `_`.
pub(crate) fn variable_name(text: &str) -> String {
    NAME_SEPARATORS
        .split(text)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Member name implied by a list of flags.
fn option_name(flags: &[&str], n: usize) -> String {
    let mut name = String::new();
    for flag in flags {
        match *flag {
            "-?" | "/?" => return "help".to_string(),
            "--" => return "end_of_options".to_string(),
            _ => {
                let candidate = variable_name(flag);
                if name.is_empty() || (name.chars().count() <= 1 && candidate.chars().count() > 1) {
                    name = candidate;
                }
            }
        }
    }
    if name.is_empty() {
        name = format!("option_{n}");
    }
    name
}

fn option_properties(text: &str, session: &mut Session<'_>) -> Result<Properties> {
    let (flags, placeholder) = parse_flags(text)?;
    let n = session.next_option();
    let flag_refs: Vec<&str> = flags.iter().map(String::as_str).collect();

    let mut implied = Properties::new();
    implied.insert(PropertyKey::MemberName, option_name(&flag_refs, n));
    implied.insert(PropertyKey::Flags, flags.join(" "));
    implied.insert(PropertyKey::Visible, "true".to_string());
    if let Some(placeholder) = placeholder {
        implied.insert(PropertyKey::MetaVariable, placeholder);
    }
    Ok(implied)
}

fn positional_properties(text: &str, n: usize) -> Properties {
    let mut implied = Properties::new();
    let placeholder = if text.is_empty() {
        format!("arg {n}")
    } else {
        text.to_string()
    };
    let mut name = variable_name(&placeholder);
    if name.is_empty() {
        name = format!("arg_{n}");
    }
    implied.insert(PropertyKey::MemberName, name);
    implied.insert(PropertyKey::MetaVariable, placeholder);
    implied.insert(PropertyKey::Visible, (!text.is_empty()).to_string());
    if !text.is_empty() {
        implied.insert(PropertyKey::Count, positional_count(text).to_string());
    }
    implied
}

/// Occurrence count implied by the shape of a positional's text.
fn positional_count(text: &str) -> &'static str {
    if text.starts_with('[') {
        if text.ends_with("...") || text.ends_with("...]") {
            "0.."
        } else {
            "0..1"
        }
    } else if text.ends_with("...") {
        "1.."
    } else {
        "1"
    }
}
