//! Argument and member model.
//!
//! A help file yields one [`Argument`] per definition. Arguments writing to the
//! same target are aggregated into a [`Member`], which describes one field of
//! the generated result type. The types serialize with [`serde`] so a deduced
//! model can be dumped as JSON or YAML.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CountRange, ValueConstraint};

/// Value type of a member.
///
/// # Examples
///
/// ```
/// use helpspec_core::ValueType;
///
/// assert_eq!(ValueType::parse_name("Integer"), Some(ValueType::Int));
/// assert_eq!(ValueType::Double.to_string(), "double");
/// assert_eq!(ValueType::parse_name("complex"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Double,
    String,
}

impl ValueType {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    /// Parses a `ValueType` property value (case-insensitive).
    pub fn parse_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "bool" | "boolean" => Some(Self::Bool),
            "int" | "integer" => Some(Self::Int),
            "double" | "float" => Some(Self::Double),
            "string" | "str" => Some(Self::String),
            _ => None,
        }
    }

    /// Returns `true` for `int` and `double`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Double)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a member, the `Type` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// A single value.
    Value,
    /// Any number of values appended in order.
    List,
    /// A fixed-size group of delimited values.
    MultiValue,
    /// Displays the help text and stops parsing.
    Help,
    /// Stops parsing without reporting missing arguments (e.g. `--version`).
    Info,
    /// Marks the end of options; everything after it is positional.
    Final,
}

impl MemberKind {
    /// Every legal `Type` value.
    pub const ALL: [Self; 6] = [
        Self::Final,
        Self::Help,
        Self::Info,
        Self::List,
        Self::MultiValue,
        Self::Value,
    ];

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::List => "list",
            Self::MultiValue => "multivalue",
            Self::Help => "help",
            Self::Info => "info",
            Self::Final => "final",
        }
    }

    /// Parses a `Type` property value (case-insensitive).
    pub fn parse_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// `help`, `info` and `final` are flag-only switches.
    pub fn is_special(self) -> bool {
        matches!(self, Self::Help | Self::Info | Self::Final)
    }

    /// `list` and `multivalue` hold several values.
    pub fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::MultiValue)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One option flag-set or one positional slot.
///
/// Options have a non-empty [`flags`](Argument::flags) list; positional
/// arguments have none and receive an [`index`](Argument::index) during
/// deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Unique display name.
    pub name: String,
    /// Name of the member this argument writes to.
    pub member_name: String,
    /// Flags, in the order they were written. Empty for positional arguments.
    pub flags: Vec<String>,
    /// Placeholder for the captured value (e.g. `FILE`).
    pub meta_variable: Option<String>,
    /// Literal value assigned when the option is given, split into
    /// alternatives when a delimiter is present. `None` means the argument
    /// consumes input.
    pub value: Option<Vec<String>>,
    /// Character splitting one capture into several sub-values.
    pub delimiter: Option<char>,
    /// How many delimiters a single capture may contain.
    pub delimiter_count: CountRange,
    /// How many times the argument may occur.
    pub count: CountRange,
    /// Whether `count` was given explicitly.
    pub count_declared: bool,
    /// Resolved position among the positional arguments.
    pub index: Option<usize>,
    /// The text shown in the help output (may be empty).
    pub text: String,
    /// Whether the argument is listed in the help text.
    pub visible: bool,
    /// Line of the definition in the help file (1-based).
    pub line_number: usize,
    /// Position among all definitions of the document.
    pub ordinal: usize,
    /// Position of the owning member in the document's member list.
    pub member_index: Option<usize>,
    pub action: Option<String>,
    pub argument_type: Option<String>,
    pub callback: Option<String>,
    pub condition: Option<String>,
    pub condition_message: Option<String>,
}

impl Argument {
    /// Returns `true` for option-like arguments.
    pub fn is_option(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Returns `true` when the argument captures a value from the command
    /// line instead of assigning a literal.
    pub fn consumes_input(&self) -> bool {
        self.value.is_none()
    }

    /// Returns `true` when every capture has the same number of delimiters.
    pub fn has_fixed_delimiter_count(&self) -> bool {
        self.delimiter_count.is_fixed()
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_option() {
            write!(f, "option({})", self.flags.join(" "))
        } else {
            write!(f, "argument({})", self.member_name)
        }
    }
}

/// A generated field: every argument sharing one target name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub value_type: ValueType,
    /// Number of values the member can end up holding.
    pub count: CountRange,
    /// Legal-value constraints.
    pub values: Vec<ValueConstraint>,
    /// Default value, one entry per sub-value.
    pub default: Vec<String>,
    /// Extra include requested by the help file.
    pub include: Option<String>,
    /// Contributing arguments in document order.
    pub arguments: Vec<Argument>,
}

impl Member {
    /// Returns `true` when the member is set by options.
    pub fn is_option(&self) -> bool {
        self.arguments.iter().all(Argument::is_option)
    }

    /// All flags of all contributing options.
    pub fn flags(&self) -> Vec<&str> {
        self.arguments
            .iter()
            .flat_map(|arg| arg.flags.iter().map(String::as_str))
            .collect()
    }

    /// Definition lines of the contributing arguments.
    pub fn line_numbers(&self) -> Vec<usize> {
        self.arguments.iter().map(|arg| arg.line_number).collect()
    }

    /// An option that must be given at least once.
    pub fn is_mandatory_option(&self) -> bool {
        self.is_option() && self.count.min > 0
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.value_type, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(flags: &[&str]) -> Argument {
        Argument {
            name: "verbose".to_string(),
            member_name: "verbose".to_string(),
            flags: flags.iter().map(|f| f.to_string()).collect(),
            meta_variable: None,
            value: Some(vec!["true".to_string()]),
            delimiter: None,
            delimiter_count: CountRange::NONE,
            count: CountRange::ZERO_OR_ONE,
            count_declared: false,
            index: None,
            text: flags.join(", "),
            visible: true,
            line_number: 3,
            ordinal: 0,
            member_index: None,
            action: None,
            argument_type: None,
            callback: None,
            condition: None,
            condition_message: None,
        }
    }

    #[test]
    fn test_member_kind_parse_is_case_insensitive() {
        assert_eq!(MemberKind::parse_name("MultiValue"), Some(MemberKind::MultiValue));
        assert_eq!(MemberKind::parse_name(" help "), Some(MemberKind::Help));
        assert_eq!(MemberKind::parse_name("toggle"), None);
    }

    #[test]
    fn test_argument_display_distinguishes_options() {
        let arg = option(&["-v", "--verbose"]);
        assert_eq!(arg.to_string(), "option(-v --verbose)");
        assert!(arg.is_option());
        assert!(!arg.consumes_input());

        let mut positional = option(&[]);
        positional.member_name = "file".to_string();
        assert_eq!(positional.to_string(), "argument(file)");
    }

    #[test]
    fn test_member_collects_flags_and_lines() {
        let mut second = option(&["-q"]);
        second.line_number = 7;
        let member = Member {
            name: "verbose".to_string(),
            kind: MemberKind::Value,
            value_type: ValueType::Bool,
            count: CountRange::ZERO_OR_ONE,
            values: Vec::new(),
            default: vec!["false".to_string()],
            include: None,
            arguments: vec![option(&["-v", "--verbose"]), second],
        };
        assert_eq!(member.flags(), vec!["-v", "--verbose", "-q"]);
        assert_eq!(member.line_numbers(), vec![3, 7]);
        assert!(member.is_option());
        assert!(!member.is_mandatory_option());
        assert_eq!(member.to_string(), "value bool: verbose");
    }

    #[test]
    fn test_model_serializes_kind_names() {
        let json = serde_json::to_string(&MemberKind::MultiValue).unwrap();
        assert_eq!(json, "\"multivalue\"");
    }
}
