//! Template access to a parsed [`HelpDocument`].
//!
//! [`ModelResolver`] answers template keys from a fixed table of
//! [`ModelKey`]s. Per-member values go through the computed key
//! `member(NAME, FIELD)` with a [`MemberField`].

use helpspec_core::{Bound, Member, MemberKind, ValueConstraint};
use helpspec_template::{Context, ResolveError, Resolver, Value};
use tracing::trace;

use crate::HelpDocument;

/// Keys understood by [`ModelResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKey {
    /// The help text as lines.
    HelpText,
    HasOptions,
    HasArguments,
    HasHelpOption,
    HasInfoOptions,
    HasFinalOption,
    MemberCount,
    OptionCount,
    ArgumentCount,
    /// Member names, one per line.
    MemberNames,
    /// `KIND TYPE: NAME` for every member, one per line.
    MemberDeclarations,
    /// 0-based help text lines that start with a definition, comma separated.
    DefinitionLines,
    /// `member(NAME, FIELD)`.
    Member,
    /// `pad_to(COLUMN)`: spaces from the cursor up to `COLUMN`, at least one.
    PadTo,
}

impl ModelKey {
    pub const ALL: [Self; 14] = [
        Self::HelpText,
        Self::HasOptions,
        Self::HasArguments,
        Self::HasHelpOption,
        Self::HasInfoOptions,
        Self::HasFinalOption,
        Self::MemberCount,
        Self::OptionCount,
        Self::ArgumentCount,
        Self::MemberNames,
        Self::MemberDeclarations,
        Self::DefinitionLines,
        Self::Member,
        Self::PadTo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HelpText => "help_text",
            Self::HasOptions => "has_options",
            Self::HasArguments => "has_arguments",
            Self::HasHelpOption => "has_help_option",
            Self::HasInfoOptions => "has_info_options",
            Self::HasFinalOption => "has_final_option",
            Self::MemberCount => "member_count",
            Self::OptionCount => "option_count",
            Self::ArgumentCount => "argument_count",
            Self::MemberNames => "member_names",
            Self::MemberDeclarations => "member_declarations",
            Self::DefinitionLines => "definition_lines",
            Self::Member => "member",
            Self::PadTo => "pad_to",
        }
    }

    pub fn parse_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

/// Fields reachable through `member(NAME, FIELD)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberField {
    Kind,
    ValueType,
    Count,
    MinCount,
    /// Empty text when unbounded.
    MaxCount,
    Default,
    Flags,
    /// One constraint per line.
    Values,
    Include,
    /// Definition lines, comma separated.
    Lines,
    IsOption,
    IsMandatory,
    IsCollection,
}

impl MemberField {
    pub const ALL: [Self; 13] = [
        Self::Kind,
        Self::ValueType,
        Self::Count,
        Self::MinCount,
        Self::MaxCount,
        Self::Default,
        Self::Flags,
        Self::Values,
        Self::Include,
        Self::Lines,
        Self::IsOption,
        Self::IsMandatory,
        Self::IsCollection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kind => "kind",
            Self::ValueType => "value_type",
            Self::Count => "count",
            Self::MinCount => "min_count",
            Self::MaxCount => "max_count",
            Self::Default => "default",
            Self::Flags => "flags",
            Self::Values => "values",
            Self::Include => "include",
            Self::Lines => "lines",
            Self::IsOption => "is_option",
            Self::IsMandatory => "is_mandatory",
            Self::IsCollection => "is_collection",
        }
    }

    pub fn parse_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    fn value_of(self, member: &Member) -> Value {
        match self {
            Self::Kind => member.kind.as_str().into(),
            Self::ValueType => member.value_type.as_str().into(),
            Self::Count => member.count.to_string().into(),
            Self::MinCount => i64::from(member.count.min).into(),
            Self::MaxCount => match member.count.max {
                Bound::Bounded(n) => i64::from(n).into(),
                Bound::Unbounded => "".into(),
            },
            Self::Default => member.default.join(", ").into(),
            Self::Flags => member.flags().join(", ").into(),
            Self::Values => Value::Lines(member.values.iter().map(describe_constraint).collect()),
            Self::Include => member.include.clone().unwrap_or_default().into(),
            Self::Lines => join_numbers(member.line_numbers()).into(),
            Self::IsOption => member.is_option().into(),
            Self::IsMandatory => member.is_mandatory_option().into(),
            Self::IsCollection => member.kind.is_collection().into(),
        }
    }
}

/// Resolves template keys against a parsed document.
///
/// # Examples
///
/// ```
/// use helpspec_core::ParserConfig;
/// use helpspec_parser::{ModelResolver, parse_help_text};
/// use helpspec_template::render;
///
/// let doc = parse_help_text("${-q, --quiet}$ Say less.", &ParserConfig::default()).unwrap();
/// let template = "[[[IF has_options]]]flags: [[[member(quiet, flags)]]][[[ENDIF]]]";
/// let text = render(template, &ModelResolver::new(&doc)).unwrap();
/// assert_eq!(text, "flags: -q, --quiet");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ModelResolver<'d> {
    document: &'d HelpDocument,
}

impl<'d> ModelResolver<'d> {
    pub fn new(document: &'d HelpDocument) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &'d HelpDocument {
        self.document
    }

    fn has_kind(&self, kind: MemberKind) -> bool {
        self.document.members.iter().any(|member| member.kind == kind)
    }

    fn member_value(&self, key: &str, args: &[String]) -> Result<Value, ResolveError> {
        let [name, field] = args else {
            return Err(invalid(key, format!("expected 2 arguments, got {}", args.len())));
        };
        let member = self
            .document
            .member(name)
            .ok_or_else(|| invalid(key, format!("no member named \"{name}\"")))?;
        let field = MemberField::parse_name(field)
            .ok_or_else(|| invalid(key, format!("unknown member field \"{field}\"")))?;
        Ok(field.value_of(member))
    }

    fn padding(key: &str, args: &[String], context: &Context) -> Result<Value, ResolveError> {
        let [column] = args else {
            return Err(invalid(key, format!("expected 1 argument, got {}", args.len())));
        };
        let column: usize = column
            .parse()
            .map_err(|_| invalid(key, format!("column must be a number, got \"{column}\"")))?;
        let width = column.saturating_sub(context.column).max(1);
        Ok(" ".repeat(width).into())
    }
}

impl Resolver for ModelResolver<'_> {
    fn resolve(&self, key: &str, args: &[String], context: &Context) -> Result<Value, ResolveError> {
        let model_key =
            ModelKey::parse_name(key).ok_or_else(|| ResolveError::UnknownKey(key.to_string()))?;
        trace!(key, ?args, column = context.column, "resolving model key");
        let doc = self.document;
        let value = match model_key {
            ModelKey::HelpText => Value::Lines(doc.text.split('\n').map(str::to_string).collect()),
            ModelKey::HasOptions => (!doc.options().is_empty()).into(),
            ModelKey::HasArguments => (!doc.positionals().is_empty()).into(),
            ModelKey::HasHelpOption => self.has_kind(MemberKind::Help).into(),
            ModelKey::HasInfoOptions => self.has_kind(MemberKind::Info).into(),
            ModelKey::HasFinalOption => self.has_kind(MemberKind::Final).into(),
            ModelKey::MemberCount => count(doc.members.len()),
            ModelKey::OptionCount => count(doc.options().len()),
            ModelKey::ArgumentCount => count(doc.positionals().len()),
            ModelKey::MemberNames => {
                Value::Lines(doc.members.iter().map(|m| m.name.clone()).collect())
            }
            ModelKey::MemberDeclarations => {
                Value::Lines(doc.members.iter().map(Member::to_string).collect())
            }
            ModelKey::DefinitionLines => join_numbers(doc.definition_lines.iter().copied()).into(),
            ModelKey::Member => self.member_value(key, args)?,
            ModelKey::PadTo => Self::padding(key, args, context)?,
        };
        Ok(value)
    }
}

fn invalid(key: &str, message: String) -> ResolveError {
    ResolveError::InvalidArguments {
        key: key.to_string(),
        message,
    }
}

fn count(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn join_numbers(numbers: impl IntoIterator<Item = usize>) -> String {
    numbers
        .into_iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes a constraint back in `Values` syntax.
fn describe_constraint(constraint: &ValueConstraint) -> String {
    match constraint {
        ValueConstraint::Exact(value) => value.clone(),
        ValueConstraint::Range { lower, upper } => {
            let mut text = String::new();
            if let Some(limit) = lower {
                text.push(if limit.inclusive { '[' } else { '(' });
                text.push_str(&limit.literal);
            }
            text.push_str("..");
            if let Some(limit) = upper {
                text.push_str(&limit.literal);
                text.push(if limit.inclusive { ']' } else { ')' });
            }
            text
        }
    }
}
