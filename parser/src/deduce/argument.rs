//! Per-definition normalization.
//!
//! Turns a [`PropertySet`] into an [`Argument`] with a known delimiter,
//! delimiter count, literal value and occurrence count, and collects the
//! properties that belong to the member rather than the argument.

use helpspec_core::{
    Argument, Bound, CountRange, ErrorKind, HelpFileError, MemberKind, Result, ValueConstraint,
    ValueType,
};

use crate::properties::{PropertyKey as Key, PropertySet, parse_bool, parse_values};

/// A `Values` property: the text as written and its parsed constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValuesProperty {
    pub(crate) text: String,
    pub(crate) constraints: Vec<ValueConstraint>,
}

/// Properties shared by every argument of a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MemberProperties {
    pub(crate) default: Option<Vec<String>>,
    pub(crate) include: Option<String>,
    pub(crate) kind: Option<MemberKind>,
    pub(crate) values: Option<ValuesProperty>,
    pub(crate) value_type: Option<ValueType>,
}

/// A normalized argument waiting for index resolution and grouping.
#[derive(Debug, Clone)]
pub(crate) struct Draft {
    pub(crate) argument: Argument,
    pub(crate) member: MemberProperties,
    pub(crate) explicit_index: Option<String>,
    pub(crate) autoindex: Option<usize>,
}

pub(crate) fn normalize(set: &PropertySet, ordinal: usize) -> Result<Draft> {
    let is_option = set.is_option();
    let flags: Vec<String> = set
        .get(Key::Flags)
        .map(|flags| flags.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    if is_option && flags.is_empty() {
        return Err(error(
            ErrorKind::MissingRequiredProperty,
            "Flags property can't be empty.",
        ));
    }

    let literal = set.get(Key::Value);
    if !is_option && literal.is_some() {
        return Err(error(
            ErrorKind::ConflictingProperty,
            "Arguments can't have the value property.",
        ));
    }
    let mut meta_variable = set.get(Key::MetaVariable).map(str::to_string);
    if meta_variable.is_some() && literal.is_some() {
        return Err(error(
            ErrorKind::ConflictingProperty,
            "An option can't have both argument and value properties.",
        ));
    }
    if meta_variable.as_deref() == Some("") {
        meta_variable = Some("VALUE".to_string());
    }
    if literal == Some("") {
        return Err(error(
            ErrorKind::MissingRequiredProperty,
            "Value property can't be empty.",
        ));
    }
    let literal = match (literal, &meta_variable) {
        (Some(value), _) => Some(value.to_string()),
        (None, None) => Some("true".to_string()),
        (None, Some(_)) => None,
    };

    let captured = literal
        .as_deref()
        .or(meta_variable.as_deref())
        .unwrap_or_default();
    let declared_count = set.get(Key::DelimiterCount);
    let delimiter = delimiter(set.get(Key::Delimiter), captured, declared_count)?;
    let delimiter_count = match (delimiter, declared_count) {
        (None, Some(text)) if text.trim() != "0" => {
            return Err(error(
                ErrorKind::MissingRequiredProperty,
                "DelimiterCount property where there is no delimiter.",
            ));
        }
        (None, _) => CountRange::NONE,
        (Some(_), Some(text)) => parse_count(Key::DelimiterCount, text)?,
        (Some(d), None) => match captured.matches(d).count() {
            0 => CountRange::ZERO_OR_MORE,
            n => CountRange::exactly(u32::try_from(n).unwrap_or(u32::MAX)),
        },
    };

    let value = literal.map(|text| match delimiter {
        Some(d) => text.split(d).map(str::to_string).collect(),
        None => vec![text],
    });

    let kind = set.get(Key::Type).and_then(MemberKind::parse_name);
    if let Some(kind) = kind.filter(|kind| kind.is_special()) {
        match &value {
            None => {
                return Err(error(
                    ErrorKind::ConflictingProperty,
                    format!("Options of type {kind} can't take an argument."),
                ));
            }
            Some(value) if value.len() != 1 || value[0] != "true" => {
                return Err(error(
                    ErrorKind::ConflictingProperty,
                    format!("Options of type {kind} must have value \"true\"."),
                ));
            }
            Some(_) => {}
        }
    }

    let default = set
        .get(Key::Default)
        .map(|text| split_default(text, delimiter, delimiter_count))
        .transpose()?;

    let count = match set.get(Key::Count) {
        None if is_option => CountRange::ZERO_OR_ONE,
        None => CountRange::EXACTLY_ONE,
        Some(text) => {
            let count = parse_count(Key::Count, text)?;
            if count.max == Bound::Bounded(0) {
                return Err(error(
                    ErrorKind::InvalidPropertyValue,
                    "Max-count can't be 0.",
                ));
            }
            count
        }
    };

    let member_name = set
        .get(Key::MemberName)
        .unwrap_or(set.name.as_str())
        .to_string();
    if member_name.is_empty() {
        return Err(error(
            ErrorKind::MissingRequiredProperty,
            "Member name can't be empty.",
        ));
    }

    let values = set
        .get(Key::Values)
        .map(|text| {
            Ok::<_, HelpFileError>(ValuesProperty {
                text: text.to_string(),
                constraints: parse_values(text)?,
            })
        })
        .transpose()?;

    let text = set
        .get(Key::Text)
        .map(str::to_string)
        .unwrap_or_else(|| set.text.trim().to_string());
    let owned = |key: Key| set.get(key).map(str::to_string);

    let argument = Argument {
        name: set.name.clone(),
        member_name,
        flags,
        meta_variable,
        value,
        delimiter,
        delimiter_count,
        count,
        count_declared: set.is_explicit(Key::Count),
        index: None,
        text,
        visible: set.get(Key::Visible).and_then(parse_bool).unwrap_or(true),
        line_number: set.line,
        ordinal,
        member_index: None,
        action: owned(Key::Action),
        argument_type: owned(Key::ArgumentType),
        callback: owned(Key::Callback),
        condition: owned(Key::Condition),
        condition_message: owned(Key::ConditionMessage),
    };

    Ok(Draft {
        argument,
        member: MemberProperties {
            default,
            include: owned(Key::Include),
            kind,
            values,
            value_type: set.get(Key::ValueType).and_then(ValueType::parse_name),
        },
        explicit_index: owned(Key::Index),
        autoindex: set.autoindex,
    })
}

fn error(kind: ErrorKind, message: impl Into<String>) -> HelpFileError {
    HelpFileError::new(kind, message)
}

/// The declared delimiter, or `,` when the captured text contains one and
/// the delimiter count isn't explicitly zero.
fn delimiter(declared: Option<&str>, captured: &str, count: Option<&str>) -> Result<Option<char>> {
    let text = match declared {
        Some(text) => text,
        None if captured.contains(',') && count.map(str::trim) != Some("0") => ",",
        None => return Ok(None),
    };
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() => Ok(Some(c)),
        _ => {
            let mut message = "Delimiter must be a single non-whitespace character.".to_string();
            if captured.contains(',') {
                message.push_str(" Use \"DelimiterCount: 0\" to disable the comma-delimiter.");
            }
            Err(error(ErrorKind::InvalidPropertyValue, message))
        }
    }
}

fn parse_count(key: Key, text: &str) -> Result<CountRange> {
    CountRange::parse(text)
        .map_err(|err| error(ErrorKind::InvalidPropertyValue, format!("Invalid {key} property: {err}")))
}

/// Splits a default on the delimiter; a single part is repeated for every
/// required sub-value.
fn split_default(text: &str, delimiter: Option<char>, count: CountRange) -> Result<Vec<String>> {
    let Some(d) = delimiter else {
        return Ok(vec![text.to_string()]);
    };
    let parts: Vec<String> = match count.max.limit() {
        Some(max) => text
            .splitn(max as usize + 1, d)
            .map(str::to_string)
            .collect(),
        None => text.split(d).map(str::to_string).collect(),
    };
    let arity = count.min as usize + 1;
    if parts.len() == 1 {
        Ok(vec![text.to_string(); arity])
    } else if parts.len() < arity {
        Err(error(
            ErrorKind::IllegalDefaultValue,
            format!("Default has too few delimited values (expects {arity})."),
        ))
    } else {
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use crate::properties::parse_definition;
    use helpspec_core::ParserConfig;

    fn draft(body: &str) -> Result<Draft> {
        let config = ParserConfig::default();
        let mut session = Session::new(&config);
        let set = parse_definition(body, 1, &mut session)?;
        normalize(&set, 0)
    }

    fn kind_of(body: &str) -> ErrorKind {
        draft(body).unwrap_err().kind
    }

    #[test]
    fn test_flag_without_placeholder_gets_true() {
        let d = draft("-v, --verbose").unwrap();
        let arg = &d.argument;
        assert_eq!(arg.flags, vec!["-v", "--verbose"]);
        assert_eq!(arg.value, Some(vec!["true".to_string()]));
        assert_eq!(arg.count, CountRange::ZERO_OR_ONE);
        assert!(!arg.count_declared);
        assert_eq!(arg.delimiter, None);
        assert_eq!(arg.delimiter_count, CountRange::NONE);
    }

    #[test]
    fn test_comma_in_placeholder_sets_delimiter() {
        let d = draft("-p, --point=X,Y,Z | Default: 0.0").unwrap();
        let arg = &d.argument;
        assert_eq!(arg.meta_variable.as_deref(), Some("X,Y,Z"));
        assert_eq!(arg.delimiter, Some(','));
        assert_eq!(arg.delimiter_count, CountRange::exactly(2));
        assert!(arg.consumes_input());
        assert_eq!(d.member.default, Some(vec!["0.0".to_string(); 3]));
    }

    #[test]
    fn test_explicit_zero_delimiter_count_disables_comma() {
        let d = draft("-f A,B | DelimiterCount: 0").unwrap();
        assert_eq!(d.argument.delimiter, None);
        assert_eq!(d.argument.delimiter_count, CountRange::NONE);
    }

    #[test]
    fn test_declared_delimiter_without_occurrences_is_open() {
        let d = draft("-i PATH | Delimiter: :").unwrap();
        assert_eq!(d.argument.delimiter, Some(':'));
        assert_eq!(d.argument.delimiter_count, CountRange::ZERO_OR_MORE);
    }

    #[test]
    fn test_value_is_split_into_alternatives() {
        let d = draft("--rgb | Value: 1,2,3 | Member: color").unwrap();
        assert_eq!(
            d.argument.value,
            Some(vec!["1".to_string(), "2".to_string(), "3".to_string()])
        );
        assert_eq!(d.argument.member_name, "color");
        assert_eq!(d.argument.name, "rgb");
    }

    #[test]
    fn test_positional_count_and_index() {
        let d = draft("[FILE...] | Index: 0").unwrap();
        assert_eq!(d.argument.count, CountRange::ZERO_OR_MORE);
        assert!(!d.argument.count_declared);
        assert_eq!(d.explicit_index.as_deref(), Some("0"));
        assert_eq!(d.autoindex, Some(0));
        assert_eq!(d.argument.meta_variable.as_deref(), Some("[FILE...]"));
    }

    #[test]
    fn test_default_split_rules() {
        let exact = CountRange::exactly(2);
        assert_eq!(
            split_default("1,2,3,4", Some(','), exact).unwrap(),
            vec!["1", "2", "3,4"]
        );
        assert_eq!(split_default("7", Some(','), exact).unwrap(), vec!["7"; 3]);
        let err = split_default("1,2", Some(','), exact).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalDefaultValue);
        assert_eq!(
            split_default("a:b:c", Some(':'), CountRange::ZERO_OR_MORE).unwrap(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_pass_through_properties() {
        let d = draft("-x | Action: run() | Cond: ready | CondMsg: not ready | Include: <x>").unwrap();
        assert_eq!(d.argument.action.as_deref(), Some("run()"));
        assert_eq!(d.argument.condition.as_deref(), Some("ready"));
        assert_eq!(d.argument.condition_message.as_deref(), Some("not ready"));
        assert_eq!(d.member.include.as_deref(), Some("<x>"));
    }

    #[test]
    fn test_normalization_errors() {
        assert_eq!(kind_of("x | Flags: "), ErrorKind::MissingRequiredProperty);
        assert_eq!(kind_of("FILE | Value: 1"), ErrorKind::ConflictingProperty);
        assert_eq!(kind_of("-n N | Value: 1"), ErrorKind::ConflictingProperty);
        assert_eq!(kind_of("-n | Value: "), ErrorKind::MissingRequiredProperty);
        assert_eq!(kind_of("-n N | Delimiter: ab"), ErrorKind::InvalidPropertyValue);
        assert_eq!(kind_of("-n N | DelimiterCount: 2"), ErrorKind::MissingRequiredProperty);
        assert_eq!(kind_of("-n N | Type: help"), ErrorKind::ConflictingProperty);
        assert_eq!(kind_of("-n | Type: info | Value: yes"), ErrorKind::ConflictingProperty);
        assert_eq!(kind_of("-n | Count: 0"), ErrorKind::InvalidPropertyValue);
        assert_eq!(kind_of("-n | Count: -1..2"), ErrorKind::InvalidPropertyValue);
        assert_eq!(kind_of("-n | Count: lots"), ErrorKind::InvalidPropertyValue);
        assert_eq!(
            kind_of("-p X,Y | Default: 1,2,3 | DelimiterCount: 3"),
            ErrorKind::IllegalDefaultValue
        );
    }

    #[test]
    fn test_bad_delimiter_hints_at_zero_count() {
        let err = draft("-p X,Y | Delimiter: ;;").unwrap_err();
        assert!(err.message.contains("DelimiterCount: 0"));
    }
}
