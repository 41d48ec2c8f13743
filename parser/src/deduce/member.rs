//! Member aggregation and inference.
//!
//! Arguments sharing a member name are grouped, and the member's count, value
//! type, kind and default are deduced from all of them together.

use std::collections::HashMap;
use std::fmt::Display;

use helpspec_core::{
    Argument, Bound, CountRange, DefaultValueRule, ErrorKind, HelpFileError, Member, MemberKind,
    ParserConfig, Result, ValueType,
};
use tracing::debug;

use super::argument::{Draft, MemberProperties};
use crate::properties::PropertyKey;

struct Group {
    name: String,
    properties: MemberProperties,
    arguments: Vec<Argument>,
}

impl Group {
    fn line_numbers(&self) -> Vec<usize> {
        self.arguments.iter().map(|arg| arg.line_number).collect()
    }
}

/// Groups drafts by member name and builds the members, sorted by name.
pub(crate) fn make_members(drafts: Vec<Draft>, config: &ParserConfig) -> Result<Vec<Member>> {
    let mut groups: Vec<Group> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for draft in drafts {
        let name = draft.argument.member_name.clone();
        let Some(i) = by_name.get(&name).copied() else {
            by_name.insert(name.clone(), groups.len());
            groups.push(Group {
                name,
                properties: draft.member,
                arguments: vec![draft.argument],
            });
            continue;
        };

        let group = &mut groups[i];
        let mixed = group.arguments[0].is_option() != draft.argument.is_option();
        group.arguments.push(draft.argument);
        if mixed {
            return Err(HelpFileError::new(
                ErrorKind::ConflictingProperty,
                format!(
                    "{name}: arguments and options can't write to the same member. \
                     (Use the \"member\" property to set a different member name)"
                ),
            )
            .with_lines(group.line_numbers()));
        }
        merge_properties(&mut group.properties, draft.member).map_err(|err| {
            HelpFileError::new(err.kind, format!("{name}: {}", err.message))
                .with_lines(group.line_numbers())
        })?;
    }

    let mut members = Vec::with_capacity(groups.len());
    for group in groups {
        let lines = group.line_numbers();
        let member = build_member(group, config).map_err(|err| err.with_lines(lines))?;
        debug!(
            member = %member.name,
            kind = %member.kind,
            value_type = %member.value_type,
            count = %member.count,
            "deduced member"
        );
        members.push(member);
    }

    if config.require_help_option && !members.iter().any(|m| m.kind == MemberKind::Help) {
        return Err(HelpFileError::new(
            ErrorKind::MissingRequiredProperty,
            "There is no help option. Use property \"Type: help\" to indicate the help option.",
        ));
    }

    members.sort_by(|a, b| a.name.cmp(&b.name));
    for (i, member) in members.iter_mut().enumerate() {
        for argument in &mut member.arguments {
            argument.member_index = Some(i);
        }
    }
    Ok(members)
}

fn merge_properties(current: &mut MemberProperties, other: MemberProperties) -> Result<()> {
    merge_field(&mut current.default, other.default, PropertyKey::Default, |v| v.join("|"))?;
    merge_field(&mut current.include, other.include, PropertyKey::Include, Clone::clone)?;
    merge_field(&mut current.kind, other.kind, PropertyKey::Type, ToString::to_string)?;
    merge_field(&mut current.values, other.values, PropertyKey::Values, |v| v.text.clone())?;
    merge_field(
        &mut current.value_type,
        other.value_type,
        PropertyKey::ValueType,
        ToString::to_string,
    )
}

fn merge_field<T: PartialEq>(
    slot: &mut Option<T>,
    other: Option<T>,
    key: PropertyKey,
    show: impl Fn(&T) -> String,
) -> Result<()> {
    let Some(other) = other else {
        return Ok(());
    };
    if let Some(current) = slot.as_ref() {
        if *current != other {
            return Err(HelpFileError::new(
                ErrorKind::ConflictingProperty,
                format!(
                    "Multiple definitions of property {key}: \"{}\" and \"{}\"",
                    show(current),
                    show(&other)
                ),
            ));
        }
    } else {
        *slot = Some(other);
    }
    Ok(())
}

fn conflict(name: &str, message: impl Display) -> HelpFileError {
    HelpFileError::new(ErrorKind::ConflictingProperty, format!("{name}: {message}"))
}

fn build_member(group: Group, config: &ParserConfig) -> Result<Member> {
    let Group {
        name,
        properties,
        arguments,
    } = group;

    let delimiters = arguments
        .iter()
        .map(|arg| arg.delimiter_count)
        .reduce(CountRange::combine)
        .unwrap_or(CountRange::NONE);
    let count = if arguments.iter().all(Argument::is_option) {
        option_count(&name, &arguments)?
    } else {
        arguments
            .iter()
            .map(|arg| arg.count)
            .reduce(CountRange::sum)
            .unwrap_or(CountRange::EXACTLY_ONE)
    };

    let value_type = match properties.value_type {
        Some(value_type) => value_type,
        None => infer_value_type(&name, &properties, &arguments)?,
    };

    let kind = match properties.kind {
        Some(kind) => {
            check_kind(&name, kind, value_type, count, &properties, &arguments)?;
            kind
        }
        None => infer_kind(&name, value_type, count, delimiters, &arguments),
    };

    let default = match properties.default.clone() {
        Some(default) => {
            check_default(&name, &default, kind, count, config.default_rule)?;
            default
        }
        None => infer_default(kind, value_type, &properties, &arguments),
    };

    Ok(Member {
        count: count.times_arity(delimiters),
        values: properties
            .values
            .map(|values| values.constraints)
            .unwrap_or_default(),
        include: properties.include,
        name,
        kind,
        value_type,
        default,
        arguments,
    })
}

/// Options must agree on the count; a `0..1` count, declared or implied,
/// yields to a single other count.
fn option_count(name: &str, arguments: &[Argument]) -> Result<CountRange> {
    let mut counts: Vec<CountRange> = Vec::new();
    for arg in arguments {
        if !counts.contains(&arg.count) {
            counts.push(arg.count);
        }
    }
    match counts.as_slice() {
        [] => Ok(CountRange::ZERO_OR_ONE),
        [count] => Ok(*count),
        [CountRange::ZERO_OR_ONE, count] | [count, CountRange::ZERO_OR_ONE] => Ok(*count),
        _ => Err(HelpFileError::new(
            ErrorKind::ConflictingCount,
            format!(
                "{name}: conflicting count properties. Options writing to the same member \
                 must have the same count."
            ),
        )),
    }
}

/// Classifies a literal as bool, quoted string, integer or double.
pub(crate) fn literal_type(literal: &str) -> Option<ValueType> {
    if literal == "true" || literal == "false" {
        Some(ValueType::Bool)
    } else if literal.len() > 1 && literal.starts_with('"') && literal.ends_with('"') {
        Some(ValueType::String)
    } else if literal.parse::<i64>().is_ok() {
        Some(ValueType::Int)
    } else if literal.parse::<f64>().is_ok() {
        Some(ValueType::Double)
    } else {
        None
    }
}

fn infer_value_type(
    name: &str,
    properties: &MemberProperties,
    arguments: &[Argument],
) -> Result<ValueType> {
    let mut candidates: Vec<&str> = Vec::new();
    if let Some(first) = properties.default.as_ref().and_then(|d| d.first()) {
        candidates.push(first);
    }
    if let Some(values) = &properties.values {
        candidates.extend(values.constraints.iter().flat_map(|c| c.literals()));
    }
    for value in arguments.iter().filter_map(|arg| arg.value.as_ref()) {
        candidates.extend(value.iter().map(String::as_str));
    }
    if candidates.is_empty() {
        return Ok(ValueType::String);
    }

    let mut types: Vec<ValueType> = Vec::new();
    for candidate in candidates {
        let Some(value_type) = literal_type(candidate) else {
            return Err(HelpFileError::new(
                ErrorKind::AmbiguousOrInvalidType,
                format!(
                    "{name}: unable to infer correct value type. \
                     (String values must be enclosed by quotes, e.g. \"foo\")"
                ),
            ));
        };
        if !types.contains(&value_type) {
            types.push(value_type);
        }
    }
    types.sort_by_key(|t| t.as_str());

    match types.as_slice() {
        [single] => Ok(*single),
        [ValueType::Double, ValueType::Int] => Ok(ValueType::Double),
        _ => {
            let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
            Err(HelpFileError::new(
                ErrorKind::AmbiguousOrInvalidType,
                format!(
                    "{name}: unable to infer correct value type, can be any of {}.",
                    names.join(", ")
                ),
            ))
        }
    }
}

fn infer_kind(
    name: &str,
    value_type: ValueType,
    count: CountRange,
    delimiters: CountRange,
    arguments: &[Argument],
) -> MemberKind {
    if value_type == ValueType::Bool
        && count == CountRange::ZERO_OR_ONE
        && arguments.iter().all(Argument::is_option)
    {
        match name {
            "help" => MemberKind::Help,
            "end_of_options" => MemberKind::Final,
            _ => MemberKind::Value,
        }
    } else if count.max != Bound::Bounded(1) || delimiters.max.is_unbounded() {
        MemberKind::List
    } else if delimiters.max == Bound::Bounded(0) {
        MemberKind::Value
    } else if delimiters.is_fixed() {
        MemberKind::MultiValue
    } else if arguments.iter().any(|arg| !arg.has_fixed_delimiter_count()) {
        MemberKind::List
    } else {
        MemberKind::MultiValue
    }
}

fn check_kind(
    name: &str,
    kind: MemberKind,
    value_type: ValueType,
    count: CountRange,
    properties: &MemberProperties,
    arguments: &[Argument],
) -> Result<()> {
    if kind == MemberKind::MultiValue
        && arguments.iter().any(|arg| !arg.has_fixed_delimiter_count())
    {
        return Err(conflict(
            name,
            "type \"multivalue\" requires a fixed number of delimiters.",
        ));
    }
    if !kind.is_collection() && count.max != Bound::Bounded(1) {
        return Err(conflict(
            name,
            "type must be \"list\" or \"multivalue\" when the maximum count is greater than 1.",
        ));
    }
    if kind.is_special() {
        if value_type != ValueType::Bool {
            return Err(conflict(
                name,
                format!("when type is \"{kind}\", value_type must be bool, not {value_type}."),
            ));
        }
        if arguments.iter().any(|arg| !arg.is_option()) {
            return Err(conflict(name, format!("only options can have type \"{kind}\".")));
        }
        if properties.values.is_some() {
            return Err(conflict(
                name,
                format!("options of type \"{kind}\" can't have the \"values\" property."),
            ));
        }
    }
    Ok(())
}

fn check_default(
    name: &str,
    default: &[String],
    kind: MemberKind,
    count: CountRange,
    rule: DefaultValueRule,
) -> Result<()> {
    let message = match rule {
        DefaultValueRule::NonZeroMinimum
            if count.min != 0 && default.iter().any(|d| !d.is_empty()) =>
        {
            "can't have default value when minimum count is non-zero."
        }
        DefaultValueRule::ListKind if kind == MemberKind::List => {
            "can't have default value when type is \"list\"."
        }
        _ => return Ok(()),
    };
    Err(HelpFileError::new(
        ErrorKind::IllegalDefaultValue,
        format!("{name}: {message}"),
    ))
}

fn infer_default(
    kind: MemberKind,
    value_type: ValueType,
    properties: &MemberProperties,
    arguments: &[Argument],
) -> Vec<String> {
    let value = properties
        .values
        .as_ref()
        .and_then(|values| values.constraints.first())
        .and_then(|constraint| constraint.inclusive_lower())
        .map(str::to_string)
        .unwrap_or_else(|| {
            match value_type {
                ValueType::Bool => "false",
                ValueType::Int | ValueType::Double => "0",
                ValueType::String => "",
            }
            .to_string()
        });
    if kind == MemberKind::MultiValue {
        let arity = arguments
            .iter()
            .map(|arg| arg.delimiter_count.min)
            .min()
            .unwrap_or(0) as usize
            + 1;
        vec![value; arity]
    } else {
        vec![value]
    }
}
