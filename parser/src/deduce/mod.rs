//! Deduction engine.
//!
//! Runs in three steps over the scanned definitions:
//!
//! 1. Each definition is parsed and normalized into an argument
//!    ([`argument::normalize`]), in document order.
//! 2. Positional arguments receive their indices ([`index::resolve_indices`]).
//! 3. Arguments are grouped by member name and every member is deduced
//!    ([`member::make_members`]).
//!
//! The first error aborts the document.

pub(crate) mod argument;
pub(crate) mod index;
pub(crate) mod member;

use std::collections::HashSet;

use helpspec_core::{Member, Result};
use tracing::debug;

use crate::Session;
use crate::properties::parse_definition;
use crate::scanner::RawDefinition;
use argument::Draft;

pub(crate) fn deduce(definitions: &[RawDefinition], session: &mut Session<'_>) -> Result<Vec<Member>> {
    let mut drafts = Vec::with_capacity(definitions.len());
    for (ordinal, definition) in definitions.iter().enumerate() {
        let draft = parse_definition(&definition.body, definition.line, session)
            .and_then(|set| argument::normalize(&set, ordinal))
            .map_err(|err| err.at_line(definition.line))?;
        drafts.push(draft);
    }

    make_unique_names(&mut drafts);
    index::resolve_indices(&mut drafts)?;
    let members = member::make_members(drafts, session.config())?;
    debug!(
        arguments = definitions.len(),
        members = members.len(),
        "deduced help document"
    );
    Ok(members)
}

/// Appends `1`, `2`, ... to display names already in use.
fn make_unique_names(drafts: &mut [Draft]) {
    let mut seen = HashSet::new();
    for draft in drafts {
        let base = draft.argument.name.clone();
        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{base}{n}");
            n += 1;
        }
        seen.insert(name.clone());
        draft.argument.name = name;
    }
}
