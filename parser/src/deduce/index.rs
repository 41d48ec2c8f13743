//! Positional index resolution.

use helpspec_core::{ErrorKind, HelpFileError, Result};

use super::argument::Draft;

/// Gives every positional argument an index.
///
/// Explicit indices must be below the number of positional arguments and
/// unique; the remaining arguments fill the free slots in document order.
pub(crate) fn resolve_indices(drafts: &mut [Draft]) -> Result<()> {
    let mut positions: Vec<usize> = (0..drafts.len())
        .filter(|&i| drafts[i].autoindex.is_some())
        .collect();
    positions.sort_by_key(|&i| drafts[i].autoindex);
    let total = positions.len();

    let mut slots: Vec<Option<usize>> = vec![None; total];
    let mut explicit: Vec<Option<usize>> = vec![None; total];
    for (k, &p) in positions.iter().enumerate() {
        let Some(text) = drafts[p].explicit_index.as_deref() else {
            continue;
        };
        let line = drafts[p].argument.line_number;
        let index: i64 = text.trim().parse().map_err(|_| {
            HelpFileError::new(
                ErrorKind::InvalidIndex,
                format!("Invalid index property: {text}"),
            )
            .at_line(line)
        })?;
        let slot = usize::try_from(index)
            .ok()
            .filter(|&slot| slot < total)
            .ok_or_else(|| {
                HelpFileError::new(
                    ErrorKind::InvalidIndex,
                    format!(
                        "Index must be between 0 and {}, it is {index}.",
                        total.saturating_sub(1)
                    ),
                )
                .at_line(line)
            })?;
        if let Some(other) = slots[slot] {
            return Err(HelpFileError::new(
                ErrorKind::DuplicateIndex,
                "Two arguments can't have the same index.",
            )
            .with_lines([drafts[other].argument.line_number, line]));
        }
        slots[slot] = Some(p);
        explicit[k] = Some(slot);
    }

    let mut free = (0..total).filter(|&slot| slots[slot].is_none());
    for (k, &p) in positions.iter().enumerate() {
        drafts[p].argument.index = explicit[k].or_else(|| free.next());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use crate::deduce::argument::normalize;
    use crate::properties::parse_definition;
    use helpspec_core::ParserConfig;

    fn drafts(bodies: &[&str]) -> Vec<Draft> {
        let config = ParserConfig::default();
        let mut session = Session::new(&config);
        bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                let set = parse_definition(body, i + 1, &mut session).unwrap();
                normalize(&set, i).unwrap()
            })
            .collect()
    }

    fn indices(drafts: &[Draft]) -> Vec<Option<usize>> {
        drafts.iter().map(|d| d.argument.index).collect()
    }

    #[test]
    fn test_explicit_index_takes_its_slot() {
        let mut d = drafts(&["A", "B | Index: 0", "C"]);
        resolve_indices(&mut d).unwrap();
        assert_eq!(indices(&d), vec![Some(1), Some(0), Some(2)]);
    }

    #[test]
    fn test_options_are_skipped() {
        let mut d = drafts(&["-v", "A", "-q", "B | Index: 0"]);
        resolve_indices(&mut d).unwrap();
        assert_eq!(indices(&d), vec![None, Some(1), None, Some(0)]);
    }

    #[test]
    fn test_duplicate_index_names_both_lines() {
        let mut d = drafts(&["A | Index: 0", "B", "C | Index: 0"]);
        let err = resolve_indices(&mut d).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateIndex);
        assert_eq!(err.lines, vec![1, 3]);
    }

    #[test]
    fn test_invalid_indices() {
        let mut d = drafts(&["A | Index: first"]);
        assert_eq!(resolve_indices(&mut d).unwrap_err().kind, ErrorKind::InvalidIndex);

        let mut d = drafts(&["A | Index: 2", "B"]);
        let err = resolve_indices(&mut d).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidIndex);
        assert_eq!(err.lines, vec![1]);

        let mut d = drafts(&["A | Index: -1"]);
        assert_eq!(resolve_indices(&mut d).unwrap_err().kind, ErrorKind::InvalidIndex);
    }
}
