//! NMR assignment parsing.
//!
//! An assignment such as `G23N-H` names a group of coupled nuclei. Each
//! `-`-separated group is `[residue letters][residue number]nucleus`; a group
//! without a residue number belongs to the same residue as the group before it.
//! A later group that does not split cleanly is read as a bare nucleus type of
//! that residue when it looks like one: an element symbol followed by a primed
//! locant (`H1'`) or by a side-chain letter before the digits (`HG2`, `HD21`).
//! Anything else with a dangling number (`H24`, `A24`) is rejected.

use crate::constants::xi_ratio;
use crate::domain::Resonance;
use crate::error::{Error, Result};

/// Parse an assignment into its resonances, in order of appearance.
pub fn parse_assignment(assignment: &str) -> Result<Vec<Resonance>> {
    let upper = assignment.trim().to_ascii_uppercase();
    let invalid = |reason: String| Error::InvalidAssignment {
        assignment: assignment.to_string(),
        reason,
    };

    if upper.is_empty() {
        return Err(invalid("empty assignment".to_string()));
    }

    let mut resonances: Vec<Resonance> = Vec::new();

    for group in upper.split('-') {
        let (residue_type, index, nucleus_type) = match split_group(group) {
            Ok(parts) => parts,
            // `H1'` after `A5C1'` is a bare nucleus type, not residue H1.
            Err(_) if !resonances.is_empty() && is_bare_nucleus(group) => ("", None, group),
            Err(reason) => return Err(invalid(reason)),
        };

        let resonance = match index {
            Some(index) => Resonance {
                index,
                residue_type: residue_type.to_string(),
                nucleus_type: nucleus_type.to_string(),
            },
            None => {
                let previous = resonances.last().ok_or_else(|| {
                    invalid(format!("group '{group}' has no residue number to inherit"))
                })?;
                if !residue_type.is_empty() {
                    return Err(invalid(format!(
                        "group '{group}' has a residue type but no residue number"
                    )));
                }
                Resonance {
                    index: previous.index,
                    residue_type: previous.residue_type.clone(),
                    nucleus_type: nucleus_type.to_string(),
                }
            }
        };
        resonances.push(resonance);
    }

    Ok(resonances)
}

/// Split one group into `(residue letters, residue number, nucleus type)`.
///
/// Without a residue number, every letter belongs to the nucleus type.
fn split_group(group: &str) -> std::result::Result<(&str, Option<u32>, &str), String> {
    if group.is_empty() {
        return Err("empty group".to_string());
    }

    let Some(digit_start) = group.find(|c: char| c.is_ascii_digit()) else {
        validate_nucleus(group, group)?;
        return Ok(("", None, group));
    };

    let residue_type = &group[..digit_start];
    if !residue_type.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("invalid residue type in group '{group}'"));
    }

    let rest = &group[digit_start..];
    let digit_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let index = rest[..digit_end]
        .parse::<u32>()
        .map_err(|e| format!("invalid residue number in group '{group}': {e}"))?;

    let nucleus_type = &rest[digit_end..];
    validate_nucleus(nucleus_type, group)?;

    Ok((residue_type, Some(index), nucleus_type))
}

/// Whether a group that failed to split is a side-chain nucleus type on its own.
fn is_bare_nucleus(group: &str) -> bool {
    if validate_nucleus(group, group).is_err() {
        return false;
    }
    let Some(element) = group.chars().next() else {
        return false;
    };
    if xi_ratio(element).is_none() {
        return false;
    }
    let letters = group.chars().take_while(char::is_ascii_alphabetic).count();
    group.contains('\'') || letters >= 2
}

fn validate_nucleus(nucleus_type: &str, group: &str) -> std::result::Result<(), String> {
    let mut chars = nucleus_type.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(format!("missing nucleus type in group '{group}'")),
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '\'') {
        Ok(())
    } else {
        Err(format!("invalid nucleus type in group '{group}'"))
    }
}
