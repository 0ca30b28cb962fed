//! Flattening of upstream evolution trees into display order.

use std::collections::HashSet;

use tracing::warn;

use crate::error::{DexError, Result};
use crate::models::{official_artwork, EvolutionEntry};
use crate::remote::EvolutionNode;

/// Id of the last non-empty path segment of a resource URL,
/// e.g. `.../pokemon-species/25/` -> `25`.
pub fn id_from_url(url: &str) -> Result<u32> {
    url.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| DexError::MalformedReference(url.to_string()))
}

fn entry_for(node: &EvolutionNode, current: Option<&str>) -> EvolutionEntry {
    let name = node.species.name.clone();
    let is_current = current.is_some_and(|c| c == name);
    match id_from_url(&node.species.url) {
        Ok(id) => EvolutionEntry {
            id: id as i64,
            sprite_url: official_artwork(id),
            name,
            is_current,
        },
        Err(err) => {
            warn!(species = %name, "{err}");
            EvolutionEntry {
                id: -1,
                sprite_url: String::new(),
                name,
                is_current,
            }
        }
    }
}

/// Pre-order walk of `root`: parent before children, children in the order
/// upstream lists them. `current` marks the species being viewed; pass `None`
/// when no entry should be marked.
///
/// A species id seen twice is emitted once, so a payload that repeats a
/// subtree cannot make the walk run away.
pub fn flatten(root: &EvolutionNode, current: Option<&str>) -> Vec<EvolutionEntry> {
    let mut out = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        let entry = entry_for(node, current);
        if entry.id >= 0 && !seen_ids.insert(entry.id) {
            continue;
        }
        out.push(entry);
        stack.extend(node.evolves_to.iter().rev());
    }

    out
}
