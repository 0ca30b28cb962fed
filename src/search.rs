//! Name search that expands every match to its whole evolution line.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{DexError, Result};
use crate::evolution::flatten;
use crate::fetch::PokeApi;
use crate::models::EvolutionEntry;
use crate::remote::NamedRef;

/// Species whose name contains `query`, ignoring case, in index order.
pub fn matching<'a>(query: &str, index: &'a [NamedRef]) -> Vec<&'a NamedRef> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }
    index
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&q))
        .collect()
}

async fn resolve_chain<A: PokeApi + ?Sized>(api: &A, species: &NamedRef) -> Result<Vec<EvolutionEntry>> {
    let info = api.species_info(&species.url).await?;
    let chain_ref = info.evolution_chain.ok_or_else(|| {
        DexError::MalformedResponse(format!("species `{}` has no evolution chain", species.name))
    })?;
    let chain = api.evolution_chain(&chain_ref.url).await?;
    Ok(flatten(&chain.chain, None))
}

/// Resolves the evolution line of every match in `index`, at most
/// `concurrency` at a time, and merges them by name, sorted by id.
///
/// A match whose line cannot be resolved is left out; the others still count.
pub async fn search_in<A: PokeApi + ?Sized>(
    api: &A,
    query: &str,
    index: &[NamedRef],
    concurrency: usize,
) -> Vec<EvolutionEntry> {
    let matches = matching(query, index);
    if matches.is_empty() {
        return Vec::new();
    }
    debug!(query, matches = matches.len(), "resolving evolution lines");

    let mut by_name: HashMap<String, EvolutionEntry> = HashMap::new();
    let pending: Vec<_> = matches
        .into_iter()
        .map(|species| async move { (species, resolve_chain(api, species).await) })
        .collect();
    let mut resolved = stream::iter(pending).buffer_unordered(concurrency.max(1));

    while let Some((species, res)) = resolved.next().await {
        match res {
            Ok(entries) => {
                for entry in entries {
                    by_name.insert(entry.name.clone(), entry);
                }
            }
            Err(err) => warn!(species = %species.name, "excluded from search: {err}"),
        }
    }

    let mut out: Vec<_> = by_name.into_values().collect();
    out.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));
    out
}

/// `search`: a blank query returns immediately without touching upstream.
pub async fn search<A: PokeApi + ?Sized>(
    api: &A,
    query: &str,
    concurrency: usize,
) -> Result<Vec<EvolutionEntry>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    let index = api.species_index().await?;
    let out = search_in(api, query, &index, concurrency).await;
    info!(query, results = out.len(), "search finished");
    Ok(out)
}

/// Monotonic tokens tagging outstanding requests of one kind; only a
/// response carrying the latest token is applied.
#[derive(Debug, Default, Clone)]
pub struct RequestTokens {
    latest: u64,
}

impl RequestTokens {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_latest(&self, token: u64) -> bool {
        token == self.latest
    }
}

/// Holds back typed input until it has been stable for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    applied: String,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            applied: String::new(),
        }
    }

    pub fn applied(&self) -> &str {
        &self.applied
    }

    pub fn input(&mut self, value: &str, now: Instant) {
        self.pending = Some((value.to_string(), now + self.delay));
    }

    /// The new value once its quiet period is over, if it differs from the
    /// one applied last.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {}
            _ => return None,
        }
        let (value, _) = self.pending.take()?;
        self.apply(value)
    }

    /// Applies whatever is pending right away.
    pub fn flush(&mut self) -> Option<String> {
        let (value, _) = self.pending.take()?;
        self.apply(value)
    }

    fn apply(&mut self, value: String) -> Option<String> {
        if value == self.applied {
            return None;
        }
        self.applied = value.clone();
        Some(value)
    }
}
