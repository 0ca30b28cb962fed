use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::{Config, ListSource};
use crate::error::{DexError, Result};
use crate::evolution::flatten;
use crate::generation::{range_for, GenerationRange, UNKNOWN_GENERATION};
use crate::models::{SpeciesBasic, SpeciesFull, SpeciesPage, StatEntry};
use crate::remote::{
    ApiEvolutionChain, ApiNamedList, ApiPokemon, ApiSpecies, GqlSpeciesPage, GraphQlResponse,
    NamedRef,
};

const USER_AGENT: &str = concat!("dextui/", env!("CARGO_PKG_VERSION"));
const DETAIL_CONCURRENCY: usize = 20;

/// Read-only view of PokeAPI used by the list, detail and search operations.
#[async_trait]
pub trait PokeApi: Send + Sync {
    /// Every species as `{ name, url }`, in national-dex order.
    async fn species_index(&self) -> Result<Vec<NamedRef>>;

    async fn species_info(&self, url: &str) -> Result<ApiSpecies>;

    async fn evolution_chain(&self, url: &str) -> Result<ApiEvolutionChain>;

    async fn pokemon(&self, id_or_name: &str) -> Result<ApiPokemon>;

    /// One page of basic records ordered by id, optionally restricted to an
    /// id range.
    async fn species_page(
        &self,
        limit: u32,
        offset: u32,
        range: Option<&'static GenerationRange>,
    ) -> Result<SpeciesPage>;
}

/// `listPage`: one page of species, optionally limited to a generation label.
pub async fn list_page<A: PokeApi + ?Sized>(
    api: &A,
    limit: u32,
    offset: u32,
    gen_filter: Option<&str>,
) -> Result<SpeciesPage> {
    let range = match gen_filter.filter(|g| !g.is_empty()) {
        Some(label) => {
            let range = range_for(label);
            if range.is_none() {
                warn!(generation = label, "unknown generation filter ignored");
            }
            range
        }
        None => None,
    };
    let page = api.species_page(limit, offset, range).await?;
    debug!(
        offset,
        received = page.items.len(),
        total = page.total,
        "species page loaded"
    );
    Ok(page)
}

/// `getDetail`: pokemon, species and evolution chain composed into one record.
pub async fn get_detail<A: PokeApi + ?Sized>(api: &A, id_or_name: &str) -> Result<SpeciesFull> {
    let pokemon = api.pokemon(id_or_name.trim().to_lowercase().as_str()).await?;
    let species = api.species_info(&pokemon.species.url).await?;
    let chain_ref = species.evolution_chain.as_ref().ok_or_else(|| {
        DexError::MalformedResponse(format!("species of `{}` has no evolution chain", pokemon.name))
    })?;
    let chain = api.evolution_chain(&chain_ref.url).await?;

    let full = SpeciesFull {
        basic: SpeciesBasic::from(&pokemon),
        generation_label: species
            .generation
            .as_ref()
            .map(|g| g.name.clone())
            .unwrap_or_else(|| UNKNOWN_GENERATION.to_string()),
        stats: pokemon.stats.iter().map(StatEntry::from).collect(),
        evolutions: flatten(&chain.chain, Some(&pokemon.name)),
        capture_rate: species.capture_rate,
        is_mythical: species.is_mythical,
        is_legendary: species.is_legendary,
    };
    info!(id = full.basic.id, name = %full.basic.name, "detail loaded");
    Ok(full)
}

/// reqwest-backed [`PokeApi`].
pub struct PokeApiClient {
    http: reqwest::Client,
    api_base: String,
    graphql_endpoint: String,
    source: ListSource,
}

impl PokeApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(DexError::Transport)?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            graphql_endpoint: config.graphql_endpoint.clone(),
            source: config.source,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let res = self.http.get(url).send().await?.error_for_status()?;
        decode_body(&res.bytes().await?)
    }

    async fn post_graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        debug!(endpoint = %self.graphql_endpoint, "POST graphql");
        let res = self
            .http
            .post(&self.graphql_endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?;
        graphql_data(decode_body(&res.bytes().await?)?)
    }

    /// Raw sprite bytes, kept in memory by the caller.
    pub async fn sprite_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "GET sprite");
        let res = self.http.get(url).send().await?.error_for_status()?;
        Ok(res.bytes().await?.to_vec())
    }

    async fn graphql_page(
        &self,
        limit: u32,
        offset: u32,
        range: Option<&'static GenerationRange>,
    ) -> Result<SpeciesPage> {
        let data: GqlSpeciesPage = self
            .post_graphql(&species_page_query(range), json!({ "limit": limit, "offset": offset }))
            .await?;
        let total = data.total.aggregate.count;
        let items = data.species.into_iter().map(SpeciesBasic::from).collect();
        Ok(SpeciesPage::new(items, offset, total))
    }

    async fn rest_page(
        &self,
        limit: u32,
        offset: u32,
        range: Option<&'static GenerationRange>,
    ) -> Result<SpeciesPage> {
        let Some((start, limit)) = rest_window(limit, offset, range) else {
            let total = range.map(|r| r.len()).unwrap_or(0);
            return Ok(SpeciesPage::new(Vec::new(), offset, total));
        };

        let list: ApiNamedList = self
            .get_json(&format!("{}/pokemon?limit={}&offset={}", self.api_base, limit, start))
            .await?;
        let total = range.map(|r| r.len()).unwrap_or(list.count);

        let mut items: Vec<SpeciesBasic> = stream::iter(list.results)
            .map(|entry| async move {
                let url = if entry.url.is_empty() {
                    format!("{}/pokemon/{}", self.api_base, entry.name)
                } else {
                    entry.url
                };
                self.get_json::<ApiPokemon>(&url).await
            })
            .buffered(DETAIL_CONCURRENCY)
            .map_ok(|p| SpeciesBasic::from(&p))
            .try_collect::<Vec<_>>()
            .await?;
        items.sort_by_key(|p| p.id);

        Ok(SpeciesPage::new(items, offset, total))
    }
}

#[async_trait]
impl PokeApi for PokeApiClient {
    async fn species_index(&self) -> Result<Vec<NamedRef>> {
        let list: ApiNamedList = self
            .get_json(&format!("{}/pokemon-species?limit=2000", self.api_base))
            .await?;
        Ok(list.results)
    }

    async fn species_info(&self, url: &str) -> Result<ApiSpecies> {
        self.get_json(url).await
    }

    async fn evolution_chain(&self, url: &str) -> Result<ApiEvolutionChain> {
        self.get_json(url).await
    }

    async fn pokemon(&self, id_or_name: &str) -> Result<ApiPokemon> {
        self.get_json(&format!("{}/pokemon/{}", self.api_base, id_or_name))
            .await
    }

    async fn species_page(
        &self,
        limit: u32,
        offset: u32,
        range: Option<&'static GenerationRange>,
    ) -> Result<SpeciesPage> {
        match self.source {
            ListSource::Graphql => self.graphql_page(limit, offset, range).await,
            ListSource::Rest => self.rest_page(limit, offset, range).await,
        }
    }
}

/// Body bytes as JSON; a shape mismatch is a [`DexError::MalformedResponse`].
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// `data` of a GraphQL response, or its `errors` joined into one message.
fn graphql_data<T>(body: GraphQlResponse<T>) -> Result<T> {
    if !body.errors.is_empty() {
        let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
        return Err(DexError::MalformedResponse(format!("GraphQL: {}", messages.join(" | "))));
    }
    body.data
        .ok_or_else(|| DexError::MalformedResponse("GraphQL: response without data".into()))
}

/// `(offset, limit)` into the national-dex listing for one page of `range`.
///
/// Listing position `n` holds id `n + 1`, so a generation is the window
/// `[min - 1, max)`. `None` once `offset` runs past the end of the range.
fn rest_window(
    limit: u32,
    offset: u32,
    range: Option<&GenerationRange>,
) -> Option<(u32, u32)> {
    let Some(r) = range else {
        return Some((offset, limit));
    };
    let start = offset.checked_add(r.min - 1)?;
    if start >= r.max {
        return None;
    }
    Some((start, limit.min(r.max - start)))
}

/// Species page query; `range` adds the same id filter to the rows and to the
/// aggregate count.
pub fn species_page_query(range: Option<&GenerationRange>) -> String {
    let where_obj =
        range.map(|r| format!("where: {{ id: {{ _gte: {}, _lte: {} }} }}", r.min, r.max));
    let where_arg = where_obj.as_ref().map(|w| format!(", {}", w)).unwrap_or_default();
    let where_agg = where_obj.as_ref().map(|w| format!("({})", w)).unwrap_or_default();

    format!(
        r#"query P($limit:Int!, $offset:Int!){{
  species: pokemon_v2_pokemonspecies(limit:$limit, offset:$offset, order_by:{{id: asc}}{where_arg}){{
    id
    name
    pokemon_v2_pokemons(where:{{is_default:{{_eq:true}}}}){{
      pokemon_v2_pokemontypes(order_by:{{slot: asc}}){{ slot pokemon_v2_type{{ name }} }}
    }}
  }}
  total: pokemon_v2_pokemonspecies_aggregate{where_agg}{{ aggregate{{ count }} }}
}}"#
    )
}
