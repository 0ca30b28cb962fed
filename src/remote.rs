//! Raw payload shapes returned by PokeAPI (REST v2 and the GraphQL beta).
//!
//! These mirror the upstream JSON and are only ever deserialized; the rest of
//! the crate works with the reshaped records in [`crate::models`].

use serde::{Deserialize, Serialize};

/// `{ name, url }` pair used everywhere upstream to reference another resource.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Response of `/pokemon?limit=&offset=` and `/pokemon-species?limit=`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiNamedList {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub results: Vec<NamedRef>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiPokemon {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<ApiTypeSlot>,
    #[serde(default)]
    pub stats: Vec<ApiStat>,
    pub species: NamedRef,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiTypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedRef,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedRef,
}

/// Response of `/pokemon-species/{id}`; only the fields we read.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiSpecies {
    #[serde(default)]
    pub generation: Option<NamedRef>,
    #[serde(default)]
    pub evolution_chain: Option<NamedRef>,
    #[serde(default)]
    pub capture_rate: u32,
    #[serde(default)]
    pub is_mythical: bool,
    #[serde(default)]
    pub is_legendary: bool,
}

/// Response of `/evolution-chain/{id}`.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiEvolutionChain {
    pub chain: EvolutionNode,
}

/// One node of an evolution tree. Children are listed in upstream order.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EvolutionNode {
    pub species: NamedRef,
    #[serde(default)]
    pub evolves_to: Vec<EvolutionNode>,
}

impl EvolutionNode {
    pub fn new(name: &str, url: &str, evolves_to: Vec<EvolutionNode>) -> Self {
        Self {
            species: NamedRef {
                name: name.to_string(),
                url: url.to_string(),
            },
            evolves_to,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// `data` of the species page query issued by [`crate::fetch::PokeApiClient`].
#[derive(Debug, Deserialize)]
pub struct GqlSpeciesPage {
    pub species: Vec<GqlSpecies>,
    pub total: GqlAggregate,
}

#[derive(Debug, Deserialize)]
pub struct GqlSpecies {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub pokemon_v2_pokemons: Vec<GqlPokemon>,
}

#[derive(Debug, Deserialize)]
pub struct GqlPokemon {
    #[serde(default)]
    pub pokemon_v2_pokemontypes: Vec<GqlTypeSlot>,
}

#[derive(Debug, Deserialize)]
pub struct GqlTypeSlot {
    pub slot: u32,
    pub pokemon_v2_type: GqlTypeName,
}

#[derive(Debug, Deserialize)]
pub struct GqlTypeName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlAggregate {
    pub aggregate: GqlCount,
}

#[derive(Debug, Deserialize)]
pub struct GqlCount {
    pub count: u32,
}
