use serde::{Deserialize, Serialize};

use crate::remote::{ApiPokemon, ApiStat, ApiTypeSlot, GqlSpecies};

const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

/// Official-artwork sprite URL for a national-dex id.
pub fn official_artwork(id: u32) -> String {
    format!("{}/{}.png", ARTWORK_BASE, id)
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u32,
    #[serde(default)]
    pub type_name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct StatEntry {
    #[serde(default)]
    pub stat_name: String,
    #[serde(default)]
    pub base_value: u32,
}

/// Minimal record needed to render a list row.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SpeciesBasic {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sprite_url: String,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
}

impl SpeciesBasic {
    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t.type_name == type_name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SpeciesFull {
    #[serde(flatten)]
    pub basic: SpeciesBasic,
    #[serde(default)]
    pub generation_label: String,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
    #[serde(default)]
    pub evolutions: Vec<EvolutionEntry>,
    #[serde(default)]
    pub capture_rate: u32,
    #[serde(default)]
    pub is_mythical: bool,
    #[serde(default)]
    pub is_legendary: bool,
}

/// One species of an evolution chain. `id` is `-1` when the upstream
/// reference could not be parsed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EvolutionEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sprite_url: String,
    #[serde(default)]
    pub is_current: bool,
}

/// One page of the species listing as returned to callers of `list_page`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SpeciesPage {
    pub items: Vec<SpeciesBasic>,
    pub total: u32,
    pub offset: u32,
    pub next_offset: u32,
    pub has_more: bool,
}

impl SpeciesPage {
    pub fn new(items: Vec<SpeciesBasic>, offset: u32, total: u32) -> Self {
        let next_offset = offset.saturating_add(items.len() as u32);
        Self {
            has_more: next_offset < total,
            items,
            total,
            offset,
            next_offset,
        }
    }
}

impl From<&ApiTypeSlot> for TypeSlot {
    fn from(value: &ApiTypeSlot) -> Self {
        Self {
            slot: value.slot,
            type_name: value.kind.name.clone(),
        }
    }
}

impl From<&ApiStat> for StatEntry {
    fn from(value: &ApiStat) -> Self {
        Self {
            stat_name: value.stat.name.clone(),
            base_value: value.base_stat,
        }
    }
}

impl From<&ApiPokemon> for SpeciesBasic {
    fn from(value: &ApiPokemon) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            sprite_url: official_artwork(value.id),
            types: value.types.iter().map(TypeSlot::from).collect(),
        }
    }
}

impl From<GqlSpecies> for SpeciesBasic {
    fn from(value: GqlSpecies) -> Self {
        // Types come from the species' default form; the query filters on
        // `is_default` so there is at most one.
        let types = value
            .pokemon_v2_pokemons
            .into_iter()
            .next()
            .map(|p| {
                p.pokemon_v2_pokemontypes
                    .into_iter()
                    .map(|t| TypeSlot {
                        slot: t.slot,
                        type_name: t.pokemon_v2_type.name,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            id: value.id,
            sprite_url: official_artwork(value.id),
            name: value.name,
            types,
        }
    }
}
