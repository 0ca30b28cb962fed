//! In-memory stand-in for PokeAPI shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use dextui::fetch::PokeApi;
use dextui::generation::GenerationRange;
use dextui::models::{official_artwork, SpeciesBasic, SpeciesPage, TypeSlot};
use dextui::remote::{ApiEvolutionChain, ApiPokemon, ApiSpecies, EvolutionNode, NamedRef};
use dextui::{DexError, Result};

pub const BASE: &str = "https://pokeapi.test/api/v2";

pub fn species_url(id: u32) -> String {
    format!("{}/pokemon-species/{}/", BASE, id)
}

pub fn chain_url(id: u32) -> String {
    format!("{}/evolution-chain/{}/", BASE, id)
}

pub fn node(id: u32, name: &str, children: Vec<EvolutionNode>) -> EvolutionNode {
    EvolutionNode::new(name, &species_url(id), children)
}

#[derive(Default)]
pub struct FakeApi {
    index: Vec<NamedRef>,
    pokemon: HashMap<String, ApiPokemon>,
    species: HashMap<String, ApiSpecies>,
    chains: HashMap<String, ApiEvolutionChain>,
    records: Vec<SpeciesBasic>,
    failing: HashSet<String>,
    index_fails: bool,
    pub calls: AtomicUsize,
    pub last_range: Mutex<Option<&'static str>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a species, its default pokemon and the chain it belongs to.
    pub fn species(mut self, id: u32, name: &str, types: &[&str], chain: u32) -> Self {
        self.index.push(NamedRef {
            name: name.to_string(),
            url: species_url(id),
        });
        let types_json: Vec<_> = types
            .iter()
            .enumerate()
            .map(|(i, t)| json!({ "slot": i + 1, "type": { "name": t, "url": "" } }))
            .collect();
        let pokemon: ApiPokemon = serde_json::from_value(json!({
            "id": id,
            "name": name,
            "types": types_json,
            "stats": [
                { "base_stat": 45, "effort": 0, "stat": { "name": "hp", "url": "" } },
                { "base_stat": 49, "effort": 0, "stat": { "name": "attack", "url": "" } }
            ],
            "species": { "name": name, "url": species_url(id) }
        }))
        .unwrap();
        self.pokemon.insert(name.to_string(), pokemon.clone());
        self.pokemon.insert(id.to_string(), pokemon);

        let species: ApiSpecies = serde_json::from_value(json!({
            "generation": { "name": dextui::generation::generation_from_id(id), "url": "" },
            "evolution_chain": { "url": chain_url(chain) },
            "capture_rate": 45,
            "is_mythical": id == 151,
            "is_legendary": false
        }))
        .unwrap();
        self.species.insert(species_url(id), species);

        self.records.push(SpeciesBasic {
            id,
            name: name.to_string(),
            sprite_url: official_artwork(id),
            types: types
                .iter()
                .enumerate()
                .map(|(i, t)| TypeSlot {
                    slot: i as u32 + 1,
                    type_name: t.to_string(),
                })
                .collect(),
        });
        self
    }

    pub fn chain(mut self, id: u32, root: EvolutionNode) -> Self {
        self.chains.insert(chain_url(id), ApiEvolutionChain { chain: root });
        self
    }

    /// Replaces a species payload, e.g. to drop its chain reference.
    pub fn species_payload(mut self, id: u32, payload: serde_json::Value) -> Self {
        self.species
            .insert(species_url(id), serde_json::from_value(payload).unwrap());
        self
    }

    pub fn fail_url(mut self, url: String) -> Self {
        self.failing.insert(url);
        self
    }

    pub fn fail_index(mut self) -> Self {
        self.index_fails = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self, url: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(url) {
            return Err(DexError::MalformedResponse(format!("injected failure for {}", url)));
        }
        Ok(())
    }
}

/// Standard fixture: three gen-I lines, an eeveelution branch, mew and a
/// species with no evolution chain.
pub fn kanto() -> FakeApi {
    FakeApi::new()
        .species(1, "bulbasaur", &["grass", "poison"], 1)
        .species(2, "ivysaur", &["grass", "poison"], 1)
        .species(3, "venusaur", &["grass", "poison"], 1)
        .species(4, "charmander", &["fire"], 2)
        .species(5, "charmeleon", &["fire"], 2)
        .species(6, "charizard", &["fire", "flying"], 2)
        .species(25, "pikachu", &["electric"], 10)
        .species(26, "raichu", &["electric"], 10)
        .species(133, "eevee", &["normal"], 67)
        .species(134, "vaporeon", &["water"], 67)
        .species(135, "jolteon", &["electric"], 67)
        .species(136, "flareon", &["fire"], 67)
        .species(151, "mew", &["psychic"], 78)
        .species(172, "pichu", &["electric"], 10)
        .species(999, "missingno", &["normal"], 0)
        .species_payload(999, json!({ "capture_rate": 3 }))
        .chain(1, node(1, "bulbasaur", vec![node(2, "ivysaur", vec![node(3, "venusaur", vec![])])]))
        .chain(2, node(4, "charmander", vec![node(5, "charmeleon", vec![node(6, "charizard", vec![])])]))
        .chain(10, node(172, "pichu", vec![node(25, "pikachu", vec![node(26, "raichu", vec![])])]))
        .chain(
            67,
            node(
                133,
                "eevee",
                vec![
                    node(134, "vaporeon", vec![]),
                    node(135, "jolteon", vec![]),
                    node(136, "flareon", vec![]),
                ],
            ),
        )
        .chain(78, node(151, "mew", vec![]))
}

#[async_trait]
impl PokeApi for FakeApi {
    async fn species_index(&self) -> Result<Vec<NamedRef>> {
        self.hit("index")?;
        if self.index_fails {
            return Err(DexError::MalformedResponse("index unavailable".into()));
        }
        Ok(self.index.clone())
    }

    async fn species_info(&self, url: &str) -> Result<ApiSpecies> {
        self.hit(url)?;
        self.species
            .get(url)
            .cloned()
            .ok_or_else(|| DexError::MalformedResponse(format!("no species at {}", url)))
    }

    async fn evolution_chain(&self, url: &str) -> Result<ApiEvolutionChain> {
        self.hit(url)?;
        self.chains
            .get(url)
            .cloned()
            .ok_or_else(|| DexError::MalformedResponse(format!("no chain at {}", url)))
    }

    async fn pokemon(&self, id_or_name: &str) -> Result<ApiPokemon> {
        self.hit(id_or_name)?;
        self.pokemon
            .get(id_or_name)
            .cloned()
            .ok_or_else(|| DexError::MalformedResponse(format!("no pokemon `{}`", id_or_name)))
    }

    async fn species_page(
        &self,
        limit: u32,
        offset: u32,
        range: Option<&'static GenerationRange>,
    ) -> Result<SpeciesPage> {
        self.hit("page")?;
        *self.last_range.lock().unwrap() = range.map(|r| r.label);
        let mut matching: Vec<SpeciesBasic> = self
            .records
            .iter()
            .filter(|p| range.map_or(true, |r| r.contains(p.id)))
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.id);
        let total = matching.len() as u32;
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok(SpeciesPage::new(items, offset, total))
    }
}
