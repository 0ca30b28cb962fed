use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::generation::range_for;

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://beta.pokeapi.co/graphql/v1beta";

/// Which upstream flavour serves species pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListSource {
    /// `/pokemon?limit=&offset=` plus one detail request per row
    Rest,
    /// single species query with an id-range filter and total count
    Graphql,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "dextui", about = "Terminal Pokédex browser backed by PokeAPI")]
pub struct Config {
    /// Species fetched per page while scrolling
    #[arg(long, env = "DEXTUI_PAGE_SIZE", default_value_t = 60)]
    pub page_size: u32,

    #[arg(long, value_enum, default_value_t = ListSource::Graphql)]
    pub source: ListSource,

    #[arg(long, env = "POKEAPI_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, env = "POKEAPI_GRAPHQL", default_value = DEFAULT_GRAPHQL_ENDPOINT)]
    pub graphql_endpoint: String,

    /// Quiet period before a typed query is applied
    #[arg(long, default_value_t = 300)]
    pub debounce_ms: u64,

    /// Evolution chains resolved at once per search
    #[arg(long, default_value_t = 16)]
    pub search_concurrency: usize,

    /// Log destination for the interactive UI (headless commands log to stderr)
    #[arg(long, default_value = "dextui.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print one page of the species listing as JSON
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Restrict to one generation, e.g. `generation-ii`
        #[arg(long, value_parser = parse_generation)]
        gen: Option<String>,
    },
    /// Print the full record of one Pokémon as JSON
    Detail { id_or_name: String },
    /// Print matching species and their evolution lines as JSON
    Search { query: String },
}

fn parse_generation(s: &str) -> Result<String, String> {
    range_for(s)
        .map(|g| g.label.to_string())
        .ok_or_else(|| format!("unknown generation `{}`", s))
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
