//! Terminal Pokédex browser over PokeAPI.
//!
//! The core pieces (evolution flattening, search aggregation, paged list
//! state and in-memory filtering) live here so both the interactive UI and
//! the headless commands in `main.rs` share them.

pub mod config;
pub mod error;
pub mod evolution;
pub mod fetch;
pub mod filter;
pub mod generation;
pub mod models;
pub mod pagination;
pub mod remote;
pub mod search;
pub mod ui;
pub mod utils;

pub use error::{DexError, Result};
