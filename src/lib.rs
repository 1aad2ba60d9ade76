//! ReDic - a reverse dictionary
//!
//! Loads a WordNet-style lexical corpus into SQLite, looks up the
//! definitions of a word, and finds words from a free-text description
//! through a full-text index.

pub mod cli;
pub mod config;
pub mod core;
pub mod database;
pub mod lexicon;
pub mod server;


pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
