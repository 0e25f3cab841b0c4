pub mod about;
pub mod config;
pub mod delegation;
pub mod error;
pub mod fasta_index;
pub mod fetcher;
pub mod jobs;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod service;

pub use scaffold_protocol as protocol;
