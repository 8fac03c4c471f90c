// Library root
// -----------
// This crate exposes the client and renderer used by the `predictasearch`
// binary.
//
// Module responsibilities:
// - `config`: resolves the API key, base URL and timeout from the environment.
// - `api`: builds and sends requests to the Predicta Search service.
// - `tree`: renders search results and network catalogs as a text tree.
// - `ui`: command-line arguments and subcommand handlers.
// - `error`: the error type shared by `config` and `api`.
pub mod api;
pub mod config;
pub mod error;
pub mod tree;
pub mod ui;

pub use api::{NetworkCatalog, PredictaClient, SearchQuery, SearchRecord};
pub use config::Config;
pub use error::{Error, Result};
