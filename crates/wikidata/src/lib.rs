//! Wikidata client: the production [`IdentityLookup`](readactor_recon::IdentityLookup).
//!
//! Blocking reqwest client (no Tokio runtime required). Two queries:
//! facts about a known QID, and humans whose label matches a name.
//!
//! Retries with backoff live here. The reconciler never retries.

pub mod client;
pub mod sparql;

pub use client::{ClientOptions, WikidataClient, MAX_RETRIES, USER_AGENT};
