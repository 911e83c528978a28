// Configuration loading

pub mod settings;

pub use settings::{
    ConfigError, LogSettings, ReconSettings, ReferenceSettings, Settings, WikidataSettings,
    DEFAULT_REFERENCE_URL, DEFAULT_SPARQL_ENDPOINT,
};
