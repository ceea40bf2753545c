use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

const DEFAULT_CONFIG_FILE: &str = "vocab_csv";
const ENV_PREFIX: &str = "VOCAB";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub selectors: SelectorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            selectors: SelectorSettings::default(),
        }
    }
}

/// CSS selectors describing where the word list lives in the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    /// Every row of the word list, markers and entries alike.
    pub items: String,
    /// Class on an item that marks it as a section heading row.
    pub marker_class: String,
    pub heading: String,
    /// Element whose `title` attribute holds the source-language words.
    pub source: String,
    pub source_attr: String,
    pub target: String,
    pub word_type: String,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            items: "#words > ul > li".into(),
            marker_class: "single".into(),
            heading: "h3".into(),
            source: "span.wA".into(),
            source_attr: "title".into(),
            target: "span.speak.xs.voice".into(),
            word_type: "small.cCCC.wP".into(),
        }
    }
}

impl Settings {
    /// Defaults, then `vocab_csv.toml` (or `explicit`), then `VOCAB__*` env vars.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with_env(explicit, env_source())
    }

    fn load_with_env(explicit: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match explicit {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        debug!(?settings, "settings loaded");
        Ok(settings)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}

// ── Tests ──
