use std::{env, path::PathBuf, str::FromStr};

use anyhow::{Context as _, bail};

const DEFAULT_TRIGGERS_PATH: &str = "triggers.json";

/// What to do when the trigger file exists but cannot be read at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorruptPolicy {
    /// Refuse to start; the file is left untouched for manual repair.
    #[default]
    Abort,
    /// Move the file to `<file>.corrupt` and start with no triggers.
    Reset,
}

impl FromStr for CorruptPolicy {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "reset" => Ok(Self::Reset),
            other => bail!("unknown trigger corrupt policy `{other}` (expected abort or reset)"),
        }
    }
}

/// Runtime settings read from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,
    pub triggers_path: PathBuf,
    pub corrupt_policy: CorruptPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|value| !value.trim().is_empty())
            .context("DISCORD_TOKEN is not set")?;

        let triggers_path = lookup("TRIGGERS_PATH")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TRIGGERS_PATH.to_owned())
            .into();

        let corrupt_policy = match lookup("TRIGGERS_CORRUPT_POLICY") {
            Some(raw) => raw.parse()?,
            None => CorruptPolicy::default(),
        };

        Ok(Self {
            discord_token,
            triggers_path,
            corrupt_policy,
        })
    }
}
