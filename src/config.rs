use dotenv::dotenv;
use std::env;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

pub const DATA_DIR_ENV_VAR: &str = "KITCHEN_GENIE_DATA_DIR";
pub const SEED_ENV_VAR: &str = "KITCHEN_GENIE_SEED";
pub const SIMULATE_LATENCY_ENV_VAR: &str = "KITCHEN_GENIE_SIMULATE_LATENCY";

pub const DEFAULT_DATA_DIR: &str = ".kitchen_genie";

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { var, value } => {
                write!(f, "Invalid value for {}: '{}'", var, value)
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Fixed seed for reproducible recipes; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub simulate_latency: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            seed: None,
            simulate_latency: true,
        }
    }
}

impl Config {
    /// Reads the process environment after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(dir) = lookup(DATA_DIR_ENV_VAR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }

        if let Some(raw) = lookup(SEED_ENV_VAR) {
            let seed = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: SEED_ENV_VAR,
                value: raw.clone(),
            })?;
            config.seed = Some(seed);
        }

        if let Some(raw) = lookup(SIMULATE_LATENCY_ENV_VAR) {
            config.simulate_latency = parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                var: SIMULATE_LATENCY_ENV_VAR,
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.simulate_latency);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = Config::from_lookup(lookup_from(&[
            (DATA_DIR_ENV_VAR, "/tmp/genie"),
            (SEED_ENV_VAR, " 42 "),
            (SIMULATE_LATENCY_ENV_VAR, "off"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/genie"));
        assert_eq!(config.seed, Some(42));
        assert!(!config.simulate_latency);
    }

    #[test]
    fn test_invalid_seed_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[(SEED_ENV_VAR, "abc")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for KITCHEN_GENIE_SEED: 'abc'");
    }

    #[test]
    fn test_blank_data_dir_keeps_default() {
        let config = Config::from_lookup(lookup_from(&[(DATA_DIR_ENV_VAR, "  ")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }
}
