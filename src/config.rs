use crate::domain::{default_min_harvest, parse_units, Address, TokenAmount, REWARD_DECIMALS};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub aggregator_api_url: String,
    pub aggregator_max_retry: Duration,
    pub wallet_address: Address,
    pub wallet_network: String,
    pub wallet_read_only: bool,
    /// Smallest-unit harvest threshold used when the user gives none.
    pub default_min_harvest: TokenAmount,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let aggregator_api_url = env_map
            .get("AGGREGATOR_API_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("AGGREGATOR_API_URL".to_string()))?;

        let aggregator_max_retry = env_map
            .get("AGGREGATOR_MAX_RETRY_MS")
            .map(|s| s.as_str())
            .unwrap_or("30000")
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "AGGREGATOR_MAX_RETRY_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let wallet_address = env_map
            .get("WALLET_ADDRESS")
            .ok_or_else(|| ConfigError::MissingEnv("WALLET_ADDRESS".to_string()))?
            .parse::<Address>()
            .map_err(|e| ConfigError::InvalidValue("WALLET_ADDRESS".to_string(), e.to_string()))?;

        let wallet_network = env_map
            .get("WALLET_NETWORK")
            .cloned()
            .unwrap_or_else(|| "mainnet".to_string());

        let wallet_read_only = match env_map
            .get("WALLET_READ_ONLY")
            .map(|s| s.as_str())
            .unwrap_or("false")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "WALLET_READ_ONLY".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let default_min_harvest = match env_map.get("DEFAULT_MIN_HARVEST") {
            Some(s) => parse_units(s.trim(), REWARD_DECIMALS).map_err(|e| {
                ConfigError::InvalidValue("DEFAULT_MIN_HARVEST".to_string(), e.to_string())
            })?,
            None => default_min_harvest(),
        };

        Ok(Config {
            port,
            aggregator_api_url,
            aggregator_max_retry,
            wallet_address,
            wallet_network,
            wallet_read_only,
            default_min_harvest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "AGGREGATOR_API_URL".to_string(),
            "http://localhost:9000".to_string(),
        );
        map.insert(
            "WALLET_ADDRESS".to_string(),
            "0x00000000000000000000000000000000000000a1".to_string(),
        );
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.aggregator_max_retry, Duration::from_secs(30));
        assert_eq!(config.wallet_network, "mainnet");
        assert!(!config.wallet_read_only);
        assert_eq!(config.default_min_harvest, default_min_harvest());
    }

    #[test]
    fn test_missing_aggregator_api_url() {
        let mut env_map = setup_required_env();
        env_map.remove("AGGREGATOR_API_URL");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "AGGREGATOR_API_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_wallet_address() {
        let mut env_map = setup_required_env();
        env_map.remove("WALLET_ADDRESS");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "WALLET_ADDRESS"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_wallet_address() {
        let mut env_map = setup_required_env();
        env_map.insert("WALLET_ADDRESS".to_string(), "0x123".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "WALLET_ADDRESS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_read_only_flag() {
        let mut env_map = setup_required_env();
        env_map.insert("WALLET_READ_ONLY".to_string(), "maybe".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "WALLET_READ_ONLY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_default_min_harvest_override() {
        let mut env_map = setup_required_env();
        env_map.insert("DEFAULT_MIN_HARVEST".to_string(), "0.5".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(
            config.default_min_harvest,
            "500000000000000000".parse::<TokenAmount>().unwrap()
        );
    }

    #[test]
    fn test_invalid_default_min_harvest() {
        let mut env_map = setup_required_env();
        env_map.insert("DEFAULT_MIN_HARVEST".to_string(), "lots".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "DEFAULT_MIN_HARVEST"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
