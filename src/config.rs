use crate::domain::Price;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub price_feed_url: String,
    pub swap_relay_url: String,
    /// Seconds between background price ticks.
    pub tick_interval_secs: u64,
    /// USDC spent per capture swap.
    pub capture_usdc_amount: Price,
    pub balance: BalanceConfig,
}

/// Game-balance tunables. The shapes (monotonic peak-based leveling, linear
/// stat scaling, retracement damage) are the contract; these numbers are not.
#[derive(Debug, Clone)]
pub struct BalanceConfig {
    /// Peak-gain ratio required per level above 1.
    pub gain_per_level: Price,
    pub attack_per_level: i64,
    pub defense_per_level: i64,
    pub speed_per_level: i64,
    pub hp_per_level: i64,
    /// Retracement percent is divided by this before scaling max health.
    pub retrace_damage_divisor: i64,
    /// Currency cost per level to revive at a healing center.
    pub revive_cost_per_level: i64,
    /// Bundle discount percent for a full-restore of the whole party.
    pub full_restore_discount_percent: i64,
    /// Percent of max health restored by a defend move's consolidation.
    pub defend_heal_percent: i64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        BalanceConfig {
            gain_per_level: Price::parse("0.1").expect("static decimal"),
            attack_per_level: 5,
            defense_per_level: 5,
            speed_per_level: 2,
            hp_per_level: 10,
            retrace_damage_divisor: 2,
            revive_cost_per_level: 10,
            full_restore_discount_percent: 90,
            defend_heal_percent: 10,
        }
    }
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

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let price_feed_url = env_map
            .get("PRICE_FEED_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("PRICE_FEED_URL".to_string()))?;

        let swap_relay_url = env_map
            .get("SWAP_RELAY_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("SWAP_RELAY_URL".to_string()))?;

        let tick_interval_secs = env_map
            .get("TICK_INTERVAL_SECS")
            .map(|s| s.as_str())
            .unwrap_or("60")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "TICK_INTERVAL_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let capture_usdc_amount = env_map
            .get("CAPTURE_USDC_AMOUNT")
            .map(|s| s.as_str())
            .unwrap_or("10")
            .parse::<Price>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "CAPTURE_USDC_AMOUNT".to_string(),
                    "must be a decimal amount".to_string(),
                )
            })?;

        let mut balance = BalanceConfig::default();
        if let Some(raw) = env_map.get("GAIN_PER_LEVEL") {
            let parsed = raw.parse::<Price>().map_err(|_| {
                ConfigError::InvalidValue(
                    "GAIN_PER_LEVEL".to_string(),
                    "must be a decimal ratio".to_string(),
                )
            })?;
            if !parsed.is_positive() {
                return Err(ConfigError::InvalidValue(
                    "GAIN_PER_LEVEL".to_string(),
                    "must be > 0".to_string(),
                ));
            }
            balance.gain_per_level = parsed;
        }

        Ok(Config {
            port,
            database_path,
            price_feed_url,
            swap_relay_url,
            tick_interval_secs,
            capture_usdc_amount,
            balance,
        })
    }
}
