//! Platform configuration with TOML file support.

use serde::{Deserialize, Serialize};

use dfund_factory::CampaignParams;
use dfund_token::{TokenConfig, TOKEN_UNIT};
use dfund_types::SECONDS_PER_DAY;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a DecentraFund platform instance.
///
/// Can be loaded from a TOML file via [`PlatformConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Supply figures are in whole
/// tokens; TOML integers cannot hold raw 18-decimal amounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Incentive token display name.
    #[serde(default = "default_token_name")]
    pub token_name: String,

    /// Incentive token ticker.
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    /// Hard supply cap, in whole tokens.
    #[serde(default = "default_max_supply_tokens")]
    pub max_supply_tokens: u64,

    /// Raw token units minted per wei contributed.
    #[serde(default = "default_mint_rate")]
    pub mint_rate: u64,

    /// Share of the cap minted to the operator at start-up, in basis points.
    #[serde(default = "default_owner_share_bps")]
    pub owner_share_bps: u32,

    /// Milestone voting window for newly created campaigns.
    #[serde(default = "default_voting_period_secs")]
    pub voting_period_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_token_name() -> String {
    "DecentraFund Token".to_string()
}

fn default_token_symbol() -> String {
    "DFUND".to_string()
}

fn default_max_supply_tokens() -> u64 {
    100_000_000
}

fn default_mint_rate() -> u64 {
    dfund_token::MINT_RATE as u64
}

fn default_owner_share_bps() -> u32 {
    dfund_token::OWNER_SHARE_BPS
}

fn default_voting_period_secs() -> u64 {
    3 * SECONDS_PER_DAY
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PlatformConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn token_config(&self) -> Result<TokenConfig, NodeError> {
        let max_supply = u128::from(self.max_supply_tokens)
            .checked_mul(TOKEN_UNIT)
            .ok_or_else(|| NodeError::Config("max_supply_tokens overflows".into()))?;
        Ok(TokenConfig {
            name: self.token_name.clone(),
            symbol: self.token_symbol.clone(),
            max_supply,
            mint_rate: u128::from(self.mint_rate),
            owner_share_bps: self.owner_share_bps,
        })
    }

    pub fn campaign_params(&self) -> CampaignParams {
        CampaignParams {
            voting_period_secs: self.voting_period_secs,
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            token_name: default_token_name(),
            token_symbol: default_token_symbol(),
            max_supply_tokens: default_max_supply_tokens(),
            mint_rate: default_mint_rate(),
            owner_share_bps: default_owner_share_bps(),
            voting_period_secs: default_voting_period_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = PlatformConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = PlatformConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = PlatformConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.token_symbol, "DFUND");
        assert_eq!(config.voting_period_secs, 259_200);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn defaults_match_token_constants() {
        let token = PlatformConfig::default().token_config().unwrap();
        assert_eq!(token, TokenConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            voting_period_secs = 60
            log_format = "json"
            max_supply_tokens = 5
        "#;
        let config = PlatformConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.campaign_params().voting_period_secs, 60);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.token_config().unwrap().max_supply, 5 * TOKEN_UNIT);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn unknown_log_format_rejected() {
        let result = PlatformConfig::from_toml_str(r#"log_format = "xml""#);
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token_symbol = \"TEST\"").unwrap();
        let config = PlatformConfig::from_toml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.token_symbol, "TEST");
    }

    #[test]
    fn missing_file_returns_io_error() {
        let result = PlatformConfig::from_toml_file("/nonexistent/dfund.toml");
        assert!(matches!(result, Err(NodeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
