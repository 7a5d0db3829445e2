//! Duel configuration models.

use serde::{Deserialize, Serialize};

use crate::game::{
    MatchSettings, Units,
    constants::{
        DEFAULT_BANKRUPTCY_THRESHOLD, DEFAULT_DISPARITY_MULTIPLIER, DEFAULT_DOUBLE_TIMEOUT_LIMIT,
        DEFAULT_MIN_WAGER, DEFAULT_RECONNECT_GRACE_SECS, DEFAULT_STARTING_BALANCE,
    },
};

/// Round clock presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundSpeed {
    Normal,
    Turbo,
    Hyper,
}

impl std::fmt::Display for RoundSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundSpeed::Normal => write!(f, "normal"),
            RoundSpeed::Turbo => write!(f, "turbo"),
            RoundSpeed::Hyper => write!(f, "hyper"),
        }
    }
}

impl std::str::FromStr for RoundSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(RoundSpeed::Normal),
            "turbo" => Ok(RoundSpeed::Turbo),
            "hyper" => Ok(RoundSpeed::Hyper),
            other => Err(format!("Unknown round speed '{other}'")),
        }
    }
}

/// Duel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelConfig {
    /// Duel name, used in logs
    pub name: String,

    /// Round clock preset
    pub speed: RoundSpeed,

    /// Balance each seat starts with (default: 200)
    pub starting_balance: Units,

    /// Smallest accepted wager (default: 10)
    pub min_wager: Units,

    /// A balance below this ends the match (default: 20)
    pub bankruptcy_threshold: Units,

    /// Wager ratio above which the lower wager wins (default: 4)
    pub disparity_multiplier: u32,

    /// Consecutive double timeouts that end the match (default: 3)
    pub double_timeout_limit: u32,

    /// Seconds a dropped seat is held for reconnection, 0 disables (default: 0)
    pub reconnect_grace_secs: u32,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            name: "Default Duel".to_string(),
            speed: RoundSpeed::Normal,
            starting_balance: DEFAULT_STARTING_BALANCE,
            min_wager: DEFAULT_MIN_WAGER,
            bankruptcy_threshold: DEFAULT_BANKRUPTCY_THRESHOLD,
            disparity_multiplier: DEFAULT_DISPARITY_MULTIPLIER,
            double_timeout_limit: DEFAULT_DOUBLE_TIMEOUT_LIMIT,
            reconnect_grace_secs: DEFAULT_RECONNECT_GRACE_SECS,
        }
    }
}

impl DuelConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_wager == 0 {
            return Err("Minimum wager must be at least 1".to_string());
        }

        if self.starting_balance < self.min_wager {
            return Err("Starting balance must cover the minimum wager".to_string());
        }

        if self.bankruptcy_threshold > self.starting_balance {
            return Err("Bankruptcy threshold must not exceed the starting balance".to_string());
        }

        if self.disparity_multiplier < 2 {
            return Err("Disparity multiplier must be at least 2".to_string());
        }

        if self.double_timeout_limit == 0 {
            return Err("Double timeout limit must be at least 1".to_string());
        }

        Ok(())
    }

    /// Get round duration based on speed
    pub fn round_duration_secs(&self) -> u32 {
        match self.speed {
            RoundSpeed::Normal => 60,
            RoundSpeed::Turbo => 30,
            RoundSpeed::Hyper => 10,
        }
    }

    /// Match settings derived from this configuration
    pub fn settings(&self) -> MatchSettings {
        MatchSettings {
            starting_balance: self.starting_balance,
            min_wager: self.min_wager,
            bankruptcy_threshold: self.bankruptcy_threshold,
            round_duration_secs: self.round_duration_secs(),
            disparity_multiplier: self.disparity_multiplier,
            double_timeout_limit: self.double_timeout_limit,
            reconnect_grace_secs: self.reconnect_grace_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DuelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings(), MatchSettings::default());
    }

    #[test]
    fn test_round_duration_follows_speed() {
        let mut config = DuelConfig::default();
        assert_eq!(config.round_duration_secs(), 60);

        config.speed = RoundSpeed::Turbo;
        assert_eq!(config.round_duration_secs(), 30);

        config.speed = RoundSpeed::Hyper;
        assert_eq!(config.settings().round_duration_secs, 10);
    }

    #[test]
    fn test_threshold_above_starting_balance_is_invalid() {
        let config = DuelConfig {
            bankruptcy_threshold: 500,
            ..DuelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_min_wager_is_invalid() {
        let config = DuelConfig {
            min_wager: 0,
            ..DuelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speed_parses_case_insensitively() {
        assert_eq!("Turbo".parse::<RoundSpeed>(), Ok(RoundSpeed::Turbo));
        assert!("warp".parse::<RoundSpeed>().is_err());
    }
}
