//! AI tuning configuration loaded from TOML
//!
//! Every section is optional in the file; missing keys fall back to the
//! defaults below, which are the rule values the planner and executor were
//! balanced against.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{CommandError, Result};

/// Economic thresholds used by the General
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Below this balance the General holds everything
    pub min_buy: u32,
    /// Smallest allocate or purchase budget worth acting on
    pub min_split: u32,
    /// Balance needed before allocating and purchasing in the same turn
    pub combo_min_balance: u32,
    /// Share of the allocate budget actually handed out to commanders
    pub alloc_ratio: f64,
    /// Templates priced up to `budget * purchase_overshoot` are considered
    pub purchase_overshoot: f64,
    /// Maximum units bought per turn
    pub purchase_cap: usize,
    /// A unit with less fuel than this ratio counts as low on fuel
    pub low_fuel_ratio: f64,
    /// Share of a commander's units low on fuel that triggers a fuel crisis
    pub fuel_crisis_ratio: f64,
    /// Share of a key point's value paid out each turn
    pub income_rate: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            min_buy: 30,
            min_split: 20,
            combo_min_balance: 60,
            alloc_ratio: 0.6,
            purchase_overshoot: 1.2,
            purchase_cap: 3,
            low_fuel_ratio: 0.5,
            fuel_crisis_ratio: 0.3,
            income_rate: 0.1,
        }
    }
}

/// Order stability protocol parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Turns an order stays valid after issue
    pub order_lifetime: u32,
    /// Turns after issue during which an order is never replaced
    pub cooldown_turns: u32,
    /// Centroid this close to the target counts as mission in progress
    pub completion_radius: u32,
    /// Enemy units within this distance of the centroid count as a threat
    pub emergency_radius: u32,
    /// Threatening enemy count that forces a new order
    pub emergency_enemy_count: usize,
    /// Units below this combat ratio count as damaged
    pub damaged_combat_ratio: f64,
    /// Share of damaged units above which a new order is forced
    pub damaged_unit_fraction: f64,
    /// A new target must score this many times the old one to replace it
    pub reissue_factor: f64,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            order_lifetime: 5,
            cooldown_turns: 3,
            completion_radius: 5,
            emergency_radius: 10,
            emergency_enemy_count: 3,
            damaged_combat_ratio: 0.5,
            damaged_unit_fraction: 0.5,
            reissue_factor: 1.4,
        }
    }
}

/// Commander-level tactical parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticsConfig {
    /// Minimum attack/defense ratio before the AI attacks
    pub attack_ratio: f64,
    /// Enemy at or within this distance switches units to recon mode
    pub recon_distance: u32,
    /// Enemy at or within this distance switches units to combat mode
    pub combat_distance: u32,
    /// Units below this fuel or combat ratio get resupplied
    pub resupply_threshold: f64,
    /// Enemies farther than this contribute no threat
    pub threat_radius: u32,
    /// Normalized threat above which a unit retreats
    pub retreat_threshold: f64,
    /// Units with `movement + fuel` above this count as fast
    pub fast_unit_threshold: u32,
    /// How far intel-gathering units spread from the target
    pub intel_radius: i32,
    /// How far short of the target supporting units stop
    pub support_distance: i32,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            attack_ratio: 1.3,
            recon_distance: 3,
            combat_distance: 6,
            resupply_threshold: 0.8,
            threat_radius: 8,
            retreat_threshold: 1.5,
            fast_unit_threshold: 8,
            intel_radius: 3,
            support_distance: 2,
        }
    }
}

/// Deployment hex scoring weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub spawn_bonus: f64,
    pub friendly_radius: u32,
    pub friendly_weight: f64,
    pub enemy_radius: u32,
    pub enemy_weight: f64,
    pub keypoint_radius: u32,
    pub keypoint_weight: f64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            spawn_bonus: 10.0,
            friendly_radius: 3,
            friendly_weight: 1.0,
            enemy_radius: 5,
            enemy_weight: 2.0,
            keypoint_radius: 3,
            keypoint_weight: 2.0,
        }
    }
}

/// Complete AI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub orders: OrdersConfig,
    #[serde(default)]
    pub tactics: TacticsConfig,
    #[serde(default)]
    pub deployment: DeploymentConfig,
}

impl AiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AiConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let ratio_fields = [
            ("economy.alloc_ratio", self.economy.alloc_ratio),
            ("economy.low_fuel_ratio", self.economy.low_fuel_ratio),
            ("economy.fuel_crisis_ratio", self.economy.fuel_crisis_ratio),
            ("economy.income_rate", self.economy.income_rate),
            ("orders.damaged_combat_ratio", self.orders.damaged_combat_ratio),
            ("orders.damaged_unit_fraction", self.orders.damaged_unit_fraction),
            ("tactics.resupply_threshold", self.tactics.resupply_threshold),
        ];
        for (name, value) in ratio_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(CommandError::InvalidConfig(format!(
                    "{} ({}) must be within 0.0..=1.0",
                    name, value
                )));
            }
        }

        if self.economy.min_split > self.economy.min_buy {
            return Err(CommandError::InvalidConfig(format!(
                "economy.min_split ({}) should be <= economy.min_buy ({})",
                self.economy.min_split, self.economy.min_buy
            )));
        }

        if self.economy.purchase_overshoot < 1.0 {
            return Err(CommandError::InvalidConfig(
                "economy.purchase_overshoot must be >= 1.0".into(),
            ));
        }

        if self.orders.cooldown_turns >= self.orders.order_lifetime {
            return Err(CommandError::InvalidConfig(format!(
                "orders.cooldown_turns ({}) should be < orders.order_lifetime ({})",
                self.orders.cooldown_turns, self.orders.order_lifetime
            )));
        }

        if self.orders.reissue_factor < 1.0 {
            return Err(CommandError::InvalidConfig(
                "orders.reissue_factor must be >= 1.0".into(),
            ));
        }

        if self.tactics.recon_distance >= self.tactics.combat_distance {
            return Err(CommandError::InvalidConfig(format!(
                "tactics.recon_distance ({}) should be < tactics.combat_distance ({})",
                self.tactics.recon_distance, self.tactics.combat_distance
            )));
        }

        if self.tactics.attack_ratio <= 0.0 {
            return Err(CommandError::InvalidConfig(
                "tactics.attack_ratio must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Load a configuration file
pub fn load_config(path: &Path) -> Result<AiConfig> {
    let contents = fs::read_to_string(path)?;
    AiConfig::from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_default_config_file() {
        let config =
            load_config(Path::new("data/ai/default.toml")).expect("Should load default config");
        assert_eq!(config.economy.min_buy, 30);
        assert_eq!(config.orders.cooldown_turns, 3);
        assert!((config.tactics.attack_ratio - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config =
            AiConfig::from_toml_str("[tactics]\nattack_ratio = 2.0\n").expect("valid toml");
        assert_eq!(config.tactics.attack_ratio, 2.0);
        assert_eq!(config.tactics.recon_distance, 3);
        assert_eq!(config.economy.purchase_cap, 3);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = AiConfig::from_toml_str("").expect("empty toml");
        assert_eq!(config.orders.order_lifetime, 5);
    }

    #[test]
    fn test_rejects_out_of_range_ratio() {
        let err = AiConfig::from_toml_str("[economy]\nalloc_ratio = 1.5\n").unwrap_err();
        assert!(matches!(err, CommandError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_cooldown_longer_than_lifetime() {
        let mut config = AiConfig::default();
        config.orders.cooldown_turns = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unordered_mode_distances() {
        let mut config = AiConfig::default();
        config.tactics.recon_distance = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = AiConfig::from_toml_str("[economy\n").unwrap_err();
        assert!(matches!(err, CommandError::TomlError(_)));
    }
}
