//! Budget strategy selection

use serde::{Deserialize, Serialize};

use crate::core::config::EconomyConfig;
use crate::general::analysis::UnitHealth;

/// How the General splits its balance this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetStrategy {
    /// Early game: build up
    Development,
    /// Some commander is running dry
    FuelCrisis,
    /// Late and behind on points: buy everything
    Desperation,
    /// Late and ahead: keep units supplied
    Protection,
    /// Mid game: push out
    Expansion,
}

/// Budget split in whole percent; always sums to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRatios {
    pub reserve: u32,
    pub allocate: u32,
    pub purchase: u32,
}

impl BudgetRatios {
    const fn new(reserve: u32, allocate: u32, purchase: u32) -> Self {
        Self {
            reserve,
            allocate,
            purchase,
        }
    }

    /// `floor(balance * percent / 100)`
    pub fn share(balance: u32, percent: u32) -> u32 {
        (balance as u64 * percent as u64 / 100) as u32
    }
}

impl BudgetStrategy {
    pub fn all() -> [BudgetStrategy; 5] {
        [
            BudgetStrategy::Development,
            BudgetStrategy::FuelCrisis,
            BudgetStrategy::Desperation,
            BudgetStrategy::Protection,
            BudgetStrategy::Expansion,
        ]
    }

    pub fn ratios(&self) -> BudgetRatios {
        match self {
            BudgetStrategy::Development => BudgetRatios::new(20, 40, 40),
            BudgetStrategy::FuelCrisis => BudgetRatios::new(15, 70, 15),
            BudgetStrategy::Desperation => BudgetRatios::new(10, 25, 65),
            BudgetStrategy::Protection => BudgetRatios::new(30, 55, 15),
            BudgetStrategy::Expansion => BudgetRatios::new(20, 35, 45),
        }
    }
}

/// Does any commander have too many units low on fuel?
pub fn is_fuel_crisis(commanders: &[UnitHealth], config: &EconomyConfig) -> bool {
    commanders
        .iter()
        .any(|h| h.low_fuel_ratio > config.fuel_crisis_ratio)
}

/// Pick the strategy; first matching rule wins
pub fn select_strategy(fuel_crisis: bool, phase: f64, losing_vp: bool) -> BudgetStrategy {
    if fuel_crisis {
        BudgetStrategy::FuelCrisis
    } else if phase > 2.0 {
        if losing_vp {
            BudgetStrategy::Desperation
        } else {
            BudgetStrategy::Protection
        }
    } else if phase > 1.0 {
        BudgetStrategy::Expansion
    } else {
        BudgetStrategy::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;

    #[test]
    fn test_ratios_sum_to_whole() {
        for strategy in BudgetStrategy::all() {
            let r = strategy.ratios();
            assert_eq!(r.reserve + r.allocate + r.purchase, 100, "{strategy:?}");
        }
    }

    #[test]
    fn test_fuel_crisis_wins_over_phase() {
        assert_eq!(select_strategy(true, 2.5, true), BudgetStrategy::FuelCrisis);
        assert_eq!(select_strategy(true, 0.0, false), BudgetStrategy::FuelCrisis);
    }

    #[test]
    fn test_late_game_depends_on_score() {
        assert_eq!(select_strategy(false, 2.1, true), BudgetStrategy::Desperation);
        assert_eq!(select_strategy(false, 2.1, false), BudgetStrategy::Protection);
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(select_strategy(false, 1.0, true), BudgetStrategy::Development);
        assert_eq!(select_strategy(false, 1.5, true), BudgetStrategy::Expansion);
        assert_eq!(select_strategy(false, 2.0, true), BudgetStrategy::Expansion);
    }

    #[test]
    fn test_fuel_crisis_detection() {
        let config = EconomyConfig::default();
        let mut health = UnitHealth::empty(PlayerId(2));
        health.low_fuel_ratio = 0.3;
        assert!(!is_fuel_crisis(&[health.clone()], &config));
        health.low_fuel_ratio = 0.4;
        assert!(is_fuel_crisis(&[health], &config));
        assert!(!is_fuel_crisis(&[], &config));
    }

    #[test]
    fn test_share_floors() {
        assert_eq!(BudgetRatios::share(120, 70), 84);
        assert_eq!(BudgetRatios::share(120, 15), 18);
        assert_eq!(BudgetRatios::share(33, 40), 13);
    }
}
