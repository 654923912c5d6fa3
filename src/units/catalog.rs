//! Unit catalog: purchasable templates, prices and baseline stats
//!
//! Stats are ADDITIVE by size step; only combat value multiplies with size.

use serde::{Deserialize, Serialize};

use crate::units::unit::{UnitKind, UnitSize, UnitStats};

/// A purchasable kind × size combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub kind: UnitKind,
    pub size: UnitSize,
    pub cost: u32,
}

/// Optional kit bought alongside a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SupportUpgrade {
    /// Trucks: +2 base movement
    Motorized,
    /// Anti-tank guns: +3 attack
    AntiTank,
}

impl SupportUpgrade {
    pub fn all() -> [SupportUpgrade; 2] {
        [SupportUpgrade::Motorized, SupportUpgrade::AntiTank]
    }

    pub fn cost(&self) -> u32 {
        match self {
            SupportUpgrade::Motorized => 6,
            SupportUpgrade::AntiTank => 8,
        }
    }

    pub fn applies_to(&self, kind: UnitKind) -> bool {
        match self {
            SupportUpgrade::Motorized => {
                matches!(kind, UnitKind::Infantry | UnitKind::Artillery | UnitKind::Supply)
            }
            SupportUpgrade::AntiTank => matches!(kind, UnitKind::Infantry | UnitKind::Recon),
        }
    }

    /// Fold this upgrade into a stat block
    pub fn apply(&self, stats: &mut UnitStats) {
        match self {
            SupportUpgrade::Motorized => stats.base_movement += 2,
            SupportUpgrade::AntiTank => stats.attack_value += 3,
        }
    }
}

/// Platoon price of a kind
pub fn base_cost(kind: UnitKind) -> u32 {
    match kind {
        UnitKind::Infantry => 10,
        UnitKind::Cavalry => 14,
        UnitKind::Recon => 12,
        UnitKind::Artillery => 20,
        UnitKind::Armor => 30,
        UnitKind::Supply => 8,
    }
}

pub fn price(kind: UnitKind, size: UnitSize) -> u32 {
    base_cost(kind) * size.multiplier()
}

/// Baseline stats of a freshly raised unit
pub fn base_stats(kind: UnitKind, size: UnitSize) -> UnitStats {
    let platoon = match kind {
        UnitKind::Infantry => UnitStats::new(5, 10, 3, 1, 4, 4, 3),
        UnitKind::Armor => UnitStats::new(10, 14, 5, 1, 8, 6, 3),
        UnitKind::Artillery => UnitStats::new(6, 8, 2, 3, 7, 2, 2),
        UnitKind::Cavalry => UnitStats::new(8, 9, 6, 1, 5, 3, 4),
        UnitKind::Recon => UnitStats::new(10, 6, 6, 1, 3, 2, 6),
        UnitKind::Supply => UnitStats::new(4, 4, 4, 0, 0, 1, 2),
    };

    let step = size.multiplier() - 1;
    let mut stats = platoon;
    stats.max_combat *= size.multiplier();
    if stats.attack_value > 0 {
        stats.attack_value += 2 * step;
    }
    stats.defense_value += 2 * step;
    stats
}

/// Every purchasable template, ordered by kind then size
pub fn templates() -> Vec<UnitTemplate> {
    UnitKind::all()
        .into_iter()
        .flat_map(|kind| {
            UnitSize::all().into_iter().map(move |size| UnitTemplate {
                kind,
                size,
                cost: price(kind, size),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_scales_with_size() {
        assert_eq!(price(UnitKind::Infantry, UnitSize::Platoon), 10);
        assert_eq!(price(UnitKind::Infantry, UnitSize::Company), 20);
        assert_eq!(price(UnitKind::Armor, UnitSize::Battalion), 90);
    }

    #[test]
    fn test_supply_is_cheapest_kind() {
        let cheapest = UnitKind::all()
            .into_iter()
            .min_by_key(|k| base_cost(*k))
            .unwrap();
        assert_eq!(cheapest, UnitKind::Supply);
    }

    #[test]
    fn test_templates_cover_every_combination() {
        let all = templates();
        assert_eq!(all.len(), UnitKind::all().len() * UnitSize::all().len());
        assert!(all.iter().all(|t| t.cost == price(t.kind, t.size)));
    }

    #[test]
    fn test_bigger_units_fight_harder() {
        let platoon = base_stats(UnitKind::Infantry, UnitSize::Platoon);
        let battalion = base_stats(UnitKind::Infantry, UnitSize::Battalion);
        assert_eq!(battalion.max_combat, platoon.max_combat * 3);
        assert!(battalion.attack_value > platoon.attack_value);
        assert_eq!(battalion.base_movement, platoon.base_movement);
    }

    #[test]
    fn test_supply_never_attacks() {
        for size in UnitSize::all() {
            assert_eq!(base_stats(UnitKind::Supply, size).attack_value, 0);
        }
    }

    #[test]
    fn test_upgrade_applicability() {
        assert!(SupportUpgrade::Motorized.applies_to(UnitKind::Infantry));
        assert!(!SupportUpgrade::Motorized.applies_to(UnitKind::Armor));
        assert!(SupportUpgrade::AntiTank.applies_to(UnitKind::Recon));
        assert!(!SupportUpgrade::AntiTank.applies_to(UnitKind::Supply));
    }

    #[test]
    fn test_upgrade_apply() {
        let mut stats = base_stats(UnitKind::Infantry, UnitSize::Platoon);
        SupportUpgrade::Motorized.apply(&mut stats);
        SupportUpgrade::AntiTank.apply(&mut stats);
        assert_eq!(stats.base_movement, 5);
        assert_eq!(stats.attack_value, 7);
    }
}
