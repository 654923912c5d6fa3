//! Strategic planner
//!
//! Once per turn the General reads a `TurnContext`, picks a budget strategy,
//! decides whether to allocate points and/or buy units, and issues one order
//! per commander subject to the stability protocol. Planning is pure; the
//! resulting `GeneralPlan` is applied by the turn driver.

pub mod allocation;
pub mod analysis;
pub mod decision;
pub mod purchase;
pub mod strategy;
pub mod targeting;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::config::AiConfig;
use crate::core::types::PlayerId;
use crate::orders::order::{MissionType, Priority, StrategicOrder};
use crate::orders::stability::{
    is_emergency, should_issue_new_order, StabilityCheck, StabilityReason,
};
use crate::units::UnitKind;

pub use allocation::{allocate_points, allocation_weights, commander_weight};
pub use analysis::{EconomySnapshot, EnemyContact, StrategicSnapshot, TurnContext, UnitHealth};
pub use decision::{decide_action, Action, ActionDecision};
pub use purchase::{plan_purchases, ForceComposition, PurchasePlan};
pub use strategy::{is_fuel_crisis, select_strategy, BudgetRatios, BudgetStrategy};
pub use targeting::{choose_mission, select_target, TargetChoice};

/// Outcome of the stability protocol for one commander
#[derive(Debug, Clone, Serialize)]
pub struct OrderDecision {
    pub commander: PlayerId,
    pub mission: MissionType,
    pub issue: bool,
    pub reason: &'static str,
    /// The new order, when one is issued
    pub order: Option<StrategicOrder>,
}

/// Everything the General decided this turn
#[derive(Debug, Clone, Serialize)]
pub struct GeneralPlan {
    pub strategy: BudgetStrategy,
    pub decision: ActionDecision,
    pub allocations: BTreeMap<PlayerId, u32>,
    pub purchases: Vec<PurchasePlan>,
    pub orders: Vec<OrderDecision>,
}

impl GeneralPlan {
    pub fn allocated_total(&self) -> u32 {
        self.allocations.values().sum()
    }

    pub fn purchase_total(&self) -> u32 {
        self.purchases.iter().map(|p| p.total_cost()).sum()
    }

    pub fn issued_orders(&self) -> impl Iterator<Item = &StrategicOrder> {
        self.orders.iter().filter_map(|d| d.order.as_ref())
    }
}

/// The strategic AI of one nation
#[derive(Debug, Clone, Default)]
pub struct General {
    config: AiConfig,
}

impl General {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn plan_turn(&self, ctx: &TurnContext) -> GeneralPlan {
        let economy = &self.config.economy;
        let fuel_crisis = is_fuel_crisis(&ctx.commanders, economy);
        let strategy = select_strategy(
            fuel_crisis,
            ctx.strategic.game_phase,
            ctx.strategic.is_losing(),
        );
        let decision = decide_action(ctx.economy.economic_points, strategy, economy);
        tracing::debug!(
            nation = %ctx.nation,
            ?strategy,
            action = ?decision.action,
            rule = decision.rule,
            balance = ctx.economy.economic_points,
            "General decision"
        );

        let weights = allocation_weights(&ctx.commanders);

        let allocations = if decision.action.allocates() {
            let pool =
                (decision.allocate_budget as f64 * economy.alloc_ratio + 1e-9).floor() as u32;
            allocate_points(pool, &weights)
        } else {
            BTreeMap::new()
        };

        let purchases = if decision.action.purchases() {
            let force = ForceComposition {
                kind_counts: ctx.force_counts(),
                enemy_has_armor: ctx.strategic.enemy_has_armor
                    || ctx.enemy_contacts.iter().any(|c| c.kind == UnitKind::Armor),
            };
            plan_purchases(decision.purchase_budget, &force, &weights, economy)
        } else {
            Vec::new()
        };

        let orders = self.plan_orders(ctx, strategy);

        GeneralPlan {
            strategy,
            decision,
            allocations,
            purchases,
            orders,
        }
    }

    /// One stability-checked order decision per commander, ascending id
    fn plan_orders(&self, ctx: &TurnContext, strategy: BudgetStrategy) -> Vec<OrderDecision> {
        let enemy_positions = ctx.enemy_positions();
        let mut claimed = BTreeSet::new();
        let mut decisions = Vec::new();

        for health in &ctx.commanders {
            let centroid = ctx.centroid_of(health);
            let emergency = health.unit_count > 0
                && is_emergency(
                    centroid,
                    &enemy_positions,
                    health.damaged_ratio,
                    &self.config.orders,
                );
            let mission = choose_mission(strategy, !enemy_positions.is_empty());

            let Some(choice) =
                select_target(mission, centroid, &ctx.key_points, &ctx.nation, &claimed)
            else {
                tracing::debug!(commander = %health.commander, "No target for any mission");
                continue;
            };

            let previous = ctx.existing_orders.get(&health.commander);
            let check = StabilityCheck {
                previous,
                current_turn: ctx.current_turn,
                centroid,
                candidate_score: choice.score,
                emergency,
                key_points: &ctx.key_points,
                nation: &ctx.nation,
            };
            let (issue, reason) = should_issue_new_order(&check, &self.config.orders);

            let order = if issue {
                let priority = if emergency
                    || matches!(strategy, BudgetStrategy::Desperation | BudgetStrategy::FuelCrisis)
                {
                    Priority::High
                } else {
                    Priority::Medium
                };
                claimed.insert(choice.target);
                Some(
                    StrategicOrder::new(
                        health.commander,
                        choice.mission,
                        choice.target,
                        priority,
                        ctx.current_turn,
                    )
                    .with_lifetime(self.config.orders.order_lifetime),
                )
            } else {
                if let Some(previous) = previous {
                    claimed.insert(previous.target_hex);
                }
                None
            };

            log_order_decision(health.commander, issue, reason, order.as_ref());
            decisions.push(OrderDecision {
                commander: health.commander,
                mission: choice.mission,
                issue,
                reason: reason.as_str(),
                order,
            });
        }
        decisions
    }
}

fn log_order_decision(
    commander: PlayerId,
    issue: bool,
    reason: StabilityReason,
    order: Option<&StrategicOrder>,
) {
    match order {
        Some(order) => tracing::debug!(
            %commander,
            mission = %order.mission_type,
            target = ?order.target_hex,
            %reason,
            "Order issued"
        ),
        None => tracing::debug!(%commander, issue, %reason, "Order kept"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::hex::HexCoord;
    use crate::core::types::{Nation, UnitId};
    use crate::economy::keypoints::{KeyPoint, KeyPointKind, KeyPoints};

    fn health(id: u32, centroid: HexCoord) -> UnitHealth {
        let mut h = UnitHealth::empty(PlayerId(id));
        h.unit_count = 3;
        h.avg_fuel_ratio = 1.0;
        h.avg_combat_ratio = 1.0;
        h.kind_counts.insert(UnitKind::Infantry, 3);
        h.centroid = Some(centroid);
        h
    }

    fn context(balance: u32) -> TurnContext {
        let key_points: KeyPoints = vec![
            KeyPoint::new(HexCoord::new(10, 0), KeyPointKind::City, 30),
            KeyPoint::new(HexCoord::new(0, 10), KeyPointKind::Village, 20),
        ]
        .into_iter()
        .collect();
        TurnContext {
            nation: Nation::new("Polska"),
            general: PlayerId(1),
            current_turn: 1,
            economy: EconomySnapshot {
                economic_points: balance,
                special_points: 0,
            },
            commanders: vec![health(2, HexCoord::new(0, 0)), health(3, HexCoord::new(1, 0))],
            strategic: StrategicSnapshot {
                current_turn: 1,
                max_turns: 30,
                game_phase: 0.1,
                ..Default::default()
            },
            key_points,
            enemy_contacts: Vec::new(),
            existing_orders: BTreeMap::new(),
            pending_units: BTreeMap::new(),
            anchor: HexCoord::new(0, 0),
        }
    }

    #[test]
    fn test_plan_holds_when_poor() {
        let plan = General::default().plan_turn(&context(25));
        assert_eq!(plan.decision.action, Action::Hold);
        assert_eq!(plan.decision.rule, "econ<MIN_BUY");
        assert!(plan.allocations.is_empty());
        assert!(plan.purchases.is_empty());
    }

    #[test]
    fn test_combo_plan_respects_budgets() {
        let plan = General::default().plan_turn(&context(100));
        assert_eq!(plan.strategy, BudgetStrategy::Development);
        assert_eq!(plan.decision.action, Action::Combo);
        // floor(40 * 0.6)
        assert_eq!(plan.allocated_total(), 24);
        assert!(plan.purchase_total() <= plan.decision.purchase_budget);
    }

    #[test]
    fn test_fuel_crisis_plan() {
        let mut ctx = context(120);
        ctx.commanders[0].low_fuel_ratio = 0.4;
        let plan = General::default().plan_turn(&ctx);
        assert_eq!(plan.strategy, BudgetStrategy::FuelCrisis);
        assert_eq!(plan.decision.action, Action::Allocate);
        assert_eq!(plan.decision.allocate_budget, 84);
        assert_eq!(plan.decision.purchase_budget, 18);
        assert_eq!(plan.allocated_total(), 50);
    }

    #[test]
    fn test_commanders_get_distinct_targets() {
        let plan = General::default().plan_turn(&context(0));
        let targets: Vec<HexCoord> = plan.issued_orders().map(|o| o.target_hex).collect();
        assert_eq!(targets.len(), 2);
        assert_ne!(targets[0], targets[1]);
        // No enemies in view early on: scouting
        assert!(plan
            .issued_orders()
            .all(|o| o.mission_type == MissionType::IntelGathering));
    }

    #[test]
    fn test_existing_order_kept_in_cooldown() {
        let mut ctx = context(0);
        ctx.current_turn = 3;
        let previous = StrategicOrder::new(
            PlayerId(2),
            MissionType::IntelGathering,
            HexCoord::new(0, 10),
            Priority::Medium,
            2,
        );
        ctx.existing_orders.insert(PlayerId(2), previous);

        let plan = General::default().plan_turn(&ctx);
        let decision = &plan.orders[0];
        assert!(!decision.issue);
        assert_eq!(decision.reason, "cooldown");
        // The kept target is claimed, so commander 3 goes elsewhere
        assert_eq!(plan.orders[1].order.as_ref().map(|o| o.target_hex), Some(HexCoord::new(10, 0)));
    }

    #[test]
    fn test_captured_target_is_replaced() {
        let mut ctx = context(0);
        ctx.current_turn = 5;
        ctx.key_points.capture(HexCoord::new(10, 0), &ctx.nation);
        let previous = StrategicOrder::new(
            PlayerId(2),
            MissionType::SecureKeypoint,
            HexCoord::new(10, 0),
            Priority::Medium,
            1,
        );
        ctx.existing_orders.insert(PlayerId(2), previous);

        let plan = General::default().plan_turn(&ctx);
        let decision = &plan.orders[0];
        assert!(decision.issue);
        assert_eq!(decision.reason, "target invalid");
        assert_eq!(
            decision.order.as_ref().map(|o| o.target_hex),
            Some(HexCoord::new(0, 10))
        );
    }

    #[test]
    fn test_emergency_order_is_high_priority() {
        let mut ctx = context(0);
        ctx.enemy_contacts = (0..3)
            .map(|i| EnemyContact {
                id: UnitId(100 + i),
                kind: UnitKind::Infantry,
                position: HexCoord::new(2, i as i32),
            })
            .collect();
        let plan = General::default().plan_turn(&ctx);
        let order = plan.orders[0].order.as_ref().expect("issued");
        assert_eq!(plan.orders[0].reason, "emergency");
        assert_eq!(order.priority, Priority::High);
    }
}
