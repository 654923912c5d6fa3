//! Turn driver
//!
//! A full turn walks the nations in order. Each nation's General plans first
//! and its plan is applied to the ledgers, the order channel and the
//! deployment queue; then each of its Commanders executes and places any
//! units bought for it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::board::hex::HexCoord;
use crate::commander::{AttackReport, Battlefield, Commander};
use crate::core::error::{CommandError, Result};
use crate::core::types::{Nation, PlayerId, Turn, UnitId};
use crate::deployment::{deploy_pending, DeploymentSite};
use crate::economy::keypoints::KeyPoint;
use crate::economy::ledger::Ledger;
use crate::game::world::{GameOutcome, World};
use crate::general::analysis::game_phase;
use crate::general::{
    EconomySnapshot, EnemyContact, General, GeneralPlan, StrategicSnapshot, TurnContext, UnitHealth,
};
use crate::orders::mailbox::channel_key;
use crate::orders::order::MissionType;
use crate::units::{UnitKind, UnitSize};

/// Events produced while a turn is played
#[derive(Debug, Clone, Serialize)]
pub enum TurnEvent {
    IncomeCollected {
        nation: Nation,
        points: u32,
    },
    PointsAllocated {
        commander: PlayerId,
        points: u32,
    },
    UnitPurchased {
        commander: PlayerId,
        kind: UnitKind,
        size: UnitSize,
        cost: u32,
        token: u32,
    },
    /// The ledger could not cover a planned purchase
    PurchaseDiscarded {
        commander: PlayerId,
        kind: UnitKind,
        cost: u32,
    },
    OrderIssued {
        commander: PlayerId,
        mission: MissionType,
        target: HexCoord,
        reason: &'static str,
    },
    OrderKept {
        commander: PlayerId,
        reason: &'static str,
    },
    Attack(AttackReport),
    UnitMoved {
        unit: UnitId,
        from: HexCoord,
        to: HexCoord,
    },
    KeyPointCaptured {
        nation: Nation,
        hex: HexCoord,
    },
    UnitDeployed {
        commander: PlayerId,
        unit: UnitId,
        hex: HexCoord,
    },
    TurnEnded {
        turn: Turn,
    },
    GameOver {
        outcome: GameOutcome,
    },
}

/// Snapshot everything `general` plans from
pub fn capture_context(world: &World, general: PlayerId) -> Result<TurnContext> {
    let nation = world.player(general)?.nation.clone();
    let balance = world.ledger(general)?.points();

    let mut commanders = Vec::new();
    let mut pending_units = BTreeMap::new();
    for id in world.commanders_of(&nation) {
        let unspent = world.ledger(id).map(|l| l.points().economic).unwrap_or(0);
        commanders.push(UnitHealth::from_units(
            id,
            world.units_of(id),
            unspent,
            &world.config,
        ));
        for record in world.deployments.pending_for(id) {
            *pending_units.entry(record.unit_kind).or_insert(0) += 1;
        }
    }

    let enemy_contacts: Vec<EnemyContact> = world
        .visibility
        .get(&general)
        .map(|vis| {
            vis.visible_enemies
                .iter()
                .filter_map(|id| world.units.get(id))
                .map(|u| EnemyContact {
                    id: u.id,
                    kind: u.kind,
                    position: u.position,
                })
                .collect()
        })
        .unwrap_or_default();

    let own_vp = world.victory_points_of(&nation);
    let enemy_vp = world
        .victory_points
        .iter()
        .filter(|(n, _)| **n != nation)
        .map(|(_, vp)| *vp)
        .max()
        .unwrap_or(0);
    let held = |pred: fn(&KeyPoint, &Nation) -> bool| {
        world.key_points.iter().filter(|kp| pred(kp, &nation)).count() as u32
    };

    let strategic = StrategicSnapshot {
        own_vp,
        enemy_vp,
        current_turn: world.current_turn,
        max_turns: world.max_turns,
        game_phase: game_phase(world.current_turn, world.max_turns),
        own_key_points: held(|kp, n| kp.is_held_by(n)),
        enemy_key_points: held(|kp, n| kp.is_enemy_of(n)),
        neutral_key_points: held(|kp, _| kp.is_neutral()),
        enemy_has_armor: enemy_contacts.iter().any(|c| c.kind == UnitKind::Armor),
    };

    let existing_orders = world
        .commanders_of(&nation)
        .into_iter()
        .filter_map(|id| {
            world
                .orders
                .read(&channel_key(&nation, id))
                .map(|order| (id, order.clone()))
        })
        .collect::<BTreeMap<_, _>>();

    let anchor = HexCoord::centroid(world.map.spawn_points_for(&nation))
        .unwrap_or_else(|| HexCoord::new(world.map.width as i32 / 2, world.map.height as i32 / 2));

    Ok(TurnContext {
        nation,
        general,
        current_turn: world.current_turn,
        economy: EconomySnapshot {
            economic_points: balance.economic,
            special_points: balance.special,
        },
        commanders,
        strategic,
        key_points: world.key_points.clone(),
        enemy_contacts,
        existing_orders,
        pending_units,
        anchor,
    })
}

/// Carry out a General's plan against the world
///
/// Allocations move points from the General to its commanders, purchases are
/// paid for and queued for deployment, and issued orders are published.
pub fn apply_general_plan(
    world: &mut World,
    general: PlayerId,
    plan: &GeneralPlan,
) -> Result<Vec<TurnEvent>> {
    let nation = world.player(general)?.nation.clone();
    let mut events = Vec::new();

    let mut general_ledger = world
        .ledgers
        .remove(&general)
        .ok_or(CommandError::PlayerNotFound(general))?;

    for (commander, amount) in &plan.allocations {
        let Some(target) = world.ledgers.get_mut(commander) else {
            tracing::warn!(%commander, "Allocation to unknown commander skipped");
            continue;
        };
        let moved = general_ledger.transfer_to(target, *amount);
        if moved > 0 {
            events.push(TurnEvent::PointsAllocated {
                commander: *commander,
                points: moved,
            });
        }
    }

    for purchase in &plan.purchases {
        let cost = purchase.total_cost();
        match general_ledger.subtract_points(cost) {
            Ok(()) => {
                let token = world.deployments.enqueue(purchase, &nation);
                events.push(TurnEvent::UnitPurchased {
                    commander: purchase.commander,
                    kind: purchase.unit_kind,
                    size: purchase.unit_size,
                    cost,
                    token,
                });
            }
            Err(err) => {
                tracing::warn!(
                    %err,
                    commander = %purchase.commander,
                    kind = ?purchase.unit_kind,
                    "Purchase discarded"
                );
                events.push(TurnEvent::PurchaseDiscarded {
                    commander: purchase.commander,
                    kind: purchase.unit_kind,
                    cost,
                });
            }
        }
    }

    world.ledgers.insert(general, general_ledger);

    for decision in &plan.orders {
        match &decision.order {
            Some(order) => {
                world
                    .orders
                    .publish(&channel_key(&nation, decision.commander), order.clone());
                events.push(TurnEvent::OrderIssued {
                    commander: decision.commander,
                    mission: order.mission_type,
                    target: order.target_hex,
                    reason: decision.reason,
                });
            }
            None => events.push(TurnEvent::OrderKept {
                commander: decision.commander,
                reason: decision.reason,
            }),
        }
    }

    Ok(events)
}

/// The General's sub-turn: see, collect income, plan, apply
pub fn run_general_turn(world: &mut World, general: PlayerId) -> Result<Vec<TurnEvent>> {
    let nation = world.player(general)?.nation.clone();
    world.refresh_visibility(general)?;

    let mut events = Vec::new();
    let income = world
        .key_points
        .collect_income(&nation, world.config.economy.income_rate);
    if income > 0 {
        world.ledger_mut(general)?.add_points(income);
        world.add_victory_points(&nation, income);
        events.push(TurnEvent::IncomeCollected {
            nation: nation.clone(),
            points: income,
        });
    }

    let ctx = capture_context(world, general)?;
    let plan = General::new(world.config.clone()).plan_turn(&ctx);
    events.extend(apply_general_plan(world, general, &plan)?);

    tracing::info!(
        %nation,
        turn = world.current_turn,
        strategy = ?plan.strategy,
        action = ?plan.decision.action,
        allocated = plan.allocated_total(),
        purchased = plan.purchases.len(),
        orders = plan.issued_orders().count(),
        "General turn complete"
    );
    Ok(events)
}

/// A Commander's sub-turn: see, execute, deploy
pub fn run_commander_turn(world: &mut World, commander: PlayerId) -> Result<Vec<TurnEvent>> {
    let nation = world.player(commander)?.nation.clone();
    world.refresh_visibility(commander)?;

    let order = world
        .orders
        .active_order(&channel_key(&nation, commander), world.current_turn)
        .cloned();
    let executor = Commander::new(commander, nation.clone(), world.config.tactics.clone());

    let ledger = world
        .ledgers
        .get_mut(&commander)
        .ok_or(CommandError::PlayerNotFound(commander))?;
    let visibility = world
        .visibility
        .get(&commander)
        .ok_or(CommandError::PlayerNotFound(commander))?;

    let report = executor.run_turn(
        Battlefield {
            map: &mut world.map,
            units: &mut world.units,
            key_points: &mut world.key_points,
        },
        visibility,
        order.as_ref(),
        ledger,
    );

    let mut events = Vec::new();
    for attack in &report.attacks {
        events.push(TurnEvent::Attack(attack.clone()));
    }
    for step in &report.moves {
        events.push(TurnEvent::UnitMoved {
            unit: step.unit,
            from: step.from,
            to: step.to,
        });
    }
    for hex in &report.captures {
        events.push(TurnEvent::KeyPointCaptured {
            nation: nation.clone(),
            hex: *hex,
        });
    }
    if report.victory_points > 0 {
        world.add_victory_points(&nation, report.victory_points);
    }

    let known_enemies: Vec<HexCoord> = world
        .visibility
        .get(&commander)
        .map(|vis| {
            vis.visible_enemies
                .iter()
                .filter_map(|id| world.units.get(id))
                .map(|u| u.position)
                .collect()
        })
        .unwrap_or_default();
    let site = DeploymentSite {
        nation: &nation,
        key_points: &world.key_points,
        known_enemies: &known_enemies,
        config: &world.config.deployment,
    };
    let placements = deploy_pending(
        &mut world.deployments,
        commander,
        &mut world.map,
        &mut world.units,
        &mut world.next_unit_id,
        &site,
    );
    for placed in placements {
        events.push(TurnEvent::UnitDeployed {
            commander,
            unit: placed.unit,
            hex: placed.hex,
        });
    }

    Ok(events)
}

/// Play one full turn for every nation, then advance the clock
///
/// A sub-turn that fails is logged and skipped; the other players still act
/// and the clock still advances.
pub fn run_full_turn(world: &mut World) -> Result<Vec<TurnEvent>> {
    let mut events = Vec::new();

    for nation in world.nations() {
        if let Some(general) = world.general_of(&nation) {
            match run_general_turn(world, general) {
                Ok(sub_turn) => events.extend(sub_turn),
                Err(err) => tracing::warn!(%err, %general, "General turn skipped"),
            }
        }
        for commander in world.commanders_of(&nation) {
            match run_commander_turn(world, commander) {
                Ok(sub_turn) => events.extend(sub_turn),
                Err(err) => tracing::warn!(%err, %commander, "Commander turn skipped"),
            }
        }
    }

    events.push(TurnEvent::TurnEnded {
        turn: world.current_turn,
    });
    world.current_turn += 1;
    let expired = world.orders.expire_stale(world.current_turn);
    if expired > 0 {
        tracing::debug!(expired, turn = world.current_turn, "Orders expired");
    }

    let outcome = world.outcome();
    if outcome != GameOutcome::InProgress {
        tracing::info!(?outcome, "Game over");
        events.push(TurnEvent::GameOver { outcome });
    }
    Ok(events)
}
