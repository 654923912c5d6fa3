//! World state and the turn driver that runs Generals and Commanders

pub mod scenario;
pub mod turn;
pub mod world;

pub use turn::{
    apply_general_plan, capture_context, run_commander_turn, run_full_turn, run_general_turn,
    TurnEvent,
};
pub use scenario::{build_world, ScenarioSettings};
pub use world::{GameOutcome, World};
