//! Hex Command - computer players for a turn-based hex wargame
//!
//! A General per nation plans budgets, purchases and orders; Commanders
//! execute those orders with their own units. The `game` module wires both
//! into a playable turn loop.

pub mod board;
pub mod commander;
pub mod core;
pub mod deployment;
pub mod economy;
pub mod game;
pub mod general;
pub mod orders;
pub mod units;

pub use crate::core::config::AiConfig;
pub use crate::core::error::{CommandError, Result};
