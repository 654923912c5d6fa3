//! What the General does with its balance this turn

use serde::{Deserialize, Serialize};

use crate::core::config::EconomyConfig;
use crate::general::strategy::{BudgetRatios, BudgetStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Hold,
    Allocate,
    Purchase,
    Combo,
}

impl Action {
    pub fn allocates(&self) -> bool {
        matches!(self, Action::Allocate | Action::Combo)
    }

    pub fn purchases(&self) -> bool {
        matches!(self, Action::Purchase | Action::Combo)
    }
}

/// Chosen action, the budgets behind it and the rule that fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDecision {
    pub action: Action,
    pub allocate_budget: u32,
    pub purchase_budget: u32,
    pub rule: &'static str,
}

impl ActionDecision {
    fn hold(rule: &'static str, allocate_budget: u32, purchase_budget: u32) -> Self {
        Self {
            action: Action::Hold,
            allocate_budget,
            purchase_budget,
            rule,
        }
    }
}

pub fn decide_action(
    balance: u32,
    strategy: BudgetStrategy,
    config: &EconomyConfig,
) -> ActionDecision {
    if balance < config.min_buy {
        return ActionDecision::hold("econ<MIN_BUY", 0, 0);
    }

    let ratios = strategy.ratios();
    let allocate_budget = BudgetRatios::share(balance, ratios.allocate);
    let purchase_budget = BudgetRatios::share(balance, ratios.purchase);
    let can_allocate = allocate_budget >= config.min_split;
    let can_purchase = purchase_budget >= config.min_split;

    let (action, rule) = if can_allocate && can_purchase && balance >= config.combo_min_balance {
        (Action::Combo, "combo")
    } else if can_allocate && (!can_purchase || allocate_budget >= purchase_budget) {
        (Action::Allocate, "allocate")
    } else if can_purchase {
        (Action::Purchase, "purchase")
    } else {
        return ActionDecision::hold("budget<MIN_SPLIT", allocate_budget, purchase_budget);
    };

    ActionDecision {
        action,
        allocate_budget,
        purchase_budget,
        rule,
    }
}
