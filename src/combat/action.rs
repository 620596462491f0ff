//! Outbound unit commands

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::UnitTag;
use crate::units::AbilityId;

/// What a command is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionTarget {
    Point(Vec2),
    Unit(UnitTag),
}

/// One command for one unit; immutable once produced
///
/// Group-level commands have no actor yet. The per-unit layer stamps the
/// actor before the command leaves the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatAction {
    pub actor: Option<UnitTag>,
    pub target: ActionTarget,
    /// Attack-move / attack-unit rather than a plain move
    pub is_attack: bool,
    pub ability: Option<AbilityId>,
}

impl CombatAction {
    pub fn move_to(point: Vec2) -> Self {
        Self {
            actor: None,
            target: ActionTarget::Point(point),
            is_attack: false,
            ability: None,
        }
    }

    pub fn attack_move(point: Vec2) -> Self {
        Self {
            actor: None,
            target: ActionTarget::Point(point),
            is_attack: true,
            ability: None,
        }
    }

    pub fn attack_unit(tag: UnitTag) -> Self {
        Self {
            actor: None,
            target: ActionTarget::Unit(tag),
            is_attack: true,
            ability: None,
        }
    }

    pub fn ability(ability: AbilityId, target: ActionTarget) -> Self {
        Self {
            actor: None,
            target,
            is_attack: false,
            ability: Some(ability),
        }
    }

    pub fn with_actor(mut self, tag: UnitTag) -> Self {
        self.actor = Some(tag);
        self
    }

    /// Target point, if the command is aimed at a point
    pub fn point(&self) -> Option<Vec2> {
        match self.target {
            ActionTarget::Point(p) => Some(p),
            ActionTarget::Unit(_) => None,
        }
    }

    /// Target unit, if the command is aimed at a unit
    pub fn unit(&self) -> Option<UnitTag> {
        match self.target {
            ActionTarget::Unit(tag) => Some(tag),
            ActionTarget::Point(_) => None,
        }
    }

    /// Plain move with no attack and no ability
    pub fn is_move(&self) -> bool {
        !self.is_attack && self.ability.is_none()
    }
}
