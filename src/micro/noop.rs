//! Strategy for units the engine should leave alone

use crate::combat::CombatAction;
use crate::micro::{MicroContext, MicroStep};
use crate::units::Unit;

/// Issues nothing; units keep whatever order they already have
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMicro;

impl MicroStep for NoMicro {
    fn group_solve(
        &mut self,
        _ctx: &mut MicroContext<'_>,
        _units: &[&Unit],
        current: CombatAction,
    ) -> CombatAction {
        current
    }

    fn unit_solve(
        &mut self,
        _ctx: &mut MicroContext<'_>,
        _unit: &Unit,
        _current: CombatAction,
    ) -> Option<CombatAction> {
        None
    }
}
