//! Damage formula.
//!
//! ```text
//! base      = mult × total_atk(snapshot)
//! bonus     = 1 + damage_bonus(snapshot, element)
//! crit      = crit ? 1 + crit_damage(snapshot) : 1
//! damage    = base × bonus × crit × def_mult × res_mult
//! ```
//!
//! Attacker values come from the snapshot; defense and resistance are read
//! live from the target at resolution time.

use super::attack::AttackInfo;
use super::target::Target;
use crate::state::Frame;
use crate::stats::Snapshot;

/// Level-based defense multiplier.
pub fn defense_multiplier(attacker_level: u32, target_level: u32) -> f64 {
    let attacker = attacker_level as f64 + 100.0;
    let target = target_level as f64 + 100.0;
    attacker / (attacker + target)
}

/// Piecewise resistance multiplier.
pub fn resistance_multiplier(resist: f64) -> f64 {
    if resist < 0.0 {
        1.0 - resist / 2.0
    } else if resist < 0.75 {
        1.0 - resist
    } else {
        1.0 / (4.0 * resist + 1.0)
    }
}

pub fn calculate_damage(
    info: &AttackInfo,
    snapshot: &Snapshot,
    target: &Target,
    now: Frame,
    crit: bool,
) -> f64 {
    let base = info.mult * snapshot.total_atk();
    let bonus = 1.0 + snapshot.damage_bonus(info.element);
    let crit_mult = if crit {
        1.0 + snapshot.crit_damage()
    } else {
        1.0
    };

    base * bonus
        * crit_mult
        * defense_multiplier(snapshot.level, target.level)
        * resistance_multiplier(target.resistance(info.element, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CharIndex, TargetId};
    use crate::stats::{Element, StatKind, StatVector};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn equal_levels_halve_damage() {
        assert!(approx(defense_multiplier(90, 90), 0.5));
    }

    #[test]
    fn resistance_branches() {
        assert!(approx(resistance_multiplier(-0.2), 1.1));
        assert!(approx(resistance_multiplier(0.1), 0.9));
        assert!(approx(resistance_multiplier(1.0), 0.2));
    }

    #[test]
    fn damage_uses_snapshot_and_live_resist() {
        let stats = StatVector::ZERO
            .with(StatKind::BaseAtk, 1000.0)
            .with(StatKind::PyroP, 0.5)
            .with(StatKind::Cd, 1.0);
        let snapshot = Snapshot::new(CharIndex(0), 90, stats);
        let info = AttackInfo::new(CharIndex(0), "test").element(Element::Pyro, 1.0);
        let target = Target::new(TargetId(1), 90).with_all_resist(0.0);

        let normal = calculate_damage(&info, &snapshot, &target, Frame(0), false);
        assert!(approx(normal, 1000.0 * 1.5 * 0.5));
        let crit = calculate_damage(&info, &snapshot, &target, Frame(0), true);
        assert!(approx(crit, normal * 2.0));
    }
}
