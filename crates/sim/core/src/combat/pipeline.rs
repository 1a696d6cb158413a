//! Queueing and resolving attacks on the simulation.

use tracing::{debug, trace};

use super::attack::{
    AttackCallback, AttackInfo, AttackPattern, CallbackContext, CallbackMode, HitResult,
    QueuedAttack,
};
use super::damage::calculate_damage;
use crate::engine::Simulation;
use crate::events::Event;
use crate::state::Frame;
use crate::stats::Snapshot;

impl Simulation {
    /// Queues an attack resolving `delay` frames from now (zero means the
    /// next frame) with an explicit snapshot.
    pub fn queue_attack(
        &mut self,
        info: AttackInfo,
        snapshot: Snapshot,
        pattern: AttackPattern,
        delay: u64,
        callbacks: Vec<AttackCallback>,
    ) -> Frame {
        let resolve_at = self.now + delay.max(1);
        trace!(
            target: "sim_core::combat",
            frame = self.now.0,
            abil = info.abil,
            resolve_at = resolve_at.0,
            "attack queued"
        );
        self.combat.pending.push(
            resolve_at,
            QueuedAttack {
                info,
                snapshot,
                pattern,
                resolve_at,
                callbacks,
            },
        );
        resolve_at
    }

    /// Queues an attack using the actor's stats as they are right now.
    pub fn queue_attack_live(
        &mut self,
        info: AttackInfo,
        pattern: AttackPattern,
        delay: u64,
        callbacks: Vec<AttackCallback>,
    ) -> Frame {
        let snapshot = self.snapshot(info.actor);
        self.queue_attack(info, snapshot, pattern, delay, callbacks)
    }

    pub fn pending_attacks(&self) -> usize {
        self.combat.pending.len()
    }

    pub(crate) fn resolve_due_attacks(&mut self) {
        for attack in self.combat.pending.take_due(self.now) {
            self.resolve_attack(attack);
        }
    }

    fn resolve_attack(&mut self, attack: QueuedAttack) {
        let now = self.now;
        let QueuedAttack {
            info,
            snapshot,
            pattern,
            callbacks,
            ..
        } = attack;

        let hit_indices: Vec<usize> = self
            .combat
            .targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_alive() && t.overlaps(&pattern))
            .map(|(i, _)| i)
            .collect();
        if hit_indices.is_empty() {
            debug!(target: "sim_core::combat", frame = now.0, abil = info.abil, "attack hit nothing");
            return;
        }

        // One ICD evaluation per attack instance, whatever the target count.
        let applied = self.combat.icd.check(
            info.actor,
            info.icd_tag,
            info.icd_group,
            now,
            &self.combat.icd_table,
        );

        let mut hits = Vec::with_capacity(hit_indices.len());
        for i in hit_indices {
            let crit = self.rng.chance(snapshot.crit_rate());
            let target = &mut self.combat.targets[i];
            let damage = calculate_damage(&info, &snapshot, target, now, crit);
            if applied {
                target.apply_element(info.element, info.durability);
            }
            let defeated = target.take_damage(damage);
            let hit = HitResult {
                target: target.id,
                damage,
                crit,
                applied,
            };

            debug!(
                target: "sim_core::combat",
                frame = now.0,
                actor = %info.actor,
                abil = info.abil,
                target_id = %hit.target,
                damage,
                crit,
                applied,
                "attack landed"
            );
            self.emit(Event::AttackLanded {
                actor: info.actor,
                target: hit.target,
                abil: info.abil,
                element: info.element,
                damage,
                crit,
                applied,
            });
            if defeated {
                self.emit(Event::TargetDefeated {
                    target: hit.target,
                    by: info.actor,
                });
            }
            hits.push(hit);
        }

        for callback in &callbacks {
            match callback.mode {
                CallbackMode::Once => {
                    let ctx = CallbackContext {
                        info: &info,
                        resolved_at: now,
                        hits: &hits,
                    };
                    callback.fire(self, &ctx);
                }
                CallbackMode::PerTarget => {
                    for hit in &hits {
                        let ctx = CallbackContext {
                            info: &info,
                            resolved_at: now,
                            hits: std::slice::from_ref(hit),
                        };
                        callback.fire(self, &ctx);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::combat::{AttackCallback, AttackInfo, AttackPattern, IcdGroup, IcdTag, ProcLimit, Target};
    use crate::events::{Event, EventTag};
    use crate::state::{CharIndex, Frame, Position, TargetId};
    use crate::stats::{Element, StatKind};
    use crate::Simulation;

    fn three_targets() -> Simulation {
        let mut sim = Simulation::for_tests();
        sim.add_target(Target::new(TargetId(2), 90).at(Position::new(1.0, 0.0), 0.5));
        sim.add_target(Target::new(TargetId(3), 90).at(Position::new(-1.0, 0.0), 0.5));
        sim
    }

    fn skill() -> AttackInfo {
        AttackInfo::new(CharIndex(0), "skill")
            .icd(IcdTag::ElementalArt, IcdGroup::Default)
            .element(Element::Pyro, 1.0)
    }

    fn counter() -> (Rc<RefCell<u32>>, AttackCallback, AttackCallback) {
        let count = Rc::new(RefCell::new(0));
        let once = {
            let c = Rc::clone(&count);
            AttackCallback::once(move |_, _| *c.borrow_mut() += 1)
        };
        let per = {
            let c = Rc::clone(&count);
            AttackCallback::per_target(move |_, _| *c.borrow_mut() += 100)
        };
        (count, once, per)
    }

    #[test]
    fn once_callbacks_fire_once_regardless_of_target_count() {
        let mut sim = three_targets();
        let (count, once, per) = counter();
        sim.queue_attack_live(
            skill(),
            AttackPattern::circle(Position::ORIGIN, 5.0),
            10,
            vec![once, per],
        );
        sim.advance_by(10);
        assert_eq!(*count.borrow(), 1 + 300);
    }

    #[test]
    fn total_miss_fires_nothing() {
        let mut sim = three_targets();
        let (count, once, per) = counter();
        let landed = Rc::new(RefCell::new(0));
        let l = Rc::clone(&landed);
        sim.subscribe(EventTag::AttackLanded, "log", move |_, _| {
            *l.borrow_mut() += 1;
            false
        });
        sim.queue_attack_live(
            skill(),
            AttackPattern::circle(Position::new(50.0, 50.0), 1.0),
            0,
            vec![once, per],
        );
        sim.advance();
        assert_eq!(*count.borrow(), 0);
        assert_eq!(*landed.borrow(), 0);
        assert_eq!(sim.pending_attacks(), 0);
    }

    #[test]
    fn attack_resolves_exactly_at_its_frame() {
        let mut sim = Simulation::for_tests();
        let frames = Rc::new(RefCell::new(Vec::new()));
        let f = Rc::clone(&frames);
        sim.subscribe(EventTag::AttackLanded, "log", move |sim, _| {
            f.borrow_mut().push(sim.now());
            false
        });
        let at = sim.queue_attack_live(skill(), AttackPattern::single(TargetId(1)), 7, vec![]);
        assert_eq!(at, Frame(7));
        sim.advance_by(20);
        assert_eq!(*frames.borrow(), vec![Frame(7)]);
    }

    #[test]
    fn snapshot_freezes_stats_at_queue_time() {
        let mut sim = Simulation::for_tests();
        let damage = Rc::new(RefCell::new(Vec::new()));
        let d = Rc::clone(&damage);
        sim.subscribe(EventTag::AttackLanded, "log", move |_, event| {
            if let Event::AttackLanded { damage, .. } = event {
                d.borrow_mut().push(*damage);
            }
            false
        });

        let info = AttackInfo::new(CharIndex(0), "normal");
        sim.queue_attack_live(info.clone(), AttackPattern::single(TargetId(1)), 5, vec![]);
        sim.add_stat_mod(
            CharIndex(0),
            crate::StatMod::constant(
                "atk",
                u64::MAX,
                crate::StatSet::ATK_P,
                crate::StatVector::ZERO.with(StatKind::AtkP, 1.0),
            ),
        );
        sim.queue_attack_live(info, AttackPattern::single(TargetId(1)), 5, vec![]);
        sim.advance_by(5);

        let damage = damage.borrow();
        assert_eq!(damage.len(), 2);
        assert!((damage[1] - damage[0] * 2.0).abs() < 1e-6);
    }

    #[test]
    fn icd_suppresses_element_within_window() {
        let mut sim = Simulation::for_tests();
        let applied = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&applied);
        sim.subscribe(EventTag::AttackLanded, "log", move |_, event| {
            if let Event::AttackLanded { applied, .. } = event {
                a.borrow_mut().push(*applied);
            }
            false
        });
        for delay in [10, 20, 30] {
            sim.queue_attack_live(skill(), AttackPattern::single(TargetId(1)), delay, vec![]);
        }
        sim.queue_attack_live(skill(), AttackPattern::single(TargetId(1)), 200, vec![]);
        sim.advance_by(200);
        assert_eq!(*applied.borrow(), vec![true, false, false, true]);
    }

    #[test]
    fn shared_limit_caps_callbacks_across_attacks() {
        let mut sim = Simulation::for_tests();
        let limit = ProcLimit::once();
        let count = Rc::new(RefCell::new(0));
        for delay in [5, 10, 15] {
            let c = Rc::clone(&count);
            let cb = AttackCallback::once(move |_, _| *c.borrow_mut() += 1).with_limit(limit.clone());
            sim.queue_attack_live(skill(), AttackPattern::single(TargetId(1)), delay, vec![cb]);
        }
        sim.advance_by(15);
        assert_eq!(*count.borrow(), 1);
        assert!(limit.is_exhausted());
    }

    #[test]
    fn defeated_targets_stop_taking_hits() {
        let mut sim = Simulation::builder()
            .character(crate::CharacterProfile::new("a", Element::Pyro, 60.0).with_stats(
                crate::StatVector::ZERO.with(StatKind::BaseAtk, 1000.0),
            ))
            .target(Target::new(TargetId(1), 90).with_hp(100.0))
            .build()
            .unwrap();
        let defeated = Rc::new(RefCell::new(0));
        let d = Rc::clone(&defeated);
        sim.subscribe(EventTag::TargetDefeated, "log", move |_, _| {
            *d.borrow_mut() += 1;
            false
        });
        sim.queue_attack_live(skill(), AttackPattern::single(TargetId(1)), 1, vec![]);
        sim.queue_attack_live(skill(), AttackPattern::single(TargetId(1)), 2, vec![]);
        sim.advance_by(2);
        assert_eq!(*defeated.borrow(), 1);
        assert!(!sim.target(TargetId(1)).unwrap().is_alive());
    }

    #[test]
    fn attack_survives_actor_swapping_out() {
        let mut sim = Simulation::builder()
            .character(crate::CharacterProfile::new("a", Element::Pyro, 60.0))
            .character(crate::CharacterProfile::new("b", Element::Hydro, 60.0))
            .target(Target::new(TargetId(1), 90))
            .build()
            .unwrap();
        let landed = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&landed);
        sim.subscribe(EventTag::AttackLanded, "log", move |_, event| {
            if let Event::AttackLanded { actor, .. } = event {
                l.borrow_mut().push(*actor);
            }
            false
        });
        sim.queue_attack_live(skill(), AttackPattern::single(TargetId(1)), 30, vec![]);
        sim.advance_by(5);
        assert!(sim.swap(CharIndex(1)));
        sim.advance_by(25);
        assert_eq!(*landed.borrow(), vec![CharIndex(0)]);
    }
}
