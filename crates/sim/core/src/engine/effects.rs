//! Statuses, stat modifiers, cooldowns and swapping on the simulation.

use tracing::{debug, warn};

use super::Simulation;
use crate::action::ActionSlot;
use crate::combat::ResistMod;
use crate::events::{Event, Owner};
use crate::state::{CharIndex, Frame, Key, RefreshPolicy, Status, StatusStack, TargetId, Timed};
use crate::stats::StatMod;

impl Simulation {
    // ===== statuses =====

    fn statuses(&self, owner: Owner) -> Option<&StatusStack> {
        match owner {
            Owner::Character(index) => self.party.get(index).map(|c| &c.statuses),
            Owner::Target(id) => self.target(id).map(|t| &t.statuses),
        }
    }

    fn statuses_mut(&mut self, owner: Owner) -> Option<&mut StatusStack> {
        match owner {
            Owner::Character(index) => self.party.get_mut(index).map(|c| &mut c.statuses),
            Owner::Target(id) => self.target_mut(id).map(|t| &mut t.statuses),
        }
    }

    /// Applies `key` to `owner` for `duration` frames (`u64::MAX` for
    /// permanent).
    ///
    /// An unknown or inactive key is created; an active key follows
    /// `policy`. Returns the resulting status, or `None` for an unknown owner.
    pub fn add_status(
        &mut self,
        owner: impl Into<Owner>,
        key: Key,
        duration: u64,
        policy: RefreshPolicy,
    ) -> Option<Status> {
        let owner = owner.into();
        let now = self.now;
        let Some(stack) = self.statuses_mut(owner) else {
            warn!(target: "sim_core::status", ?owner, key, "status for unknown owner");
            return None;
        };
        let lapsed = stack.take_lapsed(key, now);
        let status = stack.add(key, duration, policy, now);

        if lapsed.is_some() {
            debug!(target: "sim_core::status", frame = now.0, ?owner, key, "expired");
            self.emit(Event::StatusRemoved { owner, key });
        }

        debug!(
            target: "sim_core::status",
            frame = now.0,
            ?owner,
            key,
            expiry = %status.expires_at,
            stacks = status.stacks,
            "status applied"
        );
        self.emit(Event::StatusApplied {
            owner,
            key,
            expiry: status.expires_at,
            stacks: status.stacks,
        });
        Some(status)
    }

    /// Removes `key` from `owner` now. Returns whether it was active.
    ///
    /// A status that expired this frame but has not been pruned yet still
    /// publishes its `StatusRemoved`, so every removal is reported once.
    pub fn delete_status(&mut self, owner: impl Into<Owner>, key: Key) -> bool {
        let owner = owner.into();
        let now = self.now;
        let Some(removed) = self
            .statuses_mut(owner)
            .and_then(|stack| stack.remove(key))
        else {
            return false;
        };
        debug!(target: "sim_core::status", frame = now.0, ?owner, key, "status deleted");
        self.emit(Event::StatusRemoved { owner, key });
        removed.is_active_at(now)
    }

    pub fn is_status_active(&self, owner: impl Into<Owner>, key: Key) -> bool {
        self.statuses(owner.into())
            .is_some_and(|stack| stack.is_active(key, self.now))
    }

    pub fn status_expiry(&self, owner: impl Into<Owner>, key: Key) -> Option<Frame> {
        self.statuses(owner.into())
            .and_then(|stack| stack.expires_at(key, self.now))
    }

    /// Frames left on `key`, zero when inactive.
    pub fn status_remaining(&self, owner: impl Into<Owner>, key: Key) -> u64 {
        self.statuses(owner.into())
            .map_or(0, |stack| stack.remaining(key, self.now))
    }

    pub fn status_stacks(&self, owner: impl Into<Owner>, key: Key) -> u32 {
        self.statuses(owner.into())
            .map_or(0, |stack| stack.stacks(key, self.now))
    }

    // ===== stat modifiers =====

    /// Attaches `modifier` to a character; the same key replaces the earlier
    /// modifier. Returns the expiry frame.
    pub fn add_stat_mod(&mut self, index: CharIndex, modifier: StatMod) -> Option<Frame> {
        let now = self.now;
        let Some(c) = self.party.get_mut(index) else {
            warn!(target: "sim_core::status", %index, key = modifier.key, "stat mod for unknown character");
            return None;
        };
        let key = modifier.key;
        let lapsed = c.modifiers.take_lapsed(key, now);
        let expiry = c.modifiers.add(modifier, now);

        if lapsed.is_some() {
            self.emit(Event::StatModRemoved { owner: index, key });
        }
        debug!(target: "sim_core::status", frame = now.0, %index, key, expiry = %expiry, "stat mod added");
        self.emit(Event::StatModAdded {
            owner: index,
            key,
            expiry,
        });
        Some(expiry)
    }

    /// Removes a modifier now. Returns whether it was active.
    pub fn delete_stat_mod(&mut self, index: CharIndex, key: Key) -> bool {
        let now = self.now;
        let Some(removed) = self
            .party
            .get_mut(index)
            .and_then(|c| c.modifiers.remove(key))
        else {
            return false;
        };
        self.emit(Event::StatModRemoved { owner: index, key });
        removed.is_active_at(now)
    }

    pub fn is_stat_mod_active(&self, index: CharIndex, key: Key) -> bool {
        self.party
            .get(index)
            .is_some_and(|c| c.modifiers.is_active(key, self.now))
    }

    /// Attaches a resistance modifier to a target; the same key replaces.
    pub fn add_resist_mod(&mut self, target: TargetId, mut modifier: ResistMod) -> Option<Frame> {
        let now = self.now;
        let Some(t) = self.target_mut(target) else {
            warn!(target: "sim_core::status", target_id = %target, key = modifier.key, "resist mod for unknown target");
            return None;
        };
        modifier.expires_at = now + modifier.duration;
        let expiry = modifier.expires_at;
        t.resist_mods.insert(modifier);
        Some(expiry)
    }

    // ===== cooldowns =====

    /// Puts `slot` on cooldown for `duration` frames beginning `delay` frames
    /// from now. Returns the ready frame.
    pub fn start_cooldown(
        &mut self,
        index: CharIndex,
        slot: ActionSlot,
        duration: u64,
        delay: u64,
    ) -> Option<Frame> {
        let now = self.now;
        let Some(c) = self.party.get_mut(index) else {
            warn!(target: "sim_core::status", %index, ?slot, "cooldown for unknown character");
            return None;
        };
        let ready = c.cooldowns.start(slot, duration, delay, now);
        debug!(target: "sim_core::status", frame = now.0, %index, ?slot, ready = %ready, "cooldown started");
        Some(ready)
    }

    /// Shortens a running cooldown by `delta` frames, flooring at now.
    ///
    /// Reductions on a slot that is already ready change nothing and emit no
    /// event. Returns the new ready frame when something changed.
    pub fn reduce_cooldown(&mut self, index: CharIndex, slot: ActionSlot, delta: u64) -> Option<Frame> {
        let now = self.now;
        let c = self.party.get_mut(index)?;
        let before = c.cooldowns.ready_at(slot);
        let ready_at = c.cooldowns.reduce(slot, delta, now)?;

        self.emit(Event::CooldownReduced {
            char: index,
            slot,
            delta: before.since(ready_at),
            ready_at,
        });
        Some(ready_at)
    }

    /// Whether `slot` is off cooldown. Unknown characters are never ready.
    pub fn is_ready(&self, index: CharIndex, slot: ActionSlot) -> bool {
        self.party
            .get(index)
            .is_some_and(|c| c.cooldowns.is_ready(slot, self.now))
    }

    pub fn cooldown_remaining(&self, index: CharIndex, slot: ActionSlot) -> u64 {
        self.party
            .get(index)
            .map_or(0, |c| c.cooldowns.remaining(slot, self.now))
    }

    // ===== swapping =====

    /// Whether the party-wide swap lockout has passed.
    pub fn can_swap(&self) -> bool {
        self.now >= self.party.swap_ready_at
    }

    /// Puts `next` on field and starts the swap lockout.
    ///
    /// Does not wait for the lockout itself; callers check
    /// [`can_swap`](Self::can_swap). Returns `false` for an unknown index or
    /// the character already on field.
    pub fn swap(&mut self, next: CharIndex) -> bool {
        let prev = self.party.active();
        if prev == next || self.party.get(next).is_none() {
            return false;
        }
        self.party.set_active(next);
        self.party.swap_ready_at = self.now + self.config.swap_cooldown;

        debug!(target: "sim_core::status", frame = self.now.0, %prev, %next, "swap");
        self.emit(Event::CharacterSwapped { prev, next });
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::events::{Event, EventTag};
    use crate::state::{CharIndex, Frame, RefreshPolicy};
    use crate::stats::{StatKind, StatMod, StatSet, StatVector};
    use crate::{ActionSlot, Simulation};

    #[test]
    fn refresh_extends_and_restart_replaces() {
        let mut sim = Simulation::for_tests();
        let me = CharIndex(0);

        sim.add_status(me, "extend", 100, RefreshPolicy::Extend);
        sim.advance_by(10);
        sim.add_status(me, "extend", 30, RefreshPolicy::Extend);
        assert_eq!(sim.status_expiry(me, "extend"), Some(Frame(100)));

        sim.add_status(me, "restart", 100, RefreshPolicy::Restart);
        sim.advance_by(10);
        sim.add_status(me, "restart", 30, RefreshPolicy::Restart);
        assert_eq!(sim.status_expiry(me, "restart"), Some(Frame(50)));
    }

    #[test]
    fn status_expires_when_clock_reaches_expiry() {
        let mut sim = Simulation::for_tests();
        let removed = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&removed);
        sim.subscribe(EventTag::StatusRemoved, "log", move |sim, _| {
            r.borrow_mut().push(sim.now());
            false
        });

        sim.add_status(CharIndex(0), "buff", 20, RefreshPolicy::Extend);
        sim.advance_by(19);
        assert!(sim.is_status_active(CharIndex(0), "buff"));
        sim.advance();
        assert!(!sim.is_status_active(CharIndex(0), "buff"));
        assert_eq!(*removed.borrow(), vec![Frame(20)]);
    }

    #[test]
    fn deleting_inactive_status_is_silent() {
        let mut sim = Simulation::for_tests();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        sim.subscribe(EventTag::StatusRemoved, "log", move |_, _| {
            *c.borrow_mut() += 1;
            false
        });
        assert!(!sim.delete_status(CharIndex(0), "missing"));
        sim.add_status(CharIndex(0), "buff", 20, RefreshPolicy::Extend);
        assert!(sim.delete_status(CharIndex(0), "buff"));
        assert_eq!(*count.borrow(), 1);
    }

    fn removal_log(sim: &mut Simulation) -> Rc<RefCell<Vec<(Event, Frame)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in [EventTag::StatusRemoved, EventTag::StatModRemoved] {
            let l = Rc::clone(&log);
            sim.subscribe(tag, "removals", move |sim, event| {
                l.borrow_mut().push((event.clone(), sim.now()));
                false
            });
        }
        log
    }

    #[test]
    fn deleting_on_the_expiry_frame_still_reports_removal() {
        let mut sim = Simulation::for_tests();
        let me = CharIndex(0);
        let log = removal_log(&mut sim);

        sim.add_status(me, "buff", 10, RefreshPolicy::Extend);
        sim.schedule(10, move |sim| {
            assert!(!sim.delete_status(me, "buff"));
        });
        sim.advance_by(20);

        assert_eq!(
            *log.borrow(),
            vec![(
                Event::StatusRemoved {
                    owner: me.into(),
                    key: "buff",
                },
                Frame(10)
            )]
        );
    }

    #[test]
    fn reapplying_on_the_expiry_frame_reports_the_lapsed_entry() {
        let mut sim = Simulation::for_tests();
        let me = CharIndex(0);
        let log = removal_log(&mut sim);

        sim.add_status(me, "buff", 10, RefreshPolicy::Extend);
        sim.add_stat_mod(
            me,
            StatMod::constant("mod", 10, StatSet::ATK_P, StatVector::ZERO.with(StatKind::AtkP, 0.1)),
        );
        sim.schedule(10, move |sim| {
            sim.add_status(me, "buff", 10, RefreshPolicy::Extend);
            sim.add_stat_mod(
                me,
                StatMod::constant("mod", 10, StatSet::ATK_P, StatVector::ZERO.with(StatKind::AtkP, 0.1)),
            );
        });
        sim.advance_by(10);

        assert_eq!(log.borrow().len(), 2);
        assert!(sim.is_status_active(me, "buff"));
        assert!(sim.is_stat_mod_active(me, "mod"));

        sim.advance_by(10);
        assert_eq!(log.borrow().len(), 4);
        assert!(log.borrow().iter().all(|(_, frame)| frame.0 == 10 || frame.0 == 20));
    }

    #[test]
    fn stat_query_sums_active_modifiers() {
        let mut sim = Simulation::for_tests();
        let me = CharIndex(0);
        let base = sim.stat(me, StatKind::AtkP);

        sim.add_stat_mod(
            me,
            StatMod::constant("a", 30, StatSet::ATK_P, StatVector::ZERO.with(StatKind::AtkP, 0.2)),
        );
        sim.add_stat_mod(
            me,
            StatMod::constant("b", 60, StatSet::ATK_P, StatVector::ZERO.with(StatKind::AtkP, 0.1)),
        );
        assert!((sim.stat(me, StatKind::AtkP) - (base + 0.3)).abs() < 1e-9);

        sim.advance_by(30);
        assert!((sim.stat(me, StatKind::AtkP) - (base + 0.1)).abs() < 1e-9);
        sim.advance_by(30);
        assert!((sim.stat(me, StatKind::AtkP) - base).abs() < 1e-9);
    }

    #[test]
    fn functional_modifier_is_reevaluated_each_query() {
        let mut sim = Simulation::for_tests();
        let me = CharIndex(0);
        sim.add_stat_mod(
            me,
            StatMod::permanent("while-buffed", StatSet::CR, |ctx| {
                ctx.statuses
                    .is_active("buffed", ctx.now)
                    .then(|| StatVector::ZERO.with(StatKind::Cr, 0.5))
            }),
        );

        assert_eq!(sim.stat(me, StatKind::Cr), 0.0);
        sim.add_status(me, "buffed", 10, RefreshPolicy::Extend);
        assert_eq!(sim.stat(me, StatKind::Cr), 0.5);
    }

    #[test]
    fn cooldown_reduction_floors_and_reports_actual_delta() {
        let mut sim = Simulation::for_tests();
        let me = CharIndex(0);
        let events = Rc::new(RefCell::new(Vec::new()));
        let e = Rc::clone(&events);
        sim.subscribe(EventTag::CooldownReduced, "log", move |_, event| {
            e.borrow_mut().push(event.clone());
            false
        });

        assert_eq!(sim.start_cooldown(me, ActionSlot::Skill, 100, 20), Some(Frame(120)));
        sim.advance_by(10);
        assert_eq!(sim.reduce_cooldown(me, ActionSlot::Skill, 90), Some(Frame(30)));
        assert_eq!(sim.reduce_cooldown(me, ActionSlot::Skill, 500), Some(Frame(10)));
        assert!(sim.is_ready(me, ActionSlot::Skill));
        assert_eq!(sim.reduce_cooldown(me, ActionSlot::Skill, 5), None);

        assert_eq!(
            *events.borrow(),
            vec![
                Event::CooldownReduced {
                    char: me,
                    slot: ActionSlot::Skill,
                    delta: 90,
                    ready_at: Frame(30),
                },
                Event::CooldownReduced {
                    char: me,
                    slot: ActionSlot::Skill,
                    delta: 20,
                    ready_at: Frame(10),
                },
            ]
        );
    }

    #[test]
    fn unknown_character_is_ignored() {
        let mut sim = Simulation::for_tests();
        assert!(sim.add_status(CharIndex(9), "x", 10, RefreshPolicy::Extend).is_none());
        assert!(sim.start_cooldown(CharIndex(9), ActionSlot::Skill, 10, 0).is_none());
        assert!(!sim.is_ready(CharIndex(9), ActionSlot::Skill));
        assert!(!sim.swap(CharIndex(9)));
    }
}
