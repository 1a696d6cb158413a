//! The simulation context and its frame loop.
//!
//! A [`Simulation`] owns every piece of mutable state of one trial: clock,
//! scheduled tasks, subscribers, pending attacks, party and targets. Scripts
//! receive `&mut Simulation` in every callback, so there is no global state
//! and no locking.
//!
//! # Frame order
//!
//! [`Simulation::advance`] moves the clock one frame and then runs, in order:
//!
//! 1. tasks due at the new frame (FIFO),
//! 2. attacks due at the new frame (FIFO),
//! 3. expiry of statuses, stat modifiers and resist modifiers,
//! 4. publication of the kernel events buffered by phases 1-3, until the
//!    outbox is empty.
//!
//! Kernel events raised outside `advance` (from an action handler, say) are
//! delivered immediately. Kernel events raised by a running handler are
//! queued behind the event being delivered, both inside and outside
//! `advance`, so a cascade is delivered in the same order whichever phase
//! started it. Events published explicitly with [`Simulation::publish`] are
//! always delivered immediately.

mod effects;
pub(crate) mod queue;
mod tasks;

pub use tasks::{Task, TaskQueue};

use std::borrow::Cow;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::combat::{CombatState, IcdTable, Target};
use crate::config::SimConfig;
use crate::env::SimRng;
use crate::error::BuildError;
use crate::events::{Event, EventBus, EventTag, Owner};
use crate::party::{Character, CharacterProfile, Party};
use crate::state::{CharIndex, Frame, Position, TargetId};
use crate::stats::{Snapshot, StatKind, StatVector};

pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) now: Frame,
    seed: u64,
    pub(crate) tasks: TaskQueue,
    pub(crate) bus: EventBus,
    pub(crate) combat: CombatState,
    pub(crate) party: Party,
    pub(crate) rng: SimRng,
    outbox: VecDeque<Event>,
    advancing: bool,
    /// Depth of nested deliveries currently running.
    dispatching: u32,
    delivered: u64,
}

impl Simulation {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    // ===== clock =====

    pub fn now(&self) -> Frame {
        self.now
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Moves the clock one frame forward and runs the frame phases.
    ///
    /// Calling this from inside a task, callback or handler is refused with a
    /// warning.
    pub fn advance(&mut self) {
        if self.advancing {
            warn!(target: "sim_core::tasks", frame = self.now.0, "refused re-entrant advance");
            return;
        }
        self.advancing = true;
        self.now = self.now.next();
        let now = self.now;

        let due = self.tasks.take_due(now);
        if !due.is_empty() {
            trace!(target: "sim_core::tasks", frame = now.0, count = due.len(), "running tasks");
        }
        for task in due {
            task(self);
        }

        self.resolve_due_attacks();
        self.expire_effects();

        while let Some(event) = self.outbox.pop_front() {
            self.dispatch(&event);
        }
        self.advancing = false;
    }

    pub fn advance_by(&mut self, frames: u64) {
        for _ in 0..frames {
            self.advance();
        }
    }

    /// Advances until `now == frame`. Does nothing for frames in the past.
    pub fn advance_to(&mut self, frame: Frame) {
        while self.now < frame {
            self.advance();
        }
    }

    /// True while [`advance`](Self::advance) is running.
    pub fn is_advancing(&self) -> bool {
        self.advancing
    }

    // ===== scheduler =====

    /// Runs `task` at `now + delay`. A delay of zero means the next frame.
    pub fn schedule(&mut self, delay: u64, task: impl FnOnce(&mut Simulation) + 'static) {
        let at = tasks::target_frame(self.now, delay);
        self.tasks.push(at, Box::new(task));
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    // ===== event bus =====

    /// Registers `handler` for `tag` under `id`; see [`EventBus::subscribe`].
    pub fn subscribe(
        &mut self,
        tag: EventTag,
        id: impl Into<Cow<'static, str>>,
        handler: impl Fn(&mut Simulation, &Event) -> bool + 'static,
    ) -> bool {
        self.bus.subscribe(tag, id, Rc::new(handler))
    }

    pub fn unsubscribe(&mut self, tag: EventTag, id: &str) -> bool {
        self.bus.unsubscribe(tag, id)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Delivers `event` synchronously to the current subscribers of its tag.
    pub fn publish(&mut self, event: Event) {
        self.dispatch(&event);
        self.flush_outbox();
    }

    /// Number of events delivered so far.
    pub fn events_delivered(&self) -> u64 {
        self.delivered
    }

    /// Kernel-originated event: buffered while advancing or delivering,
    /// immediate otherwise.
    pub(crate) fn emit(&mut self, event: Event) {
        self.outbox.push_back(event);
        self.flush_outbox();
    }

    /// Drains the outbox unless an outer `advance` or delivery will.
    fn flush_outbox(&mut self) {
        if self.advancing || self.dispatching > 0 {
            return;
        }
        while let Some(event) = self.outbox.pop_front() {
            self.dispatch(&event);
        }
    }

    fn dispatch(&mut self, event: &Event) {
        let tag = event.tag();
        let subscribers = self.bus.snapshot(tag);
        self.delivered += 1;
        trace!(target: "sim_core::events", ?tag, subscribers = subscribers.len(), "dispatch");

        self.dispatching += 1;
        for (id, handler) in subscribers {
            if handler(self, event) {
                self.bus.remove_if_same(tag, &id, &handler);
            }
        }
        self.dispatching -= 1;
    }

    // ===== party and stats =====

    pub fn party(&self) -> &Party {
        &self.party
    }

    pub fn active(&self) -> CharIndex {
        self.party.active()
    }

    pub fn character(&self, index: CharIndex) -> Option<&Character> {
        self.party.get(index)
    }

    /// Position of the on-field character.
    pub fn player_position(&self) -> Position {
        self.party.position
    }

    /// Live value of one stat: base plus active modifiers.
    pub fn stat(&self, index: CharIndex, kind: StatKind) -> f64 {
        match self.party.get(index) {
            Some(c) => c.stat(kind, self.now),
            None => {
                warn!(target: "sim_core::status", %index, "stat query for unknown character");
                0.0
            }
        }
    }

    pub fn stats(&self, index: CharIndex) -> StatVector {
        self.party
            .get(index)
            .map(|c| c.stats(self.now))
            .unwrap_or_default()
    }

    /// Frozen copy of a character's stats for attacks queued now.
    pub fn snapshot(&self, index: CharIndex) -> Snapshot {
        match self.party.get(index) {
            Some(c) => c.snapshot(self.now),
            None => {
                warn!(target: "sim_core::combat", %index, "snapshot of unknown character");
                Snapshot::new(index, self.config.character_level, StatVector::ZERO)
            }
        }
    }

    // ===== targets =====

    pub fn targets(&self) -> &[Target] {
        &self.combat.targets
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.combat.targets.iter().find(|t| t.id == id)
    }

    pub(crate) fn target_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.combat.targets.iter_mut().find(|t| t.id == id)
    }

    /// Adds a target mid-fight.
    pub fn add_target(&mut self, target: Target) {
        debug!(target: "sim_core::combat", id = %target.id, "target added");
        self.combat.targets.push(target);
    }

    pub fn icd_table_mut(&mut self) -> &mut IcdTable {
        &mut self.combat.icd_table
    }

    pub fn rng(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    /// Expires statuses and modifiers whose expiry is at or before `now`.
    ///
    /// Everything is removed first; the removal events go out afterwards,
    /// so subscribers observe the post-expiry state.
    fn expire_effects(&mut self) {
        let now = self.now;
        let mut removed = Vec::new();

        for c in self.party.iter_mut() {
            for status in c.statuses.expire(now) {
                removed.push(Event::StatusRemoved {
                    owner: Owner::Character(c.index),
                    key: status.key,
                });
            }
            for key in c.modifiers.expire(now) {
                removed.push(Event::StatModRemoved {
                    owner: c.index,
                    key,
                });
            }
        }
        for t in self.combat.targets.iter_mut() {
            for status in t.statuses.expire(now) {
                removed.push(Event::StatusRemoved {
                    owner: Owner::Target(t.id),
                    key: status.key,
                });
            }
            t.resist_mods.expire(now);
        }

        for event in removed {
            debug!(target: "sim_core::status", frame = now.0, ?event, "expired");
            self.emit(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        use crate::stats::Element;

        let profile = CharacterProfile::new("tester", Element::Pyro, 60.0).with_stats(
            StatVector::ZERO
                .with(StatKind::BaseAtk, 1000.0)
                .with(StatKind::Cr, 0.0),
        );
        Self::builder()
            .character(profile)
            .target(Target::new(TargetId(1), 90))
            .build()
            .expect("test simulation")
    }
}

/// Assembles a [`Simulation`], validating the party before the clock starts.
pub struct SimulationBuilder {
    config: SimConfig,
    seed: u64,
    profiles: Vec<CharacterProfile>,
    targets: Vec<Target>,
    icd_table: Option<IcdTable>,
    active: CharIndex,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self {
            config: SimConfig::default(),
            seed: 0,
            profiles: Vec::new(),
            targets: Vec::new(),
            icd_table: None,
            active: CharIndex(0),
        }
    }

    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn character(mut self, profile: CharacterProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    pub fn characters(mut self, profiles: impl IntoIterator<Item = CharacterProfile>) -> Self {
        self.profiles.extend(profiles);
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    pub fn targets(mut self, targets: impl IntoIterator<Item = Target>) -> Self {
        self.targets.extend(targets);
        self
    }

    /// Replaces the default ICD table.
    pub fn icd_table(mut self, table: IcdTable) -> Self {
        self.icd_table = Some(table);
        self
    }

    /// Character on field at frame 0.
    pub fn active(mut self, index: CharIndex) -> Self {
        self.active = index;
        self
    }

    pub fn build(self) -> Result<Simulation, BuildError> {
        let party = Party::new(self.profiles, self.active, &self.config)?;
        let icd_table = self
            .icd_table
            .unwrap_or_else(|| IcdTable::with_defaults(&self.config));

        debug!(
            target: "sim_core::tasks",
            seed = self.seed,
            characters = party.len(),
            targets = self.targets.len(),
            "simulation built"
        );

        Ok(Simulation {
            now: Frame::ZERO,
            seed: self.seed,
            tasks: TaskQueue::new(),
            bus: EventBus::new(),
            combat: CombatState::new(self.targets, icd_table),
            party,
            rng: SimRng::new(self.seed),
            outbox: VecDeque::new(),
            advancing: false,
            dispatching: 0,
            delivered: 0,
            config: self.config,
        })
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::state::{Key, RefreshPolicy};

    #[test]
    fn buffered_events_keep_phase_order() {
        let mut sim = Simulation::for_tests();
        sim.add_status(CharIndex(0), "short", 5, RefreshPolicy::Extend);

        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in [EventTag::StatusApplied, EventTag::StatusRemoved] {
            let l = Rc::clone(&log);
            sim.subscribe(tag, "log", move |sim, event| {
                l.borrow_mut().push((event.tag(), sim.now()));
                false
            });
        }
        sim.schedule(5, |sim| {
            sim.add_status(CharIndex(0), "other", 30, RefreshPolicy::Extend);
        });

        sim.advance_by(4);
        assert!(log.borrow().is_empty());
        sim.advance();
        assert_eq!(
            *log.borrow(),
            vec![
                (EventTag::StatusApplied, Frame(5)),
                (EventTag::StatusRemoved, Frame(5)),
            ]
        );
        assert!(!sim.is_status_active(CharIndex(0), "short"));
    }

    #[test]
    fn kernel_events_outside_advance_are_immediate() {
        let mut sim = Simulation::for_tests();
        let seen = Rc::new(RefCell::new(0));
        let s = Rc::clone(&seen);
        sim.subscribe(EventTag::StatusApplied, "log", move |_, _| {
            *s.borrow_mut() += 1;
            false
        });
        sim.add_status(CharIndex(0), "buff", 10, RefreshPolicy::Extend);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn handler_caused_events_are_delivered_in_the_same_frame() {
        let mut sim = Simulation::for_tests();
        let frames = Rc::new(RefCell::new(Vec::new()));

        sim.subscribe(EventTag::StatusApplied, "chain", |sim, event| {
            if let Event::StatusApplied { key: "first", .. } = event {
                sim.add_status(CharIndex(0), "second", 30, RefreshPolicy::Extend);
            }
            false
        });
        let f = Rc::clone(&frames);
        sim.subscribe(EventTag::StatusApplied, "log", move |sim, event| {
            if let Event::StatusApplied { key, .. } = event {
                f.borrow_mut().push((*key, sim.now()));
            }
            false
        });

        sim.schedule(3, |sim| {
            sim.add_status(CharIndex(0), "first", 30, RefreshPolicy::Extend);
        });
        sim.advance_by(3);
        assert_eq!(*frames.borrow(), vec![("first", Frame(3)), ("second", Frame(3))]);
    }

    fn cascade_log(sim: &mut Simulation) -> Rc<RefCell<Vec<Key>>> {
        sim.subscribe(EventTag::StatusApplied, "chain", |sim, event| {
            if let Event::StatusApplied { key: "first", .. } = event {
                sim.add_status(CharIndex(0), "second", 30, RefreshPolicy::Extend);
            }
            false
        });
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        sim.subscribe(EventTag::StatusApplied, "log", move |_, event| {
            if let Event::StatusApplied { key, .. } = event {
                l.borrow_mut().push(*key);
            }
            false
        });
        log
    }

    #[test]
    fn handler_cascade_is_the_same_inside_and_outside_advance() {
        let mut outside = Simulation::for_tests();
        let outside_log = cascade_log(&mut outside);
        outside.add_status(CharIndex(0), "first", 30, RefreshPolicy::Extend);

        let mut inside = Simulation::for_tests();
        let inside_log = cascade_log(&mut inside);
        inside.schedule(0, |sim| {
            sim.add_status(CharIndex(0), "first", 30, RefreshPolicy::Extend);
        });
        inside.advance();

        assert_eq!(*outside_log.borrow(), vec!["first", "second"]);
        assert_eq!(*outside_log.borrow(), *inside_log.borrow());
    }

    #[test]
    fn builder_rejects_empty_party() {
        assert_eq!(
            Simulation::builder().build().err(),
            Some(BuildError::EmptyParty)
        );
    }

    #[test]
    fn advance_to_ignores_past_frames() {
        let mut sim = Simulation::for_tests();
        sim.advance_to(Frame(10));
        sim.advance_to(Frame(5));
        assert_eq!(sim.now(), Frame(10));
    }
}
