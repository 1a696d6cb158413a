//! Trials: one complete run of a party against its targets.
//!
//! A [`Trial`] owns its [`Simulation`], the party's kits and the ordered
//! action list. [`Trial::run`] drives actions through the kits, advancing the
//! clock to honour animation frames, cooldowns and the swap lockout, and
//! collects damage and energy totals from the event bus.

mod recorder;

use tracing::{debug, info};

use crate::action::{ActionInfo, ActionParams, ActionSlot, CharacterKit};
use crate::engine::Simulation;
use crate::error::BuildError;
use crate::state::{CharIndex, Frame};

use recorder::Recorder;

/// One entry of the action list.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionStep {
    /// Perform `slot` as `character`, swapping to it first if needed.
    Act {
        character: CharIndex,
        slot: ActionSlot,
        params: ActionParams,
    },
    Swap { to: CharIndex },
    /// Idle for `frames` once the previous action can be queued after.
    Wait { frames: u64 },
}

impl ActionStep {
    pub fn act(character: CharIndex, slot: ActionSlot) -> Self {
        Self::Act {
            character,
            slot,
            params: ActionParams::default(),
        }
    }

    fn character(&self) -> Option<CharIndex> {
        match self {
            Self::Act { character, .. } => Some(*character),
            Self::Swap { to } => Some(*to),
            Self::Wait { .. } => None,
        }
    }
}

/// When a trial stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialLimits {
    /// Hard stop.
    pub duration_frames: u64,
    /// Stop early once every target with finite HP is defeated.
    pub stop_when_targets_defeated: bool,
}

impl TrialLimits {
    pub fn frames(duration_frames: u64) -> Self {
        Self {
            duration_frames,
            stop_when_targets_defeated: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialResult {
    pub seed: u64,
    pub frames: u64,
    pub total_damage: f64,
    /// Damage per simulated second.
    pub dps: f64,
    pub damage_by_char: Vec<f64>,
    /// Energy actually gained per character, after clamping.
    pub energy_by_char: Vec<f64>,
    pub particles: u32,
    pub hits: u64,
    /// Kernel events delivered.
    pub events: u64,
    /// SHA-256 over the ordered kernel event stream.
    pub fingerprint: String,
}

/// Builds independent trials; implemented by the content layer.
///
/// Trials hold single-threaded state, so sources hand out a fresh trial per
/// seed and the trial is built on the thread that runs it.
pub trait TrialSource: Send + Sync {
    fn build_trial(&self, seed: u64) -> Result<Trial, BuildError>;

    /// Label used in logs and reports.
    fn name(&self) -> &str {
        "trial"
    }
}

struct InFlight {
    started: Frame,
    info: ActionInfo,
}

pub struct Trial {
    sim: Simulation,
    kits: Vec<Box<dyn CharacterKit>>,
    steps: Vec<ActionStep>,
    limits: TrialLimits,
}

impl Trial {
    /// Validates kits and steps against the simulation's party.
    pub fn new(
        sim: Simulation,
        kits: Vec<Box<dyn CharacterKit>>,
        steps: Vec<ActionStep>,
        limits: TrialLimits,
    ) -> Result<Self, BuildError> {
        let party = sim.party().len();
        if kits.len() != party {
            return Err(BuildError::KitCountMismatch {
                characters: party,
                kits: kits.len(),
            });
        }
        if limits.duration_frames == 0 {
            return Err(BuildError::ZeroDuration);
        }
        for (step, action) in steps.iter().enumerate() {
            if let Some(index) = action.character()
                && index.0 >= party
            {
                return Err(BuildError::UnknownCharacter { step, index });
            }
        }
        Ok(Self {
            sim,
            kits,
            steps,
            limits,
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    /// Runs the action list to completion or until the limits stop it.
    pub fn run(mut self) -> TrialResult {
        let seed = self.sim.seed();
        info!(target: "sim_core::trial", seed, steps = self.steps.len(), "trial started");

        let recorder = Recorder::attach(&mut self.sim);
        for (i, kit) in self.kits.iter_mut().enumerate() {
            kit.init(&mut self.sim, CharIndex(i));
        }

        let steps = std::mem::take(&mut self.steps);
        let mut last: Option<InFlight> = None;
        for step in &steps {
            if self.finished() {
                break;
            }
            match step {
                ActionStep::Wait { frames } => {
                    if let Some(prev) = &last {
                        self.advance_until(prev.started + u64::from(prev.info.can_queue_after));
                    }
                    let until = self.sim.now() + *frames;
                    self.advance_until(until);
                }
                ActionStep::Swap { to } => self.swap_to(*to, &mut last),
                ActionStep::Act {
                    character,
                    slot: ActionSlot::Swap,
                    ..
                } => self.swap_to(*character, &mut last),
                ActionStep::Act {
                    character,
                    slot,
                    params,
                } => self.act(*character, *slot, params, &mut last),
            }
        }
        if let Some(prev) = &last {
            self.advance_until(prev.started + u64::from(prev.info.animation_length));
        }

        let totals = recorder.finish(&mut self.sim);
        let frames = self.sim.now().0;
        let seconds = self.sim.now().as_seconds();
        let dps = if seconds > 0.0 {
            totals.total_damage / seconds
        } else {
            0.0
        };

        info!(
            target: "sim_core::trial",
            seed,
            frames,
            total_damage = totals.total_damage,
            dps,
            "trial finished"
        );
        TrialResult {
            seed,
            frames,
            total_damage: totals.total_damage,
            dps,
            damage_by_char: totals.damage_by_char,
            energy_by_char: totals.energy_by_char,
            particles: totals.particles,
            hits: totals.hits,
            events: totals.events,
            fingerprint: totals.fingerprint,
        }
    }

    fn finished(&self) -> bool {
        if self.sim.now().0 >= self.limits.duration_frames {
            return true;
        }
        if !self.limits.stop_when_targets_defeated {
            return false;
        }
        let mut mortal = self.sim.targets().iter().filter(|t| t.hp.is_some()).peekable();
        mortal.peek().is_some() && mortal.all(|t| !t.is_alive())
    }

    /// Advances until `frame` or until the limits stop the trial.
    fn advance_until(&mut self, frame: Frame) {
        while self.sim.now() < frame && !self.finished() {
            self.sim.advance();
        }
    }

    /// Waits for the previous action to allow `next`.
    fn wait_for(&mut self, last: &Option<InFlight>, next: ActionSlot) {
        if let Some(prev) = last {
            self.advance_until(prev.started + u64::from(prev.info.frames_for(next)));
        }
    }

    fn swap_to(&mut self, to: CharIndex, last: &mut Option<InFlight>) {
        if self.sim.active() == to {
            return;
        }
        self.wait_for(last, ActionSlot::Swap);
        while !self.sim.can_swap() && !self.finished() {
            self.sim.advance();
        }
        if self.finished() {
            return;
        }
        self.sim.swap(to);
        *last = Some(InFlight {
            started: self.sim.now(),
            info: ActionInfo::new(self.sim.config().swap_frames),
        });
    }

    fn act(
        &mut self,
        character: CharIndex,
        slot: ActionSlot,
        params: &ActionParams,
        last: &mut Option<InFlight>,
    ) {
        self.swap_to(character, last);
        self.wait_for(last, slot);
        while !self.finished() && !self.kits[character.0].action_ready(&self.sim, character, slot) {
            self.sim.advance();
        }
        if self.finished() {
            return;
        }

        let started = self.sim.now();
        let info = self.kits[character.0].perform(&mut self.sim, slot, params);
        debug!(
            target: "sim_core::trial",
            frame = started.0,
            %character,
            slot = slot.as_str(),
            animation = info.animation_length,
            "action performed"
        );
        *last = Some(InFlight { started, info });
    }
}
