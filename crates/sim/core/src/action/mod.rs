//! Actions and the character-kit capability interface.
//!
//! The kernel never knows concrete characters. A kit implements
//! [`CharacterKit`] and drives the [`Simulation`] from its action handlers;
//! the trial driver only sees the [`ActionInfo`] each handler returns.

use arrayvec::ArrayVec;
use strum::{EnumCount, EnumIter, IntoStaticStr};

use crate::config::SimConfig;
use crate::engine::Simulation;
use crate::state::CharIndex;

/// Action a character can perform; also indexes per-character cooldowns.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumCount, EnumIter, IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ActionSlot {
    Attack,
    Charge,
    Skill,
    Burst,
    Dash,
    Jump,
    Swap,
}

impl ActionSlot {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Frame data returned by an action handler.
///
/// `animation_length` is the full animation; `can_queue_after` is the
/// earliest frame any follow-up may start. Specific follow-ups may start at
/// other points (animation cancels), recorded as per-slot overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionInfo {
    pub animation_length: u32,
    pub can_queue_after: u32,
    frames: ArrayVec<(ActionSlot, u32), { SimConfig::MAX_FRAME_OVERRIDES }>,
}

impl ActionInfo {
    pub fn new(animation_length: u32) -> Self {
        Self {
            animation_length,
            can_queue_after: animation_length,
            frames: ArrayVec::new(),
        }
    }

    pub fn with_can_queue_after(mut self, frames: u32) -> Self {
        self.can_queue_after = frames;
        self
    }

    /// Frames after which `next` may start. Overrides beyond capacity are
    /// dropped and fall back to the animation length.
    pub fn with_frames(mut self, next: ActionSlot, frames: u32) -> Self {
        if let Some(entry) = self.frames.iter_mut().find(|(slot, _)| *slot == next) {
            entry.1 = frames;
        } else {
            let _ = self.frames.try_push((next, frames));
        }
        self
    }

    /// Frames that must pass before `next` can start, never earlier than
    /// `can_queue_after`.
    pub fn frames_for(&self, next: ActionSlot) -> u32 {
        let frames = self
            .frames
            .iter()
            .find(|(slot, _)| *slot == next)
            .map(|(_, frames)| *frames)
            .unwrap_or(self.animation_length);
        frames.max(self.can_queue_after)
    }
}

/// Recognised per-action options, validated when a scenario is loaded.
///
/// Every option has a default, so an action with no options at all is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ActionParams {
    /// Number of hits for multi-hit skills.
    pub hits: Option<u32>,
    /// Upper bound on resource drops (amulets) a skill may create.
    pub max_amulets: Option<u32>,
    /// Frames before a created resource is picked up.
    pub amulet_delay: Option<u32>,
    /// Hold instead of tap.
    pub hold: bool,
}

impl ActionParams {
    pub fn hits_or(&self, default: u32) -> u32 {
        self.hits.unwrap_or(default)
    }
}

/// Capability interface implemented by every character kit.
///
/// Handlers mutate the simulation (queue attacks, add statuses, start
/// cooldowns) and return the action's frame data. They run between frames,
/// so events they cause are delivered immediately.
pub trait CharacterKit {
    /// Character key this kit implements.
    fn key(&self) -> &'static str;

    /// Called once before the first frame. Kits install passive subscriptions
    /// and permanent modifiers here.
    fn init(&mut self, _sim: &mut Simulation, _index: CharIndex) {}

    fn attack(&mut self, sim: &mut Simulation, params: &ActionParams) -> ActionInfo;

    fn charge(&mut self, sim: &mut Simulation, params: &ActionParams) -> ActionInfo {
        self.attack(sim, params)
    }

    fn skill(&mut self, sim: &mut Simulation, params: &ActionParams) -> ActionInfo;

    fn burst(&mut self, sim: &mut Simulation, params: &ActionParams) -> ActionInfo;

    fn dash(&mut self, _sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        ActionInfo::new(DASH_FRAMES)
    }

    fn jump(&mut self, _sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        ActionInfo::new(JUMP_FRAMES)
    }

    /// Whether `slot` can be used right now.
    ///
    /// Defaults to the slot's cooldown; bursts additionally need a full
    /// energy bar.
    fn action_ready(&self, sim: &Simulation, index: CharIndex, slot: ActionSlot) -> bool {
        if !sim.is_ready(index, slot) {
            return false;
        }
        match slot {
            ActionSlot::Burst => sim
                .character(index)
                .is_some_and(|c| c.energy >= c.energy_max),
            _ => true,
        }
    }

    /// Dispatches `slot` to its handler.
    fn perform(
        &mut self,
        sim: &mut Simulation,
        slot: ActionSlot,
        params: &ActionParams,
    ) -> ActionInfo {
        match slot {
            ActionSlot::Attack => self.attack(sim, params),
            ActionSlot::Charge => self.charge(sim, params),
            ActionSlot::Skill => self.skill(sim, params),
            ActionSlot::Burst => self.burst(sim, params),
            ActionSlot::Dash => self.dash(sim, params),
            ActionSlot::Jump => self.jump(sim, params),
            ActionSlot::Swap => ActionInfo::new(sim.config().swap_frames),
        }
    }
}

const DASH_FRAMES: u32 = 21;
const JUMP_FRAMES: u32 = 30;
