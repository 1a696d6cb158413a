/// Simulation constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Suppression window applied to [`IcdGroup::Default`](crate::IcdGroup::Default).
    pub default_icd_window: u64,
    /// Frames between a particle being generated and the party receiving it.
    pub particle_delay: u64,
    /// Frames a swap occupies before the next action can start.
    pub swap_frames: u32,
    /// Party-wide lockout between two swaps.
    pub swap_cooldown: u64,
    /// Share of particle energy received by off-field characters.
    pub off_field_energy_ratio: f64,
    /// Level used for characters whose profile does not specify one.
    pub character_level: u32,
}

impl SimConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of characters in a party.
    pub const MAX_PARTY_SIZE: usize = 4;
    /// Maximum number of per-action frame overrides an [`ActionInfo`](crate::ActionInfo) carries.
    pub const MAX_FRAME_OVERRIDES: usize = 8;

    /// Simulated frames per second.
    pub const FRAMES_PER_SECOND: u64 = 60;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ICD_WINDOW: u64 = 150;
    pub const DEFAULT_PARTICLE_DELAY: u64 = 100;
    pub const DEFAULT_SWAP_FRAMES: u32 = 1;
    pub const DEFAULT_SWAP_COOLDOWN: u64 = 60;
    pub const DEFAULT_OFF_FIELD_ENERGY_RATIO: f64 = 0.6;
    pub const DEFAULT_CHARACTER_LEVEL: u32 = 90;

    pub fn new() -> Self {
        Self {
            default_icd_window: Self::DEFAULT_ICD_WINDOW,
            particle_delay: Self::DEFAULT_PARTICLE_DELAY,
            swap_frames: Self::DEFAULT_SWAP_FRAMES,
            swap_cooldown: Self::DEFAULT_SWAP_COOLDOWN,
            off_field_energy_ratio: Self::DEFAULT_OFF_FIELD_ENERGY_RATIO,
            character_level: Self::DEFAULT_CHARACTER_LEVEL,
        }
    }

    pub fn with_particle_delay(mut self, particle_delay: u64) -> Self {
        self.particle_delay = particle_delay;
        self
    }

    pub fn with_swap_cooldown(mut self, swap_cooldown: u64) -> Self {
        self.swap_cooldown = swap_cooldown;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}
