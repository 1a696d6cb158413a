//! Seeded random number generation for a single trial.
//!
//! Every random decision in a trial (crit rolls, kit procs) draws from the
//! trial's own [`SimRng`]. Given the same seed and the same sequence of
//! calls, the generator yields the same values, which makes trials
//! reproducible.

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR variant: 64-bit state, 32-bit output, one multiply, one
/// xorshift and one rotate per draw.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimRng {
    state: u64,
    draws: u64,
}

impl SimRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        // Mix the seed so that adjacent seeds start far apart.
        let mut rng = Self {
            state: mix_seed(seed),
            draws: 0,
        };
        rng.next_u32();
        rng.draws = 0;
        rng
    }

    /// Advance the PCG state by one step.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::pcg_step(old);
        self.draws += 1;
        Self::pcg_output(old)
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let high = (self.next_u32() as u64) << 21;
        let low = (self.next_u32() as u64) >> 11;
        ((high | low) as f64) / ((1u64 << 53) as f64)
    }

    /// Returns true with probability `p` (clamped to `[0, 1]`).
    ///
    /// Consumes the same draws whatever `p` is, so later rolls do not depend on it.
    pub fn chance(&mut self, p: f64) -> bool {
        let roll = self.next_f64();
        roll < p.clamp(0.0, 1.0)
    }

    /// Value in `[min, max]` inclusive.
    pub fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32() % range)
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

/// SplitMix64 finaliser used to spread seeds.
fn mix_seed(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Derives the seed of trial `iteration` from a batch base seed.
pub fn trial_seed(base_seed: u64, iteration: u64) -> u64 {
    mix_seed(base_seed ^ iteration.wrapping_mul(0x517cc1b727220a95))
}
