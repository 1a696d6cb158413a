//! Internal cooldowns (ICD).
//!
//! An ICD group bounds how often hits from one actor may apply their element.
//! State is keyed by `(actor, group)`, so two characters never share a window
//! and one character's groups are independent of each other.

use std::collections::HashMap;

use crate::config::SimConfig;
use crate::state::{CharIndex, Frame};

/// Informational ICD tag of an attack. [`IcdTag::None`] bypasses ICD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IcdTag {
    #[default]
    None,
    NormalAttack,
    ChargedAttack,
    PlungeAttack,
    ElementalArt,
    ElementalBurst,
}

/// Group whose policy decides suppression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IcdGroup {
    #[default]
    Default,
    Named(&'static str),
}

/// Suppression policy of one group.
///
/// `pattern[n]` says whether the n-th hit (0-based) inside a window applies.
/// Past the end of the pattern hits apply again from the start when
/// `cyclic`, and are suppressed otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IcdPolicy {
    pub window: u64,
    pub pattern: Vec<bool>,
    pub cyclic: bool,
}

impl IcdPolicy {
    pub fn new(window: u64, pattern: Vec<bool>, cyclic: bool) -> Self {
        Self {
            window,
            pattern,
            cyclic,
        }
    }

    /// First hit of each window applies, the rest are suppressed.
    pub fn once(window: u64) -> Self {
        Self::new(window, vec![true], false)
    }

    /// Every third hit applies, and the window resets the count.
    pub fn every_third(window: u64) -> Self {
        Self::new(window, vec![true, false, false], true)
    }

    fn allows(&self, hit: usize) -> bool {
        if self.pattern.is_empty() {
            return true;
        }
        if self.cyclic {
            self.pattern[hit % self.pattern.len()]
        } else {
            self.pattern.get(hit).copied().unwrap_or(false)
        }
    }
}

/// Group policies. Groups missing from the table never suppress.
#[derive(Clone, Debug, Default)]
pub struct IcdTable {
    policies: HashMap<IcdGroup, IcdPolicy>,
}

impl IcdTable {
    /// Empty table: nothing is suppressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with [`IcdGroup::Default`] allowing one application per
    /// `config.default_icd_window`.
    pub fn with_defaults(config: &SimConfig) -> Self {
        let mut table = Self::new();
        table.register(IcdGroup::Default, IcdPolicy::once(config.default_icd_window));
        table
    }

    pub fn register(&mut self, group: IcdGroup, policy: IcdPolicy) -> Option<IcdPolicy> {
        self.policies.insert(group, policy)
    }

    pub fn get(&self, group: IcdGroup) -> Option<&IcdPolicy> {
        self.policies.get(&group)
    }
}

#[derive(Clone, Copy, Debug)]
struct IcdWindow {
    start: Frame,
    hits: usize,
}

/// Per-(actor, group) window state.
#[derive(Clone, Debug, Default)]
pub struct IcdTracker {
    windows: HashMap<(CharIndex, IcdGroup), IcdWindow>,
}

impl IcdTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one hit and returns whether it may apply its element.
    ///
    /// A hit at or after `start + window` opens a new window.
    pub fn check(
        &mut self,
        actor: CharIndex,
        tag: IcdTag,
        group: IcdGroup,
        now: Frame,
        table: &IcdTable,
    ) -> bool {
        if tag == IcdTag::None {
            return true;
        }
        let Some(policy) = table.get(group) else {
            tracing::trace!(target: "sim_core::combat", ?group, "unknown ICD group, not suppressing");
            return true;
        };

        let window = self
            .windows
            .entry((actor, group))
            .or_insert(IcdWindow { start: now, hits: 0 });
        if now >= window.start + policy.window {
            *window = IcdWindow { start: now, hits: 0 };
        }
        let allowed = policy.allows(window.hits);
        window.hits += 1;
        allowed
    }
}
