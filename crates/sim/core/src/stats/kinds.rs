//! Elements, stat kinds and fixed-size stat vectors.

use std::ops::{Add, AddAssign, Index, IndexMut};

use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Element carried by an attack or a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum Element {
    Electro,
    Pyro,
    Cryo,
    Hydro,
    Dendro,
    Anemo,
    Geo,
    Physical,
    /// Particles and effects without an element.
    #[cfg_attr(feature = "serde", serde(rename = "none"))]
    #[strum(serialize = "none")]
    NoElement,
}

impl Element {
    /// Stat holding the damage bonus for this element.
    pub fn damage_bonus(self) -> Option<StatKind> {
        match self {
            Element::Electro => Some(StatKind::ElectroP),
            Element::Pyro => Some(StatKind::PyroP),
            Element::Cryo => Some(StatKind::CryoP),
            Element::Hydro => Some(StatKind::HydroP),
            Element::Dendro => Some(StatKind::DendroP),
            Element::Anemo => Some(StatKind::AnemoP),
            Element::Geo => Some(StatKind::GeoP),
            Element::Physical => Some(StatKind::PhysP),
            Element::NoElement => None,
        }
    }

    /// True for the seven elements that can be applied to a target.
    pub fn is_elemental(self) -> bool {
        !matches!(self, Element::Physical | Element::NoElement)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Character stat. Percent stats are stored as fractions (`0.2` = 20%).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    DefP,
    Def,
    Hp,
    HpP,
    Atk,
    AtkP,
    /// Energy recharge.
    Er,
    /// Elemental mastery.
    Em,
    /// Crit rate.
    Cr,
    /// Crit damage.
    Cd,
    Heal,
    PyroP,
    HydroP,
    GeoP,
    AnemoP,
    ElectroP,
    DendroP,
    CryoP,
    PhysP,
    BaseHp,
    BaseAtk,
    BaseDef,
}

impl StatKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// One value per [`StatKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatVector([f64; StatKind::COUNT]);

impl Default for StatVector {
    fn default() -> Self {
        Self::ZERO
    }
}

impl StatVector {
    pub const ZERO: Self = Self([0.0; StatKind::COUNT]);

    pub fn new() -> Self {
        Self::ZERO
    }

    /// Builds a vector from `(kind, value)` pairs; repeated kinds are summed.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (StatKind, f64)>) -> Self {
        let mut v = Self::ZERO;
        for (kind, value) in pairs {
            v[kind] += value;
        }
        v
    }

    /// Builder-style setter.
    pub fn with(mut self, kind: StatKind, value: f64) -> Self {
        self[kind] = value;
        self
    }

    pub fn get(&self, kind: StatKind) -> f64 {
        self.0[kind as usize]
    }

    /// Adds only the components whose kind is in `mask`.
    pub fn add_masked(&mut self, other: &StatVector, mask: StatSet) {
        for kind in StatKind::iter() {
            if mask.contains(StatSet::from(kind)) {
                self[kind] += other[kind];
            }
        }
    }

    /// Total attack: `base_atk × (1 + atk%) + flat atk`.
    pub fn total_atk(&self) -> f64 {
        self[StatKind::BaseAtk] * (1.0 + self[StatKind::AtkP]) + self[StatKind::Atk]
    }

    /// Total HP: `base_hp × (1 + hp%) + flat hp`.
    pub fn total_hp(&self) -> f64 {
        self[StatKind::BaseHp] * (1.0 + self[StatKind::HpP]) + self[StatKind::Hp]
    }

    /// Total DEF: `base_def × (1 + def%) + flat def`.
    pub fn total_def(&self) -> f64 {
        self[StatKind::BaseDef] * (1.0 + self[StatKind::DefP]) + self[StatKind::Def]
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, f64)> + '_ {
        StatKind::iter().map(|kind| (kind, self[kind]))
    }
}

impl Index<StatKind> for StatVector {
    type Output = f64;

    fn index(&self, kind: StatKind) -> &f64 {
        &self.0[kind as usize]
    }
}

impl IndexMut<StatKind> for StatVector {
    fn index_mut(&mut self, kind: StatKind) -> &mut f64 {
        &mut self.0[kind as usize]
    }
}

impl Add for StatVector {
    type Output = StatVector;

    fn add(mut self, rhs: StatVector) -> StatVector {
        self += rhs;
        self
    }
}

impl AddAssign for StatVector {
    fn add_assign(&mut self, rhs: StatVector) {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0) {
            *lhs += rhs;
        }
    }
}

bitflags::bitflags! {
    /// Set of stats a modifier contributes to.
    ///
    /// Bit `n` corresponds to the `n`th [`StatKind`] variant.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StatSet: u32 {
        const DEF_P = 1 << 0;
        const DEF = 1 << 1;
        const HP = 1 << 2;
        const HP_P = 1 << 3;
        const ATK = 1 << 4;
        const ATK_P = 1 << 5;
        const ER = 1 << 6;
        const EM = 1 << 7;
        const CR = 1 << 8;
        const CD = 1 << 9;
        const HEAL = 1 << 10;
        const PYRO_P = 1 << 11;
        const HYDRO_P = 1 << 12;
        const GEO_P = 1 << 13;
        const ANEMO_P = 1 << 14;
        const ELECTRO_P = 1 << 15;
        const DENDRO_P = 1 << 16;
        const CRYO_P = 1 << 17;
        const PHYS_P = 1 << 18;
        const BASE_HP = 1 << 19;
        const BASE_ATK = 1 << 20;
        const BASE_DEF = 1 << 21;
    }
}

impl From<StatKind> for StatSet {
    fn from(kind: StatKind) -> Self {
        StatSet::from_bits_retain(1 << kind as u32)
    }
}

impl FromIterator<StatKind> for StatSet {
    fn from_iter<I: IntoIterator<Item = StatKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(StatSet::empty(), |set, kind| set | StatSet::from(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_set_bits_follow_kind_order() {
        assert_eq!(StatSet::from(StatKind::DefP), StatSet::DEF_P);
        assert_eq!(StatSet::from(StatKind::Er), StatSet::ER);
        assert_eq!(StatSet::from(StatKind::PhysP), StatSet::PHYS_P);
        assert_eq!(StatSet::from(StatKind::BaseDef), StatSet::BASE_DEF);
        assert_eq!(StatSet::all().bits().count_ones() as usize, StatKind::COUNT);
    }

    #[test]
    fn masked_add_ignores_other_stats() {
        let mut total = StatVector::ZERO;
        let bonus = StatVector::ZERO
            .with(StatKind::Er, 0.2)
            .with(StatKind::AtkP, 0.5);

        total.add_masked(&bonus, StatSet::ER);
        assert_eq!(total[StatKind::Er], 0.2);
        assert_eq!(total[StatKind::AtkP], 0.0);
    }

    #[test]
    fn total_attack_combines_base_percent_and_flat() {
        let stats = StatVector::from_pairs([
            (StatKind::BaseAtk, 800.0),
            (StatKind::AtkP, 0.5),
            (StatKind::Atk, 300.0),
        ]);
        assert_eq!(stats.total_atk(), 1500.0);
    }
}
