//! Enemy targets and their live defensive state.

use strum::EnumCount;

use super::attack::AttackPattern;
use crate::state::{Frame, Key, Position, StatusStack, TargetId, Timed, TimedSet};
use crate::stats::Element;

/// Element lingering on a target after an unsuppressed application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aura {
    pub element: Element,
    pub durability: f64,
}

/// Timed resistance change; negative amounts shred.
#[derive(Clone, Debug, PartialEq)]
pub struct ResistMod {
    pub key: Key,
    /// `None` applies to every element.
    pub element: Option<Element>,
    pub amount: f64,
    pub duration: u64,
    /// Set when the modifier is attached.
    pub expires_at: Frame,
}

impl ResistMod {
    pub fn new(key: Key, element: Option<Element>, amount: f64, duration: u64) -> Self {
        Self {
            key,
            element,
            amount,
            duration,
            expires_at: Frame::NEVER,
        }
    }

    fn applies_to(&self, element: Element) -> bool {
        self.element.is_none_or(|e| e == element)
    }
}

impl Timed for ResistMod {
    fn key(&self) -> Key {
        self.key
    }

    fn expiry(&self) -> Frame {
        self.expires_at
    }
}

#[derive(Clone, Debug)]
pub struct Target {
    pub id: TargetId,
    pub position: Position,
    pub radius: f64,
    pub level: u32,
    resist: [f64; Element::COUNT],
    /// `None` for targets that cannot be defeated.
    pub hp: Option<f64>,
    pub aura: Option<Aura>,
    pub statuses: StatusStack,
    pub(crate) resist_mods: TimedSet<ResistMod>,
    pub damage_taken: f64,
}

impl Target {
    pub const DEFAULT_RESIST: f64 = 0.1;
    pub const DEFAULT_RADIUS: f64 = 1.0;

    pub fn new(id: TargetId, level: u32) -> Self {
        Self {
            id,
            position: Position::ORIGIN,
            radius: Self::DEFAULT_RADIUS,
            level,
            resist: [Self::DEFAULT_RESIST; Element::COUNT],
            hp: None,
            aura: None,
            statuses: StatusStack::new(),
            resist_mods: TimedSet::new(),
            damage_taken: 0.0,
        }
    }

    pub fn at(mut self, position: Position, radius: f64) -> Self {
        self.position = position;
        self.radius = radius;
        self
    }

    pub fn with_resist(mut self, element: Element, value: f64) -> Self {
        self.resist[element as usize] = value;
        self
    }

    pub fn with_all_resist(mut self, value: f64) -> Self {
        self.resist = [value; Element::COUNT];
        self
    }

    pub fn with_hp(mut self, hp: f64) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp.is_none_or(|hp| hp > 0.0)
    }

    /// Base resistance plus every active modifier for `element`.
    pub fn resistance(&self, element: Element, now: Frame) -> f64 {
        self.resist[element as usize]
            + self
                .resist_mods
                .iter_active(now)
                .filter(|m| m.applies_to(element))
                .map(|m| m.amount)
                .sum::<f64>()
    }

    pub fn overlaps(&self, pattern: &AttackPattern) -> bool {
        match *pattern {
            AttackPattern::Single(id) => self.id == id,
            AttackPattern::Circle { center, radius } => {
                center.distance(&self.position) <= radius + self.radius
            }
            AttackPattern::Rectangle {
                center,
                width,
                height,
            } => {
                let nearest = Position::new(
                    self.position
                        .x
                        .clamp(center.x - width / 2.0, center.x + width / 2.0),
                    self.position
                        .y
                        .clamp(center.y - height / 2.0, center.y + height / 2.0),
                );
                nearest.distance(&self.position) <= self.radius
            }
        }
    }

    pub(crate) fn apply_element(&mut self, element: Element, durability: f64) {
        if element.is_elemental() && durability > 0.0 {
            self.aura = Some(Aura {
                element,
                durability,
            });
        }
    }

    /// Applies damage and returns `true` if this hit defeated the target.
    pub(crate) fn take_damage(&mut self, damage: f64) -> bool {
        self.damage_taken += damage;
        match self.hp.as_mut() {
            Some(hp) if *hp > 0.0 => {
                *hp -= damage;
                *hp <= 0.0
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_overlap_accounts_for_target_radius() {
        let t = Target::new(TargetId(1), 90).at(Position::new(3.0, 0.0), 1.0);
        assert!(t.overlaps(&AttackPattern::circle(Position::ORIGIN, 2.0)));
        assert!(!t.overlaps(&AttackPattern::circle(Position::ORIGIN, 1.5)));
    }

    #[test]
    fn rectangle_overlap_uses_nearest_point() {
        let t = Target::new(TargetId(1), 90).at(Position::new(0.0, 4.0), 0.5);
        assert!(t.overlaps(&AttackPattern::rectangle(Position::ORIGIN, 2.0, 7.0)));
        assert!(!t.overlaps(&AttackPattern::rectangle(Position::ORIGIN, 2.0, 6.0)));
    }

    #[test]
    fn resist_mods_stack_until_expiry() {
        let mut t = Target::new(TargetId(1), 90);
        let mut shred = ResistMod::new("shred", Some(Element::Pyro), -0.4, 60);
        shred.expires_at = Frame(60);
        t.resist_mods.insert(shred);

        assert!((t.resistance(Element::Pyro, Frame(10)) - (-0.3)).abs() < 1e-9);
        assert!((t.resistance(Element::Cryo, Frame(10)) - 0.1).abs() < 1e-9);
        assert!((t.resistance(Element::Pyro, Frame(60)) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn defeat_is_reported_once() {
        let mut t = Target::new(TargetId(1), 90).with_hp(100.0);
        assert!(!t.take_damage(60.0));
        assert!(t.take_damage(60.0));
        assert!(!t.is_alive());
        assert!(!t.take_damage(10.0));
        assert_eq!(t.damage_taken, 130.0);
    }
}
