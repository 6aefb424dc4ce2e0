//! Boundary data model shared with the excluded character subsystem.
//!
//! The engine reads a roster of source characters once when combat starts
//! and never mutates them; everything it needs afterwards lives on its own
//! participant snapshots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for combat participants, shared with the source
/// character it was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub Uuid);

impl ParticipantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The six core attributes. An attribute selects a dice-pool policy; it is
/// never added to a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Forca,
    Destreza,
    Constituicao,
    Inteligencia,
    Sabedoria,
    Carisma,
}

impl Attribute {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Attribute::Forca => "FOR",
            Attribute::Destreza => "DES",
            Attribute::Constituicao => "CON",
            Attribute::Inteligencia => "INT",
            Attribute::Sabedoria => "SAB",
            Attribute::Carisma => "CAR",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Forca => "Força",
            Attribute::Destreza => "Destreza",
            Attribute::Constituicao => "Constituição",
            Attribute::Inteligencia => "Inteligência",
            Attribute::Sabedoria => "Sabedoria",
            Attribute::Carisma => "Carisma",
        }
    }

    pub fn all() -> [Attribute; 6] {
        [
            Attribute::Forca,
            Attribute::Destreza,
            Attribute::Constituicao,
            Attribute::Inteligencia,
            Attribute::Sabedoria,
            Attribute::Carisma,
        ]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Attribute values container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub forca: i32,
    pub destreza: i32,
    pub constituicao: i32,
    pub inteligencia: i32,
    pub sabedoria: i32,
    pub carisma: i32,
}

impl Attributes {
    pub fn new(for_: i32, des: i32, con: i32, int: i32, sab: i32, car: i32) -> Self {
        Self {
            forca: for_,
            destreza: des,
            constituicao: con,
            inteligencia: int,
            sabedoria: sab,
            carisma: car,
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Forca => self.forca,
            Attribute::Destreza => self.destreza,
            Attribute::Constituicao => self.constituicao,
            Attribute::Inteligencia => self.inteligencia,
            Attribute::Sabedoria => self.sabedoria,
            Attribute::Carisma => self.carisma,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        match attribute {
            Attribute::Forca => self.forca = value,
            Attribute::Destreza => self.destreza = value,
            Attribute::Constituicao => self.constituicao = value,
            Attribute::Inteligencia => self.inteligencia = value,
            Attribute::Sabedoria => self.sabedoria = value,
            Attribute::Carisma => self.carisma = value,
        }
    }
}

/// A depletable current/maximum pair (hit points, mana, vigor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub current: i32,
    pub maximum: i32,
}

impl ResourcePool {
    pub fn new(maximum: i32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Subtract damage, clamped at zero. Returns the amount actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let old = self.current;
        self.current = (self.current - amount.max(0)).max(0);
        old - self.current
    }

    /// Restore points, clamped at the maximum. Returns the amount actually
    /// regained.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let old = self.current;
        self.current = (self.current + amount.max(0)).min(self.maximum);
        self.current - old
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

impl fmt::Display for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.maximum)
    }
}

/// What a participant is, from the table's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Player,
    Npc,
    Enemy,
}

impl ParticipantKind {
    pub fn name(&self) -> &'static str {
        match self {
            ParticipantKind::Player => "player",
            ParticipantKind::Npc => "npc",
            ParticipantKind::Enemy => "enemy",
        }
    }
}

/// A source character as the character subsystem exposes it.
///
/// Skills are a name-to-value map owned by the sheet; the engine only ever
/// does exact-name lookups into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub id: ParticipantId,
    pub name: String,
    pub attributes: Attributes,
    pub skills: HashMap<String, i32>,
    pub hit_points: ResourcePool,
    pub mana_points: Option<ResourcePool>,
    pub vigor: Option<ResourcePool>,
}

impl CharacterSheet {
    pub fn new(name: impl Into<String>, attributes: Attributes, max_hp: i32) -> Self {
        Self {
            id: ParticipantId::new(),
            name: name.into(),
            attributes,
            skills: HashMap::new(),
            hit_points: ResourcePool::new(max_hp),
            mana_points: None,
            vigor: None,
        }
    }

    pub fn with_skill(mut self, name: impl Into<String>, value: i32) -> Self {
        self.skills.insert(name.into(), value);
        self
    }

    pub fn with_mana(mut self, maximum: i32) -> Self {
        self.mana_points = Some(ResourcePool::new(maximum));
        self
    }

    pub fn with_vigor(mut self, maximum: i32) -> Self {
        self.vigor = Some(ResourcePool::new(maximum));
        self
    }

    /// Skill value by exact name; untrained skills are 0.
    pub fn skill(&self, name: &str) -> i32 {
        self.skills.get(name).copied().unwrap_or(0)
    }
}

/// One roster line for `start_combat`: the source sheet plus the two
/// pieces of combat data the sheet does not own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub sheet: CharacterSheet,
    pub kind: ParticipantKind,
    /// Flat reduction subtracted from incoming damage, derived from
    /// equipped armor by the equipment subsystem.
    pub damage_reduction: i32,
}

impl RosterEntry {
    pub fn new(sheet: CharacterSheet, kind: ParticipantKind) -> Self {
        Self {
            sheet,
            kind,
            damage_reduction: 0,
        }
    }

    pub fn with_damage_reduction(mut self, reduction: i32) -> Self {
        self.damage_reduction = reduction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_clamps() {
        let mut hp = ResourcePool::new(10);
        assert_eq!(hp.take_damage(4), 4);
        assert_eq!(hp.current, 6);
        assert_eq!(hp.take_damage(20), 6);
        assert_eq!(hp.current, 0);
        assert!(hp.is_depleted());

        assert_eq!(hp.heal(3), 3);
        assert_eq!(hp.heal(100), 7);
        assert_eq!(hp.current, 10);
    }

    #[test]
    fn test_pool_ignores_negative_amounts() {
        let mut hp = ResourcePool::new(10);
        assert_eq!(hp.take_damage(-5), 0);
        assert_eq!(hp.current, 10);
        hp.take_damage(4);
        assert_eq!(hp.heal(-5), 0);
        assert_eq!(hp.current, 6);
    }

    #[test]
    fn test_attribute_access() {
        let mut attrs = Attributes::new(2, 3, 1, 0, -1, 1);
        assert_eq!(attrs.get(Attribute::Destreza), 3);
        assert_eq!(attrs.get(Attribute::Sabedoria), -1);
        attrs.set(Attribute::Forca, 5);
        assert_eq!(attrs.forca, 5);
    }

    #[test]
    fn test_sheet_skill_lookup_is_exact() {
        let sheet = CharacterSheet::new("Aline", Attributes::default(), 12)
            .with_skill("Iniciativa", 5)
            .with_skill("Luta", 8);
        assert_eq!(sheet.skill("Iniciativa"), 5);
        assert_eq!(sheet.skill("iniciativa"), 0);
        assert_eq!(sheet.skill("Pontaria"), 0);
    }
}
