//! Combat resolution engine for a tabletop-RPG character manager.
//!
//! This crate provides:
//! - Dice-pool selection from attribute values (roll N d20, keep one)
//! - Success grading against per-skill thresholds, with natural 20/1
//!   overrides
//! - A closed status-condition catalog with fixed mechanical effects
//! - Attack and damage resolution against flat damage reduction
//! - Initiative ordering and a round/turn state machine with an
//!   append-only action log
//!
//! The engine is pure, synchronous computation over an in-memory
//! [`CombatState`]; persistence, presentation and character editing live in
//! the consuming application. Randomness is injected (`*_with_rng`
//! variants), so a seeded generator reproduces an encounter exactly.
//!
//! # Quick Start
//!
//! ```
//! use combate_core::{
//!     Attribute, Attributes, CharacterSheet, CombatState, ParticipantKind,
//!     RosterEntry, WeaponProfile, INITIATIVE_SKILL,
//! };
//!
//! # fn main() -> Result<(), combate_core::CombatError> {
//! let hero = CharacterSheet::new("Aline", Attributes::new(2, 3, 1, 0, 0, 1), 15)
//!     .with_skill(INITIATIVE_SKILL, 5)
//!     .with_skill("Luta", 8);
//! let goblin = CharacterSheet::new("Goblin", Attributes::new(1, 1, 0, 0, 0, 0), 8);
//! let (hero_id, goblin_id) = (hero.id, goblin.id);
//!
//! let mut combat = CombatState::new();
//! combat.start_combat(vec![
//!     RosterEntry::new(hero, ParticipantKind::Player),
//!     RosterEntry::new(goblin, ParticipantKind::Enemy).with_damage_reduction(1),
//! ])?;
//! combat.roll_initiative()?;
//!
//! let sword = WeaponProfile::new("Espada", "1d8+2", "corte");
//! let resolution = combat.attack(hero_id, goblin_id, Attribute::Forca, 2, "Luta", 8, &sword)?;
//! println!("{}", resolution.summary);
//!
//! combat.next_turn()?;
//! # Ok(())
//! # }
//! ```

pub mod attack;
pub mod character;
pub mod check;
pub mod combat;
pub mod conditions;
pub mod dice;
pub mod initiative;
pub mod success;

// Primary public API
pub use attack::{AttackRange, AttackRoll, CombatResolution, DamageBreakdown, WeaponProfile};
pub use character::{
    Attribute, Attributes, CharacterSheet, ParticipantId, ParticipantKind, ResourcePool,
    RosterEntry,
};
pub use check::{resolve_skill_test, resolve_skill_test_with_rng, TestRoll, Vantage};
pub use combat::{
    ActionLogEntry, ActionType, CombatError, CombatState, Participant, INITIATIVE_SKILL,
};
pub use conditions::{Condition, ConditionEffects, FailureCategory};
pub use dice::{DamageDice, DiceError, Keep, PoolPolicy, PoolRoll};
pub use success::{grade, SuccessGrade, Thresholds};
