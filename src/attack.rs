//! Attack and damage resolution.
//!
//! An attack is a test roll (attribute pool vs. skill thresholds) between
//! two participants, adjusted by the conditions on both sides, followed on
//! a hit by a damage roll against the target's flat damage reduction.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::character::{Attribute, ParticipantId};
use crate::check::{self, TestRoll, Vantage};
use crate::combat::Participant;
use crate::conditions::FailureCategory;
use crate::dice::{DamageDice, DiceError};
use crate::success::SuccessGrade;

/// Whether a weapon or spell strikes in melee or at range. Prone and
/// unconscious targets are only easy prey up close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttackRange {
    #[default]
    Melee,
    Ranged,
}

/// Weapon or spell descriptor, supplied per attack by the equipment
/// subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub name: String,
    /// Damage notation, e.g. `1d8+2`.
    pub damage: String,
    pub damage_type: String,
    #[serde(default)]
    pub range: AttackRange,
}

impl WeaponProfile {
    pub fn new(
        name: impl Into<String>,
        damage: impl Into<String>,
        damage_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            damage: damage.into(),
            damage_type: damage_type.into(),
            range: AttackRange::Melee,
        }
    }

    pub fn ranged(mut self) -> Self {
        self.range = AttackRange::Ranged;
        self
    }
}

/// Immutable record of one attack attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRoll {
    pub attacker: ParticipantId,
    pub target: ParticipantId,
    pub attribute: Attribute,
    pub skill: String,
    pub skill_value: i32,
    /// Raw dice rolled; empty when a condition failed the attack outright.
    pub dice: Vec<u8>,
    pub kept: Option<u8>,
    pub grade: SuccessGrade,
    pub is_critical: bool,
    pub weapon: Option<WeaponProfile>,
}

/// The damage side of a resolved hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageBreakdown {
    /// Individual damage dice; doubled in count on a critical.
    pub dice: Vec<u32>,
    /// Dice sum plus the flat modifier (applied once).
    pub total: i32,
    pub damage_type: String,
}

/// Immutable record of one fully resolved attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResolution {
    pub attack: AttackRoll,
    pub hit: bool,
    pub damage: Option<DamageBreakdown>,
    /// Damage actually absorbed by the target's reduction.
    pub reduction_applied: i32,
    pub final_damage: i32,
    pub summary: String,
}

impl fmt::Display for CombatResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)
    }
}

/// Net pool adjustment for an attack, from the conditions on both sides.
fn attack_vantage(attacker: &Participant, target: &Participant, range: AttackRange) -> Vantage {
    let mut vantage = Vantage::Normal;

    for condition in &attacker.conditions {
        let effects = condition.effects();
        if effects.double_disadvantage {
            vantage = vantage.combine(Vantage::DoubleDisadvantage);
        } else if effects.attack_disadvantage {
            vantage = vantage.combine(Vantage::Disadvantage);
        }
        if effects.attacks_with_advantage {
            vantage = vantage.combine(Vantage::Advantage);
        }
    }

    for condition in &target.conditions {
        let effects = condition.effects();
        if effects.imposes_disadvantage_on_attackers {
            vantage = vantage.combine(Vantage::Disadvantage);
        }
        if effects.grants_advantage_to_attackers
            && (!effects.melee_only || range == AttackRange::Melee)
        {
            vantage = vantage.combine(Vantage::Advantage);
        }
    }

    vantage
}

/// Resolve one attack. Pure apart from the injected RNG: the caller applies
/// the resulting damage to shared state.
///
/// Malformed weapon damage notation is an error before any dice are
/// rolled; a weapon that cannot be resolved must never half-resolve.
#[allow(clippy::too_many_arguments)]
pub fn resolve_attack_with_rng<R: Rng>(
    attacker: &Participant,
    target: &Participant,
    attribute: Attribute,
    attribute_value: i32,
    skill: &str,
    skill_value: i32,
    weapon: &WeaponProfile,
    rng: &mut R,
) -> Result<CombatResolution, DiceError> {
    let damage_dice = DamageDice::parse(&weapon.damage)?;

    if let Some(condition) = attacker
        .conditions
        .iter()
        .find(|c| c.auto_fails(FailureCategory::Attacks))
    {
        debug!(attacker = %attacker.name, condition = %condition, "attack failed automatically");
        let summary = format!(
            "{} cannot attack: {}",
            attacker.name,
            condition.name()
        );
        return Ok(CombatResolution {
            attack: AttackRoll {
                attacker: attacker.id,
                target: target.id,
                attribute,
                skill: skill.to_string(),
                skill_value,
                dice: Vec::new(),
                kept: None,
                grade: SuccessGrade::FailureNormal,
                is_critical: false,
                weapon: Some(weapon.clone()),
            },
            hit: false,
            damage: None,
            reduction_applied: 0,
            final_damage: 0,
            summary,
        });
    }

    let vantage = attack_vantage(attacker, target, weapon.range);
    let roll: TestRoll = check::roll_test_with_rng(attribute_value, skill_value, vantage, rng);
    let kept = roll.kept.expect("attack pools always roll dice");

    let hit = roll.grade.is_success();
    let mut is_critical = roll.grade == SuccessGrade::SuccessExtreme;

    // A melee hit against a helpless target is always a critical.
    if hit
        && weapon.range == AttackRange::Melee
        && target
            .conditions
            .iter()
            .any(|c| c.effects().critical_on_adjacent)
    {
        is_critical = true;
    }

    let attack = AttackRoll {
        attacker: attacker.id,
        target: target.id,
        attribute,
        skill: skill.to_string(),
        skill_value,
        dice: roll.dice,
        kept: Some(kept),
        grade: roll.grade,
        is_critical,
        weapon: Some(weapon.clone()),
    };

    if !hit {
        let summary = format!(
            "{} attacks {} with {}: {:?} kept {}, {}, miss",
            attacker.name, target.name, weapon.name, attack.dice, kept, roll.grade
        );
        debug!(attacker = %attacker.name, target = %target.name, kept, grade = %roll.grade, "attack missed");
        return Ok(CombatResolution {
            attack,
            hit: false,
            damage: None,
            reduction_applied: 0,
            final_damage: 0,
            summary,
        });
    }

    // Critical hits roll the dice portion twice; the flat modifier is
    // applied once.
    let mut dice = damage_dice.roll_with_rng(rng);
    if is_critical {
        dice.extend(damage_dice.roll_with_rng(rng));
    }
    let dice_sum: i32 = dice.iter().map(|&d| d as i32).sum();
    let raw_damage = dice_sum + damage_dice.modifier;
    let final_damage = (raw_damage - target.damage_reduction).max(0);
    let reduction_applied = raw_damage.max(0) - final_damage;

    let summary = format!(
        "{} attacks {} with {}: {:?} kept {}, {}{}; {} damage {:?} = {} raw, {} after reduction",
        attacker.name,
        target.name,
        weapon.name,
        attack.dice,
        kept,
        roll.grade,
        if is_critical { " (critical)" } else { "" },
        weapon.damage,
        dice,
        raw_damage,
        final_damage
    );
    debug!(
        attacker = %attacker.name,
        target = %target.name,
        kept,
        grade = %roll.grade,
        is_critical,
        raw_damage,
        final_damage,
        "attack hit"
    );

    Ok(CombatResolution {
        attack,
        hit: true,
        damage: Some(DamageBreakdown {
            dice,
            total: raw_damage,
            damage_type: weapon.damage_type.clone(),
        }),
        reduction_applied,
        final_damage,
        summary,
    })
}

/// Resolve with the thread-local RNG.
#[allow(clippy::too_many_arguments)]
pub fn resolve_attack(
    attacker: &Participant,
    target: &Participant,
    attribute: Attribute,
    attribute_value: i32,
    skill: &str,
    skill_value: i32,
    weapon: &WeaponProfile,
) -> Result<CombatResolution, DiceError> {
    resolve_attack_with_rng(
        attacker,
        target,
        attribute,
        attribute_value,
        skill,
        skill_value,
        weapon,
        &mut rand::thread_rng(),
    )
}
