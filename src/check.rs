//! Shared test-roll primitive.
//!
//! Initiative rolls, skill tests and attack rolls are all the same shape:
//! pick a pool from an attribute, adjust it for conditions, roll, grade the
//! kept die against a skill value. The source tool carried two divergent
//! copies of this logic; here there is one.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::conditions::{Condition, FailureCategory};
use crate::dice::PoolPolicy;
use crate::success::{self, SuccessGrade};

/// Net pool adjustment after conditions are taken into account.
///
/// Adjustments never compound numerically: when several apply, the most
/// restrictive single one wins, so any disadvantage beats any advantage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Vantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
    DoubleDisadvantage,
}

impl Vantage {
    fn restrictiveness(self) -> u8 {
        match self {
            Vantage::Normal => 0,
            Vantage::Advantage => 1,
            Vantage::Disadvantage => 2,
            Vantage::DoubleDisadvantage => 3,
        }
    }

    /// Combine two applicable adjustments, keeping the most restrictive.
    pub fn combine(self, other: Vantage) -> Vantage {
        if other.restrictiveness() > self.restrictiveness() {
            other
        } else {
            self
        }
    }

    /// Apply this adjustment to an attribute-derived pool policy.
    pub fn apply(self, policy: PoolPolicy) -> PoolPolicy {
        match self {
            Vantage::Normal => policy,
            Vantage::Advantage => policy.with_advantage(),
            Vantage::Disadvantage => policy.with_disadvantage(),
            Vantage::DoubleDisadvantage => policy.with_double_disadvantage(),
        }
    }
}

/// Immutable record of one graded roll.
///
/// `kept` is `None` when a condition failed the test before any dice were
/// rolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRoll {
    pub dice: Vec<u8>,
    pub kept: Option<u8>,
    pub grade: SuccessGrade,
}

impl TestRoll {
    /// A test failed outright, with no dice rolled.
    pub fn automatic_failure() -> Self {
        Self {
            dice: Vec::new(),
            kept: None,
            grade: SuccessGrade::FailureNormal,
        }
    }
}

impl fmt::Display for TestRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kept {
            Some(kept) => write!(f, "{:?} kept {} ({})", self.dice, kept, self.grade),
            None => write!(f, "no roll ({})", self.grade),
        }
    }
}

/// Net adjustment for a skill test made by an actor with the given
/// conditions.
pub fn skill_test_vantage(conditions: &HashSet<Condition>) -> Vantage {
    conditions
        .iter()
        .fold(Vantage::Normal, |acc, condition| {
            let effects = condition.effects();
            let vantage = if effects.double_disadvantage {
                Vantage::DoubleDisadvantage
            } else if effects.skill_disadvantage {
                Vantage::Disadvantage
            } else {
                Vantage::Normal
            };
            acc.combine(vantage)
        })
}

/// Roll and grade one test.
pub fn roll_test_with_rng<R: Rng>(
    attribute_value: i32,
    skill_value: i32,
    vantage: Vantage,
    rng: &mut R,
) -> TestRoll {
    let policy = vantage.apply(PoolPolicy::for_attribute(attribute_value));
    let roll = policy.roll_with_rng(rng);
    let grade = success::grade(roll.kept, skill_value);
    TestRoll {
        dice: roll.dice,
        kept: Some(roll.kept),
        grade,
    }
}

/// Resolve a free-standing skill test for an actor with the given
/// conditions, e.g. a sheet roll outside combat.
///
/// Sight-dependent tests fail outright under a sight-failing condition.
pub fn resolve_skill_test_with_rng<R: Rng>(
    conditions: &HashSet<Condition>,
    attribute_value: i32,
    skill_value: i32,
    sight_based: bool,
    rng: &mut R,
) -> TestRoll {
    if sight_based
        && conditions
            .iter()
            .any(|c| c.auto_fails(FailureCategory::SightChecks))
    {
        return TestRoll::automatic_failure();
    }
    let vantage = skill_test_vantage(conditions);
    roll_test_with_rng(attribute_value, skill_value, vantage, rng)
}

/// Resolve a skill test with the thread-local RNG.
pub fn resolve_skill_test(
    conditions: &HashSet<Condition>,
    attribute_value: i32,
    skill_value: i32,
    sight_based: bool,
) -> TestRoll {
    resolve_skill_test_with_rng(
        conditions,
        attribute_value,
        skill_value,
        sight_based,
        &mut rand::thread_rng(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_vantage_most_restrictive_wins() {
        assert_eq!(
            Vantage::Advantage.combine(Vantage::Disadvantage),
            Vantage::Disadvantage
        );
        assert_eq!(
            Vantage::Disadvantage.combine(Vantage::Advantage),
            Vantage::Disadvantage
        );
        assert_eq!(
            Vantage::Disadvantage.combine(Vantage::DoubleDisadvantage),
            Vantage::DoubleDisadvantage
        );
        assert_eq!(Vantage::Normal.combine(Vantage::Advantage), Vantage::Advantage);
        assert_eq!(Vantage::Normal.combine(Vantage::Normal), Vantage::Normal);
    }

    #[test]
    fn test_skill_test_vantage_from_conditions() {
        let mut conditions = HashSet::new();
        assert_eq!(skill_test_vantage(&conditions), Vantage::Normal);

        conditions.insert(Condition::Envenenado);
        assert_eq!(skill_test_vantage(&conditions), Vantage::Disadvantage);

        conditions.insert(Condition::Cego);
        assert_eq!(skill_test_vantage(&conditions), Vantage::DoubleDisadvantage);
    }

    #[test]
    fn test_roll_test_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let roll = roll_test_with_rng(3, 5, Vantage::Normal, &mut rng);
        assert_eq!(roll.dice.len(), 2);
        assert_eq!(roll.kept, Some(*roll.dice.iter().max().unwrap()));
    }

    #[test]
    fn test_disadvantage_keeps_lowest() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            let roll = roll_test_with_rng(6, 5, Vantage::Disadvantage, &mut rng);
            assert_eq!(roll.dice.len(), 4);
            assert_eq!(roll.kept, Some(*roll.dice.iter().min().unwrap()));
        }
    }

    #[test]
    fn test_sight_test_fails_blind() {
        let conditions = HashSet::from([Condition::Cego]);
        let mut rng = StdRng::seed_from_u64(5);
        let roll = resolve_skill_test_with_rng(&conditions, 3, 10, true, &mut rng);
        assert_eq!(roll, TestRoll::automatic_failure());

        // Non-sight tests still roll, at double disadvantage.
        let roll = resolve_skill_test_with_rng(&conditions, 3, 10, false, &mut rng);
        assert_eq!(roll.dice.len(), 3);
        assert_eq!(roll.kept, Some(*roll.dice.iter().min().unwrap()));
    }
}
