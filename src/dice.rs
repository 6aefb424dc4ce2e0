//! Dice-pool policies and damage dice.
//!
//! Attributes in this system do not add a flat modifier to rolls. Instead
//! the attribute value selects a pool of d20s and a keep rule: roll the
//! pool, keep the highest (or lowest, under penalty) die. Damage uses
//! standard `NdM+K` notation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for damage-dice parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
}

/// Which die of a rolled pool counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keep {
    Highest,
    Lowest,
    Single,
}

/// How many d20s to roll and which one counts, derived from an attribute
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPolicy {
    pub count: u32,
    pub keep: Keep,
}

impl PoolPolicy {
    /// Dice-pool policy for an attribute value.
    ///
    /// A step function: negative attributes roll two dice and keep the
    /// worst, 0..=1 rolls a single die, and every two points above 1 add
    /// one keep-highest die, capped at seven dice.
    pub fn for_attribute(value: i32) -> PoolPolicy {
        let (count, keep) = match value {
            v if v <= -1 => (2, Keep::Lowest),
            0..=1 => (1, Keep::Single),
            2..=3 => (2, Keep::Highest),
            4..=5 => (3, Keep::Highest),
            6..=7 => (4, Keep::Highest),
            8..=9 => (5, Keep::Highest),
            10..=11 => (6, Keep::Highest),
            _ => (7, Keep::Highest),
        };
        PoolPolicy { count, keep }
    }

    /// Force the pool toward keep-highest, rolling at least two dice.
    pub fn with_advantage(self) -> PoolPolicy {
        PoolPolicy {
            count: self.count.max(2),
            keep: Keep::Highest,
        }
    }

    /// Force the pool toward keep-lowest, rolling at least two dice.
    pub fn with_disadvantage(self) -> PoolPolicy {
        PoolPolicy {
            count: self.count.max(2),
            keep: Keep::Lowest,
        }
    }

    /// Keep-lowest with one extra die on the pile.
    pub fn with_double_disadvantage(self) -> PoolPolicy {
        PoolPolicy {
            count: self.count.max(2) + 1,
            keep: Keep::Lowest,
        }
    }

    /// Roll the pool with a specific RNG (seed it for deterministic tests).
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> PoolRoll {
        let dice: Vec<u8> = (0..self.count).map(|_| rng.gen_range(1..=20)).collect();
        let kept = match self.keep {
            Keep::Highest => *dice.iter().max().expect("pool count is at least 1"),
            Keep::Lowest => *dice.iter().min().expect("pool count is at least 1"),
            Keep::Single => dice[0],
        };
        PoolRoll { dice, kept }
    }

    /// Roll the pool with the thread-local RNG.
    pub fn roll(&self) -> PoolRoll {
        self.roll_with_rng(&mut rand::thread_rng())
    }
}

impl fmt::Display for PoolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keep {
            Keep::Single => write!(f, "1d20"),
            Keep::Highest => write!(f, "{}d20kh1", self.count),
            Keep::Lowest => write!(f, "{}d20kl1", self.count),
        }
    }
}

/// The dice of one rolled pool and the die that counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRoll {
    pub dice: Vec<u8>,
    pub kept: u8,
}

/// Parsed damage notation: `NdM`, `NdM+K` or `NdM-K` (`N` defaults to 1,
/// `K` to 0).
///
/// Malformed weapon data is a hard error. Defaulting damage silently would
/// corrupt combat outcomes, so there is no fallback expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDice {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DamageDice {
    /// Parse a damage notation string.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let d_pos = notation
            .find('d')
            .ok_or_else(|| DiceError::InvalidNotation(notation.clone()))?;

        let count_str = &notation[..d_pos];
        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.clone()))?
        };
        if count == 0 {
            return Err(DiceError::NoDice);
        }

        let rest = &notation[d_pos + 1..];
        let (sides_str, modifier) = match rest.find(|c: char| c == '+' || c == '-') {
            Some(sign_pos) => {
                let mod_str = &rest[sign_pos..];
                let modifier: i32 = mod_str
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(notation.clone()))?;
                (&rest[..sign_pos], modifier)
            }
            None => (rest, 0),
        };

        let sides: u32 = sides_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.clone()))?;
        if sides < 2 {
            return Err(DiceError::InvalidDieSize(sides));
        }

        Ok(DamageDice {
            count,
            sides,
            modifier,
        })
    }

    /// Roll the dice portion once, returning the individual dice.
    ///
    /// The flat modifier is not included; critical hits roll the dice
    /// portion twice while applying the modifier once, so the caller owns
    /// the sum.
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> Vec<u32> {
        (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect()
    }
}

impl FromStr for DamageDice {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DamageDice::parse(s)
    }
}

impl fmt::Display for DamageDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_policy_step_function() {
        assert_eq!(
            PoolPolicy::for_attribute(-3),
            PoolPolicy {
                count: 2,
                keep: Keep::Lowest
            }
        );
        assert_eq!(
            PoolPolicy::for_attribute(-1),
            PoolPolicy {
                count: 2,
                keep: Keep::Lowest
            }
        );
        assert_eq!(
            PoolPolicy::for_attribute(0),
            PoolPolicy {
                count: 1,
                keep: Keep::Single
            }
        );
        assert_eq!(
            PoolPolicy::for_attribute(1),
            PoolPolicy {
                count: 1,
                keep: Keep::Single
            }
        );
        assert_eq!(PoolPolicy::for_attribute(2).count, 2);
        assert_eq!(PoolPolicy::for_attribute(3).count, 2);
        assert_eq!(PoolPolicy::for_attribute(5).count, 3);
        assert_eq!(PoolPolicy::for_attribute(7).count, 4);
        assert_eq!(PoolPolicy::for_attribute(9).count, 5);
        assert_eq!(PoolPolicy::for_attribute(11).count, 6);
        assert_eq!(PoolPolicy::for_attribute(12).count, 7);
        assert_eq!(PoolPolicy::for_attribute(20).count, 7);
    }

    #[test]
    fn test_single_count_implies_single_keep() {
        for v in -5..=25 {
            let policy = PoolPolicy::for_attribute(v);
            assert_eq!(policy.count == 1, policy.keep == Keep::Single, "attr {v}");
        }
    }

    #[test]
    fn test_roll_bounds_and_kept() {
        let mut rng = StdRng::seed_from_u64(7);
        for v in -3..=15 {
            let policy = PoolPolicy::for_attribute(v);
            let roll = policy.roll_with_rng(&mut rng);
            assert_eq!(roll.dice.len() as u32, policy.count);
            assert!(roll.dice.iter().all(|&d| (1..=20).contains(&d)));
            let expected = match policy.keep {
                Keep::Highest => *roll.dice.iter().max().unwrap(),
                Keep::Lowest => *roll.dice.iter().min().unwrap(),
                Keep::Single => roll.dice[0],
            };
            assert_eq!(roll.kept, expected);
        }
    }

    #[test]
    fn test_advantage_overrides() {
        let single = PoolPolicy::for_attribute(0);
        assert_eq!(single.with_advantage().count, 2);
        assert_eq!(single.with_advantage().keep, Keep::Highest);
        assert_eq!(single.with_disadvantage().keep, Keep::Lowest);

        let big = PoolPolicy::for_attribute(8);
        assert_eq!(big.with_disadvantage().count, 5);
        assert_eq!(big.with_disadvantage().keep, Keep::Lowest);
        assert_eq!(big.with_double_disadvantage().count, 6);
    }

    #[test]
    fn test_parse_damage() {
        assert_eq!(
            DamageDice::parse("2d6+1").unwrap(),
            DamageDice {
                count: 2,
                sides: 6,
                modifier: 1
            }
        );
        assert_eq!(
            DamageDice::parse("d8").unwrap(),
            DamageDice {
                count: 1,
                sides: 8,
                modifier: 0
            }
        );
        assert_eq!(DamageDice::parse("1d10-2").unwrap().modifier, -2);
        assert_eq!(DamageDice::parse(" 1D8+2 ").unwrap().sides, 8);
    }

    #[test]
    fn test_parse_damage_rejects_malformed() {
        assert!(matches!(DamageDice::parse(""), Err(DiceError::NoDice)));
        assert!(matches!(DamageDice::parse("0d6"), Err(DiceError::NoDice)));
        assert!(matches!(
            DamageDice::parse("2d1"),
            Err(DiceError::InvalidDieSize(1))
        ));
        assert!(DamageDice::parse("banana").is_err());
        assert!(DamageDice::parse("2d6+").is_err());
        assert!(DamageDice::parse("2d+3").is_err());
        assert!(DamageDice::parse("d6+1d4").is_err());
    }

    #[test]
    fn test_damage_roll_bounds() {
        let dd = DamageDice::parse("3d6+2").unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let dice = dd.roll_with_rng(&mut rng);
            assert_eq!(dice.len(), 3);
            assert!(dice.iter().all(|&d| (1..=6).contains(&d)));
        }
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["1d8", "2d6+1", "1d10-2"] {
            let dd = DamageDice::parse(s).unwrap();
            assert_eq!(dd.to_string(), s);
        }
    }
}
