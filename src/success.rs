//! Success grading.
//!
//! A skill value selects a row of result thresholds (normal/good/extreme);
//! the kept die of a pool is compared against them and graded into one of
//! five ordered outcomes. Natural 20 and natural 1 override the table.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five outcomes of a test, ordered worst to best.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SuccessGrade {
    FailureExtreme,
    FailureNormal,
    SuccessNormal,
    SuccessGood,
    SuccessExtreme,
}

impl SuccessGrade {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SuccessGrade::SuccessNormal | SuccessGrade::SuccessGood | SuccessGrade::SuccessExtreme
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SuccessGrade::FailureExtreme => "fracasso extremo",
            SuccessGrade::FailureNormal => "fracasso",
            SuccessGrade::SuccessNormal => "sucesso",
            SuccessGrade::SuccessGood => "sucesso bom",
            SuccessGrade::SuccessExtreme => "sucesso extremo",
        }
    }
}

impl fmt::Display for SuccessGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result thresholds for one skill value. A missing tier is unreachable at
/// that skill level and never matches a die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub normal: Option<u8>,
    pub good: Option<u8>,
    pub extreme: Option<u8>,
}

impl Thresholds {
    /// Thresholds for a skill value.
    ///
    /// Rows exist for skill -1..=20; values above 20 reuse the row for 20
    /// and values below -1 reuse the row for -1.
    pub fn for_skill(skill: i32) -> Thresholds {
        let index = (skill.clamp(-1, 20) + 1) as usize;
        SUCCESS_TABLE[index]
    }
}

fn row(normal: Option<u8>, good: Option<u8>, extreme: Option<u8>) -> Thresholds {
    Thresholds {
        normal,
        good,
        extreme,
    }
}

lazy_static! {
    /// Canonical threshold table, one row per skill value -1..=20.
    ///
    /// Normal thresholds drop one step per skill point; the good tier
    /// opens at skill 3 and the extreme tier at skill 5.
    static ref SUCCESS_TABLE: [Thresholds; 22] = [
        row(None, None, None),              // -1
        row(None, None, None),              //  0
        row(Some(19), None, None),          //  1
        row(Some(18), None, None),          //  2
        row(Some(17), Some(20), None),      //  3
        row(Some(16), Some(19), None),      //  4
        row(Some(15), Some(18), Some(20)),  //  5
        row(Some(14), Some(17), Some(20)),  //  6
        row(Some(13), Some(16), Some(19)),  //  7
        row(Some(12), Some(15), Some(19)),  //  8
        row(Some(11), Some(14), Some(18)),  //  9
        row(Some(10), Some(13), Some(18)),  // 10
        row(Some(9), Some(12), Some(17)),   // 11
        row(Some(8), Some(11), Some(17)),   // 12
        row(Some(7), Some(10), Some(16)),   // 13
        row(Some(6), Some(9), Some(16)),    // 14
        row(Some(5), Some(8), Some(15)),    // 15
        row(Some(4), Some(7), Some(15)),    // 16
        row(Some(3), Some(6), Some(14)),    // 17
        row(Some(2), Some(5), Some(14)),    // 18
        row(Some(2), Some(4), Some(13)),    // 19
        row(Some(2), Some(3), Some(12)),    // 20
    ];
}

/// Grade a kept die against a skill value.
///
/// Natural 20 always succeeds maximally and natural 1 always fails
/// maximally, regardless of skill. A skill of 0 or below reaches no
/// threshold at all.
pub fn grade(die: u8, skill: i32) -> SuccessGrade {
    if die == 20 {
        return SuccessGrade::SuccessExtreme;
    }
    if die == 1 {
        return SuccessGrade::FailureExtreme;
    }
    if skill <= 0 {
        return SuccessGrade::FailureNormal;
    }

    let thresholds = Thresholds::for_skill(skill);
    let reaches = |t: Option<u8>| t.is_some_and(|t| die >= t);

    if reaches(thresholds.extreme) {
        SuccessGrade::SuccessExtreme
    } else if reaches(thresholds.good) {
        SuccessGrade::SuccessGood
    } else if reaches(thresholds.normal) {
        SuccessGrade::SuccessNormal
    } else {
        SuccessGrade::FailureNormal
    }
}
