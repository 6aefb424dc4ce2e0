//! Status conditions and their mechanical effects.
//!
//! A closed set of eight conditions, each mapped to a fixed effect record.
//! A condition is either present or absent on a participant, never stacked,
//! and two conditions on the same actor do not compound numerically: the
//! resolver takes the most restrictive single adjustment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roll families a condition can fail automatically, before any dice hit
/// the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCategory {
    /// Attack rolls of any kind.
    Attacks,
    /// Skill tests that depend on sight.
    SightChecks,
}

/// The fixed mechanical consequences of one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionEffects {
    /// The actor's attack pools are forced toward keep-lowest.
    pub attack_disadvantage: bool,
    /// The actor's skill-test pools are forced toward keep-lowest.
    pub skill_disadvantage: bool,
    /// Movement is reduced to zero.
    pub movement_zero: bool,
    /// Attacks against this actor are made with advantage.
    pub grants_advantage_to_attackers: bool,
    /// The advantage above only applies to melee attackers.
    pub melee_only: bool,
    /// Attacks against this actor are made with disadvantage.
    pub imposes_disadvantage_on_attackers: bool,
    /// This actor's own attacks are made with advantage.
    pub attacks_with_advantage: bool,
    /// Roll families this actor fails automatically.
    pub auto_fail: &'static [FailureCategory],
    /// A melee hit against this actor is upgraded to a critical.
    pub critical_on_adjacent: bool,
    /// Disadvantage with one extra die on the pile.
    pub double_disadvantage: bool,
}

const NO_EFFECTS: ConditionEffects = ConditionEffects {
    attack_disadvantage: false,
    skill_disadvantage: false,
    movement_zero: false,
    grants_advantage_to_attackers: false,
    melee_only: false,
    imposes_disadvantage_on_attackers: false,
    attacks_with_advantage: false,
    auto_fail: &[],
    critical_on_adjacent: false,
    double_disadvantage: false,
};

const AMEDRONTADO: ConditionEffects = ConditionEffects {
    attack_disadvantage: true,
    skill_disadvantage: true,
    ..NO_EFFECTS
};

const ATORDOADO: ConditionEffects = ConditionEffects {
    movement_zero: true,
    grants_advantage_to_attackers: true,
    auto_fail: &[FailureCategory::Attacks],
    ..NO_EFFECTS
};

const CAIDO: ConditionEffects = ConditionEffects {
    attack_disadvantage: true,
    grants_advantage_to_attackers: true,
    melee_only: true,
    ..NO_EFFECTS
};

const CEGO: ConditionEffects = ConditionEffects {
    attack_disadvantage: true,
    skill_disadvantage: true,
    double_disadvantage: true,
    grants_advantage_to_attackers: true,
    auto_fail: &[FailureCategory::SightChecks],
    ..NO_EFFECTS
};

const CONTIDO: ConditionEffects = ConditionEffects {
    attack_disadvantage: true,
    movement_zero: true,
    grants_advantage_to_attackers: true,
    ..NO_EFFECTS
};

const ENVENENADO: ConditionEffects = ConditionEffects {
    attack_disadvantage: true,
    skill_disadvantage: true,
    ..NO_EFFECTS
};

const INCONSCIENTE: ConditionEffects = ConditionEffects {
    movement_zero: true,
    grants_advantage_to_attackers: true,
    auto_fail: &[FailureCategory::Attacks],
    critical_on_adjacent: true,
    ..NO_EFFECTS
};

const INVISIVEL: ConditionEffects = ConditionEffects {
    attacks_with_advantage: true,
    imposes_disadvantage_on_attackers: true,
    ..NO_EFFECTS
};

/// Status conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Amedrontado,
    Atordoado,
    Caido,
    Cego,
    Contido,
    Envenenado,
    Inconsciente,
    Invisivel,
}

impl Condition {
    /// The mechanical effects of this condition. Total over the enum.
    pub fn effects(&self) -> &'static ConditionEffects {
        match self {
            Condition::Amedrontado => &AMEDRONTADO,
            Condition::Atordoado => &ATORDOADO,
            Condition::Caido => &CAIDO,
            Condition::Cego => &CEGO,
            Condition::Contido => &CONTIDO,
            Condition::Envenenado => &ENVENENADO,
            Condition::Inconsciente => &INCONSCIENTE,
            Condition::Invisivel => &INVISIVEL,
        }
    }

    /// Condition name as it appears on the sheet.
    pub fn name(&self) -> &'static str {
        match self {
            Condition::Amedrontado => "amedrontado",
            Condition::Atordoado => "atordoado",
            Condition::Caido => "caído",
            Condition::Cego => "cego",
            Condition::Contido => "contido",
            Condition::Envenenado => "envenenado",
            Condition::Inconsciente => "inconsciente",
            Condition::Invisivel => "invisível",
        }
    }

    /// Rules text for display layers.
    pub fn description(&self) -> &'static str {
        match self {
            Condition::Amedrontado => {
                "A frightened creature rolls attacks and skill tests with \
                 disadvantage while the source of its fear is in sight."
            }
            Condition::Atordoado => {
                "A stunned creature cannot move, automatically fails its \
                 attacks, and is attacked with advantage."
            }
            Condition::Caido => {
                "A prone creature attacks with disadvantage. Melee attacks \
                 against it are made with advantage."
            }
            Condition::Cego => {
                "A blinded creature automatically fails tests that require \
                 sight, rolls with a doubled disadvantage pool, and is \
                 attacked with advantage."
            }
            Condition::Contido => {
                "A restrained creature cannot move, attacks with \
                 disadvantage, and is attacked with advantage."
            }
            Condition::Envenenado => {
                "A poisoned creature rolls attacks and skill tests with \
                 disadvantage."
            }
            Condition::Inconsciente => {
                "An unconscious creature cannot move or act. Attacks against \
                 it are made with advantage, and any melee hit is a critical."
            }
            Condition::Invisivel => {
                "An invisible creature attacks with advantage and is \
                 attacked with disadvantage."
            }
        }
    }

    pub fn all() -> [Condition; 8] {
        [
            Condition::Amedrontado,
            Condition::Atordoado,
            Condition::Caido,
            Condition::Cego,
            Condition::Contido,
            Condition::Envenenado,
            Condition::Inconsciente,
            Condition::Invisivel,
        ]
    }

    /// Check if this condition prevents movement.
    pub fn prevents_movement(&self) -> bool {
        self.effects().movement_zero
    }

    /// Check if this condition fails the given roll family outright.
    pub fn auto_fails(&self, category: FailureCategory) -> bool {
        self.effects().auto_fail.contains(&category)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
