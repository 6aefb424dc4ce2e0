//! Combat state machine.
//!
//! One encounter owns its participants, turn counters and action log, and
//! is mutated only through the named operations here. Result records are
//! immutable values; the log stores copies, never shared references.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::attack::{self, CombatResolution, WeaponProfile};
use crate::character::{Attribute, ParticipantId, ParticipantKind, ResourcePool, RosterEntry};
use crate::check::TestRoll;
use crate::conditions::{Condition, FailureCategory};
use crate::dice::DiceError;
use crate::initiative;

/// Skill consulted for initiative rolls, by exact name, on the source
/// sheet's skill map.
pub const INITIATIVE_SKILL: &str = "Iniciativa";

/// Error type for combat operations. State is left untouched when an
/// operation fails.
#[derive(Debug, Error)]
pub enum CombatError {
    #[error("Unknown participant: {0}")]
    UnknownParticipant(ParticipantId),
    #[error("No skill named for the attack roll")]
    UnknownSkill,
    #[error("Combat is not active")]
    CombatNotActive,
    #[error("Combat is already active")]
    CombatAlreadyActive,
    #[error("Initiative has already been rolled for this encounter")]
    InitiativeAlreadyRolled,
    #[error("Initiative has not been rolled yet")]
    InitiativeNotRolled,
    #[error("Cannot start combat with an empty roster")]
    EmptyRoster,
    #[error(transparent)]
    Dice(#[from] DiceError),
}

/// A combatant snapshot, created from a source sheet at `start_combat` and
/// owned by the encounter until it ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub kind: ParticipantKind,
    pub hit_points: ResourcePool,
    pub mana_points: Option<ResourcePool>,
    pub vigor: Option<ResourcePool>,
    pub conditions: HashSet<Condition>,
    /// Flat reduction subtracted from incoming damage; recomputed by the
    /// equipment subsystem and pushed in whenever equipment changes.
    pub damage_reduction: i32,
    /// Destreza attribute, snapshotted for initiative.
    pub destreza: i32,
    /// Iniciativa skill value, snapshotted for initiative.
    pub iniciativa: i32,
    /// Set once initiative is rolled.
    pub initiative: Option<TestRoll>,
}

impl Participant {
    /// Snapshot a roster entry. The source sheet is read once and never
    /// mutated.
    pub fn from_roster(entry: RosterEntry) -> Self {
        let iniciativa = entry.sheet.skill(INITIATIVE_SKILL);
        Self {
            id: entry.sheet.id,
            name: entry.sheet.name,
            kind: entry.kind,
            hit_points: entry.sheet.hit_points,
            mana_points: entry.sheet.mana_points,
            vigor: entry.sheet.vigor,
            conditions: HashSet::new(),
            damage_reduction: entry.damage_reduction,
            destreza: entry.sheet.attributes.destreza,
            iniciativa,
            initiative: None,
        }
    }

    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    /// Check if a condition fails the given roll family outright.
    pub fn auto_fails(&self, category: FailureCategory) -> bool {
        self.conditions.iter().any(|c| c.auto_fails(category))
    }

    /// Movement is zero while any movement-locking condition is present.
    pub fn can_move(&self) -> bool {
        !self.conditions.iter().any(|c| c.prevents_movement())
    }
}

/// What an action-log entry records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    CombatStarted,
    InitiativeRolled,
    TurnAdvanced,
    Attack,
    DamageApplied,
    Healed,
    ConditionAdded,
    ConditionRemoved,
    CombatEnded,
}

/// One append-only transcript entry, consumable by a display layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: Uuid,
    pub round: u32,
    pub turn: usize,
    pub participant_id: Option<ParticipantId>,
    pub action_type: ActionType,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub resolution: Option<CombatResolution>,
}

/// Mutable combat aggregate. Owned by a single controller; the engine
/// assumes one writer and performs no locking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatState {
    pub is_active: bool,
    /// 1-based once initiative is rolled; 0 before.
    pub round: u32,
    /// 0-based index into `turn_order`.
    pub turn: usize,
    pub participants: HashMap<ParticipantId, Participant>,
    /// Roster order, as the encounter was started. Tie-break of last
    /// resort for initiative.
    pub roster: Vec<ParticipantId>,
    /// Fixed once initiative is rolled.
    pub turn_order: Vec<ParticipantId>,
    pub current_participant_id: Option<ParticipantId>,
    pub action_log: Vec<ActionLogEntry>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an encounter from a roster of source characters.
    ///
    /// Snapshots HP/MP/Vigor and the initiative inputs; conditions start
    /// cleared. The sheets themselves are never written back.
    pub fn start_combat(&mut self, roster: Vec<RosterEntry>) -> Result<(), CombatError> {
        if self.is_active {
            return Err(CombatError::CombatAlreadyActive);
        }
        if roster.is_empty() {
            return Err(CombatError::EmptyRoster);
        }

        *self = CombatState::new();
        self.is_active = true;
        for entry in roster {
            let participant = Participant::from_roster(entry);
            self.roster.push(participant.id);
            self.participants.insert(participant.id, participant);
        }

        info!(participants = self.roster.len(), "combat started");
        self.log(None, ActionType::CombatStarted, "Combat begins".to_string(), None);
        Ok(())
    }

    /// Roll initiative for every participant and fix the turn order.
    pub fn roll_initiative_with_rng<R: Rng>(&mut self, rng: &mut R) -> Result<(), CombatError> {
        if !self.is_active {
            return Err(CombatError::CombatNotActive);
        }
        if !self.turn_order.is_empty() {
            return Err(CombatError::InitiativeAlreadyRolled);
        }

        let order = initiative::roll_initiative_with_rng(
            &self.roster,
            &mut self.participants,
            rng,
        );

        for &id in &order {
            let description = {
                let participant = &self.participants[&id];
                let roll = participant
                    .initiative
                    .as_ref()
                    .expect("initiative was just rolled");
                format!("{} rolls initiative: {}", participant.name, roll)
            };
            self.log(Some(id), ActionType::InitiativeRolled, description, None);
        }

        self.turn_order = order;
        self.round = 1;
        self.turn = 0;
        self.current_participant_id = self.turn_order.first().copied();
        info!(order = ?self.turn_order, "initiative rolled");
        Ok(())
    }

    /// Roll initiative with the thread-local RNG.
    pub fn roll_initiative(&mut self) -> Result<(), CombatError> {
        self.roll_initiative_with_rng(&mut rand::thread_rng())
    }

    /// Advance to the next turn, wrapping into a new round.
    pub fn next_turn(&mut self) -> Result<(), CombatError> {
        if !self.is_active {
            return Err(CombatError::CombatNotActive);
        }
        if self.turn_order.is_empty() {
            return Err(CombatError::InitiativeNotRolled);
        }

        self.turn = (self.turn + 1) % self.turn_order.len();
        if self.turn == 0 {
            self.round += 1;
        }
        self.current_participant_id = Some(self.turn_order[self.turn]);

        let name = self
            .current_participant()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        debug!(round = self.round, turn = self.turn, current = %name, "turn advanced");
        self.log(
            self.current_participant_id,
            ActionType::TurnAdvanced,
            format!("Round {}: {}'s turn", self.round, name),
            None,
        );
        Ok(())
    }

    /// Resolve an attack between two participants, apply the damage and
    /// log the outcome.
    #[allow(clippy::too_many_arguments)]
    pub fn attack_with_rng<R: Rng>(
        &mut self,
        attacker_id: ParticipantId,
        target_id: ParticipantId,
        attribute: Attribute,
        attribute_value: i32,
        skill: &str,
        skill_value: i32,
        weapon: &WeaponProfile,
        rng: &mut R,
    ) -> Result<CombatResolution, CombatError> {
        if !self.is_active {
            return Err(CombatError::CombatNotActive);
        }
        if skill.trim().is_empty() {
            return Err(CombatError::UnknownSkill);
        }
        let attacker = self
            .participants
            .get(&attacker_id)
            .ok_or(CombatError::UnknownParticipant(attacker_id))?;
        let target = self
            .participants
            .get(&target_id)
            .ok_or(CombatError::UnknownParticipant(target_id))?;

        let resolution = attack::resolve_attack_with_rng(
            attacker,
            target,
            attribute,
            attribute_value,
            skill,
            skill_value,
            weapon,
            rng,
        )?;

        if resolution.final_damage > 0 {
            let target = self
                .participants
                .get_mut(&target_id)
                .expect("target existence checked above");
            target.hit_points.take_damage(resolution.final_damage);
        }

        self.log(
            Some(attacker_id),
            ActionType::Attack,
            resolution.summary.clone(),
            Some(resolution.clone()),
        );
        Ok(resolution)
    }

    /// Attack with the thread-local RNG.
    #[allow(clippy::too_many_arguments)]
    pub fn attack(
        &mut self,
        attacker_id: ParticipantId,
        target_id: ParticipantId,
        attribute: Attribute,
        attribute_value: i32,
        skill: &str,
        skill_value: i32,
        weapon: &WeaponProfile,
    ) -> Result<CombatResolution, CombatError> {
        self.attack_with_rng(
            attacker_id,
            target_id,
            attribute,
            attribute_value,
            skill,
            skill_value,
            weapon,
            &mut rand::thread_rng(),
        )
    }

    /// Apply flat damage to a participant, clamped at zero HP. The engine
    /// never removes a participant at zero; ending the encounter is the
    /// caller's call.
    pub fn apply_damage(
        &mut self,
        participant_id: ParticipantId,
        amount: i32,
    ) -> Result<i32, CombatError> {
        let participant = self
            .participants
            .get_mut(&participant_id)
            .ok_or(CombatError::UnknownParticipant(participant_id))?;
        let lost = participant.hit_points.take_damage(amount);
        let description = format!(
            "{} takes {} damage (HP {})",
            participant.name, lost, participant.hit_points
        );
        self.log(Some(participant_id), ActionType::DamageApplied, description, None);
        Ok(lost)
    }

    /// Heal a participant, clamped at max HP.
    pub fn heal(
        &mut self,
        participant_id: ParticipantId,
        amount: i32,
    ) -> Result<i32, CombatError> {
        let participant = self
            .participants
            .get_mut(&participant_id)
            .ok_or(CombatError::UnknownParticipant(participant_id))?;
        let healed = participant.hit_points.heal(amount);
        let description = format!(
            "{} heals {} (HP {})",
            participant.name, healed, participant.hit_points
        );
        self.log(Some(participant_id), ActionType::Healed, description, None);
        Ok(healed)
    }

    /// Add a condition. Idempotent: re-adding a present condition changes
    /// nothing and logs nothing.
    pub fn add_condition(
        &mut self,
        participant_id: ParticipantId,
        condition: Condition,
    ) -> Result<bool, CombatError> {
        let participant = self
            .participants
            .get_mut(&participant_id)
            .ok_or(CombatError::UnknownParticipant(participant_id))?;
        let added = participant.conditions.insert(condition);
        if added {
            let description = format!("{} is now {}", participant.name, condition);
            self.log(Some(participant_id), ActionType::ConditionAdded, description, None);
        }
        Ok(added)
    }

    /// Remove a condition; a no-op when absent.
    pub fn remove_condition(
        &mut self,
        participant_id: ParticipantId,
        condition: Condition,
    ) -> Result<bool, CombatError> {
        let participant = self
            .participants
            .get_mut(&participant_id)
            .ok_or(CombatError::UnknownParticipant(participant_id))?;
        let removed = participant.conditions.remove(&condition);
        if removed {
            let description = format!("{} is no longer {}", participant.name, condition);
            self.log(Some(participant_id), ActionType::ConditionRemoved, description, None);
        }
        Ok(removed)
    }

    /// Push in a recomputed damage-reduction value for a participant.
    pub fn set_damage_reduction(
        &mut self,
        participant_id: ParticipantId,
        reduction: i32,
    ) -> Result<(), CombatError> {
        let participant = self
            .participants
            .get_mut(&participant_id)
            .ok_or(CombatError::UnknownParticipant(participant_id))?;
        participant.damage_reduction = reduction;
        Ok(())
    }

    /// End the encounter. The engine defines no automatic end: deciding
    /// when combat is over belongs to the caller.
    pub fn end_combat(&mut self) -> Result<(), CombatError> {
        if !self.is_active {
            return Err(CombatError::CombatNotActive);
        }
        self.is_active = false;
        info!(rounds = self.round, "combat ended");
        self.log(None, ActionType::CombatEnded, "Combat ends".to_string(), None);
        Ok(())
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn current_participant(&self) -> Option<&Participant> {
        self.current_participant_id
            .and_then(|id| self.participants.get(&id))
    }

    /// Check if it is a specific participant's turn.
    pub fn is_turn(&self, id: ParticipantId) -> bool {
        self.current_participant_id == Some(id)
    }

    fn log(
        &mut self,
        participant_id: Option<ParticipantId>,
        action_type: ActionType,
        description: String,
        resolution: Option<CombatResolution>,
    ) {
        self.action_log.push(ActionLogEntry {
            id: Uuid::new_v4(),
            round: self.round,
            turn: self.turn,
            participant_id,
            action_type,
            description,
            timestamp: Utc::now(),
            resolution,
        });
    }
}
