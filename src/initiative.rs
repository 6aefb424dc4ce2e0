//! Initiative rolls and turn ordering.
//!
//! Each participant rolls a test from their Destreza pool against their
//! Iniciativa skill. Ordering is fully deterministic: grade first, kept
//! die second, original roster order last (stable sort, never randomized
//! further).

use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

use crate::character::ParticipantId;
use crate::check;
use crate::combat::Participant;
use crate::success::SuccessGrade;

/// Roll initiative for every participant, in roster order, and return the
/// resulting turn order. Stores each `TestRoll` on its participant.
pub fn roll_initiative_with_rng<R: Rng>(
    roster: &[ParticipantId],
    participants: &mut HashMap<ParticipantId, Participant>,
    rng: &mut R,
) -> Vec<ParticipantId> {
    for id in roster {
        if let Some(participant) = participants.get_mut(id) {
            let vantage = check::skill_test_vantage(&participant.conditions);
            let roll =
                check::roll_test_with_rng(participant.destreza, participant.iniciativa, vantage, rng);
            debug!(name = %participant.name, roll = %roll, "initiative");
            participant.initiative = Some(roll);
        }
    }

    let rolls: Vec<(ParticipantId, SuccessGrade, u8)> = roster
        .iter()
        .filter_map(|id| {
            let roll = participants.get(id)?.initiative.as_ref()?;
            Some((*id, roll.grade, roll.kept.unwrap_or(0)))
        })
        .collect();
    order(&rolls)
}

/// Order initiative entries: grade descending, kept die descending,
/// original order preserved on residual ties.
pub fn order(rolls: &[(ParticipantId, SuccessGrade, u8)]) -> Vec<ParticipantId> {
    let mut sorted: Vec<_> = rolls.to_vec();
    // sort_by is stable, so equal entries keep roster order.
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.2.cmp(&a.2)));
    sorted.into_iter().map(|(id, _, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<ParticipantId> {
        (0..n).map(|_| ParticipantId::new()).collect()
    }

    #[test]
    fn test_order_by_grade_then_kept() {
        let ids = ids(3);
        let rolls = vec![
            (ids[0], SuccessGrade::SuccessNormal, 19),
            (ids[1], SuccessGrade::SuccessGood, 9),
            (ids[2], SuccessGrade::SuccessGood, 14),
        ];
        // Good beats normal regardless of the kept die; within the good
        // tier the higher kept die goes first.
        assert_eq!(order(&rolls), vec![ids[2], ids[1], ids[0]]);
    }

    #[test]
    fn test_residual_ties_keep_roster_order() {
        let ids = ids(4);
        let rolls = vec![
            (ids[0], SuccessGrade::SuccessNormal, 12),
            (ids[1], SuccessGrade::SuccessNormal, 12),
            (ids[2], SuccessGrade::SuccessNormal, 12),
            (ids[3], SuccessGrade::SuccessExtreme, 20),
        ];
        assert_eq!(order(&rolls), vec![ids[3], ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn test_failures_sort_below_successes() {
        let ids = ids(2);
        let rolls = vec![
            (ids[0], SuccessGrade::FailureExtreme, 1),
            (ids[1], SuccessGrade::FailureNormal, 3),
        ];
        assert_eq!(order(&rolls), vec![ids[1], ids[0]]);
    }
}
