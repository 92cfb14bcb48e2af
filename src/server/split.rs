//! Dynamic equal-split arithmetic. Integer cents only; the remainder is
//! assigned to the canonically-first active participant.

use crate::server::error::CoreError;
use crate::server::model::participant::Participant;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct SplitResult {
    pub base_amount_cents: i64,
    pub remainder_cents: i64,
}

/// Floor-division split of `total_cents` among `participant_count` diners.
///
/// `participant_count == 0` yields `{0, 0}`: nobody present, nobody charged.
/// The identity `base * count + remainder == total` holds for every count >= 1.
pub(crate) fn compute_split(
    total_cents: i64,
    participant_count: u32,
) -> Result<SplitResult, CoreError> {
    if total_cents < 0 {
        return Err(CoreError::InvalidArgument("total_cents must be >= 0"));
    }
    let split = match participant_count {
        0 => SplitResult {
            base_amount_cents: 0,
            remainder_cents: 0,
        },
        n => SplitResult {
            base_amount_cents: total_cents / n as i64,
            remainder_cents: total_cents % n as i64,
        },
    };
    Ok(split)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Share {
    pub participant_id: i64,
    pub amount_cents: i64,
    pub covers_remainder: bool,
}

/// Per-participant amounts for a dynamic equal split. Consumes the active set,
/// orders it with the one authoritative comparator and puts the odd cents on
/// the first entry. Both the preview endpoint and the payment validator derive
/// their accepted amounts from the same `compute_split` result, so the two can
/// never disagree about who owes what.
pub(crate) fn shares(
    total_cents: i64,
    mut participants: Vec<Participant>,
) -> Result<Vec<Share>, CoreError> {
    let split = compute_split(total_cents, participants.len() as u32)?;
    participants.sort_by(Participant::canonical_cmp);
    Ok(participants
        .iter()
        .enumerate()
        .map(|(i, p)| Share {
            participant_id: p.id,
            amount_cents: if i == 0 {
                split.base_amount_cents + split.remainder_cents
            } else {
                split.base_amount_cents
            },
            covers_remainder: i == 0 && split.remainder_cents > 0,
        })
        .collect())
}
