//! Server-side re-verification of a proposed payment amount. Advisory only:
//! an accepted verdict lets the caller proceed to capture, nothing is marked
//! paid here. Every rejection carries the data needed to recompute client-side.

use crate::server::error::CoreError;
use crate::server::model::payment::{PaymentIntent, SplitMethod};
use crate::server::split::compute_split;
use crate::server::store::SplitStore;
use serde::Serialize;

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum Rejection {
    MissingRequiredFields {
        missing: Vec<&'static str>,
    },
    ParticipantInactive,
    ParticipantCountMismatch {
        expected: u32,
        actual: u32,
    },
    InvalidAmount {
        amount_cents: i64,
        accepted_amounts: Vec<i64>,
    },
    BillTotalMismatch {
        bill_total_cents: i64,
        recomputed_cents: i64,
    },
}

#[derive(Debug, PartialEq)]
pub(crate) enum Verdict {
    Accepted,
    Rejected(Rejection),
}

/// Validate an intent against live state. Strict split checks apply only to
/// `DYNAMIC_EQUAL`; other methods pass once the participant exists and is
/// active. No retries: a rejection is surfaced immediately.
pub(crate) async fn validate<S: SplitStore>(
    store: &S,
    intent: &PaymentIntent,
) -> Result<Verdict, CoreError> {
    let participant = store
        .find_participant(intent.session_id, intent.participant_id)
        .await?
        .ok_or(CoreError::NotFound)?;
    if !participant.is_active {
        return Ok(Verdict::Rejected(Rejection::ParticipantInactive));
    }
    if intent.split_method != SplitMethod::DynamicEqual {
        return Ok(Verdict::Accepted);
    }

    let (Some(expected_count), Some(bill_total_cents)) =
        (intent.expected_participant_count, intent.bill_total_cents)
    else {
        let mut missing = Vec::new();
        if intent.expected_participant_count.is_none() {
            missing.push("expected_participant_count");
        }
        if intent.bill_total_cents.is_none() {
            missing.push("bill_total_cents");
        }
        return Ok(Verdict::Rejected(Rejection::MissingRequiredFields {
            missing,
        }));
    };

    // Presence read happens after the existence check and before recomputing
    // the split, with the same store consistency as the claim reads.
    let actual_count = store.active_participants(intent.session_id).await?.len() as u32;
    if actual_count != expected_count {
        return Ok(Verdict::Rejected(Rejection::ParticipantCountMismatch {
            expected: expected_count,
            actual: actual_count,
        }));
    }

    let split = compute_split(bill_total_cents, actual_count)?;
    let base = split.base_amount_cents;
    let with_remainder = base + split.remainder_cents;
    if intent.amount_cents != base && intent.amount_cents != with_remainder {
        let mut accepted_amounts = vec![base];
        if with_remainder != base {
            accepted_amounts.push(with_remainder);
        }
        return Ok(Verdict::Rejected(Rejection::InvalidAmount {
            amount_cents: intent.amount_cents,
            accepted_amounts,
        }));
    }

    // Guards against a stale or forged bill total; never silently corrected.
    let recomputed = base * actual_count as i64 + split.remainder_cents;
    if recomputed != bill_total_cents {
        return Ok(Verdict::Rejected(Rejection::BillTotalMismatch {
            bill_total_cents,
            recomputed_cents: recomputed,
        }));
    }

    Ok(Verdict::Accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::presence;
    use crate::server::store::memory::MemStore;
    use crate::server::util::time::mock_chrono;

    fn intent(
        session_id: i64,
        participant_id: i64,
        amount_cents: i64,
        method: SplitMethod,
        expected_count: Option<u32>,
        bill_total: Option<i64>,
    ) -> PaymentIntent {
        PaymentIntent {
            session_id,
            participant_id,
            amount_cents,
            split_method: method,
            expected_participant_count: expected_count,
            bill_total_cents: bill_total,
        }
    }

    async fn session_with_diners(store: &MemStore, session_id: i64, count: u32) -> Vec<i64> {
        let mut ids = Vec::new();
        for i in 0..count {
            mock_chrono::set_now(100 + i as i64);
            let p = presence::join_session(store, session_id, i == 0).await.unwrap();
            ids.push(p.id);
        }
        ids
    }

    #[tokio::test]
    async fn unknown_participant_or_session_is_not_found() {
        let store = MemStore::new();
        let ids = session_with_diners(&store, 1, 1).await;

        let unknown_participant = intent(1, 999, 100, SplitMethod::DynamicEqual, Some(1), Some(100));
        assert!(matches!(
            validate(&store, &unknown_participant).await,
            Err(CoreError::NotFound)
        ));

        // right participant, wrong session
        let wrong_session = intent(2, ids[0], 100, SplitMethod::DynamicEqual, Some(1), Some(100));
        assert!(matches!(
            validate(&store, &wrong_session).await,
            Err(CoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn inactive_participant_is_rejected() {
        let store = MemStore::new();
        let ids = session_with_diners(&store, 1, 2).await;
        presence::leave(&store, ids[1]).await.unwrap();

        let verdict = validate(
            &store,
            &intent(1, ids[1], 500, SplitMethod::DynamicEqual, Some(1), Some(500)),
        )
        .await
        .unwrap();
        assert_eq!(verdict, Verdict::Rejected(Rejection::ParticipantInactive));
    }

    #[tokio::test]
    async fn dynamic_equal_requires_count_and_total() {
        let store = MemStore::new();
        let ids = session_with_diners(&store, 1, 1).await;

        let verdict = validate(
            &store,
            &intent(1, ids[0], 500, SplitMethod::DynamicEqual, None, None),
        )
        .await
        .unwrap();
        assert_eq!(
            verdict,
            Verdict::Rejected(Rejection::MissingRequiredFields {
                missing: vec!["expected_participant_count", "bill_total_cents"]
            })
        );
    }

    #[tokio::test]
    async fn join_between_computation_and_submission_is_rejected() {
        let store = MemStore::new();
        let ids = session_with_diners(&store, 1, 3).await;
        // client computed its split for 3 diners, then a 4th joins
        mock_chrono::set_now(500);
        presence::join_session(&store, 1, false).await.unwrap();

        let verdict = validate(
            &store,
            &intent(1, ids[0], 334, SplitMethod::DynamicEqual, Some(3), Some(1000)),
        )
        .await
        .unwrap();
        assert_eq!(
            verdict,
            Verdict::Rejected(Rejection::ParticipantCountMismatch {
                expected: 3,
                actual: 4
            })
        );
    }

    #[tokio::test]
    async fn accepts_exactly_base_and_base_plus_remainder() {
        let store = MemStore::new();
        let ids = session_with_diners(&store, 1, 3).await;

        for (amount, expected) in [
            (333, Verdict::Accepted),
            (334, Verdict::Accepted),
            (
                332,
                Verdict::Rejected(Rejection::InvalidAmount {
                    amount_cents: 332,
                    accepted_amounts: vec![333, 334],
                }),
            ),
            (
                335,
                Verdict::Rejected(Rejection::InvalidAmount {
                    amount_cents: 335,
                    accepted_amounts: vec![333, 334],
                }),
            ),
        ] {
            let verdict = validate(
                &store,
                &intent(1, ids[0], amount, SplitMethod::DynamicEqual, Some(3), Some(1000)),
            )
            .await
            .unwrap();
            assert_eq!(verdict, expected, "amount {amount}");
        }
    }

    #[tokio::test]
    async fn single_diner_pays_the_whole_bill() {
        let store = MemStore::new();
        let ids = session_with_diners(&store, 1, 1).await;

        let verdict = validate(
            &store,
            &intent(1, ids[0], 2875, SplitMethod::DynamicEqual, Some(1), Some(2875)),
        )
        .await
        .unwrap();
        assert_eq!(verdict, Verdict::Accepted);
    }

    #[tokio::test]
    async fn non_dynamic_methods_pass_after_existence_checks() {
        let store = MemStore::new();
        let ids = session_with_diners(&store, 1, 2).await;

        for method in [SplitMethod::ByItem, SplitMethod::Custom] {
            let verdict = validate(&store, &intent(1, ids[1], 12345, method, None, None))
                .await
                .unwrap();
            assert_eq!(verdict, Verdict::Accepted);
        }

        presence::leave(&store, ids[1]).await.unwrap();
        let verdict = validate(&store, &intent(1, ids[1], 12345, SplitMethod::ByItem, None, None))
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Rejected(Rejection::ParticipantInactive));
    }

    #[test]
    fn rejections_serialize_with_reason_tags() {
        let value = serde_json::to_value(Rejection::ParticipantCountMismatch {
            expected: 3,
            actual: 4,
        })
        .unwrap();
        assert_eq!(value["reason"], "PARTICIPANT_COUNT_MISMATCH");
        assert_eq!(value["expected"], 3);
        assert_eq!(value["actual"], 4);

        let value = serde_json::to_value(Rejection::ParticipantInactive).unwrap();
        assert_eq!(value["reason"], "PARTICIPANT_INACTIVE");
    }
}
