//! Optimistic claim ledger. Claims are idempotent-set: the requested quantity
//! becomes the caller's claimed share. The version compare-and-swap lives in
//! the store; this module owns the decision logic around it.

use crate::server::error::CoreError;
use crate::server::model::item::ClaimRequest;
use crate::server::store::{ClaimWrite, ReleaseWrite, SplitStore};
use log::debug;

#[derive(Debug, PartialEq)]
pub(crate) enum ClaimOutcome {
    Applied {
        new_version: i64,
    },
    /// Not an error: the caller raced another claimer or holds a stale view.
    /// Carries the live version so the caller can refetch and retry.
    VersionConflict {
        current_version: i64,
    },
    ExceedsAvailable {
        requested: i32,
        available: i32,
    },
}

pub(crate) async fn claim<S: SplitStore>(
    store: &S,
    item_id: i64,
    req: &ClaimRequest,
) -> Result<ClaimOutcome, CoreError> {
    if req.quantity < 0 {
        return Err(CoreError::InvalidArgument("quantity must be >= 0"));
    }
    if req.expected_version < 1 {
        return Err(CoreError::InvalidArgument("expected_version must be >= 1"));
    }

    let item = store
        .fetch_item(item_id)
        .await?
        .ok_or(CoreError::NotFound)?;
    if item.version != req.expected_version {
        debug!(
            "claim conflict on item={}: expected v{}, stored v{}",
            item_id, req.expected_version, item.version
        );
        return Ok(ClaimOutcome::VersionConflict {
            current_version: item.version,
        });
    }

    // Capacity is judged on the snapshot we just read. The CAS below is keyed
    // to that snapshot's version, so whenever the write lands the snapshot was
    // still authoritative.
    let held_by_others = match item.claimed_by {
        Some(owner) if owner == req.participant_id => 0,
        _ => item.claimed_quantity,
    };
    // i64 math so a huge requested quantity cannot wrap the capacity check
    let new_quantity = held_by_others as i64 + req.quantity as i64;
    if new_quantity > item.total_quantity as i64 {
        return Ok(ClaimOutcome::ExceedsAvailable {
            requested: req.quantity,
            available: item.total_quantity - held_by_others,
        });
    }
    let new_quantity = new_quantity as i32;
    let new_claimed_by = if req.quantity > 0 {
        Some(req.participant_id)
    } else if new_quantity > 0 {
        item.claimed_by
    } else {
        None
    };

    match store
        .write_claim(item_id, req.expected_version, new_quantity, new_claimed_by)
        .await?
    {
        ClaimWrite::Applied { new_version } => Ok(ClaimOutcome::Applied { new_version }),
        ClaimWrite::VersionMismatch { current_version } => {
            debug!(
                "claim lost the race on item={}: stored v{}",
                item_id, current_version
            );
            Ok(ClaimOutcome::VersionConflict { current_version })
        }
        ClaimWrite::Missing => Err(CoreError::NotFound),
    }
}

/// Clear a claim. Only the current owner may release; the ownership gate is
/// enforced in the same conditional write that clears the fields.
pub(crate) async fn release<S: SplitStore>(
    store: &S,
    item_id: i64,
    participant_id: i64,
) -> Result<i64, CoreError> {
    match store.write_release(item_id, participant_id).await? {
        ReleaseWrite::Applied { new_version } => Ok(new_version),
        ReleaseWrite::NotOwner => Err(CoreError::PermissionDenied),
        ReleaseWrite::Missing => Err(CoreError::NotFound),
    }
}
