//! Offer matching: which waiting tasks go onto which offer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::{Offer, TaskRequest};
use crate::util::{NodeId, OfferId, Resources, TaskId};

/// Tasks assigned to one offer, and what is left of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferAssignment {
    /// Offer the tasks are launched on.
    pub offer_id: OfferId,
    /// Node of the offer.
    pub node_id: NodeId,
    /// Matched tasks in launch order.
    pub task_ids: Vec<TaskId>,
    /// Unused resources of the offer.
    pub residual: Resources,
}

impl OfferAssignment {
    /// True when no task was matched to this offer.
    pub fn is_unused(&self) -> bool {
        self.task_ids.is_empty()
    }
}

/// Result of matching one batch of offers; one entry per offer, in offer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPlan {
    /// Per-offer assignments.
    pub assignments: Vec<OfferAssignment>,
}

impl MatchPlan {
    /// Total number of matched tasks.
    pub fn matched_count(&self) -> usize {
        self.assignments.iter().map(|a| a.task_ids.len()).sum()
    }

    /// All matched task ids, offer by offer.
    pub fn matched_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.assignments.iter().flat_map(|a| a.task_ids.iter())
    }
}

/// Maps a batch of offers to a subset of the waiting tasks. Must be pure:
/// the same inputs always give the same plan.
pub trait OfferMatcher: Send + Sync {
    /// Build a plan for `offers` against `waiting` (oldest first).
    fn plan(&self, waiting: &[&TaskRequest], offers: &[Offer]) -> MatchPlan;
}

/// Greedy first-fit by submission order.
///
/// Offers are filled in the order received; each offer takes every
/// not-yet-claimed waiting task that still fits its residual, oldest first.
/// A task that does not fit is skipped and tried against the next offer, so
/// an older large task never blocks smaller tasks behind it within an offer
/// yet always gets first pick of every offer it fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitMatcher;

impl OfferMatcher for FirstFitMatcher {
    fn plan(&self, waiting: &[&TaskRequest], offers: &[Offer]) -> MatchPlan {
        let mut claimed: HashSet<&TaskId> = HashSet::new();
        let mut assignments = Vec::with_capacity(offers.len());

        for offer in offers {
            let mut residual = offer.resources.clone();
            let mut task_ids = Vec::new();

            for task in waiting {
                if claimed.contains(&task.id) {
                    continue;
                }
                if let Some(left) = residual.checked_sub(&task.resources) {
                    residual = left;
                    claimed.insert(&task.id);
                    task_ids.push(task.id.clone());
                }
            }

            tracing::debug!(
                offer_id = %offer.id,
                node_id = %offer.node_id,
                matched = task_ids.len(),
                "offer matched"
            );
            assignments.push(OfferAssignment {
                offer_id: offer.id.clone(),
                node_id: offer.node_id.clone(),
                task_ids,
                residual,
            });
        }

        MatchPlan { assignments }
    }
}
