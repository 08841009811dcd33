/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Batch and credit bookkeeping for one inbound path.
//!
//! The ledger only counts. It never sends anything and never corrects a
//! violation: a batch that breaks the protocol is rejected and the counters
//! stay as they were.

use serde::Serialize;
use tracing::trace;

use crate::common::{BatchId, Credit};
use crate::stream::{PathError, StreamError};

/// Counters for the batches received on a path and the credit granted to its source.
///
/// Invariants: `last_acked_batch_id <= last_batch_id`, and `assigned_credit`
/// is never negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreditLedger {
    /// Id of the last batch acknowledged to the source.
    last_acked_batch_id: BatchId,
    /// Id of the last batch received. `0` until the first batch arrives.
    last_batch_id: BatchId,
    /// Credit the source may still spend.
    assigned_credit: Credit,
}

impl CreditLedger {
    /// Creates an empty ledger with no credit and no batches.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_acked_batch_id: 0,
            last_batch_id: 0,
            assigned_credit: 0,
        }
    }

    /// Records an arriving batch of `batch_size` with id `batch_id`.
    ///
    /// On success the batch is charged against the assigned credit and becomes
    /// the last received batch.
    ///
    /// # Errors
    ///
    /// - [`StreamError::BatchIdNotIncreasing`] if `batch_id` does not exceed the
    ///   last received id, whatever the size.
    /// - [`StreamError::InvalidBatchSize`] if `batch_size` is negative.
    /// - [`StreamError::CreditExceeded`] if `batch_size` exceeds the assigned credit.
    pub fn record_batch(&mut self, batch_size: Credit, batch_id: BatchId) -> Result<(), StreamError> {
        if batch_id <= self.last_batch_id {
            return Err(StreamError::BatchIdNotIncreasing {
                last: self.last_batch_id,
                received: batch_id,
            });
        }
        if batch_size < 0 {
            return Err(StreamError::InvalidBatchSize(batch_size));
        }
        if batch_size > self.assigned_credit {
            return Err(StreamError::CreditExceeded {
                batch_size,
                credit: self.assigned_credit,
            });
        }
        self.assigned_credit -= batch_size;
        self.last_batch_id = batch_id;
        trace!(
            batch_id,
            batch_size,
            assigned_credit = self.assigned_credit,
            "Recorded batch"
        );
        Ok(())
    }

    /// Sets the assigned credit to `new_total` and acknowledges every batch seen so far.
    ///
    /// The value is absolute, not a delta, and may be lower than the credit
    /// that was left.
    ///
    /// # Returns
    ///
    /// The id of the last acknowledged batch.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NegativeValue`] if `new_total` is negative; the
    /// ledger is left unchanged.
    pub fn grant(&mut self, new_total: Credit) -> Result<BatchId, PathError> {
        if new_total < 0 {
            return Err(PathError::NegativeValue(new_total));
        }
        self.assigned_credit = new_total;
        self.last_acked_batch_id = self.last_batch_id;
        trace!(
            assigned_credit = new_total,
            acknowledged_id = self.last_acked_batch_id,
            "Granted credit"
        );
        Ok(self.last_acked_batch_id)
    }

    /// Id of the last batch acknowledged to the source.
    #[must_use]
    pub const fn last_acked_batch_id(&self) -> BatchId {
        self.last_acked_batch_id
    }

    /// Id of the last batch received, `0` if none.
    #[must_use]
    pub const fn last_batch_id(&self) -> BatchId {
        self.last_batch_id
    }

    /// Credit the source may still spend.
    #[must_use]
    pub const fn assigned_credit(&self) -> Credit {
        self.assigned_credit
    }

    /// Number of batch ids received but not yet acknowledged.
    #[must_use]
    pub const fn unacknowledged(&self) -> BatchId {
        self.last_batch_id - self.last_acked_batch_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with_credit(credit: Credit) -> CreditLedger {
        let mut ledger = CreditLedger::new();
        ledger.grant(credit).unwrap();
        ledger
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = CreditLedger::new();
        assert_eq!(ledger, CreditLedger::default());
        assert_eq!(ledger.assigned_credit(), 0);
        assert_eq!(ledger.last_batch_id(), 0);
        assert_eq!(ledger.last_acked_batch_id(), 0);
    }

    #[test]
    fn batches_consume_credit() {
        let mut ledger = ledger_with_credit(100);
        let sizes = [10, 25, 5, 40];
        for (id, size) in (1..).zip(sizes) {
            ledger.record_batch(size, id).unwrap();
        }
        assert_eq!(ledger.assigned_credit(), 100 - sizes.iter().sum::<Credit>());
        assert_eq!(ledger.last_batch_id(), 4);
        assert_eq!(ledger.last_acked_batch_id(), 0);
        assert_eq!(ledger.unacknowledged(), 4);
    }

    #[test]
    fn ids_may_skip_but_never_repeat() {
        let mut ledger = ledger_with_credit(10);
        ledger.record_batch(1, 3).unwrap();
        ledger.record_batch(1, 9).unwrap();

        let err = ledger.record_batch(0, 9).unwrap_err();
        assert_eq!(err, StreamError::BatchIdNotIncreasing { last: 9, received: 9 });
        let err = ledger.record_batch(1, 4).unwrap_err();
        assert_eq!(err, StreamError::BatchIdNotIncreasing { last: 9, received: 4 });
        assert_eq!(ledger.assigned_credit(), 8);
    }

    #[test]
    fn stale_id_is_rejected_before_size_is_checked() {
        let mut ledger = ledger_with_credit(10);
        ledger.record_batch(5, 1).unwrap();
        let err = ledger.record_batch(500, 1).unwrap_err();
        assert!(matches!(err, StreamError::BatchIdNotIncreasing { .. }));
    }

    #[test]
    fn over_credit_batch_leaves_ledger_untouched() {
        let mut ledger = ledger_with_credit(10);
        ledger.record_batch(4, 1).unwrap();
        let before = ledger.clone();

        let err = ledger.record_batch(7, 2).unwrap_err();
        assert_eq!(
            err,
            StreamError::CreditExceeded {
                batch_size: 7,
                credit: 6
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn batch_may_spend_exactly_the_remaining_credit() {
        let mut ledger = ledger_with_credit(10);
        ledger.record_batch(10, 1).unwrap();
        assert_eq!(ledger.assigned_credit(), 0);
        assert!(ledger.record_batch(1, 2).is_err());
    }

    #[test]
    fn negative_batch_size_is_rejected() {
        let mut ledger = ledger_with_credit(10);
        assert_eq!(
            ledger.record_batch(-1, 1).unwrap_err(),
            StreamError::InvalidBatchSize(-1)
        );
        assert_eq!(ledger.last_batch_id(), 0);
    }

    #[test]
    fn grant_is_absolute_and_acknowledges_everything_seen() {
        let mut ledger = ledger_with_credit(50);
        ledger.record_batch(10, 1).unwrap();
        ledger.record_batch(10, 2).unwrap();

        // lower than the 30 that was left
        let acked = ledger.grant(5).unwrap();
        assert_eq!(acked, 2);
        assert_eq!(ledger.assigned_credit(), 5);
        assert_eq!(ledger.last_acked_batch_id(), 2);
        assert_eq!(ledger.unacknowledged(), 0);
    }

    #[test]
    fn negative_grant_is_rejected() {
        let mut ledger = ledger_with_credit(50);
        ledger.record_batch(10, 1).unwrap();
        assert_eq!(ledger.grant(-3).unwrap_err(), PathError::NegativeValue(-3));
        assert_eq!(ledger.assigned_credit(), 40);
        assert_eq!(ledger.last_acked_batch_id(), 0);
    }
}
