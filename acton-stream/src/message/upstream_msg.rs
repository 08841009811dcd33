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

use acton_ern::Ern;

use crate::common::{BatchId, Credit};
use crate::stream::{StreamError, StreamSlots};

/// A message sent from a destination to the source of one of its paths.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamMsg {
    /// Slot pair of the path this message belongs to.
    pub slots: StreamSlots,
    /// The message payload.
    pub content: UpstreamContent,
}

/// Payloads of [`UpstreamMsg`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamContent {
    /// Accepts a new path and grants its initial credit.
    AckOpen {
        /// Previous identity of a migrating source, if any.
        rebind_from: Option<Ern>,
        /// Identity the source should address its batches to from now on.
        rebind_to: Ern,
        /// Initial credit granted to the source.
        initial_demand: Credit,
        /// Batch size the destination would like to receive.
        desired_batch_size: Credit,
    },
    /// Acknowledges received batches and sets a new credit total.
    AckBatch {
        /// Credit now available to the source.
        new_capacity: Credit,
        /// Batch size the destination would like to receive.
        desired_batch_size: Credit,
        /// Highest batch id covered by this acknowledgment.
        acknowledged_id: BatchId,
    },
    /// Orderly end of the path.
    Drop,
    /// Failed end of the path, carrying the error verbatim.
    ForcedDrop {
        /// Why the path was closed.
        reason: StreamError,
    },
}

impl UpstreamMsg {
    /// Returns `true` for the two shutdown notifications.
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        matches!(
            self.content,
            UpstreamContent::Drop | UpstreamContent::ForcedDrop { .. }
        )
    }

    /// Credit granted by this message, if it grants any.
    #[must_use]
    pub const fn granted_credit(&self) -> Option<Credit> {
        match self.content {
            UpstreamContent::AckOpen { initial_demand, .. } => Some(initial_demand),
            UpstreamContent::AckBatch { new_capacity, .. } => Some(new_capacity),
            UpstreamContent::Drop | UpstreamContent::ForcedDrop { .. } => None,
        }
    }
}

impl std::fmt::Display for UpstreamContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AckOpen { initial_demand, .. } => write!(f, "ack_open({initial_demand})"),
            Self::AckBatch {
                new_capacity,
                acknowledged_id,
                ..
            } => write!(f, "ack_batch({new_capacity}, #{acknowledged_id})"),
            Self::Drop => write!(f, "drop"),
            Self::ForcedDrop { reason } => write!(f, "forced_drop({reason})"),
        }
    }
}
