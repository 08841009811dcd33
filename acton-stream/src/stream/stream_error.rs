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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{BatchId, Credit};
use crate::message::MessageError;
use crate::stream::{PathState, StreamSlots};

/// Why a path ended abnormally.
///
/// This is the value recorded as a path's shutdown reason and carried verbatim
/// to the source in a forced drop, so the peer can tell failure from an orderly end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamError {
    /// A batch arrived whose id does not exceed the last received id.
    ///
    /// Reordered or duplicated delivery by the transport.
    BatchIdNotIncreasing {
        /// Last batch id accepted on the path.
        last: BatchId,
        /// The offending batch id.
        received: BatchId,
    },
    /// A batch larger than the credit the source was granted.
    CreditExceeded {
        /// Size of the offending batch.
        batch_size: Credit,
        /// Credit that was available.
        credit: Credit,
    },
    /// A batch with a negative size.
    InvalidBatchSize(Credit),
    /// The source actor terminated before the path closed.
    SourceDown(String),
    /// The destination stopped consuming.
    Cancelled,
    /// Any other failure reported by the stream manager.
    Runtime(String),
}

impl StreamError {
    /// Returns `true` for errors detected by the path itself while recording batches.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::BatchIdNotIncreasing { .. } | Self::CreditExceeded { .. } | Self::InvalidBatchSize(_)
        )
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BatchIdNotIncreasing { last, received } => {
                write!(f, "batch id {received} does not follow {last}")
            }
            Self::CreditExceeded { batch_size, credit } => {
                write!(f, "batch of {batch_size} exceeds assigned credit {credit}")
            }
            Self::InvalidBatchSize(size) => write!(f, "invalid batch size {size}"),
            Self::SourceDown(source) => write!(f, "source {source} terminated"),
            Self::Cancelled => write!(f, "stream cancelled"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
        }
    }
}

impl std::error::Error for StreamError {}

/// Errors returned by [`InboundPath`](crate::stream::InboundPath) operations.
///
/// Protocol violations also close the path. [`PathError::Undeliverable`] is
/// returned after the state change took effect. Every other variant is a usage
/// error that leaves the path untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The source broke the protocol. The path is now closing with this reason.
    ProtocolViolation(StreamError),
    /// Batches or acks before the open handshake.
    NotOpen,
    /// A second open handshake.
    AlreadyOpen,
    /// The operation is not allowed in this state.
    Closed(PathState),
    /// A rebind on a path whose source is not redeployable.
    NotRedeployable,
    /// A negative credit, demand or batch size hint.
    NegativeValue(Credit),
    /// Another path already uses this receiver slot.
    SlotInUse(StreamSlots),
    /// The path was updated but the source's mailbox refused the message.
    ///
    /// The ledger already holds the new grant; acking again resends it.
    Undeliverable(MessageError),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProtocolViolation(reason) => write!(f, "protocol violation: {reason}"),
            Self::NotOpen => write!(f, "path is not open yet"),
            Self::AlreadyOpen => write!(f, "path is already open"),
            Self::Closed(state) => write!(f, "operation not allowed on a {state} path"),
            Self::NotRedeployable => write!(f, "source is not redeployable"),
            Self::NegativeValue(value) => write!(f, "negative value {value}"),
            Self::SlotInUse(slots) => write!(f, "slot pair {slots} is already in use"),
            Self::Undeliverable(err) => write!(f, "message to source not delivered: {err}"),
        }
    }
}

impl std::error::Error for PathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ProtocolViolation(reason) => Some(reason),
            Self::Undeliverable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StreamError> for PathError {
    fn from(reason: StreamError) -> Self {
        Self::ProtocolViolation(reason)
    }
}
