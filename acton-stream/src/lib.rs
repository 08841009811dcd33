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

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

//! # Acton Stream
//!
//! Credit-based flow control for streams flowing between Acton actors. A
//! source actor pushes batches to a destination; the destination keeps one
//! [`InboundPath`](crate::stream::InboundPath) per source and decides when to
//! release more credit. In-flight data is bounded by the credit the
//! destination has granted, and every path ends with exactly one shutdown
//! notification to its source: a clean drop or a forced drop carrying the error.
//!
//! ## Key Concepts
//!
//! - **Paths (`InboundPath`)**: per-source state machine combining the credit
//!   ledger, the shutdown reason and the source identity.
//! - **Ledger (`CreditLedger`)**: pure counters for batch ids and assigned credit.
//! - **Handles (`ActorHandle`)**: shared actor identity plus a mailbox sender;
//!   `WeakActorHandle` observes liveness without keeping the actor reachable.
//! - **Messages (`UpstreamMsg`)**: open acks, batch acks, drops and forced drops
//!   sent from the destination back to the source.
//! - **Irregular shutdown (`emit_irregular_shutdown`)**: forced drop for sources
//!   that have no live path.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use acton_stream::prelude::*;
//!
//! let (manager, _inbox) = ActorHandle::with_name("sink")?;
//! let (source, mut mailbox) = ActorHandle::with_name("source")?;
//!
//! let mut path = InboundPath::new(manager.clone(), StreamSlots::new(1, 2), source);
//! path.open(&manager, None, 100, false)?;
//! path.on_batch(20, 1)?;
//! path.ack(&manager, 100)?;
//! path.close(&manager)?;
//! path.teardown()?;
//! ```

/// Actor identity, mailboxes, configuration and shared type aliases.
pub(crate) mod common;

/// Messages sent upstream and the envelope carrying them.
pub(crate) mod message;

/// Inbound stream paths: slots, priorities, credit ledger and path state machine.
pub(crate) mod stream;

/// Configuration loading for stream defaults.
pub mod config {
    pub use crate::common::config::{DefaultsConfig, LimitsConfig, StreamConfig, CONFIG};
}

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// *   [`crate::common::ActorHandle`]: Shared handle to an actor and its mailbox.
/// *   [`crate::common::WeakActorHandle`]: Non-owning handle used to monitor liveness.
/// *   [`crate::common::Mailbox`]: Receiving side of an actor's mailbox.
/// *   [`crate::message::UpstreamMsg`] / [`crate::message::UpstreamContent`]: Upstream protocol messages.
/// *   [`crate::stream::InboundPath`]: The path controller.
/// *   [`crate::stream::InboundPaths`]: Path table keyed by receiver slot.
/// *   [`crate::stream::emit_irregular_shutdown`]: Stateless forced-drop emitter.
pub mod prelude {
    pub use acton_ern::Ern;

    pub use crate::common::{
        ActorHandle, BatchId, Credit, Mailbox, ManagerRef, StreamConfig, WeakActorHandle,
    };
    pub use crate::message::{Envelope, MessageError, UpstreamContent, UpstreamMsg};
    pub use crate::stream::{
        emit_irregular_shutdown, CreditLedger, InboundPath, InboundPaths, PathError,
        PathSnapshot, PathState, ShutdownReason, StreamError, StreamPriority, StreamSlot,
        StreamSlots,
    };
}
