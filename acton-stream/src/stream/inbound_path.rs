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

//! The per-source path state machine.
//!
//! Every path is in exactly one [`PathState`]:
//!
//! ```text
//! Opening --open--> Open --close--------> ClosingClean --teardown--> Closed
//!                     |                       |
//!                     +--close_with/violation-+--> ClosingError --teardown--> Closed
//! ```
//!
//! Teardown sends the only shutdown notification a path ever emits.

use std::fmt;

use acton_ern::Ern;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use tracing::{debug, instrument, trace, warn};

use crate::common::config::CONFIG;
use crate::common::{ActorHandle, BatchId, Credit, ManagerRef, StreamConfig, WeakActorHandle};
use crate::message::{MessageError, UpstreamContent};
use crate::stream::{
    send_as, CreditLedger, PathError, ShutdownReason, StreamError, StreamPriority, StreamSlots,
};

/// Lifecycle states of an [`InboundPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathState {
    /// Created, waiting for the open handshake.
    Opening,
    /// Credit granted, batches flowing.
    Open,
    /// Marked for a clean drop at teardown.
    ClosingClean,
    /// Marked for a forced drop at teardown.
    ClosingError,
    /// The shutdown notification has been sent. Terminal.
    Closed,
}

impl PathState {
    /// Returns `true` for the two closing states.
    #[must_use]
    pub const fn is_closing(self) -> bool {
        matches!(self, Self::ClosingClean | Self::ClosingError)
    }

    /// Returns `true` once the path is closed.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for PathState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opening => write!(f, "opening"),
            Self::Open => write!(f, "open"),
            Self::ClosingClean => write!(f, "closing_clean"),
            Self::ClosingError => write!(f, "closing_error"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// State for one inbound stream from a source actor.
///
/// A path is owned by the stream manager of the destination actor and only
/// touched from that actor's message loop, so it needs no locking. Every
/// operation is a constant-time state update followed by at most one send.
///
/// Acknowledgments are never sent implicitly: [`InboundPath::on_batch`] only
/// records, and the manager calls [`InboundPath::ack`] whenever it wants to
/// release credit, which lets it acknowledge several batches at once.
///
/// The path holds a strong handle to its source until [`InboundPath::teardown`],
/// which sends exactly one [`UpstreamContent::Drop`] or
/// [`UpstreamContent::ForcedDrop`] and releases the handle. Dropping a path
/// without tearing it down sends nothing.
#[derive(Debug)]
pub struct InboundPath {
    /// Actor hosting the manager responsible for this path.
    manager: ManagerRef,
    /// Slot IDs for sender (source) and receiver (us).
    slots: StreamSlots,
    /// Handle to the source, released at teardown.
    source: Option<ActorHandle>,
    /// Identity of the source, kept for logging after release.
    source_id: Ern,
    /// Priority of incoming batches from this source.
    priority: StreamPriority,
    /// Ideal size for individual batches, echoed in every acknowledgment.
    desired_batch_size: Credit,
    /// Whether the runtime may redeploy the source on failure.
    redeployable: bool,
    ledger: CreditLedger,
    shutdown_reason: ShutdownReason,
    state: PathState,
    /// Actor named as sender of the final notification.
    closed_by: Option<Ern>,
}

assert_impl_all!(InboundPath: Send, Sync);

impl InboundPath {
    /// Constructs a path for `source` on `slots`, using the global configuration.
    ///
    /// The path starts in [`PathState::Opening`] with no credit. Nothing is sent.
    #[must_use]
    pub fn new(manager: ManagerRef, slots: StreamSlots, source: ActorHandle) -> Self {
        Self::with_config(manager, slots, source, &CONFIG)
    }

    /// Constructs a path taking its default priority and batch size from `config`.
    #[must_use]
    pub fn with_config(
        manager: ManagerRef,
        slots: StreamSlots,
        source: ActorHandle,
        config: &StreamConfig,
    ) -> Self {
        trace!(%slots, source = %source.id(), manager = %manager.id(), "Creating inbound path");
        Self {
            manager,
            slots,
            source_id: source.id().clone(),
            source: Some(source),
            priority: config.defaults.priority,
            desired_batch_size: config.defaults.desired_batch_size,
            redeployable: false,
            ledger: CreditLedger::new(),
            shutdown_reason: ShutdownReason::none(),
            state: PathState::Opening,
            closed_by: None,
        }
    }

    /// Completes the open handshake.
    ///
    /// Sets the assigned credit to `initial_demand`, records whether the source
    /// is redeployable and sends one [`UpstreamContent::AckOpen`]. The ack goes to
    /// `rebind_from` when the source is migrating from that identity, otherwise
    /// to the source.
    ///
    /// # Errors
    ///
    /// - [`PathError::AlreadyOpen`] or [`PathError::Closed`] if the path is past `Opening`.
    /// - [`PathError::NegativeValue`] if `initial_demand` is negative.
    /// - [`PathError::Undeliverable`] if the recipient refused the ack. The path
    ///   is open with the granted credit regardless; the next [`InboundPath::ack`]
    ///   repeats the grant.
    ///
    /// On every other error the path is unchanged and nothing is sent.
    #[instrument(skip(self, initiator, rebind_from), fields(slots = %self.slots))]
    pub fn open(
        &mut self,
        initiator: &ActorHandle,
        rebind_from: Option<&ActorHandle>,
        initial_demand: Credit,
        is_redeployable: bool,
    ) -> Result<(), PathError> {
        match self.state {
            PathState::Opening => {}
            PathState::Open => return Err(self.usage_error(PathError::AlreadyOpen, "open")),
            state => return Err(self.usage_error(PathError::Closed(state), "open")),
        }
        if let Err(e) = self.ledger.grant(initial_demand) {
            return Err(self.usage_error(e, "open"));
        }
        self.redeployable = is_redeployable;
        self.state = PathState::Open;
        debug!(initial_demand, is_redeployable, "Path open");

        let content = UpstreamContent::AckOpen {
            rebind_from: rebind_from.map(|handle| handle.id().clone()),
            rebind_to: initiator.id().clone(),
            initial_demand,
            desired_batch_size: self.desired_batch_size,
        };
        if let Some(recipient) = rebind_from.or(self.source.as_ref()) {
            send_as(initiator.id(), recipient, self.slots, content)
                .map_err(PathError::Undeliverable)?;
        }
        Ok(())
    }

    /// Records an arriving batch. Sends nothing.
    ///
    /// # Errors
    ///
    /// - [`PathError::ProtocolViolation`] if `batch_id` does not exceed the last
    ///   received id or `batch_size` exceeds the assigned credit. The violation
    ///   becomes the shutdown reason and the path moves to
    ///   [`PathState::ClosingError`]; the counters are not touched.
    /// - [`PathError::NotOpen`] or [`PathError::Closed`] outside [`PathState::Open`].
    pub fn on_batch(&mut self, batch_size: Credit, batch_id: BatchId) -> Result<(), PathError> {
        match self.state {
            PathState::Open => {}
            PathState::Opening => return Err(self.usage_error(PathError::NotOpen, "on_batch")),
            state => return Err(self.usage_error(PathError::Closed(state), "on_batch")),
        }
        if let Err(reason) = self.ledger.record_batch(batch_size, batch_id) {
            warn!(
                slots = %self.slots,
                source = %self.source_id,
                %reason,
                "Protocol violation on inbound path"
            );
            self.fail(reason.clone());
            return Err(PathError::ProtocolViolation(reason));
        }
        Ok(())
    }

    /// Grants `new_demand` as the new credit total and acknowledges every batch
    /// received so far with one [`UpstreamContent::AckBatch`].
    ///
    /// This is the only way to release backpressure after the open handshake.
    ///
    /// # Errors
    ///
    /// - [`PathError::NegativeValue`] if `new_demand` is negative.
    /// - [`PathError::NotOpen`] or [`PathError::Closed`] outside [`PathState::Open`].
    /// - [`PathError::Undeliverable`] if the source's mailbox refused the ack.
    ///   The grant is recorded; calling `ack` again resends it.
    #[instrument(skip(self, initiator), fields(slots = %self.slots))]
    pub fn ack(&mut self, initiator: &ActorHandle, new_demand: Credit) -> Result<(), PathError> {
        match self.state {
            PathState::Open => {}
            PathState::Opening => return Err(self.usage_error(PathError::NotOpen, "ack")),
            state => return Err(self.usage_error(PathError::Closed(state), "ack")),
        }
        let acknowledged_id = match self.ledger.grant(new_demand) {
            Ok(id) => id,
            Err(e) => return Err(self.usage_error(e, "ack")),
        };
        let content = UpstreamContent::AckBatch {
            new_capacity: new_demand,
            desired_batch_size: self.desired_batch_size,
            acknowledged_id,
        };
        if let Some(source) = &self.source {
            send_as(initiator.id(), source, self.slots, content)
                .map_err(PathError::Undeliverable)?;
        }
        Ok(())
    }

    /// Marks the path for a clean drop, sent by [`InboundPath::teardown`].
    ///
    /// `initiator` is named as the sender of that drop. Closing a path that is
    /// already closing changes nothing; in particular a failing path keeps its
    /// reason and still ends with a forced drop.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Closed`] if the path is already closed.
    pub fn close(&mut self, initiator: &ActorHandle) -> Result<(), PathError> {
        match self.state {
            PathState::Opening | PathState::Open => {
                debug!(slots = %self.slots, initiator = %initiator.id(), "Closing path");
                self.state = PathState::ClosingClean;
                self.closed_by = Some(initiator.id().clone());
                Ok(())
            }
            PathState::ClosingClean | PathState::ClosingError => {
                debug!(slots = %self.slots, state = %self.state, "Path already closing");
                Ok(())
            }
            PathState::Closed => Err(self.usage_error(PathError::Closed(self.state), "close")),
        }
    }

    /// Marks the path for a forced drop carrying `reason`, sent by
    /// [`InboundPath::teardown`].
    ///
    /// Legal from every state but [`PathState::Closed`], including a path
    /// already marked for a clean drop. If a reason was recorded before, that
    /// first reason is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Closed`] if the path is already closed.
    pub fn close_with(&mut self, initiator: &ActorHandle, reason: StreamError) -> Result<(), PathError> {
        if self.state.is_closed() {
            return Err(self.usage_error(PathError::Closed(self.state), "close_with"));
        }
        self.fail(reason);
        self.closed_by.get_or_insert_with(|| initiator.id().clone());
        Ok(())
    }

    /// Records `reason` as the shutdown reason without naming an initiator.
    ///
    /// Used by the manager when it learns about a failure (for example the
    /// source terminated) and will tear the path down later.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Closed`] if the path is already closed.
    pub fn abort(&mut self, reason: StreamError) -> Result<(), PathError> {
        if self.state.is_closed() {
            return Err(self.usage_error(PathError::Closed(self.state), "abort"));
        }
        self.fail(reason);
        Ok(())
    }

    /// Sends the path's single shutdown notification and releases the source.
    ///
    /// A forced drop carrying the shutdown reason if one was recorded, a clean
    /// drop otherwise. The notification names the closing initiator as sender,
    /// or the manager if the path was never explicitly closed.
    ///
    /// Returns `Ok(true)` if this call delivered the notification and
    /// `Ok(false)` if the path was already closed.
    ///
    /// # Errors
    ///
    /// - [`MessageError::MailboxFull`]: nothing was delivered and the path is
    ///   left as it was, so a later `teardown` retries.
    /// - [`MessageError::Unreachable`]: the source is gone. The path is closed
    ///   and the handle released; there is nobody left to notify.
    #[instrument(skip(self), fields(slots = %self.slots, source = %self.source_id))]
    pub fn teardown(&mut self) -> Result<bool, MessageError> {
        if self.state.is_closed() {
            trace!("Path already torn down");
            return Ok(false);
        }
        let content = self.shutdown_reason.shutdown_content();
        let sender = self
            .closed_by
            .clone()
            .unwrap_or_else(|| self.manager.id().clone());
        let delivered = match &self.source {
            Some(source) => {
                debug!(content = %content, "Notifying source of shutdown");
                send_as(&sender, source, self.slots, content)
            }
            None => Ok(()),
        };
        if let Err(MessageError::MailboxFull(_)) = delivered {
            debug!(state = %self.state, "Source mailbox full, teardown can be retried");
            return delivered.map(|()| false);
        }
        self.state = PathState::Closed;
        self.closed_by = None;
        self.source = None;
        delivered.map(|()| true)
    }

    /// Moves the path to a new source identity under the same slot pair.
    ///
    /// Used when a redeployable source was restarted elsewhere.
    ///
    /// # Errors
    ///
    /// - [`PathError::Closed`] if the path is closing or closed.
    /// - [`PathError::NotRedeployable`] if the open handshake did not mark the
    ///   source as redeployable.
    pub fn rebind(&mut self, new_source: ActorHandle) -> Result<(), PathError> {
        if self.state.is_closing() || self.state.is_closed() {
            return Err(self.usage_error(PathError::Closed(self.state), "rebind"));
        }
        if !self.redeployable {
            return Err(self.usage_error(PathError::NotRedeployable, "rebind"));
        }
        debug!(slots = %self.slots, from = %self.source_id, to = %new_source.id(), "Rebinding source");
        self.source_id = new_source.id().clone();
        self.source = Some(new_source);
        Ok(())
    }

    /// Sets the batch size hint sent with future acknowledgments.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NegativeValue`] if `desired_batch_size` is negative.
    pub fn set_desired_batch_size(&mut self, desired_batch_size: Credit) -> Result<(), PathError> {
        if desired_batch_size < 0 {
            return Err(self.usage_error(
                PathError::NegativeValue(desired_batch_size),
                "set_desired_batch_size",
            ));
        }
        self.desired_batch_size = desired_batch_size;
        Ok(())
    }

    /// Sets the priority of this path.
    pub fn set_priority(&mut self, priority: StreamPriority) {
        self.priority = priority;
    }

    /// Slot pair naming this path.
    #[inline]
    #[must_use]
    pub const fn slots(&self) -> StreamSlots {
        self.slots
    }

    /// Handle to the actor hosting the manager.
    #[inline]
    #[must_use]
    pub const fn manager(&self) -> &ManagerRef {
        &self.manager
    }

    /// Handle to the source, `None` once torn down.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> Option<&ActorHandle> {
        self.source.as_ref()
    }

    /// Identity of the current source.
    #[inline]
    #[must_use]
    pub const fn source_id(&self) -> &Ern {
        &self.source_id
    }

    /// A weak handle for watching the source without keeping it reachable.
    #[must_use]
    pub fn monitor(&self) -> Option<WeakActorHandle> {
        self.source.as_ref().map(ActorHandle::downgrade)
    }

    /// Priority of incoming batches.
    #[must_use]
    pub const fn priority(&self) -> StreamPriority {
        self.priority
    }

    /// Batch size hint echoed in acknowledgments.
    #[must_use]
    pub const fn desired_batch_size(&self) -> Credit {
        self.desired_batch_size
    }

    /// Credit the source may still spend.
    #[must_use]
    pub const fn assigned_credit(&self) -> Credit {
        self.ledger.assigned_credit()
    }

    /// Id of the last received batch, `0` if none.
    #[must_use]
    pub const fn last_batch_id(&self) -> BatchId {
        self.ledger.last_batch_id()
    }

    /// Id of the last acknowledged batch, `0` if none.
    #[must_use]
    pub const fn last_acked_batch_id(&self) -> BatchId {
        self.ledger.last_acked_batch_id()
    }

    /// Number of batch ids received but not yet acknowledged.
    #[must_use]
    pub const fn unacknowledged_batches(&self) -> BatchId {
        self.ledger.unacknowledged()
    }

    /// Whether the source may be redeployed, as announced during the handshake.
    #[must_use]
    pub const fn is_redeployable(&self) -> bool {
        self.redeployable
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PathState {
        self.state
    }

    /// The recorded shutdown reason, if the path is failing.
    #[must_use]
    pub const fn shutdown_reason(&self) -> Option<&StreamError> {
        self.shutdown_reason.get()
    }

    /// The ledger behind this path.
    #[must_use]
    pub const fn ledger(&self) -> &CreditLedger {
        &self.ledger
    }

    /// A serializable view of the path for logging and inspection.
    #[must_use]
    pub fn snapshot(&self) -> PathSnapshot {
        PathSnapshot {
            slots: self.slots,
            source: self.source_id.to_string(),
            priority: self.priority,
            last_acked_batch_id: self.ledger.last_acked_batch_id(),
            last_batch_id: self.ledger.last_batch_id(),
            assigned_credit: self.ledger.assigned_credit(),
            desired_batch_size: self.desired_batch_size,
            state: self.state,
        }
    }

    fn fail(&mut self, reason: StreamError) {
        debug!(slots = %self.slots, %reason, "Path failing");
        if !self.shutdown_reason.set(reason) {
            debug!(
                kept = ?self.shutdown_reason.get(),
                "Shutdown reason already recorded, keeping the first one"
            );
        }
        self.state = PathState::ClosingError;
    }

    /// Logs an ignored operation and hands the error back.
    fn usage_error(&self, err: PathError, operation: &'static str) -> PathError {
        warn!(
            slots = %self.slots,
            state = %self.state,
            operation,
            error = %err,
            "Ignoring operation on inbound path"
        );
        err
    }
}

impl Drop for InboundPath {
    fn drop(&mut self) {
        if !self.state.is_closed() {
            warn!(
                slots = %self.slots,
                source = %self.source_id,
                state = %self.state,
                "Inbound path dropped without teardown, source was not notified"
            );
        }
    }
}

/// A serializable view of an [`InboundPath`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSnapshot {
    /// Slot pair naming the path.
    pub slots: StreamSlots,
    /// Identity of the source.
    pub source: String,
    /// Priority of the path.
    pub priority: StreamPriority,
    /// Id of the last acknowledged batch.
    pub last_acked_batch_id: BatchId,
    /// Id of the last received batch.
    pub last_batch_id: BatchId,
    /// Credit the source may still spend.
    pub assigned_credit: Credit,
    /// Batch size hint.
    pub desired_batch_size: Credit,
    /// Lifecycle state.
    pub state: PathState,
}
