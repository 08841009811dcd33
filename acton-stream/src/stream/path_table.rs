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

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::common::ActorHandle;
use crate::message::MessageError;
use crate::stream::{
    emit_irregular_shutdown, InboundPath, PathError, StreamError, StreamSlot, StreamSlots,
};

/// The inbound paths of one destination, keyed by receiver slot.
///
/// Removing a path tears it down, so the source is notified exactly when the
/// path leaves the table. A migrating source is rebound in place with
/// [`InboundPath::rebind`]; the key never changes.
///
/// Uses `HashMap` rather than a concurrent map: the table lives inside a single
/// actor and is only touched from its message loop.
#[derive(Debug, Default)]
pub struct InboundPaths {
    paths: HashMap<StreamSlot, InboundPath>,
}

impl InboundPaths {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `path` under its receiver slot.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::SlotInUse`] together with the rejected path if its
    /// receiver slot is taken. The rejected path has not been notified; the
    /// caller decides how to shut it down.
    pub fn insert(&mut self, path: InboundPath) -> Result<&mut InboundPath, (PathError, InboundPath)> {
        let slots = path.slots();
        if self.paths.contains_key(&slots.receiver) {
            debug!(%slots, "Receiver slot already in use");
            return Err((PathError::SlotInUse(slots), path));
        }
        trace!(%slots, "Adding inbound path");
        Ok(self.paths.entry(slots.receiver).or_insert(path))
    }

    /// The path on receiver slot `slot`.
    #[must_use]
    pub fn get(&self, slot: StreamSlot) -> Option<&InboundPath> {
        self.paths.get(&slot)
    }

    /// Mutable access to the path on receiver slot `slot`.
    pub fn get_mut(&mut self, slot: StreamSlot) -> Option<&mut InboundPath> {
        self.paths.get_mut(&slot)
    }

    /// Returns `true` if a path uses receiver slot `slot`.
    #[must_use]
    pub fn contains(&self, slot: StreamSlot) -> bool {
        self.paths.contains_key(&slot)
    }

    /// Number of paths in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if the table holds no paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterates over all paths in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &InboundPath> {
        self.paths.values()
    }

    /// Removes the path on receiver slot `slot`, tearing it down first.
    ///
    /// The returned path is closed; its source has received its shutdown
    /// notification unless an earlier teardown already sent it.
    ///
    /// # Errors
    ///
    /// Returns the [`MessageError`] from [`InboundPath::teardown`]. The path then
    /// stays in the table, and removing it again retries the notification
    /// if the source was only busy.
    pub fn remove(&mut self, slot: StreamSlot) -> Result<Option<InboundPath>, MessageError> {
        let path = match self.paths.get_mut(&slot) {
            Some(path) => path,
            None => return Ok(None),
        };
        path.teardown()?;
        let removed = self.paths.remove(&slot);
        debug!(slot, "Removed inbound path");
        Ok(removed)
    }

    /// Refuses a source during the open handshake.
    ///
    /// The source never gets a path, so the forced drop is sent directly.
    ///
    /// # Errors
    ///
    /// Returns the [`MessageError`] if the source's mailbox did not accept the drop.
    pub fn reject(
        &self,
        initiator: &ActorHandle,
        slots: StreamSlots,
        source: &ActorHandle,
        reason: StreamError,
    ) -> Result<(), MessageError> {
        debug!(%slots, source = %source.id(), %reason, "Rejecting inbound path");
        emit_irregular_shutdown(initiator, slots, source, reason)
    }

    /// Fails and removes every path, sending each source one notification.
    ///
    /// Paths that already recorded a reason keep it. A path whose notification
    /// could not be delivered stays in the table. Returns the number of
    /// notifications delivered.
    pub fn abort_all(&mut self, reason: &StreamError) -> usize {
        debug!(paths = self.paths.len(), %reason, "Aborting all inbound paths");
        let mut delivered = 0;
        self.paths.retain(|_, path| {
            // only fails for paths that are already closed
            let _ = path.abort(reason.clone());
            match path.teardown() {
                Ok(notified) => {
                    delivered += usize::from(notified);
                    false
                }
                Err(_) => true,
            }
        });
        delivered
    }
}
