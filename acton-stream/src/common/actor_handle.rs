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

use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use acton_ern::Ern;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError, Receiver, Sender};
use tracing::{instrument, trace};

use crate::common::config::CONFIG;
use crate::message::{Envelope, MessageError};

/// Shared state behind every strong and weak handle of one actor.
struct ActorCell {
    id: Ern,
    outbox: Sender<Envelope>,
}

/// A shared, reference-counted handle to an actor.
///
/// Cloning is cheap and every clone names the same actor. The handle can send
/// [`Envelope`]s into the actor's [`Mailbox`] and observe whether the actor is
/// still alive, which is the case for as long as the mailbox exists.
///
/// Equality and hashing are based solely on the actor's [`Ern`].
#[derive(Clone)]
pub struct ActorHandle {
    cell: Arc<ActorCell>,
}

impl ActorHandle {
    /// Creates a handle and the mailbox it delivers into.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(id: Ern, capacity: usize) -> (Self, Mailbox) {
        let (outbox, inbox) = mpsc::channel(capacity);
        trace!(actor = %id, capacity, "Creating actor mailbox");
        let handle = Self {
            cell: Arc::new(ActorCell {
                id: id.clone(),
                outbox,
            }),
        };
        (handle, Mailbox { id, inbox })
    }

    /// Creates a handle for a root actor named `name`, using the configured
    /// mailbox capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid [`Ern`] root.
    pub fn with_name(name: impl Into<String>) -> anyhow::Result<(Self, Mailbox)> {
        let id = Ern::with_root(name.into())?;
        Ok(Self::new(id, CONFIG.limits.mailbox_capacity))
    }

    /// Returns the actor's identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &Ern {
        &self.cell.id
    }

    /// Returns `true` while the actor's mailbox has not been dropped or closed.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.cell.outbox.is_closed()
    }

    /// Creates a [`WeakActorHandle`] that does not keep this actor reachable.
    #[must_use]
    pub fn downgrade(&self) -> WeakActorHandle {
        WeakActorHandle {
            id: self.cell.id.clone(),
            cell: Arc::downgrade(&self.cell),
        }
    }

    /// Number of strong handles currently naming this actor.
    #[must_use]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.cell)
    }

    /// Places `envelope` into the actor's mailbox without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MailboxFull`] if the mailbox is at capacity and
    /// [`MessageError::Unreachable`] if the actor is gone.
    #[instrument(skip(self, envelope), fields(recipient = %self.cell.id))]
    pub fn deliver(&self, envelope: Envelope) -> Result<(), MessageError> {
        match self.cell.outbox.try_send(envelope) {
            Ok(()) => {
                trace!("Envelope delivered");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(MessageError::MailboxFull(self.cell.id.to_string())),
            Err(TrySendError::Closed(_)) => {
                Err(MessageError::Unreachable(self.cell.id.to_string()))
            }
        }
    }

    /// Completes once the actor's mailbox has been dropped or closed.
    pub async fn terminated(&self) {
        self.cell.outbox.closed().await;
    }
}

impl PartialEq for ActorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.cell.id == other.cell.id
    }
}

impl Eq for ActorHandle {}

impl Hash for ActorHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cell.id.hash(state);
    }
}

impl Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("id", &self.cell.id.to_string())
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A non-owning reference to an actor.
///
/// Used to monitor a source without extending how long it stays reachable:
/// once every [`ActorHandle`] is gone, [`WeakActorHandle::upgrade`] returns `None`.
#[derive(Clone)]
pub struct WeakActorHandle {
    id: Ern,
    cell: Weak<ActorCell>,
}

impl WeakActorHandle {
    /// Returns the identifier of the monitored actor.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &Ern {
        &self.id
    }

    /// Returns a strong handle if the actor is still referenced somewhere.
    #[must_use]
    pub fn upgrade(&self) -> Option<ActorHandle> {
        self.cell.upgrade().map(|cell| ActorHandle { cell })
    }

    /// Returns `true` if the actor is still referenced and its mailbox is open.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some_and(|handle| handle.is_alive())
    }

    /// Completes once the actor terminates or is no longer referenced.
    ///
    /// Waiting holds a sender clone only, so it does not count as a strong handle.
    pub async fn terminated(&self) {
        let outbox = match self.cell.upgrade() {
            Some(cell) => cell.outbox.clone(),
            None => return,
        };
        outbox.closed().await;
    }
}

impl Debug for WeakActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakActorHandle")
            .field("id", &self.id.to_string())
            .finish()
    }
}

/// Receiving half of an actor's mailbox.
///
/// Dropping the mailbox terminates the actor as far as its handles are concerned.
pub struct Mailbox {
    id: Ern,
    inbox: Receiver<Envelope>,
}

impl Mailbox {
    /// Returns the identifier of the owning actor.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &Ern {
        &self.id
    }

    /// Waits for the next envelope. Returns `None` once no handle can deliver anymore.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.inbox.recv().await
    }

    /// Takes the next envelope if one is queued.
    pub fn try_recv(&mut self) -> Option<Envelope> {
        match self.inbox.try_recv() {
            Ok(envelope) => Some(envelope),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Takes every queued envelope.
    pub fn drain(&mut self) -> Vec<Envelope> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Stops accepting new envelopes; queued ones can still be received.
    pub fn close(&mut self) {
        trace!(actor = %self.id, "Closing mailbox");
        self.inbox.close();
    }
}

impl Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("id", &self.id.to_string())
            .finish_non_exhaustive()
    }
}
