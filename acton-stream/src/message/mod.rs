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

//! Defines the messages a destination sends back to the sources of its
//! inbound paths, and the envelope that carries them.
//!
//! # Key Components
//!
//! *   [`UpstreamMsg`]: A message addressed to a source, tagged with the slot pair
//!     of the path it belongs to.
//! *   [`UpstreamContent`]: The four upstream message kinds: open ack, batch ack,
//!     clean drop and forced drop.
//! *   [`Envelope`]: Wraps an [`UpstreamMsg`] with the identity of the sending actor.
//! *   [`MessageError`]: Delivery failures reported by
//!     [`ActorHandle::deliver`](crate::common::ActorHandle::deliver).

// --- Public Re-exports ---
pub use envelope::Envelope;
pub use message_error::MessageError;
pub use upstream_msg::{UpstreamContent, UpstreamMsg};

// --- Submodules ---

/// Defines [`Envelope`].
mod envelope;
/// Defines [`MessageError`].
mod message_error;
/// Defines [`UpstreamMsg`] and [`UpstreamContent`].
mod upstream_msg;
