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

//! Provides actor identity, mailboxes, configuration and the shared type aliases
//! used by the stream paths.
//!
//! # Key Re-exported Components:
//!
//! *   [`ActorHandle`]: Shared, reference-counted identity of an actor together with
//!     the sending half of its mailbox.
//! *   [`WeakActorHandle`]: A non-owning handle that observes liveness without
//!     extending the actor's reachability.
//! *   [`Mailbox`]: The receiving half owned by the actor itself.
//! *   [`StreamConfig`]: Defaults and limits loaded from XDG-compliant locations.

// --- Public Re-exports ---
pub use actor_handle::{ActorHandle, Mailbox, WeakActorHandle};
pub use config::StreamConfig;
pub use types::*;

// --- Submodules ---

/// Defines [`ActorHandle`], [`WeakActorHandle`] and [`Mailbox`].
mod actor_handle;
/// Defines the configuration system for stream defaults.
pub mod config;
/// Defines common type aliases.
mod types;
