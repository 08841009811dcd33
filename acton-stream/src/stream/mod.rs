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

//! Inbound stream paths and the credit-based flow control that governs them.
//!
//! A destination actor keeps one [`InboundPath`] per source. Each path composes
//! a [`CreditLedger`] (batch ids and assigned credit) with a [`ShutdownReason`]
//! and the source's identity, and exposes the protocol operations to the stream
//! manager that owns it:
//!
//! *   [`InboundPath::open`] grants the initial credit and acknowledges the handshake.
//! *   [`InboundPath::on_batch`] records an arriving batch; no message is sent.
//! *   [`InboundPath::ack`] sets a new credit total and acknowledges every batch seen so far.
//! *   [`InboundPath::close`] / [`InboundPath::close_with`] mark the path for a clean
//!     or forced shutdown.
//! *   [`InboundPath::teardown`] sends the single shutdown notification.
//!
//! [`emit_irregular_shutdown`] sends a forced drop for sources that never got a
//! live path, and [`InboundPaths`] is a path table keyed by receiver slot whose
//! removals trigger teardown.

// --- Public Re-exports ---
pub use credit_ledger::CreditLedger;
pub use inbound_path::{InboundPath, PathSnapshot, PathState};
pub use irregular_shutdown::emit_irregular_shutdown;
pub use path_table::InboundPaths;
pub use shutdown_reason::ShutdownReason;
pub use stream_error::{PathError, StreamError};
pub use stream_priority::StreamPriority;
pub use stream_slots::{StreamSlot, StreamSlots};

// --- Crate-Internal Re-exports ---
pub(crate) use send::send_as;

// --- Submodules ---

/// Defines [`CreditLedger`].
mod credit_ledger;
/// Defines [`InboundPath`] and [`PathState`].
mod inbound_path;
/// Defines [`emit_irregular_shutdown`].
mod irregular_shutdown;
/// Defines [`InboundPaths`].
mod path_table;
/// Sends upstream messages on behalf of an actor.
mod send;
/// Defines [`ShutdownReason`].
mod shutdown_reason;
/// Defines [`StreamError`] and [`PathError`].
mod stream_error;
/// Defines [`StreamPriority`].
mod stream_priority;
/// Defines [`StreamSlots`].
mod stream_slots;
