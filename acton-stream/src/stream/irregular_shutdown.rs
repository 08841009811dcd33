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

use tracing::{debug, instrument};

use crate::common::ActorHandle;
use crate::message::{MessageError, UpstreamContent};
use crate::stream::{send_as, StreamError, StreamSlots};

/// Sends a forced drop to a source that has no live [`InboundPath`](crate::stream::InboundPath).
///
/// This is the same message a path's teardown sends when it failed, built from
/// the identity supplied by the caller. Use it for sources rejected during the
/// open handshake or for paths whose state was already discarded.
///
/// Calls are not deduplicated: two calls send two forced drops.
///
/// # Errors
///
/// Returns the [`MessageError`] if the source's mailbox did not accept the message.
#[instrument(skip(initiator, source, slots), fields(initiator = %initiator.id(), source = %source.id(), slots = %slots))]
pub fn emit_irregular_shutdown(
    initiator: &ActorHandle,
    slots: StreamSlots,
    source: &ActorHandle,
    reason: StreamError,
) -> Result<(), MessageError> {
    debug!(%reason, "Emitting irregular shutdown");
    send_as(
        initiator.id(),
        source,
        slots,
        UpstreamContent::ForcedDrop { reason },
    )
}
