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
use tracing::{trace, warn};

use crate::common::ActorHandle;
use crate::message::{Envelope, MessageError, UpstreamContent};
use crate::stream::StreamSlots;

/// Sends `content` on the path `slots` to `recipient`, naming `sender` as its origin.
///
/// Nothing is retried. A failed delivery is logged and returned; the path state
/// has already moved on by the time this is called.
pub(crate) fn send_as(
    sender: &Ern,
    recipient: &ActorHandle,
    slots: StreamSlots,
    content: UpstreamContent,
) -> Result<(), MessageError> {
    trace!(
        sender = %sender,
        recipient = %recipient.id(),
        %slots,
        content = %content,
        "Sending upstream message"
    );
    recipient
        .deliver(Envelope::new(sender.clone(), slots, content))
        .inspect_err(|e| warn!(%slots, error = %e, "Upstream message was not delivered"))
}
