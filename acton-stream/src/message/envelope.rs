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

use crate::message::{UpstreamContent, UpstreamMsg};
use crate::stream::StreamSlots;

/// An [`UpstreamMsg`] together with the identity of the actor that sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// The sending actor.
    pub sender: Ern,
    /// The message itself.
    pub message: UpstreamMsg,
}

impl Envelope {
    /// Creates an envelope for `content` on the path named by `slots`.
    #[must_use]
    pub const fn new(sender: Ern, slots: StreamSlots, content: UpstreamContent) -> Self {
        Self {
            sender,
            message: UpstreamMsg { slots, content },
        }
    }
}
