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

use std::fmt;

use derive_new::new;
use serde::{Deserialize, Serialize};

/// Identifies one side of a stream within an actor's set of active streams.
pub type StreamSlot = u16;

/// The pair of slots that jointly name one logical stream.
///
/// `sender` is chosen by the source, `receiver` by the destination. The pair is
/// immutable once the path exists and unique within each actor's active streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, new)]
pub struct StreamSlots {
    /// Slot chosen by the source.
    pub sender: StreamSlot,
    /// Slot chosen by the destination.
    pub receiver: StreamSlot,
}

impl fmt::Display for StreamSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.sender, self.receiver)
    }
}
