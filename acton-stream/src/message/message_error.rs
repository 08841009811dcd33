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
/// Represents errors that can occur when delivering messages to an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The recipient's mailbox is at capacity.
    MailboxFull(String),
    /// The recipient has terminated.
    Unreachable(String),
}

impl std::fmt::Display for MessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MailboxFull(actor) => write!(f, "Mailbox of {actor} is full"),
            Self::Unreachable(actor) => write!(f, "Actor {actor} is unreachable"),
        }
    }
}

impl std::error::Error for MessageError {}
