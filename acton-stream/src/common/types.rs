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

//! Type aliases shared by the ledger, the path controller and the messages.

use crate::common::ActorHandle;

/// Identifier of a batch on one path.
///
/// Ids start at 1 and strictly increase; `0` means no batch has been seen yet.
pub type BatchId = i64;

/// Credit, batch sizes and demand, all counted in one abstract unit.
///
/// The unit is whatever the manager uses consistently (elements, bytes, ...).
/// Negative values are never valid.
pub type Credit = i64;

/// A type alias representing a handle ([`ActorHandle`]) to the actor hosting a
/// stream manager.
///
/// Paths keep this handle so that a teardown triggered by the manager can name
/// the sender of the final notification.
pub type ManagerRef = ActorHandle;
