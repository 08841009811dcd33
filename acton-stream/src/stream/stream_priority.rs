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

//! Priorities of inbound paths.
//!
//! The priority only tags a path. How it influences credit distribution across
//! paths is decided by the stream manager.

use serde::{Deserialize, Serialize};

/// Ordinal priority of the batches arriving on a path.
///
/// Variants are declared from lowest to highest, so `Ord` follows priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamPriority {
    /// Served only when nothing else is waiting.
    VeryLow,
    /// Below the default.
    Low,
    /// The default priority of new paths.
    #[default]
    Normal,
    /// Above the default.
    High,
    /// Served before everything else.
    VeryHigh,
}

impl std::fmt::Display for StreamPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VeryLow => write!(f, "very_low"),
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
            Self::VeryHigh => write!(f, "very_high"),
        }
    }
}
