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

use crate::message::UpstreamContent;
use crate::stream::StreamError;

/// Holds why a path is shutting down, if it failed.
///
/// Absent means the path ends cleanly. A reason is chosen at most once; later
/// attempts keep the first one so the source learns about the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReason(Option<StreamError>);

impl ShutdownReason {
    /// A holder with no reason.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Records `reason` unless one is already present.
    ///
    /// Returns `true` if `reason` was recorded.
    pub fn set(&mut self, reason: StreamError) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(reason);
        true
    }

    /// The recorded reason, if any.
    #[must_use]
    pub const fn get(&self) -> Option<&StreamError> {
        self.0.as_ref()
    }

    /// Returns `true` if a reason has been recorded.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.0.is_some()
    }

    /// The notification this reason calls for: a drop, or a forced drop carrying the reason.
    #[must_use]
    pub fn shutdown_content(&self) -> UpstreamContent {
        match &self.0 {
            None => UpstreamContent::Drop,
            Some(reason) => UpstreamContent::ForcedDrop {
                reason: reason.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_reason_means_clean_drop() {
        let reason = ShutdownReason::none();
        assert!(!reason.is_error());
        assert_eq!(reason.shutdown_content(), UpstreamContent::Drop);
    }

    #[test]
    fn first_reason_wins() {
        let mut reason = ShutdownReason::default();
        assert!(reason.set(StreamError::Cancelled));
        assert!(!reason.set(StreamError::Runtime("late".to_string())));
        assert_eq!(reason.get(), Some(&StreamError::Cancelled));
        assert_eq!(
            reason.shutdown_content(),
            UpstreamContent::ForcedDrop {
                reason: StreamError::Cancelled
            }
        );
    }
}
