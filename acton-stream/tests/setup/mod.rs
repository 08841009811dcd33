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
#![allow(dead_code)]

use std::sync::Once;

use acton_stream::prelude::*;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests.
///
/// Logs go to `logs/stream_tests.txt` through a non-blocking writer so test
/// output stays readable.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let file_appender = RollingFileAppender::new(Rotation::NEVER, "logs", "stream_tests.txt");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Leak the guard so the non-blocking writer is not dropped before process exit
        Box::leak(Box::new(guard));

        let filter = EnvFilter::new("trace")
            .add_directive("acton_stream::stream=trace".parse().unwrap())
            .add_directive("acton_stream::common=debug".parse().unwrap())
            .add_directive(tracing_subscriber::filter::LevelFilter::TRACE.into());

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .with_max_level(Level::TRACE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// A destination and one source, each with its mailbox.
pub struct Link {
    pub sink: ActorHandle,
    pub sink_mailbox: Mailbox,
    pub source: ActorHandle,
    pub source_mailbox: Mailbox,
}

impl Link {
    pub fn new() -> anyhow::Result<Self> {
        initialize_tracing();
        let (sink, sink_mailbox) = ActorHandle::new(Ern::with_root("sink")?, 64);
        let (source, source_mailbox) = ActorHandle::new(Ern::with_root("source")?, 64);
        Ok(Self {
            sink,
            sink_mailbox,
            source,
            source_mailbox,
        })
    }

    /// A fresh path from the source into the sink on `slots`.
    pub fn path(&self, slots: StreamSlots) -> InboundPath {
        InboundPath::with_config(
            self.sink.clone(),
            slots,
            self.source.clone(),
            &StreamConfig::default(),
        )
    }

    /// Everything the source has received so far.
    pub fn upstream(&mut self) -> Vec<UpstreamMsg> {
        self.source_mailbox
            .drain()
            .into_iter()
            .map(|envelope| envelope.message)
            .collect()
    }
}

/// Counts the shutdown notifications in `messages`.
pub fn shutdowns(messages: &[UpstreamMsg]) -> usize {
    messages.iter().filter(|msg| msg.is_shutdown()).count()
}
