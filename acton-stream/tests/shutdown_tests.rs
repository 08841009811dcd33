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

//! Integration tests for exactly-once shutdown notification.

use acton_stream::prelude::*;

use crate::setup::{initialize_tracing, shutdowns, Link};

mod setup;

/// Tests that open, batches, ack and close end with a single clean drop.
#[test]
fn test_clean_close_sends_one_drop() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut path = link.path(StreamSlots::new(1, 1));
    path.open(&link.sink, None, 10, false)?;
    path.on_batch(5, 1)?;
    path.ack(&link.sink, 10)?;
    path.close(&link.sink)?;
    assert_eq!(path.state(), PathState::ClosingClean);
    assert_eq!(shutdowns(&link.upstream()), 0);

    assert!(path.teardown()?);
    assert_eq!(path.state(), PathState::Closed);
    let upstream = link.upstream();
    assert_eq!(upstream.len(), 1);
    assert_eq!(upstream[0].content, UpstreamContent::Drop);
    Ok(())
}

/// Tests that closing with an error ends with a single forced drop carrying it.
#[test]
fn test_error_close_sends_one_forced_drop() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut path = link.path(StreamSlots::new(1, 1));
    path.open(&link.sink, None, 10, false)?;
    path.on_batch(5, 1)?;
    let reason = StreamError::Runtime("disk full".to_string());
    path.close_with(&link.sink, reason.clone())?;
    assert_eq!(path.state(), PathState::ClosingError);

    path.teardown()?;
    path.teardown()?;
    let upstream = link.upstream();
    assert_eq!(shutdowns(&upstream), 1);
    assert_eq!(
        upstream.last().map(|msg| &msg.content),
        Some(&UpstreamContent::ForcedDrop { reason })
    );
    Ok(())
}

/// Tests that a path torn down without any activity or reason sends a clean drop,
/// naming the manager as sender.
#[test]
fn test_idle_teardown_sends_clean_drop() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut path = link.path(StreamSlots::new(2, 2));
    path.open(&link.sink, None, 10, false)?;
    link.upstream();

    assert!(path.teardown()?);
    let envelopes = link.source_mailbox.drain();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(&envelopes[0].sender, link.sink.id());
    assert_eq!(envelopes[0].message.content, UpstreamContent::Drop);
    Ok(())
}

/// Tests that a path that never completed its handshake still notifies once.
#[test]
fn test_unopened_path_teardown() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut path = link.path(StreamSlots::new(2, 2));
    assert!(path.teardown()?);
    assert_eq!(link.upstream(), vec![UpstreamMsg {
        slots: StreamSlots::new(2, 2),
        content: UpstreamContent::Drop,
    }]);
    Ok(())
}

/// Tests that the closing initiator is named as the sender of the final drop.
#[test]
fn test_close_initiator_sends_final_drop() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let (other, _other_mailbox) = ActorHandle::new(Ern::with_root("other")?, 4);
    let mut path = link.path(StreamSlots::new(1, 1));
    path.open(&link.sink, None, 10, false)?;
    path.close(&other)?;
    path.teardown()?;

    let envelopes = link.source_mailbox.drain();
    assert_eq!(envelopes.last().map(|envelope| &envelope.sender), Some(other.id()));
    Ok(())
}

/// Tests that a protocol violation followed by a late clean close still ends with
/// a forced drop carrying the violation.
#[test]
fn test_late_close_keeps_violation() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut path = link.path(StreamSlots::new(1, 1));
    path.open(&link.sink, None, 5, false)?;
    assert!(path.on_batch(6, 1).is_err());

    path.close(&link.sink)?;
    path.close_with(&link.sink, StreamError::Cancelled)?;
    assert_eq!(path.state(), PathState::ClosingError);
    path.teardown()?;

    let upstream = link.upstream();
    assert_eq!(shutdowns(&upstream), 1);
    assert_eq!(
        upstream.last().map(|msg| &msg.content),
        Some(&UpstreamContent::ForcedDrop {
            reason: StreamError::CreditExceeded {
                batch_size: 6,
                credit: 5
            }
        })
    );
    Ok(())
}

/// Tests that an error reported after a clean close turns the drop into a forced drop.
#[test]
fn test_error_after_clean_close_is_forced() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut path = link.path(StreamSlots::new(1, 1));
    path.open(&link.sink, None, 5, false)?;
    path.close(&link.sink)?;
    path.close_with(&link.sink, StreamError::Cancelled)?;
    path.teardown()?;

    let upstream = link.upstream();
    assert_eq!(shutdowns(&upstream), 1);
    assert_eq!(
        upstream.last().map(|msg| &msg.content),
        Some(&UpstreamContent::ForcedDrop {
            reason: StreamError::Cancelled
        })
    );
    Ok(())
}

/// Tests that every operation on a closed path is refused without sending anything.
#[test]
fn test_closed_path_refuses_everything() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut path = link.path(StreamSlots::new(1, 1));
    path.open(&link.sink, None, 5, false)?;
    path.teardown()?;
    link.upstream();

    let closed = PathError::Closed(PathState::Closed);
    assert_eq!(path.open(&link.sink, None, 5, false), Err(closed.clone()));
    assert_eq!(path.on_batch(1, 1), Err(closed.clone()));
    assert_eq!(path.ack(&link.sink, 5), Err(closed.clone()));
    assert_eq!(path.close(&link.sink), Err(closed.clone()));
    assert_eq!(path.close_with(&link.sink, StreamError::Cancelled), Err(closed.clone()));
    assert_eq!(path.abort(StreamError::Cancelled), Err(closed.clone()));
    assert_eq!(path.rebind(link.source.clone()), Err(closed));
    assert!(path.shutdown_reason().is_none());
    assert!(link.upstream().is_empty());
    Ok(())
}

/// Tests that the stateless emitter sends exactly one forced drop per call,
/// independent of any path.
#[test]
fn test_irregular_shutdown_emits_forced_drop() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut path = link.path(StreamSlots::new(1, 1));
    path.open(&link.sink, None, 5, false)?;
    link.upstream();

    let reason = StreamError::Runtime("rejected".to_string());
    emit_irregular_shutdown(&link.sink, StreamSlots::new(3, 7), &link.source, reason.clone())?;

    let upstream = link.upstream();
    assert_eq!(
        upstream,
        vec![UpstreamMsg {
            slots: StreamSlots::new(3, 7),
            content: UpstreamContent::ForcedDrop { reason },
        }]
    );
    assert_eq!(path.state(), PathState::Open);
    path.teardown()?;
    Ok(())
}

/// Tests that removing a path from the table is what notifies the source.
#[test]
fn test_table_removal_notifies_source() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut paths = InboundPaths::new();
    let path = paths
        .insert(link.path(StreamSlots::new(1, 4)))
        .map_err(|(err, _)| err)?;
    path.open(&link.sink, None, 10, false)?;
    path.on_batch(3, 1)?;
    path.close(&link.sink)?;
    assert_eq!(shutdowns(&link.upstream()), 0);

    let removed = paths.remove(4)?.expect("path should be in the table");
    assert!(removed.state().is_closed());
    assert_eq!(shutdowns(&link.upstream()), 1);
    Ok(())
}

/// Tests that a rejected source gets a forced drop without ever entering the table.
#[test]
fn test_table_reject_uses_irregular_shutdown() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let paths = InboundPaths::new();
    paths.reject(&link.sink, StreamSlots::new(9, 0), &link.source, StreamError::Cancelled)?;
    assert!(paths.is_empty());
    assert_eq!(
        link.upstream(),
        vec![UpstreamMsg {
            slots: StreamSlots::new(9, 0),
            content: UpstreamContent::ForcedDrop {
                reason: StreamError::Cancelled
            },
        }]
    );
    Ok(())
}

/// Tests bulk teardown: every path gets one forced drop, and a path that
/// already failed keeps its own reason.
#[test]
fn test_abort_all_keeps_existing_reasons() -> anyhow::Result<()> {
    let mut link = Link::new()?;
    let mut paths = InboundPaths::new();
    for receiver in 1..=2 {
        let path = paths
            .insert(link.path(StreamSlots::new(receiver, receiver)))
            .map_err(|(err, _)| err)?;
        path.open(&link.sink, None, 10, false)?;
    }
    let failing = paths.get_mut(2).expect("path 2 exists");
    assert!(failing.on_batch(1, 0).is_err());
    link.upstream();

    assert_eq!(paths.abort_all(&StreamError::Cancelled), 2);
    let upstream = link.upstream();
    assert_eq!(shutdowns(&upstream), 2);
    for msg in upstream {
        let expected = if msg.slots.receiver == 2 {
            StreamError::BatchIdNotIncreasing { last: 0, received: 0 }
        } else {
            StreamError::Cancelled
        };
        assert_eq!(msg.content, UpstreamContent::ForcedDrop { reason: expected });
    }
    Ok(())
}

/// Tests that a source whose mailbox is full never loses a grant or its
/// shutdown notification without the manager being told.
///
/// **Scenario:**
/// 1. Open a path to a source whose mailbox holds a single message.
/// 2. Spend all credit, then ack while the open handshake is still queued.
/// 3. Close and tear down while the mailbox is still full.
/// 4. Let the source catch up, then tear down again.
///
/// **Verification:**
/// - The refused ack is reported as `Undeliverable`, with the grant recorded.
/// - The refused teardown leaves the path closing so it can be retried.
/// - The source ends up with exactly one drop.
#[test]
fn test_busy_source_reports_undelivered_messages() -> anyhow::Result<()> {
    initialize_tracing();
    let (sink, _sink_mailbox) = ActorHandle::new(Ern::with_root("sink")?, 4);
    let (source, mut mailbox) = ActorHandle::new(Ern::with_root("busy_source")?, 1);
    let mut path = InboundPath::with_config(
        sink.clone(),
        StreamSlots::new(1, 1),
        source,
        &StreamConfig::default(),
    );

    path.open(&sink, None, 10, false)?;
    path.on_batch(10, 1)?;
    assert_eq!(path.assigned_credit(), 0);

    let refused = path.ack(&sink, 10);
    assert!(matches!(
        refused,
        Err(PathError::Undeliverable(MessageError::MailboxFull(_)))
    ));
    assert_eq!(path.assigned_credit(), 10);
    assert_eq!(path.last_acked_batch_id(), 1);

    path.close(&sink)?;
    assert!(matches!(path.teardown(), Err(MessageError::MailboxFull(_))));
    assert_eq!(path.state(), PathState::ClosingClean);
    assert!(path.source().is_some());

    // the source catches up with its handshake
    let handshake = mailbox.drain();
    assert_eq!(handshake.len(), 1);
    assert!(matches!(handshake[0].message.content, UpstreamContent::AckOpen { .. }));

    assert!(path.teardown()?);
    assert!(!path.teardown()?);
    let upstream: Vec<UpstreamMsg> = mailbox.drain().into_iter().map(|e| e.message).collect();
    assert_eq!(shutdowns(&upstream), 1);
    assert_eq!(upstream[0].content, UpstreamContent::Drop);
    Ok(())
}
