//! Lazy Load Controller: materializes deferred work on first visibility.
//!
//! Two independent trigger paths converge here for frames (the section gate
//! and the per-frame 100px gate); both funnel into the same idempotent
//! begin-loading operation, so double-initiation is harmless.

use std::sync::Arc;

use crate::host::{Host, MediaReadyState};
use crate::lifecycle::LifecycleStats;
use crate::model::MediaResource;

pub struct LazyLoadController {
    host: Arc<dyn Host>,
}

impl LazyLoadController {
    pub(crate) fn new(host: Arc<dyn Host>) -> Self {
        Self { host }
    }

    /// One-time source assignment for a frame. Idempotent via the resource's
    /// `sourced` flag; a frame without a deferred source consumes its claim
    /// without transitioning, since there is nothing to fetch.
    pub(crate) fn begin_frame_load(&self, frame: &mut MediaResource, stats: &mut LifecycleStats) {
        let Some(deferred) = frame.claim_deferred_source() else {
            return;
        };
        match deferred {
            Some(source) => {
                frame.begin_loading();
                self.host.assign_frame_source(frame.node, &source);
                stats.frames_sourced += 1;
                tracing::debug!(node = frame.node, source = %source, "frame source materialized");
            }
            None => {
                tracing::debug!(node = frame.node, "frame has no deferred source");
            }
        }
    }

    /// Request a metadata load for a native player, only while the element
    /// reports nothing loaded so the request is never duplicated.
    pub(crate) fn begin_player_load(&self, player: &mut MediaResource, stats: &mut LifecycleStats) {
        if !player.is_native_player() || !player.begin_loading() {
            return;
        }
        if self.host.ready_state(player.node) != MediaReadyState::HaveNothing {
            // The element is already fetching on its own; just track it.
            tracing::debug!(node = player.node, "player already loading, skipping request");
            return;
        }
        self.host.request_load(player.node);
        stats.player_loads_requested += 1;
        tracing::debug!(node = player.node, "player metadata load requested");
    }
}
