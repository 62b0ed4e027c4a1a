//! Playback Controller: starts and stops native players.
//!
//! Idempotence is checked against the environment-reported paused flag, so
//! redundant requests never reach the media primitive. A play request may be
//! rejected asynchronously (autoplay policy, resource not ready); rejection
//! is logged and the model reverts, never retried.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::host::Host;
use crate::lifecycle::{EngineEvent, LifecycleStats};
use crate::model::{MediaResource, PlaybackState};

pub struct PlaybackController {
    host: Arc<dyn Host>,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl PlaybackController {
    pub(crate) fn new(host: Arc<dyn Host>, events: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { host, events }
    }

    /// React to the player's autoplay gate.
    pub(crate) fn autoplay_gate_changed(
        &self,
        player: &mut MediaResource,
        is_intersecting: bool,
        stats: &mut LifecycleStats,
    ) {
        if is_intersecting {
            self.play(player, stats);
        } else {
            self.pause(player, stats);
        }
    }

    pub(crate) fn play(&self, player: &mut MediaResource, stats: &mut LifecycleStats) {
        if !player.is_native_player() {
            return;
        }
        if !self.host.is_paused(player.node) {
            tracing::debug!(node = player.node, "already playing, skipping play");
            return;
        }
        player.set_playback(PlaybackState::Playing);
        stats.play_requests += 1;

        let host = self.host.clone();
        let events = self.events.clone();
        let node = player.node;
        tokio::spawn(async move {
            if let Err(error) = host.request_play(node).await {
                tracing::warn!(node, %error, "playback request rejected");
                let _ = events.send(EngineEvent::PlaybackRejected { node });
            }
        });
    }

    pub(crate) fn pause(&self, player: &mut MediaResource, stats: &mut LifecycleStats) {
        if !player.is_native_player() {
            return;
        }
        if self.host.is_paused(player.node) {
            tracing::debug!(node = player.node, "already paused, skipping pause");
            return;
        }
        self.host.request_pause(player.node);
        player.set_playback(PlaybackState::Paused);
        stats.pauses_issued += 1;
    }

    /// The environment refused a play request; the element stayed paused.
    pub(crate) fn playback_rejected(
        &self,
        player: &mut MediaResource,
        stats: &mut LifecycleStats,
    ) {
        player.set_playback(PlaybackState::Paused);
        stats.play_rejections += 1;
    }
}
