//! Poster Fallback Controller: swaps posters against media readiness.
//!
//! On ready the poster goes transparent immediately and is removed from
//! layout after a fixed delay; on failure it is forced back to fully
//! visible. The pending hide timer is stored per resource and aborted when
//! a failure lands mid-fade, so a forced-visible poster stays visible.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::LifecycleError;
use crate::host::{Host, NodeId};
use crate::lifecycle::{EngineEvent, LifecycleStats};
use crate::model::{LoadState, MediaResource, PosterVisual};

pub struct PosterFallbackController {
    host: Arc<dyn Host>,
    events: mpsc::UnboundedSender<EngineEvent>,
    fade: Duration,
    /// Semantic visual state per poster node.
    visuals: HashMap<NodeId, PosterVisual>,
    /// Pending fade-then-hide timers, keyed by resource node.
    timers: HashMap<NodeId, JoinHandle<()>>,
}

impl PosterFallbackController {
    pub(crate) fn new(
        host: Arc<dyn Host>,
        events: mpsc::UnboundedSender<EngineEvent>,
        fade: Duration,
        posters: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        Self {
            host,
            events,
            fade,
            visuals: posters
                .into_iter()
                .map(|node| (node, PosterVisual::Visible))
                .collect(),
            timers: HashMap::new(),
        }
    }

    /// Media became ready: start the fade-then-remove sequence.
    pub(crate) fn resource_ready(&mut self, resource: &mut MediaResource) {
        if !resource.mark_ready() {
            tracing::debug!(node = resource.node, "ready event on terminal resource ignored");
            return;
        }
        let Some(poster) = resource.poster else {
            tracing::debug!(node = resource.node, "media ready with no registered poster");
            return;
        };

        self.set_visual(poster, PosterVisual::FadingOut);

        let events = self.events.clone();
        let node = resource.node;
        let fade = self.fade;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(fade).await;
            let _ = events.send(EngineEvent::PosterFadeElapsed { node });
        });
        if let Some(stale) = self.timers.insert(node, timer) {
            stale.abort();
        }
    }

    /// Media failed: force the poster fully visible and cancel any pending
    /// hide so it cannot flash hidden afterwards.
    pub(crate) fn resource_failed(
        &mut self,
        resource: &mut MediaResource,
        stats: &mut LifecycleStats,
    ) {
        resource.mark_failed();
        tracing::warn!(
            node = resource.node,
            error = %LifecycleError::MediaLoadFailure,
            "restoring poster after load failure"
        );

        if let Some(timer) = self.timers.remove(&resource.node) {
            timer.abort();
        }
        if let Some(poster) = resource.poster {
            self.set_visual(poster, PosterVisual::Shown);
            stats.posters_forced_visible += 1;
        }
    }

    /// The fade delay elapsed: remove the poster from layout. Hidden is only
    /// reachable while the owning resource is still Ready and the poster is
    /// still mid-fade; a stale timer firing after a forced-visible does
    /// nothing.
    pub(crate) fn fade_elapsed(&mut self, resource: &MediaResource, stats: &mut LifecycleStats) {
        self.timers.remove(&resource.node);
        if resource.load_state != LoadState::Ready {
            return;
        }
        if let Some(poster) = resource.poster {
            if self.visuals.get(&poster) != Some(&PosterVisual::FadingOut) {
                return;
            }
            self.set_visual(poster, PosterVisual::Hidden);
            stats.posters_hidden += 1;
        }
    }

    pub(crate) fn abort_timers(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }

    fn set_visual(&mut self, poster: NodeId, visual: PosterVisual) {
        self.visuals.insert(poster, visual);
        self.host.set_poster_visual(poster, visual);
    }
}
