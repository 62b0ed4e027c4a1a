//! Lifecycle Facade: wires discovery, gates, and controllers together.
//!
//! One engine task owns every piece of mutable lifecycle state and drains a
//! single event channel, so host callbacks, commands, and fade timers all
//! serialize through it. Per subject the channel preserves occurrence
//! order; across subjects the handlers tolerate arbitrary interleaving.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::config::LifecycleConfig;
use crate::controller::{LazyLoadController, PlaybackController, PosterFallbackController};
use crate::gate::{GateKind, IntersectionGate};
use crate::host::{Host, IntersectionSink, NodeId, ObserverOptions};
use crate::model::{MediaResource, Section, SectionId};
use crate::registry;

/// Counters describing everything the lifecycle has asked of the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleStats {
    pub frames_sourced: u64,
    pub player_loads_requested: u64,
    pub play_requests: u64,
    pub play_rejections: u64,
    pub pauses_issued: u64,
    pub posters_hidden: u64,
    pub posters_forced_visible: u64,
}

/// Everything that can wake the engine task.
#[derive(Debug)]
pub(crate) enum EngineEvent {
    Intersection {
        gate: GateKind,
        node: NodeId,
        is_intersecting: bool,
    },
    MediaReady {
        node: NodeId,
    },
    MediaError {
        node: NodeId,
    },
    VisibilityChanged {
        hidden: bool,
    },
    PosterFadeElapsed {
        node: NodeId,
    },
    PlaybackRejected {
        node: NodeId,
    },
    PlayAll,
    PauseAll,
    Shutdown,
}

/// Cloneable sender the embedder wires host element events into.
#[derive(Clone)]
pub struct LifecycleHandle {
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl LifecycleHandle {
    /// A media element's `loadeddata` (or frame `load`) event fired.
    pub fn media_ready(&self, node: NodeId) {
        let _ = self.events.send(EngineEvent::MediaReady { node });
    }

    /// A media element's `error` event fired.
    pub fn media_error(&self, node: NodeId) {
        let _ = self.events.send(EngineEvent::MediaError { node });
    }

    /// The page's visibility changed. Hidden pauses everything; becoming
    /// visible takes no action, the next intersection event re-drives state.
    pub fn page_visibility_changed(&self, hidden: bool) {
        let _ = self.events.send(EngineEvent::VisibilityChanged { hidden });
    }
}

/// The lifecycle object owned by the embedding application.
pub struct HeroMediaLifecycle {
    events: mpsc::UnboundedSender<EngineEvent>,
    stats: watch::Receiver<LifecycleStats>,
    destroyed: AtomicBool,
    engine: Mutex<Option<JoinHandle<()>>>,
}

impl HeroMediaLifecycle {
    /// Discover hero sections, register every gate subject, and spawn the
    /// engine task. Must be called within a tokio runtime. Never fails: an
    /// unsupported viewport primitive degrades to eager loading instead of
    /// aborting setup.
    pub fn create(host: Arc<dyn Host>, config: LifecycleConfig) -> Self {
        let discovery = registry::discover(host.as_ref());
        let (events, events_rx) = mpsc::unbounded_channel();
        let (stats_tx, stats_rx) = watch::channel(LifecycleStats::default());

        let mut section_gate =
            Self::build_gate(&host, GateKind::Section, config.section_gate(), &events);
        let mut autoplay_gate =
            Self::build_gate(&host, GateKind::Autoplay, config.autoplay_gate(), &events);
        let mut frame_gate =
            Self::build_gate(&host, GateKind::FrameLoad, config.frame_load_gate(), &events);

        for section in &discovery.sections {
            section_gate.observe(section.root);
        }
        for resource in discovery.resources.values() {
            if resource.is_frame() {
                frame_gate.observe(resource.node);
            } else if resource.autoplay {
                autoplay_gate.observe(resource.node);
            }
        }

        // Degraded mode: without observation every subject is treated as
        // permanently intersecting, which loads and plays everything.
        for gate in [&section_gate, &autoplay_gate, &frame_gate] {
            if gate.is_eager() {
                for node in gate.subjects() {
                    let _ = events.send(EngineEvent::Intersection {
                        gate: gate.kind(),
                        node,
                        is_intersecting: true,
                    });
                }
            }
        }

        // A page born hidden starts in the paused-everything state, the
        // same as if it had been hidden after creation.
        if host.page_hidden() {
            tracing::debug!("page hidden at creation, pausing all playback");
            let _ = events.send(EngineEvent::VisibilityChanged { hidden: true });
        }

        let posters: Vec<NodeId> = discovery
            .sections
            .iter()
            .flat_map(|section| section.posters.iter().copied())
            .collect();

        let engine = Engine {
            lazy: LazyLoadController::new(host.clone()),
            playback: PlaybackController::new(host.clone(), events.clone()),
            poster: PosterFallbackController::new(
                host.clone(),
                events.clone(),
                config.poster_fade(),
                posters,
            ),
            sections: discovery.sections,
            resources: discovery.resources,
            section_by_root: discovery.section_by_root,
            section_gate,
            autoplay_gate,
            frame_gate,
            stats: LifecycleStats::default(),
            stats_tx,
        };

        tracing::info!(
            sections = engine.sections.len(),
            resources = engine.resources.len(),
            "hero media lifecycle created"
        );
        let task = tokio::spawn(engine.run(events_rx));

        Self {
            events,
            stats: stats_rx,
            destroyed: AtomicBool::new(false),
            engine: Mutex::new(Some(task)),
        }
    }

    fn build_gate(
        host: &Arc<dyn Host>,
        kind: GateKind,
        options: ObserverOptions,
        events: &mpsc::UnboundedSender<EngineEvent>,
    ) -> IntersectionGate {
        let sink: IntersectionSink = {
            let events = events.clone();
            Box::new(move |node, is_intersecting| {
                let _ = events.send(EngineEvent::Intersection {
                    gate: kind,
                    node,
                    is_intersecting,
                });
            })
        };
        match host.viewport_observer(options, sink) {
            Ok(observer) => IntersectionGate::new(kind, Some(observer)),
            Err(error) => {
                tracing::warn!(?kind, %error, "falling back to eager visibility");
                IntersectionGate::new(kind, None)
            }
        }
    }

    /// Handle for wiring host element and visibility events in.
    pub fn handle(&self) -> LifecycleHandle {
        LifecycleHandle {
            events: self.events.clone(),
        }
    }

    /// Start every native player, regardless of its gate state.
    pub fn play_all_videos(&self) {
        let _ = self.events.send(EngineEvent::PlayAll);
    }

    /// Pause every native player.
    pub fn pause_all_videos(&self) {
        let _ = self.events.send(EngineEvent::PauseAll);
    }

    /// Snapshot of the host-interaction counters.
    pub fn stats(&self) -> LifecycleStats {
        self.stats.borrow().clone()
    }

    /// Detach every gate registration, cancel pending timers, and drop all
    /// internal collections. Idempotent.
    pub async fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.events.send(EngineEvent::Shutdown);
        let task = self.engine.lock().await.take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

impl Drop for HeroMediaLifecycle {
    fn drop(&mut self) {
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            let _ = self.events.send(EngineEvent::Shutdown);
        }
    }
}

/// Owns all mutable lifecycle state; runs until shutdown.
struct Engine {
    lazy: LazyLoadController,
    playback: PlaybackController,
    poster: PosterFallbackController,
    sections: Vec<Section>,
    resources: HashMap<NodeId, MediaResource>,
    section_by_root: HashMap<NodeId, SectionId>,
    section_gate: IntersectionGate,
    autoplay_gate: IntersectionGate,
    frame_gate: IntersectionGate,
    stats: LifecycleStats,
    stats_tx: watch::Sender<LifecycleStats>,
}

impl Engine {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<EngineEvent>) {
        loop {
            match events.recv().await {
                Some(EngineEvent::Shutdown) | None => {
                    self.teardown();
                    break;
                }
                Some(event) => {
                    self.handle(event);
                    self.stats_tx.send_replace(self.stats.clone());
                }
            }
        }
    }

    fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Intersection {
                gate: GateKind::Section,
                node,
                is_intersecting,
            } => {
                // The lazy path only acts on entry; leaving a section has no
                // effect on already-initiated loads.
                let Some(true) = self.section_gate.transition(node, is_intersecting) else {
                    return;
                };
                let Some(&section) = self.section_by_root.get(&node) else {
                    return;
                };
                self.section_entered(section);
            }
            EngineEvent::Intersection {
                gate: GateKind::FrameLoad,
                node,
                is_intersecting,
            } => {
                let Some(true) = self.frame_gate.transition(node, is_intersecting) else {
                    return;
                };
                if let Some(frame) = self.resources.get_mut(&node) {
                    self.lazy.begin_frame_load(frame, &mut self.stats);
                }
                // One-shot trigger: detach so the gate never fires again for
                // this frame.
                self.frame_gate.unobserve(node);
            }
            EngineEvent::Intersection {
                gate: GateKind::Autoplay,
                node,
                is_intersecting,
            } => {
                let Some(state) = self.autoplay_gate.transition(node, is_intersecting) else {
                    return;
                };
                if let Some(player) = self.resources.get_mut(&node) {
                    self.playback
                        .autoplay_gate_changed(player, state, &mut self.stats);
                }
            }
            EngineEvent::MediaReady { node } => {
                if let Some(resource) = self.resources.get_mut(&node) {
                    self.poster.resource_ready(resource);
                }
            }
            EngineEvent::MediaError { node } => {
                if let Some(resource) = self.resources.get_mut(&node) {
                    self.poster.resource_failed(resource, &mut self.stats);
                }
            }
            EngineEvent::PosterFadeElapsed { node } => {
                if let Some(resource) = self.resources.get(&node) {
                    self.poster.fade_elapsed(resource, &mut self.stats);
                }
            }
            EngineEvent::PlaybackRejected { node } => {
                if let Some(player) = self.resources.get_mut(&node) {
                    self.playback.playback_rejected(player, &mut self.stats);
                }
            }
            EngineEvent::VisibilityChanged { hidden } => {
                if hidden {
                    tracing::debug!("page hidden, pausing all players");
                    self.pause_all();
                } else {
                    tracing::debug!("page visible again");
                }
            }
            EngineEvent::PlayAll => self.play_all(),
            EngineEvent::PauseAll => self.pause_all(),
            EngineEvent::Shutdown => {}
        }
    }

    fn section_entered(&mut self, section: SectionId) {
        tracing::debug!(section, "hero section entered viewport");
        let frames = self.sections[section].frames.clone();
        let players = self.sections[section].players.clone();
        for node in frames {
            if let Some(frame) = self.resources.get_mut(&node) {
                self.lazy.begin_frame_load(frame, &mut self.stats);
            }
        }
        for node in players {
            if let Some(player) = self.resources.get_mut(&node) {
                self.lazy.begin_player_load(player, &mut self.stats);
            }
        }
    }

    fn player_nodes(&self) -> Vec<NodeId> {
        self.sections
            .iter()
            .flat_map(|section| section.players.iter().copied())
            .collect()
    }

    fn play_all(&mut self) {
        for node in self.player_nodes() {
            if let Some(player) = self.resources.get_mut(&node) {
                self.playback.play(player, &mut self.stats);
            }
        }
    }

    fn pause_all(&mut self) {
        for node in self.player_nodes() {
            if let Some(player) = self.resources.get_mut(&node) {
                self.playback.pause(player, &mut self.stats);
            }
        }
    }

    fn teardown(&mut self) {
        self.section_gate.disconnect();
        self.autoplay_gate.disconnect();
        self.frame_gate.disconnect();
        self.poster.abort_timers();
        self.sections.clear();
        self.resources.clear();
        self.section_by_root.clear();
        tracing::info!("hero media lifecycle destroyed");
    }
}
