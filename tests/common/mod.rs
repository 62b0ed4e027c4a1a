//! Recording mock host shared by the integration tests.
//!
//! Records every call the lifecycle makes (plays, pauses, loads, source
//! assignments, poster visuals) so tests can assert exact call counts, and
//! lets tests fire intersection batches at whatever observers the lifecycle
//! registered.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use heroplay::{
    DocumentHost, FrameNode, IntersectionSink, LifecycleError, MediaHost, MediaReadyState, NodeId,
    ObserverOptions, PlayerNode, PosterVisual, SectionNodes, ViewportHost, ViewportObserver,
};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install the env-filtered subscriber once per test binary, so lifecycle
/// logs show up under `RUST_LOG` the same way the binary entrypoint wires
/// them up.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Default)]
struct Recorder {
    play_calls: HashMap<NodeId, usize>,
    pause_calls: HashMap<NodeId, usize>,
    load_calls: HashMap<NodeId, usize>,
    frame_sources: HashMap<NodeId, Vec<String>>,
    poster_visuals: HashMap<NodeId, Vec<PosterVisual>>,
}

struct ObserverRec {
    options: ObserverOptions,
    observed: HashSet<NodeId>,
    disconnected: bool,
    sink: IntersectionSink,
}

pub struct MockHost {
    sections: Vec<SectionNodes>,
    observer_supported: bool,
    hidden: Mutex<bool>,
    paused: Mutex<HashMap<NodeId, bool>>,
    ready_states: Mutex<HashMap<NodeId, MediaReadyState>>,
    reject_play: Mutex<HashSet<NodeId>>,
    observers: Arc<Mutex<Vec<ObserverRec>>>,
    recorder: Mutex<Recorder>,
}

struct MockObserver {
    index: usize,
    observers: Arc<Mutex<Vec<ObserverRec>>>,
}

impl ViewportObserver for MockObserver {
    fn observe(&self, node: NodeId) {
        let mut observers = self.observers.lock().unwrap();
        observers[self.index].observed.insert(node);
    }

    fn unobserve(&self, node: NodeId) {
        let mut observers = self.observers.lock().unwrap();
        observers[self.index].observed.remove(&node);
    }

    fn disconnect(&self) {
        let mut observers = self.observers.lock().unwrap();
        observers[self.index].disconnected = true;
        observers[self.index].observed.clear();
    }
}

impl MockHost {
    pub fn new(sections: Vec<SectionNodes>) -> Arc<Self> {
        Arc::new(Self::build(sections, true))
    }

    pub fn without_observer_support(sections: Vec<SectionNodes>) -> Arc<Self> {
        Arc::new(Self::build(sections, false))
    }

    fn build(sections: Vec<SectionNodes>, observer_supported: bool) -> Self {
        init_tracing();
        Self {
            sections,
            observer_supported,
            hidden: Mutex::new(false),
            paused: Mutex::new(HashMap::new()),
            ready_states: Mutex::new(HashMap::new()),
            reject_play: Mutex::new(HashSet::new()),
            observers: Arc::new(Mutex::new(Vec::new())),
            recorder: Mutex::new(Recorder::default()),
        }
    }

    /// Deliver an intersection change to every live observer watching `node`.
    pub fn intersect(&self, node: NodeId, is_intersecting: bool) {
        let observers = self.observers.lock().unwrap();
        for rec in observers.iter() {
            if !rec.disconnected && rec.observed.contains(&node) {
                (rec.sink)(node, is_intersecting);
            }
        }
    }

    /// Whether any live observer still watches `node`.
    pub fn is_observed(&self, node: NodeId) -> bool {
        let observers = self.observers.lock().unwrap();
        observers
            .iter()
            .any(|rec| !rec.disconnected && rec.observed.contains(&node))
    }

    /// Options of every observer ever created, in creation order.
    pub fn observer_options(&self) -> Vec<ObserverOptions> {
        let observers = self.observers.lock().unwrap();
        observers.iter().map(|rec| rec.options).collect()
    }

    pub fn all_observers_disconnected(&self) -> bool {
        let observers = self.observers.lock().unwrap();
        !observers.is_empty() && observers.iter().all(|rec| rec.disconnected)
    }

    pub fn set_hidden(&self, hidden: bool) {
        *self.hidden.lock().unwrap() = hidden;
    }

    /// Pretend the element is already playing, as a restored page may report.
    pub fn set_playing(&self, node: NodeId) {
        self.paused.lock().unwrap().insert(node, false);
    }

    pub fn set_ready_state(&self, node: NodeId, state: MediaReadyState) {
        self.ready_states.lock().unwrap().insert(node, state);
    }

    pub fn reject_play_for(&self, node: NodeId) {
        self.reject_play.lock().unwrap().insert(node);
    }

    pub fn play_calls(&self, node: NodeId) -> usize {
        *self
            .recorder
            .lock()
            .unwrap()
            .play_calls
            .get(&node)
            .unwrap_or(&0)
    }

    pub fn pause_calls(&self, node: NodeId) -> usize {
        *self
            .recorder
            .lock()
            .unwrap()
            .pause_calls
            .get(&node)
            .unwrap_or(&0)
    }

    pub fn load_calls(&self, node: NodeId) -> usize {
        *self
            .recorder
            .lock()
            .unwrap()
            .load_calls
            .get(&node)
            .unwrap_or(&0)
    }

    pub fn frame_sources(&self, node: NodeId) -> Vec<String> {
        self.recorder
            .lock()
            .unwrap()
            .frame_sources
            .get(&node)
            .cloned()
            .unwrap_or_default()
    }

    pub fn poster_visuals(&self, node: NodeId) -> Vec<PosterVisual> {
        self.recorder
            .lock()
            .unwrap()
            .poster_visuals
            .get(&node)
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_poster_visual(&self, node: NodeId) -> Option<PosterVisual> {
        self.poster_visuals(node).last().copied()
    }
}

impl DocumentHost for MockHost {
    fn hero_sections(&self) -> Vec<SectionNodes> {
        self.sections.clone()
    }

    fn page_hidden(&self) -> bool {
        *self.hidden.lock().unwrap()
    }
}

impl ViewportHost for MockHost {
    fn viewport_observer(
        &self,
        options: ObserverOptions,
        on_change: IntersectionSink,
    ) -> Result<Box<dyn ViewportObserver>, LifecycleError> {
        if !self.observer_supported {
            return Err(LifecycleError::UnsupportedEnvironment(
                "no intersection observer".to_string(),
            ));
        }
        let mut observers = self.observers.lock().unwrap();
        let index = observers.len();
        observers.push(ObserverRec {
            options,
            observed: HashSet::new(),
            disconnected: false,
            sink: on_change,
        });
        Ok(Box::new(MockObserver {
            index,
            observers: Arc::clone(&self.observers),
        }))
    }
}

#[async_trait]
impl MediaHost for MockHost {
    fn request_load(&self, node: NodeId) {
        *self
            .recorder
            .lock()
            .unwrap()
            .load_calls
            .entry(node)
            .or_insert(0) += 1;
    }

    async fn request_play(&self, node: NodeId) -> Result<(), LifecycleError> {
        *self
            .recorder
            .lock()
            .unwrap()
            .play_calls
            .entry(node)
            .or_insert(0) += 1;
        if self.reject_play.lock().unwrap().contains(&node) {
            return Err(LifecycleError::PlaybackRejected(
                "autoplay policy".to_string(),
            ));
        }
        self.paused.lock().unwrap().insert(node, false);
        Ok(())
    }

    fn request_pause(&self, node: NodeId) {
        *self
            .recorder
            .lock()
            .unwrap()
            .pause_calls
            .entry(node)
            .or_insert(0) += 1;
        self.paused.lock().unwrap().insert(node, true);
    }

    fn is_paused(&self, node: NodeId) -> bool {
        *self.paused.lock().unwrap().get(&node).unwrap_or(&true)
    }

    fn ready_state(&self, node: NodeId) -> MediaReadyState {
        *self
            .ready_states
            .lock()
            .unwrap()
            .get(&node)
            .unwrap_or(&MediaReadyState::HaveNothing)
    }

    fn assign_frame_source(&self, node: NodeId, source: &str) {
        self.recorder
            .lock()
            .unwrap()
            .frame_sources
            .entry(node)
            .or_default()
            .push(source.to_string());
    }

    fn set_poster_visual(&self, node: NodeId, visual: PosterVisual) {
        self.recorder
            .lock()
            .unwrap()
            .poster_visuals
            .entry(node)
            .or_default()
            .push(visual);
    }
}

/// A section with one autoplay player (node `root + 1`, poster `root + 3`)
/// and one lazy frame (node `root + 2`, poster `root + 4`).
pub fn hero_section(root: NodeId, clip: &str) -> SectionNodes {
    SectionNodes {
        root,
        players: vec![PlayerNode {
            node: root + 1,
            autoplay: true,
            poster: Some(root + 3),
        }],
        frames: vec![FrameNode {
            node: root + 2,
            deferred_source: Some(clip.to_string()),
            poster: Some(root + 4),
        }],
        posters: vec![root + 3, root + 4],
    }
}

/// Let the engine task drain everything queued so far. Tests run with the
/// clock paused, so this is deterministic.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
