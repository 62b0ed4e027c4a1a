//! Intersection Gate: one deduplicated boolean stream per observed subject.
//!
//! A gate wraps one viewport observer (or none, in the eager fallback) and
//! keeps the last delivered state per subject, so raw host batches collapse
//! into clean transitions. Three gates exist per lifecycle, one per concern.

use std::collections::{HashMap, HashSet};

use crate::host::{NodeId, ViewportObserver};

/// Which lifecycle concern a gate serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// Section-level gate driving lazy loading of a whole section.
    Section,
    /// Per-player gate driving autoplay at majority visibility.
    Autoplay,
    /// Per-frame gate driving the one-time deferred-source load.
    FrameLoad,
}

pub struct IntersectionGate {
    kind: GateKind,
    /// `None` when the host reported `UnsupportedEnvironment`; subjects are
    /// then driven by synthesized always-intersecting events.
    observer: Option<Box<dyn ViewportObserver>>,
    observed: HashSet<NodeId>,
    last: HashMap<NodeId, bool>,
}

impl IntersectionGate {
    pub fn new(kind: GateKind, observer: Option<Box<dyn ViewportObserver>>) -> Self {
        Self {
            kind,
            observer,
            observed: HashSet::new(),
            last: HashMap::new(),
        }
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Whether this gate runs without a real observer.
    pub fn is_eager(&self) -> bool {
        self.observer.is_none()
    }

    /// Register a subject. Idempotent: observing a subject twice registers
    /// it with the underlying observer once.
    pub fn observe(&mut self, node: NodeId) {
        if self.observed.insert(node) {
            if let Some(observer) = &self.observer {
                observer.observe(node);
            }
        }
    }

    /// Stop delivery for a subject. Later raw events for it are dropped.
    pub fn unobserve(&mut self, node: NodeId) {
        if self.observed.remove(&node) {
            self.last.remove(&node);
            if let Some(observer) = &self.observer {
                observer.unobserve(node);
            }
        }
    }

    /// Fold one raw host event into the per-subject state. Returns the new
    /// intersection state when it changed, `None` for unknown subjects and
    /// duplicate deliveries of the current state.
    pub fn transition(&mut self, node: NodeId, is_intersecting: bool) -> Option<bool> {
        if !self.observed.contains(&node) {
            return None;
        }
        match self.last.insert(node, is_intersecting) {
            Some(previous) if previous == is_intersecting => None,
            _ => Some(is_intersecting),
        }
    }

    /// Detach everything. Called once at teardown.
    pub fn disconnect(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
        self.observed.clear();
        self.last.clear();
    }

    /// Subjects currently registered, for the eager fallback to synthesize
    /// always-intersecting events against.
    pub fn subjects(&self) -> Vec<NodeId> {
        self.observed.iter().copied().collect()
    }
}
