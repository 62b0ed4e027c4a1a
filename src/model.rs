//! Core data model: sections, media resources, and their state machines.
//!
//! Load state moves strictly forward through `Unloaded -> Loading ->
//! {Ready | Failed}`; the terminal states are never left again. All state
//! transitions go through the methods here so the monotonicity invariant
//! lives in one place.

use serde::{Deserialize, Serialize};

use crate::host::NodeId;

/// Index of a [`Section`] in the registry's output. Resources hold this as a
/// back-reference; it is never an ownership edge.
pub type SectionId = usize;

/// Network/decode progress of a media resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl LoadState {
    /// Whether this state can never be left again.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed)
    }
}

/// Playback state of a native player, mirroring what the controller last
/// requested from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Paused,
    Playing,
}

/// Visual state of a poster image.
///
/// `Hidden` is only reachable after the owning resource reached `Ready`;
/// `Shown` is the forced-visible state entered after a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterVisual {
    Visible,
    FadingOut,
    Hidden,
    Shown,
}

/// One hero section discovered in the document: a viewport subject plus the
/// media resources found inside it. Built once at setup, never resized.
#[derive(Debug, Clone)]
pub struct Section {
    pub id: SectionId,
    /// The section's own node, observed by the section-level gate.
    pub root: NodeId,
    pub players: Vec<NodeId>,
    pub frames: Vec<NodeId>,
    pub posters: Vec<NodeId>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.frames.is_empty()
    }
}

/// Variant-specific state of a media resource.
#[derive(Debug, Clone)]
pub enum ResourceKind {
    NativePlayer {
        playback: PlaybackState,
    },
    EmbeddedFrame {
        /// Placeholder source, consumed exactly once when loading begins.
        deferred_source: Option<String>,
        /// Set when the one-time source assignment has happened, whether or
        /// not a deferred source was actually present.
        sourced: bool,
    },
}

/// One controllable media unit: a native player or an embeddable frame,
/// plus the poster recorded for it at registration time.
#[derive(Debug, Clone)]
pub struct MediaResource {
    pub node: NodeId,
    pub section: SectionId,
    pub autoplay: bool,
    pub poster: Option<NodeId>,
    pub load_state: LoadState,
    pub kind: ResourceKind,
}

impl MediaResource {
    pub fn native_player(
        node: NodeId,
        section: SectionId,
        autoplay: bool,
        poster: Option<NodeId>,
    ) -> Self {
        Self {
            node,
            section,
            autoplay,
            poster,
            load_state: LoadState::Unloaded,
            kind: ResourceKind::NativePlayer {
                playback: PlaybackState::Paused,
            },
        }
    }

    pub fn embedded_frame(
        node: NodeId,
        section: SectionId,
        deferred_source: Option<String>,
        poster: Option<NodeId>,
    ) -> Self {
        Self {
            node,
            section,
            autoplay: false,
            poster,
            load_state: LoadState::Unloaded,
            kind: ResourceKind::EmbeddedFrame {
                deferred_source,
                sourced: false,
            },
        }
    }

    pub fn is_native_player(&self) -> bool {
        matches!(self.kind, ResourceKind::NativePlayer { .. })
    }

    pub fn is_frame(&self) -> bool {
        matches!(self.kind, ResourceKind::EmbeddedFrame { .. })
    }

    /// `Unloaded -> Loading`. Returns whether the transition happened.
    pub fn begin_loading(&mut self) -> bool {
        if self.load_state == LoadState::Unloaded {
            self.load_state = LoadState::Loading;
            true
        } else {
            false
        }
    }

    /// Forward transition to `Ready`. A ready signal can arrive without a
    /// controller-initiated load (the element fetched on its own), so
    /// `Unloaded -> Ready` is accepted; terminal states are never left.
    pub fn mark_ready(&mut self) -> bool {
        if self.load_state.is_terminal() {
            false
        } else {
            self.load_state = LoadState::Ready;
            true
        }
    }

    /// Forward transition to `Failed`. Terminal states are never left, so a
    /// failure after `Ready` is ignored here; callers decide what the error
    /// event means for the poster.
    pub fn mark_failed(&mut self) -> bool {
        if self.load_state.is_terminal() {
            false
        } else {
            self.load_state = LoadState::Failed;
            true
        }
    }

    pub fn playback(&self) -> Option<PlaybackState> {
        match self.kind {
            ResourceKind::NativePlayer { playback } => Some(playback),
            ResourceKind::EmbeddedFrame { .. } => None,
        }
    }

    /// Record the playback state last requested for a native player.
    /// Returns whether anything changed.
    pub fn set_playback(&mut self, target: PlaybackState) -> bool {
        match &mut self.kind {
            ResourceKind::NativePlayer { playback } if *playback != target => {
                *playback = target;
                true
            }
            _ => false,
        }
    }

    /// Claim the one-time source assignment for a frame. Returns `None` if
    /// this is not a frame or the assignment already happened; the deferred
    /// source (which may itself be absent) otherwise.
    pub fn claim_deferred_source(&mut self) -> Option<Option<String>> {
        match &mut self.kind {
            ResourceKind::EmbeddedFrame { sourced: true, .. } => None,
            ResourceKind::EmbeddedFrame {
                deferred_source,
                sourced,
            } => {
                *sourced = true;
                Some(deferred_source.take())
            }
            ResourceKind::NativePlayer { .. } => None,
        }
    }
}
