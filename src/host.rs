//! Collaborator contracts the lifecycle drives.
//!
//! The document tree, the viewport-intersection primitive, the media
//! elements, and page visibility are all host concerns. The lifecycle only
//! ever sees opaque [`NodeId`]s and these traits, which keeps the
//! controllers testable against a recording mock.

use async_trait::async_trait;

use crate::error::LifecycleError;
use crate::model::PosterVisual;

/// Opaque handle to a host document node.
pub type NodeId = u64;

/// How far a media element's fetch has progressed, mirroring the HTML media
/// ready-state ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MediaReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Margin and visibility threshold for one viewport observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Expansion of the viewport box, in CSS pixels.
    pub root_margin_px: i32,
    /// Minimum visible fraction for a subject to count as intersecting.
    pub threshold: f32,
}

/// Callback invoked by the host whenever an observed subject's intersection
/// state changes. Batches may arrive in any order across subjects; per
/// subject the host delivers transitions in occurrence order.
pub type IntersectionSink = Box<dyn Fn(NodeId, bool) + Send + Sync>;

/// One live viewport observer, created with fixed [`ObserverOptions`].
pub trait ViewportObserver: Send + Sync {
    fn observe(&self, node: NodeId);
    fn unobserve(&self, node: NodeId);
    fn disconnect(&self);
}

/// Factory for viewport observers.
pub trait ViewportHost: Send + Sync {
    /// Create an observer delivering changes into `on_change`.
    ///
    /// Fails with [`LifecycleError::UnsupportedEnvironment`] when the host
    /// has no intersection-observation capability.
    fn viewport_observer(
        &self,
        options: ObserverOptions,
        on_change: IntersectionSink,
    ) -> Result<Box<dyn ViewportObserver>, LifecycleError>;
}

/// Static document inventory plus page visibility.
pub trait DocumentHost: Send + Sync {
    /// Query the hero sections once at setup.
    fn hero_sections(&self) -> Vec<SectionNodes>;

    /// Whether the page is currently hidden.
    fn page_hidden(&self) -> bool;
}

/// Media, frame, and poster element operations.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Request a metadata load on a native player.
    fn request_load(&self, node: NodeId);

    /// Request playback. Resolves once the environment accepts or refuses;
    /// refusal (autoplay policy, resource not ready) is an error, not a
    /// panic-worthy condition.
    async fn request_play(&self, node: NodeId) -> Result<(), LifecycleError>;

    fn request_pause(&self, node: NodeId);

    /// Environment-reported paused flag for a native player.
    fn is_paused(&self, node: NodeId) -> bool;

    fn ready_state(&self, node: NodeId) -> MediaReadyState;

    /// Assign a frame's live source attribute, starting its network fetch.
    fn assign_frame_source(&self, node: NodeId, source: &str);

    /// Reflect a poster's visual state (opacity/layout) in the document.
    fn set_poster_visual(&self, node: NodeId, visual: PosterVisual);
}

/// Everything the lifecycle needs from its embedding environment.
pub trait Host: DocumentHost + ViewportHost + MediaHost {}

impl<T: DocumentHost + ViewportHost + MediaHost> Host for T {}

/// A native player as found in the document.
#[derive(Debug, Clone)]
pub struct PlayerNode {
    pub node: NodeId,
    /// Whether the element is flagged autoplay-eligible.
    pub autoplay: bool,
    /// Nearest poster inside the player's container, resolved by the
    /// document query once at setup.
    pub poster: Option<NodeId>,
}

/// An embeddable frame as found in the document.
#[derive(Debug, Clone)]
pub struct FrameNode {
    pub node: NodeId,
    /// The deferred-source attribute value, if the frame is lazy.
    pub deferred_source: Option<String>,
    pub poster: Option<NodeId>,
}

/// One hero section's inventory as reported by the document query.
#[derive(Debug, Clone)]
pub struct SectionNodes {
    pub root: NodeId,
    pub players: Vec<PlayerNode>,
    pub frames: Vec<FrameNode>,
    pub posters: Vec<NodeId>,
}
