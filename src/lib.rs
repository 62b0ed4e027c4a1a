//! heroplay - visibility-driven lifecycle control for hero media blocks.
//!
//! A hero section carries a background video (native player or embedded
//! frame) behind a poster image. This crate defers the network and decode
//! cost of that media until the section is actually visible, pauses playback
//! when it leaves the viewport or the page is hidden, and swaps the poster
//! out once the media is ready.
//!
//! The embedding environment (document tree, viewport observation, media
//! elements, page visibility) is abstracted behind the traits in [`host`];
//! wire a [`Host`] implementation into [`HeroMediaLifecycle::create`] and
//! feed element events through the [`LifecycleHandle`].

pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod host;
pub mod lifecycle;
pub mod model;
pub mod registry;

pub use config::LifecycleConfig;
pub use error::LifecycleError;
pub use gate::{GateKind, IntersectionGate};
pub use host::{
    DocumentHost, FrameNode, Host, IntersectionSink, MediaHost, MediaReadyState, NodeId,
    ObserverOptions, PlayerNode, SectionNodes, ViewportHost, ViewportObserver,
};
pub use lifecycle::{HeroMediaLifecycle, LifecycleHandle, LifecycleStats};
pub use model::{
    LoadState, MediaResource, PlaybackState, PosterVisual, ResourceKind, Section, SectionId,
};
