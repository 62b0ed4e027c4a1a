//! Section Registry: one-shot inventory of hero sections and their media.
//!
//! Pure inventory building, no media-state mutation. A section with zero
//! media resources is still registered so the section gate can track it.

use std::collections::HashMap;

use crate::host::{DocumentHost, NodeId};
use crate::model::{MediaResource, Section, SectionId};

/// Output of [`discover`]: sections, their resources keyed by node, and the
/// root-node index used to route section gate events.
pub struct Discovery {
    pub sections: Vec<Section>,
    pub resources: HashMap<NodeId, MediaResource>,
    pub section_by_root: HashMap<NodeId, SectionId>,
}

/// Run the static document query and build the section records.
pub fn discover<D: DocumentHost + ?Sized>(document: &D) -> Discovery {
    let mut sections = Vec::new();
    let mut resources = HashMap::new();
    let mut section_by_root = HashMap::new();

    for (id, found) in document.hero_sections().into_iter().enumerate() {
        let mut section = Section {
            id,
            root: found.root,
            players: Vec::with_capacity(found.players.len()),
            frames: Vec::with_capacity(found.frames.len()),
            posters: found.posters,
        };

        for player in found.players {
            section.players.push(player.node);
            resources.insert(
                player.node,
                MediaResource::native_player(player.node, id, player.autoplay, player.poster),
            );
        }
        for frame in found.frames {
            section.frames.push(frame.node);
            resources.insert(
                frame.node,
                MediaResource::embedded_frame(frame.node, id, frame.deferred_source, frame.poster),
            );
        }

        if section.is_empty() {
            tracing::debug!(section = id, "hero section has no media resources");
        }
        section_by_root.insert(section.root, id);
        sections.push(section);
    }

    tracing::info!(
        sections = sections.len(),
        resources = resources.len(),
        "discovered hero sections"
    );

    Discovery {
        sections,
        resources,
        section_by_root,
    }
}
