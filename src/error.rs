//! Error taxonomy for the hero media lifecycle.
//!
//! None of these are fatal to the embedding page: the worst outcome is a
//! visible poster with unplayed media. Recoverable conditions are handled
//! locally and logged rather than propagated to the embedder.

/// Failure modes of the lifecycle controller and its host collaborators.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The host has no viewport-intersection observation capability.
    ///
    /// The facade reacts by treating every subject as permanently
    /// intersecting (eager load and play) instead of aborting setup.
    #[error("viewport intersection observation unavailable: {0}")]
    UnsupportedEnvironment(String),

    /// The environment refused a playback request (autoplay policy,
    /// resource not ready). Playback simply stays paused.
    #[error("playback request rejected: {0}")]
    PlaybackRejected(String),

    /// A media resource's load or error event fired with a failure.
    /// Recovered by forcing the poster visible; never retried.
    #[error("media resource failed to load")]
    MediaLoadFailure,

    /// Configuration failed to parse or validate.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failure_mode() {
        assert_eq!(
            LifecycleError::MediaLoadFailure.to_string(),
            "media resource failed to load"
        );
        assert_eq!(
            LifecycleError::PlaybackRejected("autoplay policy".into()).to_string(),
            "playback request rejected: autoplay policy"
        );
        assert_eq!(
            LifecycleError::UnsupportedEnvironment("no observer".into()).to_string(),
            "viewport intersection observation unavailable: no observer"
        );
    }
}
