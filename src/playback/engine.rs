use async_trait::async_trait;

/// Playback failure.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// The manifest could not be fetched or parsed by the adaptive
    /// engine.
    #[error("Manifest could not be loaded: {0}")]
    Manifest(String),

    /// The host refused to start playback without user interaction.
    #[error("Autoplay rejected: {0}")]
    AutoplayRejected(String),
}

/// Surface that renders media, the host video element of the embedding
/// application.
pub trait VideoSink: Send {
    /// Point the sink directly at a progressive source.
    fn set_source(&mut self, url: &str);

    /// Attempt to start playback. Hosts may reject unsolicited
    /// playback; callers decide whether that matters.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Detach whatever source is currently bound.
    fn clear(&mut self);
}

/// Handle to a running adaptive-streaming player bound to one
/// manifest.
pub trait AdaptiveSession: Send {
    /// Release the underlying player instance. Idempotent.
    fn release(&mut self);
}

/// Adaptive-streaming engine: parses a segmented manifest and feeds a
/// [`VideoSink`].
#[async_trait]
pub trait AdaptiveEngine: Send + Sync {
    /// Whether this runtime can host adaptive playback at all.
    fn supported(&self) -> bool;

    /// Parse the manifest and attach a player session to `sink`.
    /// Resolves once the manifest is parsed and playback can start.
    async fn start(
        &self,
        manifest_url: &str,
        sink: &mut dyn VideoSink,
    ) -> Result<Box<dyn AdaptiveSession>, PlaybackError>;
}
