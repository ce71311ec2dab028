//! Playback strategy selection and player lifecycle.
//!
//! A finished conversion yields a URL that is either a segmented
//! manifest (HLS) or a progressive file. Manifests need an adaptive
//! player bound to a video sink; progressive files go to the sink
//! directly. [`PlaybackAdapter`] makes that decision per URL and owns
//! the adaptive player's lifecycle: the previous session is always
//! released before a new target is bound and on teardown.

mod engine;

pub use engine::{AdaptiveEngine, AdaptiveSession, PlaybackError, VideoSink};

use tracing::{debug, info};

/// How a resolved artifact URL should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStrategy {
    /// Segmented manifest; needs an adaptive-streaming player.
    Adaptive,
    /// Progressive file; the sink plays it natively.
    Progressive,
}

impl PlaybackStrategy {
    /// Classify by canonical extension of the URL path. Query and
    /// fragment are ignored.
    pub fn classify(url: &str) -> Self {
        if is_manifest_path(url) {
            PlaybackStrategy::Adaptive
        } else {
            PlaybackStrategy::Progressive
        }
    }
}

fn is_manifest_path(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.contains('/') => {
            ext.eq_ignore_ascii_case("m3u8") || ext.eq_ignore_ascii_case("m3u")
        }
        _ => false,
    }
}

/// Binds playback targets to a [`VideoSink`], managing at most one
/// adaptive session at a time.
pub struct PlaybackAdapter {
    engine: Box<dyn AdaptiveEngine>,
    sink: Box<dyn VideoSink>,
    session: Option<Box<dyn AdaptiveSession>>,
    current: Option<String>,
}

impl PlaybackAdapter {
    pub fn new(engine: Box<dyn AdaptiveEngine>, sink: Box<dyn VideoSink>) -> Self {
        Self {
            engine,
            sink,
            session: None,
            current: None,
        }
    }

    /// URL currently bound, if any.
    pub fn current_url(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Bind a new playback target and attempt autoplay.
    ///
    /// Any previous adaptive session is released first. Manifest URLs
    /// get an adaptive session when the engine supports one, and fall
    /// back to direct playback otherwise. A rejected autoplay attempt
    /// is logged and swallowed; a manifest the engine cannot load is
    /// an error.
    pub async fn bind(&mut self, url: &str) -> Result<PlaybackStrategy, PlaybackError> {
        self.release_session();
        self.sink.clear();
        self.current = None;

        let strategy = PlaybackStrategy::classify(url);
        match strategy {
            PlaybackStrategy::Adaptive if self.engine.supported() => {
                let session = self.engine.start(url, self.sink.as_mut()).await?;
                self.session = Some(session);
                info!(url = %url, "Adaptive playback session started");
            }
            PlaybackStrategy::Adaptive | PlaybackStrategy::Progressive => {
                self.sink.set_source(url);
                debug!(url = %url, "Direct playback source set");
            }
        }

        if let Err(err) = self.sink.play() {
            debug!("Autoplay rejected: {}", err);
        }

        self.current = Some(url.to_string());
        Ok(strategy)
    }

    /// Release the adaptive session and detach the sink.
    pub fn teardown(&mut self) {
        self.release_session();
        self.sink.clear();
        self.current = None;
    }

    fn release_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.release();
        }
    }
}

impl Drop for PlaybackAdapter {
    fn drop(&mut self) {
        self.release_session();
    }
}
