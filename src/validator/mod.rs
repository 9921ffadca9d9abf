//! Platform validators.
//!
//! This module provides:
//! - The `VideoValidator` capability (media id extraction, URL building,
//!   reachability check)
//! - YouTube and Vimeo implementations
//! - `ValidatorRegistry`, which maps an extension to a validator and lets
//!   callers add platforms or override the lookup through hooks
//! - The `OEmbedProbe` used for reachability checks

mod probe;
mod vimeo;
mod youtube;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::config::DEFAULT_OEMBED_FORMAT;
use crate::error_handling::ProbeError;
use crate::storage::VideoRecord;

pub use probe::{HttpProbe, OEmbedProbe};
pub use vimeo::VimeoValidator;
pub use youtube::YoutubeValidator;

/// One video platform.
#[async_trait]
pub trait VideoValidator: Send + Sync {
    /// Lowercase extension this validator handles, e.g. `youtube`.
    fn extension(&self) -> &str;

    /// Platform media id stored in `video`, or `None` if it is absent or
    /// malformed.
    fn online_media_id(&self, video: &VideoRecord) -> Option<String>;

    /// Canonical public watch URL. The media id is percent-encoded.
    fn build_url(&self, media_id: &str) -> String;

    /// oEmbed endpoint for `media_id`. The watch URL is percent-encoded once
    /// more as a query value.
    fn oembed_url(&self, media_id: &str, format: &str) -> String;

    /// Probes the JSON oEmbed endpoint.
    ///
    /// Online means the endpoint answered 2xx with a non-empty JSON object.
    /// Every failure is logged at debug and reported as offline.
    async fn is_video_online(&self, probe: &dyn OEmbedProbe, media_id: &str) -> bool {
        let url = self.oembed_url(media_id, DEFAULT_OEMBED_FORMAT);
        match probe.fetch(&url).await.and_then(|body| check_oembed(&body)) {
            Ok(()) => true,
            Err(e) => {
                debug!("{} media {} is offline: {}", self.extension(), media_id, e);
                false
            }
        }
    }
}

/// Accepts a non-empty JSON object.
pub fn check_oembed(body: &str) -> Result<(), ProbeError> {
    if body.trim().is_empty() {
        return Err(ProbeError::EmptyBody);
    }
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ProbeError::Malformed(e.to_string()))?;
    match value.as_object() {
        Some(object) if !object.is_empty() => Ok(()),
        Some(_) => Err(ProbeError::Malformed("empty JSON object".to_string())),
        None => Err(ProbeError::Malformed("not a JSON object".to_string())),
    }
}

/// Builds a validator instance.
pub type ValidatorFactory = Arc<dyn Fn() -> Arc<dyn VideoValidator> + Send + Sync>;

/// Modification hook applied after the built-in lookup.
///
/// Receives the lowercase extension and the validator chosen so far, returns
/// the validator to use (or `None` for "no validator").
pub type ValidatorHook = Arc<
    dyn Fn(&str, Option<Arc<dyn VideoValidator>>) -> Option<Arc<dyn VideoValidator>>
        + Send
        + Sync,
>;

/// Extension → validator lookup.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    factories: HashMap<String, ValidatorFactory>,
    hooks: Vec<ValidatorHook>,
}

impl ValidatorRegistry {
    /// An empty registry; every extension resolves to `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the YouTube and Vimeo validators.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("youtube", || Arc::new(YoutubeValidator));
        registry.register("vimeo", || Arc::new(VimeoValidator));
        registry
    }

    /// Adds or replaces the validator for `extension`.
    pub fn register<F>(&mut self, extension: &str, factory: F)
    where
        F: Fn() -> Arc<dyn VideoValidator> + Send + Sync + 'static,
    {
        self.factories
            .insert(extension.trim().to_lowercase(), Arc::new(factory));
    }

    /// Appends a modification hook. Hooks run in registration order.
    pub fn add_hook<F>(&mut self, hook: F)
    where
        F: Fn(&str, Option<Arc<dyn VideoValidator>>) -> Option<Arc<dyn VideoValidator>>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.push(Arc::new(hook));
    }

    /// Validator for `extension` after applying every hook.
    pub fn resolve(&self, extension: &str) -> Option<Arc<dyn VideoValidator>> {
        let extension = extension.trim().to_lowercase();
        let builtin = self.factories.get(&extension).map(|factory| factory());
        self.hooks
            .iter()
            .fold(builtin, |validator, hook| hook(&extension, validator))
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.factories.keys().cloned().collect();
        extensions.sort();
        extensions
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("extensions", &self.extensions())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub(crate) fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
