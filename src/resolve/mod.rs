//! Image resolution: memory map → byte cache → network, with format dispatch.
//!
//! The [`Resolver`] owns its collaborators — an [`ImageCache`] and an
//! [`ImageFetcher`] — as explicitly injected instances. There are no shared
//! singletons: a test wires in a [`MemoryCache`] and a mock fetcher, a host
//! wires in a [`DiskCache`] and an [`HttpFetcher`], and nothing else changes.
//!
//! # Resolution order
//!
//! 1. Memory-backed photos render directly; no cache, no network.
//! 2. A decoded-image map returns previously resolved URLs without re-decoding.
//! 3. An in-flight registry guarantees at most one resolution per URL at a
//!    time: later callers block on the first caller's result instead of
//!    issuing a duplicate fetch.
//! 4. Byte-cache hit: classify the raw bytes (animated vs static) and decode.
//!    Lookups never write.
//! 5. Miss: fetch at high priority with the photo's effective auth header and
//!    the configured timeout, classify + decode, then store the raw bytes
//!    under the URL key. A failed store is logged and otherwise ignored — the
//!    decoded image still renders.

pub mod cache;
pub mod decode;
pub mod fetcher;
pub mod format;

pub use cache::{CacheError, DiskCache, ImageCache, MemoryCache};
pub use decode::{AnimatedImage, DecodeError, RenderedImage, decode_bytes};
pub use fetcher::{
    DEFAULT_MAX_RESPONSE_BYTES, FetchError, FetchPriority, FetchRequest, HttpFetcher, ImageFetcher,
};
pub use format::{ImageClass, classify, is_animated};

use crate::photo::{Photo, PhotoSource};
use log::warn;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use thiserror::Error;

/// `Clone` so one in-flight failure can be handed to every waiter.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// The network fetch failed. The host should stop the loading indicator
    /// and offer a retry.
    #[error("fetch failed for {url}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    /// Bytes were retrieved (or found cached) but are not decodable as any
    /// supported image format. Same user-visible treatment as a fetch failure.
    #[error("undecodable image data from {url}")]
    Decode {
        url: String,
        #[source]
        source: DecodeError,
    },
}

/// Tuning knobs for the resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Per-fetch timeout. A photo view must not spin forever on a stalled
    /// transfer.
    pub fetch_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(15),
        }
    }
}

/// Result slot shared between the resolving thread and its waiters.
struct InFlight {
    slot: Mutex<Option<Result<Arc<RenderedImage>, ResolveError>>>,
    cv: Condvar,
}

impl InFlight {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            cv: Condvar::new(),
        }
    }

    fn set(&self, result: Result<Arc<RenderedImage>, ResolveError>) {
        *self.slot.lock().unwrap() = Some(result);
        self.cv.notify_all();
    }

    fn wait(&self) -> Result<Arc<RenderedImage>, ResolveError> {
        let mut guard = self.slot.lock().unwrap();
        while guard.is_none() {
            guard = self.cv.wait(guard).unwrap();
        }
        guard.as_ref().unwrap().clone()
    }
}

/// Turns [`Photo`]s into renderable images.
pub struct Resolver {
    cache: Arc<dyn ImageCache>,
    fetcher: Arc<dyn ImageFetcher>,
    config: ResolverConfig,
    /// Decoded results by URL key; hits here skip cache and decode entirely.
    /// Unbounded: one entry per distinct URL for the resolver's lifetime.
    /// Long-lived hosts shed it with [`Resolver::clear_decoded`].
    decoded: Mutex<HashMap<String, Arc<RenderedImage>>>,
    /// At most one resolution per URL; later callers attach as waiters.
    in_flight: Mutex<HashMap<String, Arc<InFlight>>>,
}

impl Resolver {
    pub fn new(cache: Arc<dyn ImageCache>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self::with_config(cache, fetcher, ResolverConfig::default())
    }

    pub fn with_config(
        cache: Arc<dyn ImageCache>,
        fetcher: Arc<dyn ImageFetcher>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            cache,
            fetcher,
            config,
            decoded: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a photo to a renderable image.
    ///
    /// Blocking; per-photo views call this from a worker thread (see
    /// [`crate::viewer::PhotoView`]). Safe to call concurrently for the same
    /// URL — only one fetch is issued.
    pub fn resolve(&self, photo: &Photo) -> Result<Arc<RenderedImage>, ResolveError> {
        let (url, key) = match &photo.source {
            PhotoSource::Memory { image, .. } => {
                return Ok(Arc::new(RenderedImage::Static((**image).clone())));
            }
            PhotoSource::Remote { image_url, .. } => (image_url, image_url.as_str()),
        };

        if let Some(rendered) = self.decoded.lock().unwrap().get(key) {
            return Ok(Arc::clone(rendered));
        }

        let (flight, is_owner) = self.join_in_flight(key);
        if !is_owner {
            return flight.wait();
        }

        let result = self.resolve_remote(photo, url.as_str(), key);
        if let Ok(rendered) = &result {
            self.decoded
                .lock()
                .unwrap()
                .insert(key.to_string(), Arc::clone(rendered));
        }
        flight.set(result.clone());
        self.in_flight.lock().unwrap().remove(key);
        result
    }

    fn resolve_remote(
        &self,
        photo: &Photo,
        url: &str,
        key: &str,
    ) -> Result<Arc<RenderedImage>, ResolveError> {
        // Step 1: cache lookup. A lookup error degrades to a miss.
        let cached = match self.cache.lookup(key) {
            Ok(hit) => hit,
            Err(e) => {
                warn!("cache lookup failed for {key}: {e}");
                None
            }
        };

        // Step 2: format dispatch on the cached raw bytes.
        if let Some(bytes) = cached {
            let rendered = decode_bytes(&bytes).map_err(|source| ResolveError::Decode {
                url: url.to_string(),
                source,
            })?;
            return Ok(Arc::new(rendered));
        }

        // Step 3: fetch. UI-blocking load, so elevated priority.
        let image_url = photo.image_url().expect("remote photo has a URL");
        let headers = photo
            .effective_auth_header()
            .map(|(name, value)| vec![(name.to_string(), value.to_string())])
            .unwrap_or_default();
        let bytes = self
            .fetcher
            .fetch(&FetchRequest {
                url: image_url,
                headers,
                priority: FetchPriority::High,
                timeout: self.config.fetch_timeout,
            })
            .map_err(|source| ResolveError::Fetch {
                url: url.to_string(),
                source,
            })?;

        // Step 4: decode, then persist the raw bytes. The write happens only
        // after a successful fetch + decode and never blocks rendering.
        let rendered = decode_bytes(&bytes).map_err(|source| ResolveError::Decode {
            url: url.to_string(),
            source,
        })?;
        if let Err(e) = self.cache.store(key, &bytes) {
            warn!("cache write failed for {key}: {e}");
        }
        Ok(Arc::new(rendered))
    }

    /// Drop every memoized decoded image. The byte cache is untouched; later
    /// resolves re-decode from cache or network. Images still displayed keep
    /// living through their own `Arc`s.
    pub fn clear_decoded(&self) {
        self.decoded.lock().unwrap().clear();
    }

    fn join_in_flight(&self, key: &str) -> (Arc<InFlight>, bool) {
        let mut map = self.in_flight.lock().unwrap();
        if let Some(existing) = map.get(key) {
            return (Arc::clone(existing), false);
        }
        let flight = Arc::new(InFlight::new());
        map.insert(key.to_string(), Arc::clone(&flight));
        (flight, true)
    }
}
