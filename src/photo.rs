//! The `Photo` value object — one displayable image plus presentation metadata.
//!
//! A photo is backed either by in-memory bitmaps or by remote URLs. The two
//! variants share one record (title, deletable flag, optional auth header)
//! instead of living in parallel definitions; builder-style setters cover the
//! mixed cases (e.g. remote full image with an in-memory thumbnail).
//!
//! Photos are constructed once before the gallery is presented and are
//! immutable in practice afterwards. Equality is reference identity — hosts
//! share photos via `Arc` and compare with [`Arc::ptr_eq`] — so `Photo`
//! deliberately implements neither `PartialEq` nor `Hash`.

use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum PhotoError {
    /// The image URL is not a well-formed absolute URL. Raised at
    /// construction time so a bad record can never reach resolution.
    #[error("invalid image URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Where a photo's pixels come from.
#[derive(Debug, Clone)]
pub enum PhotoSource {
    /// Already-decoded bitmaps supplied by the host. Resolution renders these
    /// directly and never touches the cache or the network.
    Memory {
        image: Arc<DynamicImage>,
        thumbnail: Option<Arc<DynamicImage>>,
    },
    /// Remote images identified by URL. The full-image URL doubles as the
    /// cache key (canonical string form).
    Remote {
        image_url: Url,
        thumbnail_url: Option<Url>,
    },
}

/// A single HTTP header attached to fetches for this photo (e.g. an
/// `Authorization` header for a private CDN).
#[derive(Debug, Clone)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

/// One displayable image: source plus presentation metadata.
#[derive(Debug, Clone)]
pub struct Photo {
    pub source: PhotoSource,
    /// Display title shown by the host (caption bar, overlay, ...).
    pub title: Option<String>,
    /// Whether the host should offer a delete action for this photo.
    pub deletable: bool,
    /// Optional header override for authenticated image fetches.
    pub auth_header: Option<HttpHeader>,
}

impl Photo {
    /// A photo backed by an in-memory image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            source: PhotoSource::Memory {
                image: Arc::new(image),
                thumbnail: None,
            },
            title: None,
            deletable: false,
            auth_header: None,
        }
    }

    /// A photo backed by a remote URL. Fails fast on a malformed URL.
    pub fn from_url(url: &str) -> Result<Self, PhotoError> {
        let image_url = parse_url(url)?;
        Ok(Self {
            source: PhotoSource::Remote {
                image_url,
                thumbnail_url: None,
            },
            title: None,
            deletable: false,
            auth_header: None,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn deletable(mut self, deletable: bool) -> Self {
        self.deletable = deletable;
        self
    }

    /// Set the thumbnail URL on a remote photo. No-op for memory photos.
    pub fn with_thumbnail_url(mut self, url: &str) -> Result<Self, PhotoError> {
        if let PhotoSource::Remote { thumbnail_url, .. } = &mut self.source {
            *thumbnail_url = Some(parse_url(url)?);
        }
        Ok(self)
    }

    /// Set an in-memory thumbnail on a memory photo. No-op for remote photos.
    pub fn with_thumbnail_image(mut self, thumb: DynamicImage) -> Self {
        if let PhotoSource::Memory { thumbnail, .. } = &mut self.source {
            *thumbnail = Some(Arc::new(thumb));
        }
        self
    }

    pub fn with_auth_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth_header = Some(HttpHeader {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// The full-image URL, if this photo is remote.
    pub fn image_url(&self) -> Option<&Url> {
        match &self.source {
            PhotoSource::Remote { image_url, .. } => Some(image_url),
            PhotoSource::Memory { .. } => None,
        }
    }

    /// Cache key: the canonical string form of the full-image URL.
    pub fn cache_key(&self) -> Option<&str> {
        self.image_url().map(Url::as_str)
    }

    /// The header to attach to fetches, if any. A header with an empty value
    /// is treated as absent rather than sent blank.
    pub fn effective_auth_header(&self) -> Option<(&str, &str)> {
        self.auth_header
            .as_ref()
            .filter(|h| !h.value.is_empty())
            .map(|h| (h.name.as_str(), h.value.as_str()))
    }
}

fn parse_url(raw: &str) -> Result<Url, PhotoError> {
    Url::parse(raw).map_err(|e| PhotoError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}
