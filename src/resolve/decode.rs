//! Decoding fetched or cached bytes into something renderable.
//!
//! Static payloads become a single [`DynamicImage`]; animated payloads become
//! an [`AnimatedImage`] — the decoded frame sequence plus the raw bytes it
//! came from. The raw bytes are kept because the cache stores bytes, not
//! frames: re-persisting an already-decoded animation must not re-encode.

use super::format::{self, ImageClass};
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, Frame, GenericImageView};
use std::fmt;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DecodeError {
    /// Bytes were retrieved but are not parseable as any supported format.
    #[error("could not decode image data: {0}")]
    Malformed(String),
    /// An animated container decoded to zero frames.
    #[error("animated image has no frames")]
    EmptyAnimation,
}

/// A decoded frame sequence (GIF, APNG, animated WebP).
///
/// Frames are fully decoded up front; playback timing comes from each frame's
/// [`image::Delay`]. The original encoded bytes remain available via
/// [`AnimatedImage::as_bytes`].
#[derive(Clone)]
pub struct AnimatedImage {
    bytes: Vec<u8>,
    frames: Vec<Frame>,
}

impl AnimatedImage {
    /// Decode an animated payload. The container is dispatched on its
    /// signature, mirroring [`format::classify`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        let frames = decode_frames(&bytes)?;
        if frames.is_empty() {
            return Err(DecodeError::EmptyAnimation);
        }
        Ok(Self { bytes, frames })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// First frame as a still image — used for snapshots and as the poster
    /// frame before playback starts.
    pub fn first_frame(&self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.frames[0].buffer().clone())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.frames[0].buffer().dimensions()
    }

    /// The encoded bytes this animation was decoded from.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for AnimatedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedImage")
            .field("bytes", &self.bytes.len())
            .field("frames", &self.frames.len())
            .finish()
    }
}

/// A renderable image: either a static bitmap or an animated frame sequence.
#[derive(Debug, Clone)]
pub enum RenderedImage {
    Static(DynamicImage),
    Animated(AnimatedImage),
}

impl RenderedImage {
    pub fn class(&self) -> ImageClass {
        match self {
            RenderedImage::Static(_) => ImageClass::Static,
            RenderedImage::Animated(_) => ImageClass::Animated,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            RenderedImage::Static(image) => image.dimensions(),
            RenderedImage::Animated(animation) => animation.dimensions(),
        }
    }
}

/// Decode raw bytes according to their sniffed classification.
pub fn decode_bytes(bytes: &[u8]) -> Result<RenderedImage, DecodeError> {
    match format::classify(bytes) {
        ImageClass::Animated => {
            AnimatedImage::from_bytes(bytes.to_vec()).map(RenderedImage::Animated)
        }
        ImageClass::Static => image::load_from_memory(bytes)
            .map(RenderedImage::Static)
            .map_err(|e| DecodeError::Malformed(e.to_string())),
    }
}

fn decode_frames(bytes: &[u8]) -> Result<Vec<Frame>, DecodeError> {
    let malformed = |e: image::ImageError| DecodeError::Malformed(e.to_string());
    let cursor = Cursor::new(bytes);

    if bytes.starts_with(b"GIF") {
        let decoder = GifDecoder::new(cursor).map_err(malformed)?;
        return decoder.into_frames().collect_frames().map_err(malformed);
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        let decoder = PngDecoder::new(cursor)
            .and_then(PngDecoder::apng)
            .map_err(malformed)?;
        return decoder.into_frames().collect_frames().map_err(malformed);
    }
    if bytes.starts_with(b"RIFF") {
        let decoder = WebPDecoder::new(cursor).map_err(malformed)?;
        return decoder.into_frames().collect_frames().map_err(malformed);
    }
    Err(DecodeError::Malformed(
        "unrecognized animated container".to_string(),
    ))
}
