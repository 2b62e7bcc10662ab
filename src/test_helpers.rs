//! Shared image fixtures for the test suite.
//!
//! Decodable fixtures (PNG, JPEG, GIF) are produced with the `image` crate's
//! encoders so decode tests exercise real payloads. The APNG and WebP
//! fixtures are hand-assembled containers for the signature sniffer only;
//! nothing decodes them.

use image::codecs::gif::GifEncoder;
use image::{DynamicImage, Frame, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Decodable fixtures
// =========================================================================

/// A 2x2 opaque PNG.
pub fn png_bytes() -> Vec<u8> {
    encode_static(ImageFormat::Png)
}

/// A 2x2 JPEG.
pub fn jpeg_bytes() -> Vec<u8> {
    encode_static(ImageFormat::Jpeg)
}

fn encode_static(format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(solid_frame(200, 60, 30)).to_rgb8();
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// A two-frame 2x2 GIF89a.
pub fn animated_gif_bytes() -> Vec<u8> {
    encode_gif(&[solid_frame(255, 0, 0), solid_frame(0, 0, 255)])
}

/// A one-frame 2x2 GIF89a. Still classifies as animated.
pub fn single_frame_gif_bytes() -> Vec<u8> {
    encode_gif(&[solid_frame(0, 255, 0)])
}

fn solid_frame(r: u8, g: u8, b: u8) -> RgbaImage {
    RgbaImage::from_pixel(2, 2, Rgba([r, g, b, 255]))
}

fn encode_gif(frames: &[RgbaImage]) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        for buffer in frames {
            encoder.encode_frame(Frame::new(buffer.clone())).unwrap();
        }
    }
    bytes
}

// =========================================================================
// Sniff-only fixtures
// =========================================================================

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// PNG signature + IHDR + acTL, enough for the chunk walk to find the
/// animation control chunk. Chunk data and CRCs are zeroed.
pub fn apng_bytes() -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    push_png_chunk(&mut bytes, b"IHDR", 13);
    push_png_chunk(&mut bytes, b"acTL", 8);
    push_png_chunk(&mut bytes, b"IDAT", 0);
    push_png_chunk(&mut bytes, b"IEND", 0);
    bytes
}

fn push_png_chunk(bytes: &mut Vec<u8>, chunk_type: &[u8; 4], data_len: u32) {
    bytes.extend_from_slice(&data_len.to_be_bytes());
    bytes.extend_from_slice(chunk_type);
    bytes.extend(std::iter::repeat_n(0u8, data_len as usize + 4));
}

/// RIFF/WEBP header with a plain VP8 chunk.
pub fn static_webp_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&20u32.to_le_bytes());
    bytes.extend_from_slice(b"WEBP");
    bytes.extend_from_slice(b"VP8 ");
    bytes.extend_from_slice(&8u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 8]);
    bytes
}

/// RIFF/WEBP header with a VP8X chunk whose animation flag is set.
pub fn animated_webp_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&22u32.to_le_bytes());
    bytes.extend_from_slice(b"WEBP");
    bytes.extend_from_slice(b"VP8X");
    bytes.extend_from_slice(&10u32.to_le_bytes());
    bytes.push(0x02); // animation flag
    bytes.extend_from_slice(&[0u8; 9]);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodable_fixtures_decode() {
        assert_eq!(
            image::load_from_memory(&png_bytes()).unwrap().width(),
            2
        );
        assert!(image::load_from_memory(&jpeg_bytes()).is_ok());
        assert!(image::load_from_memory(&animated_gif_bytes()).is_ok());
        assert!(image::load_from_memory(&single_frame_gif_bytes()).is_ok());
    }

    #[test]
    fn gif_fixtures_carry_the_gif89a_signature() {
        assert!(animated_gif_bytes().starts_with(b"GIF"));
        assert!(single_frame_gif_bytes().starts_with(b"GIF"));
    }
}
