//! Format sniffing: animated vs static, from raw bytes.
//!
//! Classification looks only at container signatures, never at pixel data, so
//! it is cheap enough to run on every cache hit. The rules:
//!
//! | Container | Animated when |
//! |---|---|
//! | GIF | always — viewers hand GIFs to the frame-sequence renderer wholesale |
//! | PNG | an `acTL` chunk precedes the first `IDAT` (APNG) |
//! | WebP | the VP8X animation flag is set, or an `ANIM` chunk is present |
//! | anything else | never |
//!
//! A single-frame GIF therefore classifies as animated; it decodes into a
//! one-frame sequence, which renders identically to a static bitmap.

const GIF87A: &[u8] = b"GIF87a";
const GIF89A: &[u8] = b"GIF89a";
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Coarse classification of an image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageClass {
    /// Single bitmap; decode with an ordinary still-image decoder.
    Static,
    /// Frame sequence; hand to the animated renderer.
    Animated,
}

/// Classify raw image bytes.
pub fn classify(bytes: &[u8]) -> ImageClass {
    if is_animated(bytes) {
        ImageClass::Animated
    } else {
        ImageClass::Static
    }
}

/// True when the payload carries an animated-image signature.
pub fn is_animated(bytes: &[u8]) -> bool {
    is_gif(bytes) || is_apng(bytes) || is_animated_webp(bytes)
}

fn is_gif(bytes: &[u8]) -> bool {
    bytes.starts_with(GIF87A) || bytes.starts_with(GIF89A)
}

/// Walk PNG chunks looking for `acTL` before the first `IDAT`.
///
/// Per the APNG spec the animation control chunk must precede the first image
/// data chunk, so the scan stops at `IDAT` (or `IEND`, or a truncated chunk).
fn is_apng(bytes: &[u8]) -> bool {
    if !bytes.starts_with(PNG_SIGNATURE) {
        return false;
    }

    let mut pos = PNG_SIGNATURE.len();
    // Each chunk: 4-byte big-endian length, 4-byte type, data, 4-byte CRC.
    while pos + 8 <= bytes.len() {
        let length = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
            as usize;
        let chunk_type = &bytes[pos + 4..pos + 8];
        match chunk_type {
            b"acTL" => return true,
            b"IDAT" | b"IEND" => return false,
            _ => {}
        }
        // length can be attacker-controlled; a checked add guards the cursor.
        pos = match pos.checked_add(8 + length + 4) {
            Some(next) => next,
            None => return false,
        };
    }
    false
}

/// RIFF layout: "RIFF" + file size + "WEBP" + chunks. An extended-format file
/// starts its chunk list with VP8X whose flag byte carries the animation bit.
fn is_animated_webp(bytes: &[u8]) -> bool {
    if bytes.len() < 21 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WEBP" {
        return false;
    }

    const ANIMATION_FLAG: u8 = 0x02;
    if &bytes[12..16] == b"VP8X" && bytes[20] & ANIMATION_FLAG != 0 {
        return true;
    }

    // Lenient fallback: some writers emit ANIM without the VP8X flag set.
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let fourcc = &bytes[pos..pos + 4];
        if fourcc == b"ANIM" {
            return true;
        }
        let size = u32::from_le_bytes([
            bytes[pos + 4],
            bytes[pos + 5],
            bytes[pos + 6],
            bytes[pos + 7],
        ]) as usize;
        // RIFF chunks are padded to even sizes.
        let padded = size + (size & 1);
        pos = match pos.checked_add(8 + padded) {
            Some(next) => next,
            None => return false,
        };
    }
    false
}
