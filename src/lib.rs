//! # Lightbox
//!
//! The loading and gesture core of a photo viewer. Hosts hand it a list of
//! [`photo::Photo`]s (remote URLs or in-memory bitmaps) and get back, per
//! photo, a renderable image plus the answers to the viewer's gesture
//! questions: what a double-tap zooms to and when a long-press action fires.
//! Rendering itself stays in the host.
//!
//! # Architecture: Resolve, Then Orchestrate
//!
//! Image loading runs through one funnel:
//!
//! ```text
//! Photo → memory bitmap?            → render directly
//!       → byte cache hit?           → classify → decode → render
//!       → fetch → classify → decode → store raw bytes → render
//! ```
//!
//! The [`resolve::Resolver`] owns that funnel. Its collaborators — the byte
//! cache and the fetcher — are traits injected at construction, so tests run
//! against an in-memory cache and a mock fetcher while a host wires in the
//! disk cache and the HTTP client. On top of it, [`viewer::PhotoView`] runs
//! the per-photo lifecycle: resolution on a worker thread, a polled
//! `Loading → Ready | Failed` state machine, dismissal that discards late
//! completions, and retry.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`photo`] | The `Photo` value object: source, title, deletable flag, auth header |
//! | [`resolve`] | The resolution funnel: decoded-image map, in-flight dedup, cache, fetch |
//! | [`resolve::cache`] | Byte cache trait with in-memory and on-disk implementations |
//! | [`resolve::fetcher`] | Network seam: fetch trait plus the blocking HTTP client |
//! | [`resolve::format`] | Signature sniffing: animated vs static |
//! | [`resolve::decode`] | Bytes → static bitmap or decoded frame sequence |
//! | [`zoom`] | Pure double-tap zoom math: target scale and target rect |
//! | [`gesture`] | Long-press recognition from raw touch events |
//! | [`viewer`] | Per-photo orchestration: load lifecycle, zoom state, gesture wiring |
//!
//! # Design Decisions
//!
//! ## Bytes in the Cache, Frames in Memory
//!
//! The persistent cache stores the raw encoded payload, never decoded pixels.
//! Animated formats make this non-negotiable: re-encoding a GIF on every
//! cache write would be slow and lossy, and the frame renderer wants the
//! original container anyway. Decoded results live only in the resolver's
//! in-memory map.
//!
//! ## Format Dispatch by Signature
//!
//! Whether a payload is animated is decided from container signatures alone
//! ([`resolve::format`]), before any pixel decoding. A single-frame GIF
//! therefore goes down the animated path; it renders identically and keeps
//! the dispatch rule trivial.
//!
//! ## One Fetch per URL
//!
//! A gallery page can ask for the same URL many times at once (full image and
//! thumbnail, or two views of one photo). The resolver's in-flight registry
//! collapses those into a single fetch whose result — success or failure — is
//! fanned out to every waiter. Failures are fanned out but never memoized, so
//! a retry always hits the network again.
//!
//! ## Blocking Core, Polling Edge
//!
//! The resolver is synchronous and thread-safe; [`viewer::PhotoView`] runs it
//! on a plain worker thread and the host polls for completion from its UI
//! tick. No async runtime, no callback re-entrancy, and dismissal reduces to
//! dropping a channel receiver.

pub mod gesture;
pub mod photo;
pub mod resolve;
pub mod viewer;
pub mod zoom;

#[cfg(test)]
pub(crate) mod test_helpers;
