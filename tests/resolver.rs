//! End-to-end resolution through the public API: a real on-disk cache, a
//! scripted fetcher behind the network seam, and the per-photo view on top.

use image::codecs::gif::GifEncoder;
use image::{DynamicImage, Frame, ImageFormat, Rgba, RgbaImage};
use lightbox::photo::Photo;
use lightbox::resolve::{
    DiskCache, FetchError, FetchRequest, ImageCache, ImageClass, ImageFetcher, Resolver,
};
use lightbox::viewer::{LoadState, PhotoView};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const GIF_URL: &str = "https://photos.example/loop.gif";
const PNG_URL: &str = "https://photos.example/still.png";

/// Serves canned bytes and counts calls; unknown URLs fail as transport
/// errors, so a test that should never fetch fails loudly if it does.
struct ScriptedFetcher {
    responses: Vec<(String, Vec<u8>)>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(responses: &[(&str, Vec<u8>)]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(url, bytes)| (url.to_string(), bytes.clone()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn offline() -> Self {
        Self::new(&[])
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageFetcher for ScriptedFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .iter()
            .find(|(url, _)| url == request.url.as_str())
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| FetchError::Transport(format!("offline: {}", request.url)))
    }
}

fn gif_payload() -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        for color in [[255, 0, 0, 255], [0, 0, 255, 255]] {
            let frame = RgbaImage::from_pixel(2, 2, Rgba(color));
            encoder.encode_frame(Frame::new(frame)).unwrap();
        }
    }
    bytes
}

fn png_payload() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::new_rgb8(3, 3)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn settle(view: &mut PhotoView) -> LoadState {
    let deadline = Instant::now() + Duration::from_secs(5);
    while view.poll().is_loading() {
        assert!(Instant::now() < deadline, "load never settled");
        std::thread::sleep(Duration::from_millis(2));
    }
    view.state().clone()
}

#[test]
fn first_resolution_fetches_and_populates_the_disk_cache() {
    let tmp = TempDir::new().unwrap();
    let cache = Arc::new(DiskCache::open(tmp.path()));
    let fetcher = Arc::new(ScriptedFetcher::new(&[(GIF_URL, gif_payload())]));
    let resolver = Resolver::new(Arc::clone(&cache) as _, Arc::clone(&fetcher) as _);

    let photo = Photo::from_url(GIF_URL).unwrap();
    let rendered = resolver.resolve(&photo).unwrap();

    assert_eq!(rendered.class(), ImageClass::Animated);
    assert_eq!(rendered.dimensions(), (2, 2));
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(cache.lookup(GIF_URL).unwrap(), Some(gif_payload()));
}

#[test]
fn cached_bytes_survive_a_restart_and_resolve_offline() {
    let tmp = TempDir::new().unwrap();

    // First run: online, populates the cache.
    {
        let cache = Arc::new(DiskCache::open(tmp.path()));
        let fetcher = Arc::new(ScriptedFetcher::new(&[(GIF_URL, gif_payload())]));
        let resolver = Resolver::new(cache as _, fetcher as _);
        resolver
            .resolve(&Photo::from_url(GIF_URL).unwrap())
            .unwrap();
    }

    // Second run: offline, same cache directory. Still resolves, and the
    // animated classification is reproduced from the raw cached bytes.
    let cache = Arc::new(DiskCache::open(tmp.path()));
    let fetcher = Arc::new(ScriptedFetcher::offline());
    let resolver = Resolver::new(cache as _, Arc::clone(&fetcher) as _);

    let rendered = resolver
        .resolve(&Photo::from_url(GIF_URL).unwrap())
        .unwrap();
    assert_eq!(rendered.class(), ImageClass::Animated);
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn distinct_urls_cache_independently() {
    let tmp = TempDir::new().unwrap();
    let cache = Arc::new(DiskCache::open(tmp.path()));
    let fetcher = Arc::new(ScriptedFetcher::new(&[
        (GIF_URL, gif_payload()),
        (PNG_URL, png_payload()),
    ]));
    let resolver = Resolver::new(Arc::clone(&cache) as _, Arc::clone(&fetcher) as _);

    let gif = resolver.resolve(&Photo::from_url(GIF_URL).unwrap()).unwrap();
    let png = resolver.resolve(&Photo::from_url(PNG_URL).unwrap()).unwrap();

    assert_eq!(gif.class(), ImageClass::Animated);
    assert_eq!(png.class(), ImageClass::Static);
    assert_eq!(png.dimensions(), (3, 3));
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn photo_view_loads_through_the_disk_cache() {
    let tmp = TempDir::new().unwrap();
    let cache = Arc::new(DiskCache::open(tmp.path()));
    let fetcher = Arc::new(ScriptedFetcher::new(&[(PNG_URL, png_payload())]));
    let resolver = Arc::new(Resolver::new(cache as _, Arc::clone(&fetcher) as _));

    let photo = Arc::new(Photo::from_url(PNG_URL).unwrap());
    let mut view = PhotoView::new(Arc::clone(&photo), Arc::clone(&resolver));
    view.present();
    match settle(&mut view) {
        LoadState::Ready(image) => assert_eq!(image.class(), ImageClass::Static),
        other => panic!("expected Ready, got {other:?}"),
    }

    // A second view of the same photo never reaches the fetcher.
    let mut second = PhotoView::new(photo, resolver);
    second.present();
    assert!(matches!(settle(&mut second), LoadState::Ready(_)));
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn offline_view_fails_then_recovers_on_retry() {
    // The fetcher comes back online between attempts; the cache directory
    // stays the same throughout.
    struct FlakyFetcher {
        inner: ScriptedFetcher,
        fail_first: AtomicUsize,
    }
    impl ImageFetcher for FlakyFetcher {
        fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<u8>, FetchError> {
            if self.fail_first.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            }).is_ok()
            {
                return Err(FetchError::Status(503));
            }
            self.inner.fetch(request)
        }
    }

    let tmp = TempDir::new().unwrap();
    let cache = Arc::new(DiskCache::open(tmp.path()));
    let fetcher = Arc::new(FlakyFetcher {
        inner: ScriptedFetcher::new(&[(PNG_URL, png_payload())]),
        fail_first: AtomicUsize::new(1),
    });
    let resolver = Arc::new(Resolver::new(cache as _, fetcher as _));

    let photo = Arc::new(Photo::from_url(PNG_URL).unwrap());
    let mut view = PhotoView::new(photo, resolver);
    view.present();
    assert!(matches!(settle(&mut view), LoadState::Failed(_)));

    view.retry();
    assert!(matches!(settle(&mut view), LoadState::Ready(_)));
}
