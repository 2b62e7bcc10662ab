//! Per-photo view orchestration.
//!
//! A [`PhotoView`] owns the loading lifecycle for one photo: it kicks off
//! resolution on a worker thread, lets the host poll for the outcome from its
//! UI thread, and answers the gesture questions (what a double-tap does, when
//! a long-press action fires). It renders nothing itself; the host draws the
//! [`RenderedImage`] and runs the zoom animation.
//!
//! | Concern           | Where it lives                                   |
//! |-------------------|--------------------------------------------------|
//! | Image resolution  | background thread calling [`Resolver::resolve`]  |
//! | State transitions | [`LoadState`]: `Loading` → `Ready` or `Failed`   |
//! | Double-tap zoom   | [`PhotoView::double_tap`] via [`crate::zoom`]    |
//! | Long press        | [`PhotoView::long_press`], fires on `Began` only |

use crate::gesture::GesturePhase;
use crate::photo::Photo;
use crate::resolve::{RenderedImage, ResolveError, Resolver};
use crate::zoom::{self, Point, Rect, Size, ZoomBounds};
use log::debug;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Where a photo view is in its loading lifecycle.
///
/// `Loading` transitions exactly once, to `Ready` or `Failed`. A failed view
/// stays failed (loading indicator stopped, image area blank) until the host
/// calls [`PhotoView::retry`].
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(Arc<RenderedImage>),
    Failed(ResolveError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// The zoom the host should animate after a double-tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTarget {
    pub scale: f32,
    pub rect: Rect,
}

type LoadResult = Result<Arc<RenderedImage>, ResolveError>;

/// One photo's view model.
pub struct PhotoView {
    photo: Arc<Photo>,
    resolver: Arc<Resolver>,
    state: LoadState,
    /// Completion channel for the in-progress load, if any.
    pending: Option<Receiver<LoadResult>>,
    dismissed: bool,
    zoom_bounds: ZoomBounds,
    zoom_scale: f32,
    long_press_action: Option<Box<dyn Fn(&Photo) + Send>>,
}

impl PhotoView {
    pub fn new(photo: Arc<Photo>, resolver: Arc<Resolver>) -> Self {
        let zoom_bounds = ZoomBounds { min: 1.0, max: 3.0 };
        Self {
            photo,
            resolver,
            state: LoadState::Loading,
            pending: None,
            dismissed: false,
            zoom_bounds,
            zoom_scale: zoom_bounds.min,
            long_press_action: None,
        }
    }

    pub fn with_zoom_bounds(mut self, bounds: ZoomBounds) -> Self {
        self.zoom_bounds = bounds;
        self.zoom_scale = bounds.min;
        self
    }

    /// Register the action to run when a long press is confirmed.
    pub fn on_long_press(mut self, action: impl Fn(&Photo) + Send + 'static) -> Self {
        self.long_press_action = Some(Box::new(action));
        self
    }

    pub fn photo(&self) -> &Photo {
        &self.photo
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// The image to draw, once ready.
    pub fn image(&self) -> Option<&Arc<RenderedImage>> {
        match &self.state {
            LoadState::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Start loading. Called when the view comes on screen; calling it again
    /// while a load is pending or finished does nothing.
    pub fn present(&mut self) {
        if self.dismissed || self.pending.is_some() || !self.state.is_loading() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        self.pending = Some(rx);

        let photo = Arc::clone(&self.photo);
        let resolver = Arc::clone(&self.resolver);
        thread::spawn(move || {
            let result = resolver.resolve(&photo);
            // A send failure means the view was dismissed; the transfer (if
            // any) already finished and the bytes are cached for next time.
            if tx.send(result).is_err() {
                debug!("load completed after dismissal; result dropped");
            }
        });
    }

    /// Drain the completion channel. Hosts call this from their UI tick; the
    /// returned state is current as of this call.
    pub fn poll(&mut self) -> &LoadState {
        if let Some(rx) = &self.pending {
            match rx.try_recv() {
                Ok(Ok(image)) => {
                    self.state = LoadState::Ready(image);
                    self.pending = None;
                }
                Ok(Err(error)) => {
                    self.state = LoadState::Failed(error);
                    self.pending = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    // Worker died without reporting. Should not happen; treat
                    // as still loading so present() can be retried by retry().
                    self.pending = None;
                }
            }
        }
        &self.state
    }

    /// Stop caring about this view. Any in-progress load keeps running to
    /// completion (populating the byte cache) but its result is discarded.
    pub fn dismiss(&mut self) {
        self.dismissed = true;
        self.pending = None;
    }

    /// Restart a failed load. No-op unless the state is `Failed`.
    pub fn retry(&mut self) {
        if matches!(self.state, LoadState::Failed(_)) && !self.dismissed {
            self.state = LoadState::Loading;
            self.present();
        }
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// The host reports the scroll view's actual scale here (pinch zooms,
    /// animation settling) so the next double-tap toggles correctly.
    pub fn set_zoom_scale(&mut self, scale: f32) {
        self.zoom_scale = scale;
    }

    pub fn zoom_scale(&self) -> f32 {
        self.zoom_scale
    }

    /// Handle a double-tap at `tap` within `viewport`. Returns the target
    /// the host should animate to, or `None` while no image is displayed
    /// (zooming a spinner makes no sense).
    pub fn double_tap(&mut self, tap: Point, viewport: Size) -> Option<ZoomTarget> {
        if self.image().is_none() {
            return None;
        }
        let scale = zoom::double_tap_scale(self.zoom_scale, self.zoom_bounds);
        let rect = zoom::zoom_rect(tap, viewport, scale);
        self.zoom_scale = scale;
        Some(ZoomTarget { scale, rect })
    }

    /// Forward a long-press phase. The registered action runs exactly when
    /// the phase is [`GesturePhase::Began`]; every other phase is ignored.
    pub fn long_press(&self, phase: GesturePhase) {
        if phase == GesturePhase::Began {
            if let Some(action) = &self.long_press_action {
                action(&self.photo);
            }
        }
    }
}
