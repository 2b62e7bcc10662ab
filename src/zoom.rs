//! Pure double-tap zoom math.
//!
//! All functions here are pure and testable without a scroll view. The host
//! owns the actual zoom animation; this module only decides the target scale
//! and the target rectangle.

/// How close to maximum zoom still counts as "at maximum" when deciding the
/// double-tap direction. Absorbs floating-point drift from the host's zoom
/// animation settling slightly below its target.
pub const ZOOM_SNAP_TOLERANCE: f32 = 0.01;

/// Zoom scale limits, from the host's scroll view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min: f32,
    pub max: f32,
}

/// A point in the zoomed content's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Viewport dimensions in the host's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// The rectangle the host should zoom to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// The scale a double-tap toggles to.
///
/// Zooms out to `min` iff the current scale is at (or within
/// [`ZOOM_SNAP_TOLERANCE`] of) `max`; otherwise zooms in to `max`.
///
/// # Examples
/// ```
/// # use lightbox::zoom::{double_tap_scale, ZoomBounds};
/// let bounds = ZoomBounds { min: 1.0, max: 3.0 };
/// assert_eq!(double_tap_scale(1.0, bounds), 3.0);   // zoomed out → in
/// assert_eq!(double_tap_scale(3.0, bounds), 1.0);   // at max → out
/// assert_eq!(double_tap_scale(2.995, bounds), 1.0); // within tolerance → out
/// ```
pub fn double_tap_scale(current: f32, bounds: ZoomBounds) -> f32 {
    if current >= bounds.max || (bounds.max - current).abs() <= ZOOM_SNAP_TOLERANCE {
        bounds.min
    } else {
        bounds.max
    }
}

/// The rectangle to zoom to so that `tap` ends up centered in the viewport at
/// `scale`. Width and height are the viewport divided by the target scale;
/// the origin is offset so the tap point is the rectangle's center.
///
/// The rect may extend past the content edges — hosts clamp during the zoom
/// animation, exactly as platform scroll views do.
pub fn zoom_rect(tap: Point, viewport: Size, scale: f32) -> Rect {
    let width = viewport.width / scale;
    let height = viewport.height / scale;
    Rect {
        x: tap.x - width / 2.0,
        y: tap.y - height / 2.0,
        width,
        height,
    }
}
