//! View state and screen/image coordinate conversion.
//!
//! Screen coordinates are canvas pixels; image coordinates are the units the
//! polygons are stored in. `screen = image * zoom + pan`.

use crate::constants::{MAX_ZOOM, MIN_ZOOM};
use crate::model::Point;

/// Convert a screen-space point to image space.
pub fn to_image(screen: Point, zoom: f64, pan: Point) -> Point {
    Point::new((screen.x - pan.x) / zoom, (screen.y - pan.y) / zoom)
}

/// Convert an image-space point to screen space.
pub fn to_screen(image: Point, zoom: f64, pan: Point) -> Point {
    Point::new(image.x * zoom + pan.x, image.y * zoom + pan.y)
}

/// Clamp a zoom factor into the supported range. Non-finite or non-positive
/// values become [`MIN_ZOOM`].
pub fn sanitize_zoom(zoom: f64) -> f64 {
    if !zoom.is_finite() || zoom <= 0.0 {
        log::warn!("Invalid zoom {} replaced with {}", zoom, MIN_ZOOM);
        return MIN_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Pan/zoom state of the canvas. Zoom is always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    zoom: f64,
    pan: Point,
}

impl ViewState {
    /// Create a view; the zoom is clamped into `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn new(zoom: f64, pan: Point) -> Self {
        Self {
            zoom: sanitize_zoom(zoom),
            pan,
        }
    }

    /// Create an identity view (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, Point::new(0.0, 0.0))
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn screen_to_image(&self, screen: Point) -> Point {
        to_image(screen, self.zoom, self.pan)
    }

    pub fn image_to_screen(&self, image: Point) -> Point {
        to_screen(image, self.zoom, self.pan)
    }

    /// Zoom while keeping the image point under `cursor` (screen space) fixed.
    pub fn zoom_to_cursor(&self, new_zoom: f64, cursor: Point) -> ViewState {
        let new_zoom = sanitize_zoom(new_zoom);
        let image = self.screen_to_image(cursor);

        ViewState {
            zoom: new_zoom,
            pan: Point::new(cursor.x - image.x * new_zoom, cursor.y - image.y * new_zoom),
        }
    }

    /// Apply a pan delta (screen pixels).
    pub fn pan_by(&self, dx: f64, dy: f64) -> ViewState {
        ViewState {
            zoom: self.zoom,
            pan: Point::new(self.pan.x + dx, self.pan.y + dy),
        }
    }

    /// Zoom in by a factor (e.g., 1.2 for 20% zoom in).
    pub fn zoom_in(&self, factor: f64, max_zoom: f64) -> ViewState {
        ViewState {
            zoom: sanitize_zoom((self.zoom * factor).min(max_zoom)),
            pan: self.pan,
        }
    }

    /// Zoom out by a factor (e.g., 1.2 for 20% zoom out).
    pub fn zoom_out(&self, factor: f64, min_zoom: f64) -> ViewState {
        ViewState {
            zoom: sanitize_zoom((self.zoom / factor).max(min_zoom)),
            pan: self.pan,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::identity()
    }
}
