/// Pan/zoom transform of the source image inside the crop canvas.
///
/// `x`/`y` place the image's top-left corner in canvas pixels and `scale`
/// multiplies the native pixel size. After every mutation made through
/// [`CropEditor`] the image covers the whole crop frame.

use cgmath::{Point2, Vector2};

use super::frame::{CropFrame, ImageDims};
use super::resolver::{self, SourceRect};

/// Default zoom ceiling relative to native pixels
pub const DEFAULT_MAX_SCALE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SCALE)
    }
}

impl Transform {
    pub fn new(max_scale: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            min_scale: 1.0,
            max_scale,
        }
    }

    /// Smallest scale at which the image fills the frame on both axes
    pub fn cover_scale(frame: &CropFrame, dims: ImageDims) -> f64 {
        let scale_x = frame.width / dims.width.max(1) as f64;
        let scale_y = frame.height / dims.height.max(1) as f64;
        scale_x.max(scale_y)
    }

    /// Ceiling actually applied. A tiny source can need a cover scale above
    /// `max_scale`; the floor wins in that case.
    fn ceiling(&self) -> f64 {
        self.max_scale.max(self.min_scale)
    }

    /// Scaled image size on screen
    pub fn displayed_size(&self, dims: ImageDims) -> Vector2<f64> {
        Vector2::new(dims.width as f64 * self.scale, dims.height as f64 * self.scale)
    }

    /// Cover-fit the image to the frame and center it. Also resets the zoom floor.
    pub fn reset(&mut self, frame: &CropFrame, dims: ImageDims) {
        self.scale = Self::cover_scale(frame, dims);
        self.min_scale = self.scale;

        let size = self.displayed_size(dims);
        self.x = frame.left + (frame.width - size.x) / 2.0;
        self.y = frame.top + (frame.height - size.y) / 2.0;
    }

    pub fn pan(&mut self, delta: Vector2<f64>) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.x += delta.x;
            self.y += delta.y;
        }
    }

    /// Multiply the scale by `factor` (bounded), keeping `anchor` fixed on screen.
    ///
    /// Returns false when the factor is unusable and nothing changed.
    pub fn zoom_at(&mut self, anchor: Point2<f64>, factor: f64) -> bool {
        if !(factor.is_finite() && factor > 0.0) {
            return false;
        }

        let old_scale = self.scale;
        let new_scale = (old_scale * factor).max(self.min_scale).min(self.ceiling());
        let ratio = new_scale / old_scale;

        self.scale = new_scale;
        self.x = anchor.x - (anchor.x - self.x) * ratio;
        self.y = anchor.y - (anchor.y - self.y) * ratio;
        true
    }

    /// Keep the frame covered: center an axis the image cannot overflow,
    /// otherwise stop the image edge from receding past the frame edge.
    pub fn clamp(&mut self, frame: &CropFrame, dims: ImageDims) {
        let size = self.displayed_size(dims);
        self.x = clamp_axis(self.x, size.x, frame.left, frame.width);
        self.y = clamp_axis(self.y, size.y, frame.top, frame.height);
    }
}

fn clamp_axis(position: f64, extent: f64, frame_start: f64, frame_extent: f64) -> f64 {
    if extent <= frame_extent {
        return frame_start + (frame_extent - extent) / 2.0;
    }

    let frame_end = frame_start + frame_extent;
    if position > frame_start {
        frame_start
    } else if position + extent < frame_end {
        frame_end - extent
    } else {
        position
    }
}

/// Transform bound to the frame and image it is constrained by.
///
/// This is the unit the gesture interpreter mutates; every mutation is
/// followed by a clamp so no invalid state is ever drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct CropEditor {
    transform: Transform,
    frame: CropFrame,
    dims: ImageDims,
}

impl CropEditor {
    pub fn new(frame: CropFrame, dims: ImageDims, max_scale: f64) -> Self {
        let mut transform = Transform::new(max_scale);
        transform.reset(&frame, dims);
        Self { transform, frame, dims }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn frame(&self) -> &CropFrame {
        &self.frame
    }

    pub fn dims(&self) -> ImageDims {
        self.dims
    }

    pub fn pan(&mut self, delta: Vector2<f64>) {
        self.transform.pan(delta);
        self.transform.clamp(&self.frame, self.dims);
    }

    pub fn zoom_at(&mut self, anchor: Point2<f64>, factor: f64) {
        if self.transform.zoom_at(anchor, factor) {
            self.transform.clamp(&self.frame, self.dims);
        }
    }

    /// Back to the cover-fit centered state, dropping all pan and zoom
    pub fn reset(&mut self) {
        self.transform.reset(&self.frame, self.dims);
    }

    /// New frame (viewport change): recompute and reset
    pub fn set_frame(&mut self, frame: CropFrame) {
        self.frame = frame;
        self.reset();
    }

    /// Source pixels currently under the frame
    pub fn source_rect(&self) -> SourceRect {
        resolver::resolve(&self.transform, &self.frame, self.dims)
    }
}
