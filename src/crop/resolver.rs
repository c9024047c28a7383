/// Map the on-screen transform back to the source pixels under the crop frame.

use tracing::warn;

use super::frame::{CropFrame, ImageDims, TargetSize};
use super::transform::Transform;

/// Rectangle in source image pixels (fractional)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Integer pixel region ready for sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Snap to whole pixels inside the image, never empty
    pub fn to_pixels(&self, dims: ImageDims) -> PixelRect {
        let (x, width) = snap_axis(self.x, self.right(), dims.width);
        let (y, height) = snap_axis(self.y, self.bottom(), dims.height);
        PixelRect { x, y, width, height }
    }
}

fn snap_axis(start: f64, end: f64, limit: u32) -> (u32, u32) {
    let limit = limit.max(1);
    let first = (start.round().max(0.0) as u32).min(limit - 1);
    let last = (end.round().max(0.0) as u32).min(limit);
    (first, last.saturating_sub(first).max(1))
}

/// Source rectangle for the current transform.
///
/// Clamps to the image bounds. If nothing usable is left the result is a
/// centered crop instead; cropping never fails once committed.
pub fn resolve(transform: &Transform, frame: &CropFrame, dims: ImageDims) -> SourceRect {
    let raw = SourceRect {
        x: (frame.left - transform.x) / transform.scale,
        y: (frame.top - transform.y) / transform.scale,
        width: frame.width / transform.scale,
        height: frame.height / transform.scale,
    };

    match clamp_to_image(raw, dims) {
        Some(rect) => rect,
        None => {
            warn!(?raw, ?dims, "crop rectangle left the image, using centered crop");
            centered(raw.width, raw.height, frame.target, dims)
        }
    }
}

/// Clamp origin to >= 0 and extent to the image edge. `None` when the
/// remaining area is empty or not a number.
pub fn clamp_to_image(raw: SourceRect, dims: ImageDims) -> Option<SourceRect> {
    let x = raw.x.max(0.0);
    let y = raw.y.max(0.0);
    let width = raw.width.min(dims.width as f64 - x);
    let height = raw.height.min(dims.height as f64 - y);

    let usable = [x, y, width, height].iter().all(|v| v.is_finite()) && width > 0.0 && height > 0.0;
    usable.then_some(SourceRect { x, y, width, height })
}

/// Crop of the requested size centered in the image, shrunk to fit.
///
/// When the requested size is unusable the largest centered rectangle with
/// the target aspect ratio is taken.
pub fn centered(width: f64, height: f64, target: TargetSize, dims: ImageDims) -> SourceRect {
    let image_w = dims.width.max(1) as f64;
    let image_h = dims.height.max(1) as f64;

    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return aspect_fit(target, dims);
    }

    let x = ((image_w - width) / 2.0).max(0.0);
    let y = ((image_h - height) / 2.0).max(0.0);
    SourceRect {
        x,
        y,
        width: width.min(image_w - x),
        height: height.min(image_h - y),
    }
}

/// Largest centered rectangle with the target aspect ratio
pub fn aspect_fit(target: TargetSize, dims: ImageDims) -> SourceRect {
    let image_w = dims.width.max(1) as f64;
    let image_h = dims.height.max(1) as f64;
    let aspect = target.aspect();

    let (width, height) = if image_w / image_h > aspect {
        // Wider than the target: height limits
        (image_h * aspect, image_h)
    } else {
        (image_w, image_w / aspect)
    };

    SourceRect {
        x: (image_w - width) / 2.0,
        y: (image_h - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::frame::{SlotKind, Viewport, COVER_TARGET};
    use crate::crop::transform::CropEditor;
    use cgmath::{Point2, Vector2};

    const EPS: f64 = 1e-6;

    fn assert_inside(rect: &SourceRect, dims: ImageDims) {
        assert!(rect.x >= 0.0 && rect.y >= 0.0, "{rect:?}");
        assert!(rect.width > 0.0 && rect.height > 0.0, "{rect:?}");
        assert!(rect.right() <= dims.width as f64 + EPS, "{rect:?}");
        assert!(rect.bottom() <= dims.height as f64 + EPS, "{rect:?}");
    }

    #[test]
    fn test_reset_state_maps_to_centered_cover_region() {
        let frame = CropFrame::compute(Viewport::new(1000.0, 700.0), SlotKind::Cover);
        let dims = ImageDims::new(3400, 3000);
        let editor = CropEditor::new(frame, dims, 5.0);

        let rect = editor.source_rect();

        // Width limits: the whole width is used, vertically centered.
        assert!((rect.x).abs() < EPS);
        assert!((rect.width - 3400.0).abs() < 1e-3);
        assert!((rect.height - 1500.0).abs() < 1e-3);
        assert!((rect.y - 750.0).abs() < 1e-3);
    }

    #[test]
    fn test_rect_tracks_pan_and_zoom() {
        let frame = CropFrame::compute(Viewport::new(1000.0, 700.0), SlotKind::Content);
        let dims = ImageDims::new(2800, 2000);
        let mut editor = CropEditor::new(frame, dims, 5.0);

        editor.zoom_at(Point2::new(frame.left, frame.top), 2.0);
        let zoomed = editor.source_rect();
        assert!((zoomed.width - 1400.0).abs() < 1e-3);
        assert!((zoomed.height - 1000.0).abs() < 1e-3);

        let scale = editor.transform().scale;
        editor.pan(Vector2::new(-100.0, -50.0));
        let panned = editor.source_rect();
        assert!((panned.x - (zoomed.x + 100.0 / scale)).abs() < 1e-3);
        assert!((panned.y - (zoomed.y + 50.0 / scale)).abs() < 1e-3);
    }

    #[test]
    fn test_rect_stays_inside_image_for_valid_transforms() {
        let shapes = [(4000, 3000), (300, 2000), (2000, 300), (640, 480), (37, 91)];
        for kind in [SlotKind::Cover, SlotKind::Content] {
            let frame = CropFrame::compute(Viewport::new(900.0, 640.0), kind);
            for &(w, h) in &shapes {
                let dims = ImageDims::new(w, h);
                let mut editor = CropEditor::new(frame, dims, 5.0);
                for step in 0..20 {
                    let f = step as f64;
                    editor.zoom_at(Point2::new(f * 40.0, 600.0 - f * 25.0), 1.0 + (f % 4.0) * 0.15);
                    editor.pan(Vector2::new((f - 10.0) * 97.0, (7.0 - f) * 61.0));
                    assert_inside(&editor.source_rect(), dims);
                }
            }
        }
    }

    #[test]
    fn test_out_of_bounds_transform_falls_back_to_centered() {
        let frame = CropFrame::compute(Viewport::new(1000.0, 700.0), SlotKind::Cover);
        let dims = ImageDims::new(2000, 1000);
        let transform = Transform {
            // Frame starts 3000 source pixels in, past the 2000px edge.
            x: frame.left - 1500.0,
            y: frame.top,
            scale: 0.5,
            min_scale: 0.5,
            max_scale: 5.0,
        };

        let rect = resolve(&transform, &frame, dims);

        assert_inside(&rect, dims);
        assert!((rect.x + rect.width / 2.0 - 1000.0).abs() < EPS);
        assert!((rect.y + rect.height / 2.0 - 500.0).abs() < EPS);
    }

    #[test]
    fn test_degenerate_scale_uses_aspect_fit() {
        let frame = CropFrame::compute(Viewport::new(1000.0, 700.0), SlotKind::Cover);
        let dims = ImageDims::new(1000, 1000);
        let transform = Transform {
            scale: 0.0,
            ..Transform::default()
        };

        let rect = resolve(&transform, &frame, dims);

        assert_inside(&rect, dims);
        assert!((rect.width / rect.height - COVER_TARGET.aspect()).abs() < EPS);
        assert!((rect.width - 1000.0).abs() < EPS);
    }

    #[test]
    fn test_clamp_trims_overhang() {
        let dims = ImageDims::new(100, 100);
        let rect = clamp_to_image(
            SourceRect { x: -10.0, y: 50.0, width: 80.0, height: 80.0 },
            dims,
        )
        .unwrap();
        assert_eq!(rect, SourceRect { x: 0.0, y: 50.0, width: 80.0, height: 50.0 });

        assert!(clamp_to_image(SourceRect { x: 120.0, y: 0.0, width: 10.0, height: 10.0 }, dims).is_none());
    }

    #[test]
    fn test_pixel_snapping_is_never_empty() {
        let dims = ImageDims::new(10, 10);
        let tiny = SourceRect { x: 9.8, y: 0.0, width: 0.1, height: 0.2 };
        let px = tiny.to_pixels(dims);
        assert!(px.width >= 1 && px.height >= 1);
        assert!(px.x + px.width <= 10 && px.y + px.height <= 10);

        let full = SourceRect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        assert_eq!(full.to_pixels(dims), PixelRect { x: 0, y: 0, width: 10, height: 10 });
    }
}
