/// Slot geometry: which output size a slot uses and where its crop frame
/// sits on screen.

/// Number of slots in a session
pub const SLOT_COUNT: usize = 25;

/// Slots below this index are covers
pub const COVER_SLOTS: usize = 2;

/// Output size of a cover slot
pub const COVER_TARGET: TargetSize = TargetSize { width: 680, height: 300 };

/// Output size of a content slot
pub const CONTENT_TARGET: TargetSize = TargetSize { width: 420, height: 300 };

/// Share of the viewport width the frame takes for each kind
const COVER_WIDTH_SHARE: f64 = 0.85;
const CONTENT_WIDTH_SHARE: f64 = 0.70;

/// The frame never grows taller than this share of the viewport
const MAX_HEIGHT_SHARE: f64 = 0.80;

/// What a slot produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Cover,
    Content,
}

impl SlotKind {
    /// Kind bound to a slot index
    pub fn for_slot(slot: usize) -> Self {
        if slot < COVER_SLOTS {
            SlotKind::Cover
        } else {
            SlotKind::Content
        }
    }

    pub fn target(self) -> TargetSize {
        match self {
            SlotKind::Cover => COVER_TARGET,
            SlotKind::Content => CONTENT_TARGET,
        }
    }

    fn width_share(self) -> f64 {
        match self {
            SlotKind::Cover => COVER_WIDTH_SHARE,
            SlotKind::Content => CONTENT_WIDTH_SHARE,
        }
    }
}

/// Final output pixel dimensions (before supersampling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn aspect(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Raster size for the given supersample factor, `None` on overflow
    pub fn scaled(self, factor: u32) -> Option<(u32, u32)> {
        Some((self.width.checked_mul(factor)?, self.height.checked_mul(factor)?))
    }
}

/// Native pixel size of a decoded source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

impl ImageDims {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Size of the drawing surface the frame lives in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 1.0 && self.height >= 1.0
    }
}

/// On-screen rectangle the user crops against, plus the output size it maps to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropFrame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub target: TargetSize,
}

impl CropFrame {
    /// Lay out the frame for a slot kind inside the viewport.
    ///
    /// The frame keeps the target aspect ratio so the exported raster is not
    /// distorted, and is centered in the viewport.
    pub fn compute(viewport: Viewport, kind: SlotKind) -> Self {
        let target = kind.target();
        let aspect = target.aspect();

        let mut width = viewport.width * kind.width_share();
        let mut height = width / aspect;

        let max_height = viewport.height * MAX_HEIGHT_SHARE;
        if height > max_height {
            height = max_height;
            width = height * aspect;
        }

        Self {
            left: (viewport.width - width) / 2.0,
            top: (viewport.height - height) / 2.0,
            width,
            height,
            target,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_kinds() {
        assert_eq!(SlotKind::for_slot(0), SlotKind::Cover);
        assert_eq!(SlotKind::for_slot(1), SlotKind::Cover);
        assert_eq!(SlotKind::for_slot(2), SlotKind::Content);
        assert_eq!(SlotKind::for_slot(24), SlotKind::Content);
        assert_eq!(SlotKind::Cover.target().scaled(2), Some((1360, 600)));
        assert_eq!(SlotKind::Content.target().scaled(2), Some((840, 600)));
        assert_eq!(SlotKind::Cover.target().scaled(10_000_000), None);
    }

    #[test]
    fn test_frame_keeps_aspect_and_is_centered() {
        let viewport = Viewport::new(1000.0, 800.0);
        for kind in [SlotKind::Cover, SlotKind::Content] {
            let frame = CropFrame::compute(viewport, kind);
            assert!((frame.width / frame.height - kind.target().aspect()).abs() < 1e-9);
            assert!((frame.left - (1000.0 - frame.right())).abs() < 1e-9);
            assert!((frame.top - (800.0 - frame.bottom())).abs() < 1e-9);
        }

        let cover = CropFrame::compute(viewport, SlotKind::Cover);
        assert!((cover.width - 850.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_shrinks_in_short_viewport() {
        let frame = CropFrame::compute(Viewport::new(2000.0, 300.0), SlotKind::Content);
        assert!((frame.height - 240.0).abs() < 1e-9);
        assert!((frame.width - 336.0).abs() < 1e-9);
        assert!(frame.top >= 0.0 && frame.bottom() <= 300.0);
    }
}
