/// Crop engine
///
/// - Frame geometry per slot (frame.rs)
/// - Pan/zoom transform constrained to the frame (transform.rs)
/// - Transform → source rectangle mapping (resolver.rs)
/// - Final resampling and PNG encoding (raster.rs)

pub mod frame;
pub mod raster;
pub mod resolver;
pub mod transform;

pub use frame::{CropFrame, ImageDims, SlotKind, Viewport, SLOT_COUNT};
pub use raster::Rasterizer;
pub use transform::CropEditor;
