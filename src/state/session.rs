/// The cropping session
///
/// Owns every asset and the slot cursor. Assets live in exactly one of two
/// lists: `pending` (sorted by slot) or `processed`. Committing a crop moves
/// an asset from the first to the second; navigating back moves it again.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::data::{CroppedImage, ImageAsset};
use super::reorder::{ClickOutcome, ReorderMode};
use crate::config::CropperConfig;
use crate::crop::resolver;
use crate::crop::{CropEditor, CropFrame, Rasterizer, SlotKind, Viewport, SLOT_COUNT};
use crate::error::{CropError, Result};
use crate::export::archive::{self, ArchiveEntry};
use crate::media::decode::DecodedImage;
use crate::media::import::UploadedFile;

/// Which screen the session is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Upload,
    Crop,
    Complete,
}

/// Decode work the caller must run for the newly active slot
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub slot: usize,
    pub asset_id: u64,
    pub name: String,
    pub bytes: Arc<Vec<u8>>,
}

/// Result of a successful commit
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// The asset as it now sits in the processed list
    pub asset: ImageAsset,
    /// Next slot to decode, `None` when the session is complete
    pub next: Option<LoadRequest>,
}

/// Slot currently being cropped
#[derive(Debug, Clone)]
pub struct ActiveSlot {
    pub slot: usize,
    pub asset_id: u64,
    /// `None` while the decode is in flight
    pub image: Option<DecodedImage>,
    /// `None` until both image and viewport are known
    pub editor: Option<CropEditor>,
}

pub struct Session {
    pending: Vec<ImageAsset>,
    processed: Vec<ImageAsset>,
    cursor: usize,
    phase: SessionPhase,
    active: Option<ActiveSlot>,
    viewport: Option<Viewport>,
    reorder: ReorderMode,
    rasterizer: Rasterizer,
    max_scale: f64,
    next_id: u64,
}

impl Session {
    pub fn new(config: &CropperConfig) -> Self {
        Self {
            pending: Vec::new(),
            processed: Vec::new(),
            cursor: 0,
            phase: SessionPhase::Upload,
            active: None,
            viewport: None,
            reorder: ReorderMode::new(
                Duration::from_secs(config.reorder_timeout_secs),
                Duration::from_millis(config.double_tap_ms),
            ),
            rasterizer: Rasterizer::new(config.supersample, config.thumbnail_size),
            max_scale: config.max_scale,
            next_id: 1,
        }
    }

    // ========== Accessors ==========

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn pending(&self) -> &[ImageAsset] {
        &self.pending
    }

    pub fn processed(&self) -> &[ImageAsset] {
        &self.processed
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn active(&self) -> Option<&ActiveSlot> {
        self.active.as_ref()
    }

    pub fn editor(&self) -> Option<&CropEditor> {
        self.active.as_ref()?.editor.as_ref()
    }

    /// Mutable editor for the gesture interpreter
    pub fn editor_mut(&mut self) -> Option<&mut CropEditor> {
        self.active.as_mut()?.editor.as_mut()
    }

    pub fn reorder(&self) -> &ReorderMode {
        &self.reorder
    }

    /// Open slots left for uploads
    pub fn remaining_uploads(&self) -> usize {
        SLOT_COUNT.saturating_sub(self.pending.len())
    }

    /// Assets across both lists
    pub fn total(&self) -> usize {
        self.pending.len() + self.processed.len()
    }

    // ========== Upload phase ==========

    /// Fail early if a batch of `count` files cannot be accepted
    pub fn check_capacity(&self, count: usize) -> Result<()> {
        if self.phase != SessionPhase::Upload {
            return Err(CropError::NotInUploadPhase);
        }
        if count > self.remaining_uploads() {
            return Err(CropError::TooManyFiles {
                offered: count,
                remaining: self.remaining_uploads(),
            });
        }
        Ok(())
    }

    /// Append uploads in order. All or nothing.
    pub fn add_uploads(&mut self, files: Vec<UploadedFile>) -> Result<usize> {
        self.check_capacity(files.len())?;

        let added = files.len();
        for file in files {
            let asset = ImageAsset {
                id: self.next_id,
                name: file.name,
                source: file.bytes,
                original_index: self.pending.len(),
                thumbnail: file.thumbnail.map(Arc::new),
                cropped: None,
            };
            self.next_id += 1;
            self.pending.push(asset);
        }

        info!(added, total = self.pending.len(), "images uploaded");
        Ok(added)
    }

    /// Delete a pending upload; later slots move up by one
    pub fn remove_upload(&mut self, asset_id: u64) -> Result<()> {
        if self.phase != SessionPhase::Upload {
            return Err(CropError::NotInUploadPhase);
        }
        if let Some(position) = self.pending.iter().position(|a| a.id == asset_id) {
            self.pending.remove(position);
            self.reorder.exit();
            for (index, asset) in self.pending.iter_mut().enumerate() {
                asset.original_index = index;
            }
        }
        Ok(())
    }

    /// Click on the pending thumbnail at list position `position`
    pub fn click_pending(&mut self, position: usize, now: Instant) -> ClickOutcome {
        if self.phase != SessionPhase::Upload || position >= self.pending.len() {
            return ClickOutcome::Ignored;
        }
        let outcome = self.reorder.click(position, now);
        if let ClickOutcome::Swap(a, b) = outcome {
            self.swap_pending(a, b);
        }
        outcome
    }

    /// Expire reorder mode; true if it just ended
    pub fn tick_reorder(&mut self, now: Instant) -> bool {
        self.reorder.tick(now)
    }

    /// Swap two pending assets together with the slots they are bound to
    pub fn swap_pending(&mut self, a: usize, b: usize) {
        if a == b || a >= self.pending.len() || b >= self.pending.len() {
            return;
        }
        self.pending.swap(a, b);
        let slot_a = self.pending[a].original_index;
        self.pending[a].original_index = self.pending[b].original_index;
        self.pending[b].original_index = slot_a;
    }

    // ========== Crop phase ==========

    /// Leave the upload phase and activate slot 0
    pub fn begin_cropping(&mut self) -> Result<Option<LoadRequest>> {
        if self.phase != SessionPhase::Upload {
            return Err(CropError::NotInUploadPhase);
        }
        if self.pending.len() != SLOT_COUNT {
            return Err(CropError::WrongUploadCount { have: self.pending.len() });
        }

        self.reorder.exit();
        self.phase = SessionPhase::Crop;
        Ok(self.load_slot(0))
    }

    /// Activate slot `index`, or the next slot that still has a pending asset.
    /// Completes the session when none is left.
    pub fn load_slot(&mut self, index: usize) -> Option<LoadRequest> {
        let found = self
            .pending
            .iter()
            .filter(|a| a.original_index >= index && a.original_index < SLOT_COUNT)
            .min_by_key(|a| a.original_index);

        match found {
            Some(asset) => {
                let request = LoadRequest {
                    slot: asset.original_index,
                    asset_id: asset.id,
                    name: asset.name.clone(),
                    bytes: Arc::clone(&asset.source),
                };
                self.cursor = request.slot;
                self.phase = SessionPhase::Crop;
                self.active = Some(ActiveSlot {
                    slot: request.slot,
                    asset_id: request.asset_id,
                    image: None,
                    editor: None,
                });
                Some(request)
            }
            None => {
                self.cursor = SLOT_COUNT;
                self.active = None;
                self.phase = SessionPhase::Complete;
                info!(processed = self.processed.len(), "all slots cropped");
                None
            }
        }
    }

    /// Decode finished for `slot`. Stale results are ignored.
    pub fn on_decoded(&mut self, slot: usize, asset_id: u64, decoded: DecodedImage) {
        let viewport = self.viewport;
        let max_scale = self.max_scale;
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.slot != slot || active.asset_id != asset_id {
            return;
        }

        active.editor = viewport
            .filter(Viewport::is_usable)
            .map(|v| CropEditor::new(CropFrame::compute(v, SlotKind::for_slot(slot)), decoded.dims, max_scale));
        active.image = Some(decoded);
    }

    /// Decode failed: drop the asset and move on to the next slot
    pub fn on_decode_failed(&mut self, slot: usize, asset_id: u64, reason: &str) -> Option<LoadRequest> {
        let matches = self
            .active
            .as_ref()
            .is_some_and(|a| a.slot == slot && a.asset_id == asset_id);
        if !matches {
            return None;
        }

        if let Some(position) = self.pending.iter().position(|a| a.id == asset_id) {
            let dropped = self.pending.remove(position);
            warn!(slot, name = %dropped.name, reason, "decode failed, slot skipped");
        }
        self.active = None;
        self.load_slot(slot + 1)
    }

    /// Canvas size changed: recompute the frame and reset the transform
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        let max_scale = self.max_scale;
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(image) = active.image.as_ref() else {
            return;
        };
        if !viewport.is_usable() {
            active.editor = None;
            return;
        }

        let frame = CropFrame::compute(viewport, SlotKind::for_slot(active.slot));
        match active.editor.as_mut() {
            Some(editor) => editor.set_frame(frame),
            None => active.editor = Some(CropEditor::new(frame, image.dims, max_scale)),
        }
    }

    /// Crop the active slot and advance.
    ///
    /// Without a decoded image this fails with `SourceMissing` and nothing
    /// changes. Without a frame/transform a centered crop is used instead.
    pub fn commit_crop(&mut self) -> Result<CommitOutcome> {
        if self.phase != SessionPhase::Crop {
            return Err(CropError::SourceMissing);
        }
        let active = self.active.as_ref().ok_or(CropError::SourceMissing)?;
        let image = active.image.as_ref().ok_or(CropError::SourceMissing)?;
        let position = self
            .pending
            .iter()
            .position(|a| a.id == active.asset_id)
            .ok_or(CropError::SourceMissing)?;

        let kind = SlotKind::for_slot(active.slot);
        let rect = match active.editor.as_ref() {
            Some(editor) => editor.source_rect(),
            None => {
                warn!(slot = active.slot, "no crop frame at commit, using centered crop");
                resolver::aspect_fit(kind.target(), image.dims)
            }
        };

        let rendered = self.rasterizer.render(&image.image, rect, kind.target())?;
        let slot = active.slot;

        let mut asset = self.pending.remove(position);
        asset.cropped = Some(CroppedImage {
            data: Arc::new(rendered.png),
            width: rendered.width,
            height: rendered.height,
            kind,
            preview: Arc::new(rendered.preview),
        });
        self.processed.push(asset.clone());
        info!(slot, name = %asset.name, "crop committed");

        self.active = None;
        let next = self.load_slot(slot + 1);
        Ok(CommitOutcome { asset, next })
    }

    /// Undo the most recent commit before the cursor and re-activate its slot
    pub fn previous_slot(&mut self) -> Option<LoadRequest> {
        if self.phase == SessionPhase::Upload {
            return None;
        }

        let position = self
            .processed
            .iter()
            .enumerate()
            .filter(|(_, a)| a.original_index < self.cursor)
            .max_by_key(|(_, a)| a.original_index)
            .map(|(i, _)| i)?;

        let mut asset = self.processed.remove(position);
        asset.clear_crop();
        let slot = asset.original_index;
        let insert_at = self
            .pending
            .iter()
            .position(|a| a.original_index > slot)
            .unwrap_or(self.pending.len());
        self.pending.insert(insert_at, asset);

        info!(slot, "back to previous slot");
        self.load_slot(slot)
    }

    // ========== Complete phase ==========

    /// Archive entries in slot order
    pub fn export_entries(&self) -> Result<Vec<ArchiveEntry>> {
        if self.phase != SessionPhase::Complete {
            return Err(CropError::SessionIncomplete);
        }

        let mut sorted: Vec<&ImageAsset> = self.processed.iter().collect();
        sorted.sort_by_key(|a| a.original_index);

        Ok(sorted
            .into_iter()
            .filter_map(|asset| {
                asset.cropped.as_ref().map(|cropped| ArchiveEntry {
                    name: archive::entry_name(asset.original_index),
                    data: Arc::clone(&cropped.data),
                })
            })
            .collect())
    }

    /// Back to an empty upload phase
    pub fn restart(&mut self) {
        self.pending.clear();
        self.processed.clear();
        self.cursor = 0;
        self.phase = SessionPhase::Upload;
        self.active = None;
        self.reorder.exit();
        info!("session restarted");
    }
}
