/// Presentation layer: canvas, thumbnail strips and labels

pub mod canvas;
pub mod strip;

use crate::crop::frame::COVER_SLOTS;
use crate::crop::{SlotKind, SLOT_COUNT};

/// Heading for the slot being cropped
pub fn slot_label(slot: usize) -> String {
    match slot {
        0 => "Cover (front)".to_string(),
        1 => "Cover (back)".to_string(),
        n => format!("Content {}/{}", n + 1 - COVER_SLOTS, SLOT_COUNT - COVER_SLOTS),
    }
}

/// Output size hint shown next to the heading
pub fn ratio_label(kind: SlotKind) -> String {
    let target = kind.target();
    format!("{}×{}", target.width, target.height)
}

/// "k/25" progress through the slots
pub fn progress_label(slot: usize) -> String {
    format!("{}/{}", (slot + 1).min(SLOT_COUNT), SLOT_COUNT)
}

/// Upload counter and what is still missing
pub fn upload_label(uploaded: usize) -> String {
    match SLOT_COUNT.saturating_sub(uploaded) {
        0 => format!("{uploaded}/{SLOT_COUNT} images, ready to crop"),
        missing => format!("{uploaded}/{SLOT_COUNT} images, {missing} more needed"),
    }
}

/// What is left after the active slot, split by output ratio
pub fn remaining_label(cursor: usize, pending_slots: impl IntoIterator<Item = usize>) -> String {
    let (mut covers, mut contents) = (0, 0);
    for slot in pending_slots.into_iter().filter(|&slot| slot != cursor) {
        match SlotKind::for_slot(slot) {
            SlotKind::Cover => covers += 1,
            SlotKind::Content => contents += 1,
        }
    }

    match SlotKind::for_slot(cursor) {
        SlotKind::Cover => format!(
            "{covers} more cover after this, then {contents} content images at {}",
            ratio_label(SlotKind::Content)
        ),
        SlotKind::Content => format!("{contents} remaining"),
    }
}

/// Append a standing notice to a status line
pub fn with_notice(status: String, notice: Option<&str>) -> String {
    match notice {
        Some(notice) => format!("{status} ({notice})"),
        None => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_labels() {
        assert_eq!(slot_label(0), "Cover (front)");
        assert_eq!(slot_label(1), "Cover (back)");
        assert_eq!(slot_label(2), "Content 1/23");
        assert_eq!(slot_label(24), "Content 23/23");
    }

    #[test]
    fn test_progress_and_ratio() {
        assert_eq!(progress_label(0), "1/25");
        assert_eq!(progress_label(24), "25/25");
        assert_eq!(ratio_label(SlotKind::Cover), "680×300");
        assert_eq!(ratio_label(SlotKind::Content), "420×300");
    }

    #[test]
    fn test_upload_label() {
        assert_eq!(upload_label(0), "0/25 images, 25 more needed");
        assert_eq!(upload_label(25), "25/25 images, ready to crop");
    }

    #[test]
    fn test_remaining_split_by_ratio() {
        assert_eq!(
            remaining_label(0, 0..SLOT_COUNT),
            "1 more cover after this, then 23 content images at 420×300"
        );
        assert_eq!(
            remaining_label(1, 1..SLOT_COUNT),
            "0 more cover after this, then 23 content images at 420×300"
        );
        assert_eq!(remaining_label(10, 10..SLOT_COUNT), "14 remaining");
        assert_eq!(remaining_label(24, [24]), "0 remaining");
    }

    #[test]
    fn test_notice_survives_status_change() {
        let notice = crate::export::archive::sanitize_name("a:b").unwrap().notice();
        let status = with_notice("Saved /tmp/a_b.zip".to_string(), notice);
        assert!(status.starts_with("Saved /tmp/a_b.zip"));
        assert!(status.contains("replaced with _"));
        assert_eq!(with_notice("Saved".to_string(), None), "Saved");
    }
}
