/// Archive packaging of the finished session
///
/// Entries are written in slot order with fixed names, into `<name>.zip`
/// inside the output directory. The file is written under a temporary name
/// first so a failed export never leaves a truncated archive behind.

use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::crop::frame::COVER_SLOTS;
use crate::error::{CropError, Result};

/// Characters that are not allowed in the archive file name
const ILLEGAL_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// One file inside the archive
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Arc<Vec<u8>>,
}

/// Archive name after replacing illegal characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    pub name: String,
    /// True when characters had to be replaced
    pub altered: bool,
}

impl ArchiveName {
    /// Message for the user when the typed name had to be changed
    pub fn notice(&self) -> Option<&'static str> {
        self.altered.then_some("Illegal characters in the name were replaced with _")
    }
}

/// File name for a slot's cropped image
pub fn entry_name(slot: usize) -> String {
    match slot {
        0 => "cover_front.png".to_string(),
        1 => "cover_back.png".to_string(),
        n => format!("content_{:02}.png", n + 1 - COVER_SLOTS),
    }
}

/// Suggested archive name for the name field
pub fn default_archive_name() -> String {
    Local::now().format("photos-%Y-%m-%d").to_string()
}

/// Trim and replace illegal characters with `_`
pub fn sanitize_name(input: &str) -> Result<ArchiveName> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CropError::EmptyArchiveName);
    }

    let name: String = trimmed
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect();

    Ok(ArchiveName {
        altered: name != trimmed,
        name,
    })
}

/// Write `<name>.zip` into `dir` and return its path
pub fn write_archive(dir: &Path, name: &ArchiveName, entries: &[ArchiveEntry]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(format!("{}.zip", name.name));
    let partial = dir.join(format!("{}.zip.part", name.name));

    if let Err(e) = write_entries(&partial, entries) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }
    fs::rename(&partial, &target)?;

    info!(path = %target.display(), entries = entries.len(), "archive written");
    Ok(target)
}

fn write_entries(path: &Path, entries: &[ArchiveEntry]) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut writer = ZipWriter::new(file);
    // PNG data is already compressed
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for entry in entries {
        writer
            .start_file(entry.name.as_str(), options)
            .map_err(|e| CropError::Archive(e.to_string()))?;
        writer.write_all(&entry.data)?;
    }

    let mut file = writer.finish().map_err(|e| CropError::Archive(e.to_string()))?;
    file.flush()?;
    Ok(())
}

/// `write_archive` on the blocking pool
pub async fn export_archive(dir: PathBuf, name: ArchiveName, entries: Vec<ArchiveEntry>) -> Result<PathBuf> {
    task::spawn_blocking(move || write_archive(&dir, &name, &entries))
        .await
        .map_err(|e| CropError::Archive(format!("task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_entry_names_are_unique_and_ordered() {
        let names: Vec<String> = (0..25).map(entry_name).collect();
        assert_eq!(names[0], "cover_front.png");
        assert_eq!(names[1], "cover_back.png");
        assert_eq!(names[2], "content_01.png");
        assert_eq!(names[24], "content_23.png");

        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), 25);
        let mut sorted = names[2..].to_vec();
        sorted.sort();
        assert_eq!(sorted, names[2..].to_vec());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(
            sanitize_name("  Alice 10/16  ").unwrap(),
            ArchiveName { name: "Alice 10_16".to_string(), altered: true }
        );
        assert_eq!(
            sanitize_name("bob-2026").unwrap(),
            ArchiveName { name: "bob-2026".to_string(), altered: false }
        );
        assert_eq!(sanitize_name(r#"a\b:c*d?e"f<g>h|"#).unwrap().name, "a_b_c_d_e_f_g_h_");
        assert!(matches!(sanitize_name("   "), Err(CropError::EmptyArchiveName)));
    }

    #[test]
    fn test_notice_only_when_altered() {
        assert!(sanitize_name("a/b").unwrap().notice().is_some());
        assert_eq!(sanitize_name("ab").unwrap().notice(), None);
    }

    #[test]
    fn test_write_archive_contents() {
        let dir = tempfile::tempdir().unwrap();
        let entries: Vec<ArchiveEntry> = (0..3)
            .map(|slot| ArchiveEntry {
                name: entry_name(slot),
                data: Arc::new(vec![slot as u8; 16]),
            })
            .collect();
        let name = sanitize_name("order").unwrap();

        let path = write_archive(dir.path(), &name, &entries).unwrap();

        assert_eq!(path, dir.path().join("order.zip"));
        assert!(!dir.path().join("order.zip.part").exists());

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);
        for slot in 0..3 {
            let mut file = archive.by_index(slot).unwrap();
            assert_eq!(file.name(), entry_name(slot));
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            assert_eq!(data, vec![slot as u8; 16]);
        }
    }

    #[test]
    fn test_default_name_has_date() {
        let name = default_archive_name();
        assert!(name.starts_with("photos-"));
        assert!(!sanitize_name(&name).unwrap().altered);
    }
}
