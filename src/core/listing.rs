use crate::core::models::{DirectoryEntry, FileEntry, PageData};
use crate::error::ServerError;
use crate::utils::security::RootPath;
use bytesize::ByteSize;
use chrono::{DateTime, Local};
use std::time::SystemTime;

const MODIFIED_FORMAT: &str = "%a %d. %B %Y %H:%M";

/// Reads the directory `requested` (relative to the root, empty for the root
/// itself) into the data shown on the listing page.
pub async fn list_directory(
    root: &RootPath,
    display_name: &str,
    requested: &str,
) -> Result<PageData, ServerError> {
    let requested = if requested.is_empty() { "." } else { requested };
    let dir = root.resolve([requested])?;
    let directory_path = root.to_relative(&dir).unwrap_or_else(|| ".".to_string());

    let directory_name = if directory_path == "." {
        display_name.to_string()
    } else {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| display_name.to_string())
    };

    let mut read_dir = tokio::fs::read_dir(&dir)
        .await
        .map_err(|source| ServerError::DirectoryUnavailable {
            path: dir.clone(),
            source,
        })?;

    let mut entries = Vec::new();
    loop {
        match read_dir.next_entry().await {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("Stopped reading {:?}: {}", dir, e);
                break;
            }
        }
    }
    entries.sort_by_key(|e| e.file_name());

    let mut files = Vec::new();
    let mut directories = Vec::new();
    for entry in entries {
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let modified = meta.modified().map(format_modified).unwrap_or_default();

        if meta.is_dir() {
            directories.push(DirectoryEntry { name, modified });
        } else {
            files.push(FileEntry {
                name,
                modified,
                size: ByteSize::b(meta.len()).to_string_as(true),
            });
        }
    }

    Ok(PageData {
        directory_name,
        is_not_top_most: directory_path != ".",
        parent_dir: parent_of(&directory_path),
        directory_path,
        files,
        directories,
    })
}

/// Joins a forward-slash relative directory and an entry name.
pub fn child_path(directory_path: &str, name: &str) -> String {
    if directory_path == "." || directory_path.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", directory_path, name)
    }
}

fn parent_of(relative: &str) -> String {
    match relative.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => ".".to_string(),
    }
}

fn format_modified(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(MODIFIED_FORMAT).to_string()
}
