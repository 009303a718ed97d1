use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of filesystem change forwarded to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsEventKind {
    #[serde(rename = "create")]
    Created,
    #[serde(rename = "remove")]
    Removed,
    #[serde(rename = "rename")]
    Renamed,
}

impl FsEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FsEventKind::Created => "create",
            FsEventKind::Removed => "remove",
            FsEventKind::Renamed => "rename",
        }
    }
}

impl fmt::Display for FsEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filesystem change as reported by the watcher. `path` is absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub kind: FsEventKind,
    pub path: PathBuf,
}

impl FsEvent {
    pub fn new(kind: FsEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// JSON message pushed to websocket clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEventMessage {
    pub event_type: FsEventKind,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub modified: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub name: String,
    pub modified: String,
}

/// Everything the listing page needs for one directory.
#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    pub directory_name: String,
    pub is_not_top_most: bool,
    /// Forward-slash path relative to the root, `"."` for the root itself.
    pub directory_path: String,
    pub parent_dir: String,
    pub files: Vec<FileEntry>,
    pub directories: Vec<DirectoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_message_uses_lowercase_kind() {
        let msg = FileEventMessage {
            event_type: FsEventKind::Created,
            path: "docs/readme.txt".into(),
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"event_type":"create","path":"docs/readme.txt"}"#
        );
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(FsEventKind::Renamed.to_string(), "rename");
        assert_eq!(
            serde_json::to_value(FsEventKind::Removed).unwrap(),
            serde_json::json!("remove")
        );
    }
}
