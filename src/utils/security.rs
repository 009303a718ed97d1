use crate::error::ServerError;
use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// The served directory. Absolute, lexically clean, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPath(PathBuf);

impl RootPath {
    /// Wraps an already absolute path without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(clean(&path.into()))
    }

    /// Resolves `dir` against the working directory and canonicalizes it.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let canonical = dir
            .canonicalize()
            .with_context(|| format!("Cannot resolve shared directory {:?}", dir))?;
        if !canonical.is_dir() {
            anyhow::bail!("Shared path {:?} is not a directory", canonical);
        }
        Ok(Self(canonical))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins user supplied segments below the root the way a plain string
    /// concatenation would: absolute segments and drive prefixes do not
    /// replace the root, `.` and `..` are resolved lexically.
    pub fn join_user_path<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = self.0.clone();
        for segment in segments {
            for component in Path::new(segment.as_ref()).components() {
                match component {
                    Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
                    Component::ParentDir => joined.push(".."),
                    Component::Normal(part) => joined.push(part),
                }
            }
        }
        clean(&joined)
    }

    pub fn is_valid(&self, candidate: &Path) -> bool {
        is_path_valid(&self.0, candidate)
    }

    /// Joins the segments and runs the result through the sandbox.
    pub fn resolve<I, S>(&self, segments: I) -> Result<PathBuf, ServerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidate = self.join_user_path(segments);
        if !self.is_valid(&candidate) {
            tracing::warn!("SECURITY: path traversal attempt blocked: {:?}", candidate);
            return Err(ServerError::PathTraversal(candidate));
        }
        Ok(candidate)
    }

    /// Forward-slash form of `path` relative to the root, `"."` for the root
    /// itself. `None` when `path` does not live at or below the root.
    pub fn to_relative(&self, path: &Path) -> Option<String> {
        let cleaned = clean(path);
        let rel = cleaned.strip_prefix(&self.0).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            Some(".".to_string())
        } else {
            Some(parts.join("/"))
        }
    }
}

/// Sandbox gate: `true` when `candidate` (an already joined path) lies at or
/// below `root`. The literal `"."` always passes.
pub fn is_path_valid(root: &Path, candidate: &Path) -> bool {
    if candidate == Path::new(".") {
        return true;
    }

    match relative_to(root, candidate) {
        Some(rel) => !matches!(rel.components().next(), Some(Component::ParentDir)),
        None => false,
    }
}

/// Lexical relative path from `base` to `target`. `None` when no relative
/// form exists (absolute vs relative, different drive prefixes, or a base
/// that still climbs with `..` past the shared prefix).
pub fn relative_to(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = clean(base);
    let target = clean(target);
    if base.is_absolute() != target.is_absolute() {
        return None;
    }

    let base_parts: Vec<Component> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let target_parts: Vec<Component> = target
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if let (Some(a), Some(b)) = (base_parts.first(), target_parts.first()) {
        let a_prefix = matches!(a, Component::Prefix(_));
        let b_prefix = matches!(b, Component::Prefix(_));
        if (a_prefix || b_prefix) && a != b {
            return None;
        }
    }

    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    if base_parts[common..]
        .iter()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Some(rel)
}

/// Lexical normalization: drops `.`, folds `name/..`, never climbs above a root.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}
