// src/fs/mock.rs

use super::{FileSystem, Metadata};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, modified: SystemTime },
    Dir { children: Vec<String>, modified: SystemTime }, // child names, insertion order
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Seconds since the epoch used as mtime for newly written entries.
    clock: u64,
    failing: HashSet<PathBuf>,
    copies: Vec<(PathBuf, PathBuf)>,
    created_dirs: Vec<PathBuf>,
}

/// In-memory filesystem.
///
/// Directory listings come back in insertion order, which lets tests build
/// trees whose traversal order is fully known up front.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

fn secs(s: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(s)
}

fn parent_key(path: &Path) -> Option<PathBuf> {
    let parent = path.parent()?;
    if parent.as_os_str().is_empty() {
        Some(PathBuf::from("."))
    } else {
        Some(parent.to_path_buf())
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState {
            clock: 1,
            ..MockState::default()
        };
        // Ensure root exists
        state.entries.insert(
            PathBuf::from("."),
            MockEntry::Dir {
                children: Vec::new(),
                modified: secs(0),
            },
        );

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panic while holding the lock only happens inside a failing test.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a file stamped with the current mock clock. Parents are created
    /// implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let clock = self.lock().clock;
        self.add_file_at(path, content, clock);
    }

    /// Add a file with an explicit mtime (seconds since the epoch).
    pub fn add_file_at(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>, mtime: u64) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.lock();
        let clock = state.clock;
        if let Some(parent) = parent_key(&path) {
            Self::ensure_dir_entry(&mut state, &parent, clock);
        }
        Self::insert_entry(
            &mut state,
            path,
            MockEntry::File {
                content: content.into(),
                modified: secs(mtime),
            },
        );
    }

    /// Add an (empty) directory and any missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        let clock = state.clock;
        Self::ensure_dir_entry(&mut state, path.as_ref(), clock);
    }

    /// Make every operation touching `path` fail.
    pub fn fail_on(&self, path: impl AsRef<Path>) {
        self.lock().failing.insert(path.as_ref().to_path_buf());
    }

    /// File content, if `path` is a file.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().entries.get(path.as_ref()) {
            Some(MockEntry::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    /// Every `copy_file` performed so far, as `(from, to)`.
    pub fn copies(&self) -> Vec<(PathBuf, PathBuf)> {
        self.lock().copies.clone()
    }

    /// Every directory created through `create_dir_all`, in order.
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.lock().created_dirs.clone()
    }

    fn insert_entry(state: &mut MockState, path: PathBuf, entry: MockEntry) {
        if let Some(parent) = parent_key(&path) {
            if let Some(MockEntry::Dir { children, .. }) = state.entries.get_mut(&parent) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if !children.iter().any(|c| c == name) {
                        children.push(name.to_string());
                    }
                }
            }
        }
        state.entries.insert(path, entry);
    }

    fn ensure_dir_entry(state: &mut MockState, path: &Path, clock: u64) {
        if state.entries.contains_key(path) {
            return;
        }
        if let Some(parent) = parent_key(path) {
            if parent != path {
                Self::ensure_dir_entry(state, &parent, clock);
            }
        }
        Self::insert_entry(
            state,
            path.to_path_buf(),
            MockEntry::Dir {
                children: Vec::new(),
                modified: secs(clock),
            },
        );
    }

    fn check(state: &MockState, path: &Path) -> Result<()> {
        if state.failing.contains(path) {
            return Err(anyhow!("injected failure for {:?}", path));
        }
        Ok(())
    }

    fn meta_of(entry: &MockEntry) -> Metadata {
        match entry {
            MockEntry::File { modified, .. } => Metadata {
                is_dir: false,
                modified: *modified,
            },
            MockEntry::Dir { modified, .. } => Metadata {
                is_dir: true,
                modified: *modified,
            },
        }
    }
}

impl FileSystem for MockFileSystem {
    fn metadata(&self, path: &Path) -> Result<Metadata> {
        self.try_metadata(path)?
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }

    fn try_metadata(&self, path: &Path) -> Result<Option<Metadata>> {
        let state = self.lock();
        Self::check(&state, path)?;
        Ok(state.entries.get(path).map(Self::meta_of))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.lock();
        Self::check(&state, path)?;
        match state.entries.get(path) {
            Some(MockEntry::Dir { children, .. }) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, path)?;
        if let Some(MockEntry::File { .. }) = state.entries.get(path) {
            return Err(anyhow!("File exists: {:?}", path));
        }
        let clock = state.clock;
        Self::ensure_dir_entry(&mut state, path, clock);
        state.created_dirs.push(path.to_path_buf());
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        let mut state = self.lock();
        Self::check(&state, from)?;
        Self::check(&state, to)?;

        let (content, modified) = match state.entries.get(from) {
            Some(MockEntry::File { content, modified }) => (content.clone(), *modified),
            Some(MockEntry::Dir { .. }) => return Err(anyhow!("Is a directory: {:?}", from)),
            None => return Err(anyhow!("File not found: {:?}", from)),
        };

        match parent_key(to).and_then(|p| state.entries.get(&p).cloned()) {
            Some(MockEntry::Dir { .. }) => {}
            _ => return Err(anyhow!("Parent directory missing for {:?}", to)),
        }

        let bytes = content.len() as u64;
        Self::insert_entry(&mut state, to.to_path_buf(), MockEntry::File { content, modified });
        state.copies.push((from.to_path_buf(), to.to_path_buf()));
        Ok(bytes)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        {
            let state = self.lock();
            Self::check(&state, path)?;
        }
        self.add_file(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }
}
