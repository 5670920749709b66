//! Single-slot, last-write-wins progress channel
//!
//! A writer overwrites the slot; a reader polls it and only sees the latest
//! content. Snapshots published between two polls are lost, which is fine
//! for progress display.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, trace, warn};

use crate::{ChannelError, ChannelMessage};

/// Storage for the latest channel message
pub trait Slot: Send + Sync {
    /// Overwrite the slot
    fn store(&self, msg: &ChannelMessage) -> Result<(), ChannelError>;

    /// Read the slot without blocking; `None` if nothing was published
    fn load(&self) -> Result<Option<ChannelMessage>, ChannelError>;

    /// Empty the slot
    fn clear(&self) -> Result<(), ChannelError>;
}

/// File-backed slot shared between processes
///
/// Writes go to a sibling temp file that is renamed over the slot, so a
/// concurrent reader sees either the old record or the new one.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!("FileSlot::new: path={}", path.display());
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl Slot for FileSlot {
    fn store(&self, msg: &ChannelMessage) -> Result<(), ChannelError> {
        let json = msg.to_json()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(json.as_bytes())?;
            file.flush()?;
        }
        fs::rename(&temp, &self.path)?;
        trace!("FileSlot::store: wrote {} bytes to {}", json.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<ChannelMessage>, ChannelError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        ChannelMessage::from_json(&content).map(Some)
    }

    fn clear(&self) -> Result<(), ChannelError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("FileSlot::clear: removed {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process slot guarded by a mutex; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    inner: Arc<Mutex<Option<ChannelMessage>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Slot for MemorySlot {
    fn store(&self, msg: &ChannelMessage) -> Result<(), ChannelError> {
        let mut guard = self.inner.lock().map_err(|_| ChannelError::Poisoned)?;
        *guard = Some(msg.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<ChannelMessage>, ChannelError> {
        let guard = self.inner.lock().map_err(|_| ChannelError::Poisoned)?;
        Ok(guard.clone())
    }

    fn clear(&self) -> Result<(), ChannelError> {
        let mut guard = self.inner.lock().map_err(|_| ChannelError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

impl<S: Slot + ?Sized> Slot for Arc<S> {
    fn store(&self, msg: &ChannelMessage) -> Result<(), ChannelError> {
        (**self).store(msg)
    }

    fn load(&self) -> Result<Option<ChannelMessage>, ChannelError> {
        (**self).load()
    }

    fn clear(&self) -> Result<(), ChannelError> {
        (**self).clear()
    }
}

/// Result of a single poll
#[derive(Debug, Clone, PartialEq)]
pub enum Poll {
    /// Slot is empty, unreadable, or equal to the last observed content
    Unchanged,
    /// New content since the last poll
    Changed(ChannelMessage),
}

/// Reader side of the channel with change detection
pub struct Poller<S: Slot> {
    slot: S,
    last: Option<ChannelMessage>,
}

impl<S: Slot> Poller<S> {
    pub fn new(slot: S) -> Self {
        Self { slot, last: None }
    }

    /// Absorb a sentinel left behind by a previous run
    ///
    /// Returns true if a stale exit was found.
    pub fn prime(&mut self) -> Result<bool, ChannelError> {
        match self.slot.load() {
            Ok(Some(msg)) if msg.is_exit() => {
                debug!("Poller::prime: ignoring stale exit sentinel");
                self.last = Some(msg);
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(ChannelError::Decode(e)) => {
                warn!("Poller::prime: slot content unreadable: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Non-blocking read of the slot
    pub fn poll(&mut self) -> Result<Poll, ChannelError> {
        let msg = match self.slot.load() {
            Ok(Some(msg)) => msg,
            Ok(None) => {
                // an emptied slot forgets the last message so a repeat of it counts as new
                self.last = None;
                return Ok(Poll::Unchanged);
            }
            Err(ChannelError::Decode(e)) => {
                debug!("Poller::poll: skipping undecodable slot content: {}", e);
                return Ok(Poll::Unchanged);
            }
            Err(e) => return Err(e),
        };

        if self.last.as_ref() == Some(&msg) {
            return Ok(Poll::Unchanged);
        }
        self.last = Some(msg.clone());
        Ok(Poll::Changed(msg))
    }

    pub fn last(&self) -> Option<&ChannelMessage> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProgressSnapshot;
    use tempfile::TempDir;

    fn snap(current: f64, desc: &str) -> ChannelMessage {
        ProgressSnapshot::from_progress(current, 10, desc).into()
    }

    #[test]
    fn test_file_slot_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let slot = FileSlot::new(temp.path().join("progress.json"));
        assert_eq!(slot.load().unwrap(), None);
    }

    #[test]
    fn test_file_slot_last_write_wins() {
        let temp = TempDir::new().unwrap();
        let slot = FileSlot::new(temp.path().join("nested").join("progress.json"));

        slot.store(&snap(1.0, "first")).unwrap();
        slot.store(&snap(2.0, "second")).unwrap();

        let loaded = slot.load().unwrap().unwrap();
        assert_eq!(loaded.as_snapshot().unwrap().step_description, "second");
    }

    #[test]
    fn test_file_slot_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let slot = FileSlot::new(temp.path().join("progress.json"));
        slot.store(&snap(1.0, "a")).unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["progress.json".to_string()]);
    }

    #[test]
    fn test_file_slot_garbage_is_decode_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("progress.json");
        fs::write(&path, "{not json").unwrap();

        let err = FileSlot::new(&path).load().unwrap_err();
        assert!(matches!(err, ChannelError::Decode(_)));
    }

    #[test]
    fn test_file_slot_clear() {
        let temp = TempDir::new().unwrap();
        let slot = FileSlot::new(temp.path().join("progress.json"));
        slot.store(&ChannelMessage::exit()).unwrap();
        slot.clear().unwrap();
        assert_eq!(slot.load().unwrap(), None);
        // clearing twice is fine
        slot.clear().unwrap();
    }

    #[test]
    fn test_poller_reports_only_changes() {
        let slot = MemorySlot::new();
        let mut poller = Poller::new(slot.clone());

        assert_eq!(poller.poll().unwrap(), Poll::Unchanged);

        let first = snap(1.0, "one");
        slot.store(&first).unwrap();
        assert_eq!(poller.poll().unwrap(), Poll::Changed(first.clone()));
        assert_eq!(poller.poll().unwrap(), Poll::Unchanged);

        // identical content written again is not a change
        slot.store(&first).unwrap();
        assert_eq!(poller.poll().unwrap(), Poll::Unchanged);
    }

    #[test]
    fn test_poller_coalesces_to_latest() {
        let slot = MemorySlot::new();
        let mut poller = Poller::new(slot.clone());

        slot.store(&snap(1.0, "one")).unwrap();
        slot.store(&snap(2.0, "two")).unwrap();
        slot.store(&snap(3.0, "three")).unwrap();

        match poller.poll().unwrap() {
            Poll::Changed(msg) => assert_eq!(msg.as_snapshot().unwrap().step_description, "three"),
            Poll::Unchanged => panic!("expected a change"),
        }
    }

    #[test]
    fn test_exit_observed_after_snapshot() {
        let slot = MemorySlot::new();
        let mut poller = Poller::new(slot.clone());

        slot.store(&snap(10.0, "done")).unwrap();
        poller.poll().unwrap();
        slot.store(&ChannelMessage::exit()).unwrap();

        match poller.poll().unwrap() {
            Poll::Changed(msg) => assert!(msg.is_exit()),
            Poll::Unchanged => panic!("exit must be observed"),
        }
    }

    #[test]
    fn test_prime_absorbs_stale_exit() {
        let slot = MemorySlot::new();
        slot.store(&ChannelMessage::exit()).unwrap();

        let mut poller = Poller::new(slot.clone());
        assert!(poller.prime().unwrap());
        assert!(poller.last().is_some_and(ChannelMessage::is_exit));
        assert_eq!(poller.poll().unwrap(), Poll::Unchanged);

        // a fresh run publishes, then exits again
        slot.store(&snap(1.0, "new run")).unwrap();
        assert!(matches!(poller.poll().unwrap(), Poll::Changed(_)));
        slot.store(&ChannelMessage::exit()).unwrap();
        assert!(matches!(poller.poll().unwrap(), Poll::Changed(m) if m.is_exit()));
    }

    #[test]
    fn test_exit_after_clear_is_observed() {
        let slot = MemorySlot::new();
        slot.store(&ChannelMessage::exit()).unwrap();

        let mut poller = Poller::new(slot.clone());
        assert!(poller.prime().unwrap());

        slot.clear().unwrap();
        assert_eq!(poller.poll().unwrap(), Poll::Unchanged);
        assert!(poller.last().is_none());

        slot.store(&ChannelMessage::exit()).unwrap();
        assert!(matches!(poller.poll().unwrap(), Poll::Changed(m) if m.is_exit()));
    }

    #[test]
    fn test_poller_skips_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("progress.json");
        fs::write(&path, "[[[").unwrap();

        let mut poller = Poller::new(FileSlot::new(&path));
        assert_eq!(poller.poll().unwrap(), Poll::Unchanged);
    }
}
