//! File system storage for comment feeds

use ct_core::error::{CatchThreadError, Result};
use ct_core::feed::{
    CommentFeed, FeedFile, FeedInfo, FeedMigrator, FeedStorage, CURRENT_SCHEMA_VERSION,
};
use ct_core::types::CatchId;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const FEED_EXTENSION: &str = "json";

/// File system based feed storage
///
/// Each catch owns one file, `<root>/feeds/<catch_id>.json`, holding a
/// versioned [`FeedFile`]. The file name is the catch id, so a file whose
/// stored `catch_id` disagrees with its name is rejected.
pub struct FileSystemStorage {
    root: PathBuf,
    feeds_dir: PathBuf,
}

impl FileSystemStorage {
    /// Open (and create if needed) a feed store under `root`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let feeds_dir = root.join("feeds");

        fs::create_dir_all(&feeds_dir).map_err(|e| {
            CatchThreadError::from(e)
                .with_context(format!("Failed to create feed directory {:?}", feeds_dir))
        })?;
        debug!("Feed store ready at {:?}", feeds_dir);

        Ok(Self { root, feeds_dir })
    }

    /// Platform data directory, falling back to `~/.catch-thread`
    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("com", "catch-thread", "catch-thread")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".catch-thread")
            })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one file per feed
    pub fn feeds_dir(&self) -> &Path {
        &self.feeds_dir
    }

    fn feed_path(&self, id: &CatchId) -> PathBuf {
        self.feeds_dir.join(format!("{}.{}", id, FEED_EXTENSION))
    }

    fn temp_path(&self, id: &CatchId) -> PathBuf {
        self.feeds_dir.join(format!(".{}.{}.tmp", id, FEED_EXTENSION))
    }

    /// Catch id named by a feed file, `None` for temp files and strays
    fn catch_id_of(path: &Path) -> Option<CatchId> {
        if path.extension()? != FEED_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if stem.starts_with('.') {
            return None;
        }
        CatchId::from_string(stem).ok()
    }

    /// Read one feed file, upgrading older schema versions
    fn read_feed(&self, id: &CatchId, path: &Path) -> Result<CommentFeed> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CatchThreadError::FeedNotFound(id.to_string()),
            _ => CatchThreadError::from(e).with_context(format!("Failed to read {:?}", path)),
        })?;

        let mut file: FeedFile = serde_json::from_slice(&bytes)
            .map_err(|e| CatchThreadError::from(e).with_context(format!("Corrupt feed {:?}", path)))?;

        if FeedMigrator::needs_migration(&file) {
            info!(
                catch = %id,
                "Migrating feed from schema {} to {}",
                file.schema_version,
                CURRENT_SCHEMA_VERSION
            );
            file = FeedMigrator::migrate(file)?;
        }

        let feed = file.into_feed();
        if feed.catch_id != *id {
            return Err(CatchThreadError::Validation(format!(
                "Feed file {:?} holds catch {}, expected {}",
                path, feed.catch_id, id
            )));
        }
        Ok(feed)
    }

    /// Read every feed in the store, skipping files that fail to load
    fn scan(&self) -> Result<Vec<CommentFeed>> {
        let entries = fs::read_dir(&self.feeds_dir).map_err(|e| {
            CatchThreadError::from(e)
                .with_context(format!("Failed to read feed directory {:?}", self.feeds_dir))
        })?;

        let mut feeds = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            let Some(id) = Self::catch_id_of(&path) else {
                continue;
            };
            match self.read_feed(&id, &path) {
                Ok(feed) => feeds.push(feed),
                Err(e) => warn!(catch = %id, "Skipping feed file: {}", e),
            }
        }
        Ok(feeds)
    }
}

impl FeedStorage for FileSystemStorage {
    /// Serialize the whole file first, then swap it in with a rename
    fn save(&self, feed: &CommentFeed) -> Result<()> {
        let id = &feed.catch_id;
        let bytes = serde_json::to_vec_pretty(&FeedFile::new(feed.clone()))?;
        let temp = self.temp_path(id);
        let target = self.feed_path(id);

        fs::write(&temp, &bytes).map_err(|e| {
            CatchThreadError::from(e).with_context(format!("Failed to write {:?}", temp))
        })?;
        if let Err(e) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(CatchThreadError::from(e)
                .with_context(format!("Failed to store feed {}", id)));
        }

        debug!(
            catch = %id,
            comments = feed.len(),
            revision = feed.revision,
            "Stored feed at {:?}",
            target
        );
        Ok(())
    }

    fn load(&self, id: &CatchId) -> Result<CommentFeed> {
        self.read_feed(id, &self.feed_path(id))
    }

    fn list(&self) -> Result<Vec<FeedInfo>> {
        Ok(self.scan()?.iter().map(CommentFeed::info).collect())
    }

    fn delete(&self, id: &CatchId) -> Result<()> {
        let path = self.feed_path(id);
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CatchThreadError::FeedNotFound(id.to_string()),
            _ => CatchThreadError::from(e).with_context(format!("Failed to delete feed {}", id)),
        })?;

        debug!(catch = %id, "Deleted feed file {:?}", path);
        Ok(())
    }

    fn exists(&self, id: &CatchId) -> bool {
        self.feed_path(id).is_file()
    }

    /// One pass over the directory; the newest feed is already loaded
    fn latest(&self) -> Result<Option<CommentFeed>> {
        Ok(self.scan()?.into_iter().max_by_key(|f| f.updated_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ct_core::comment::CommentRecord;
    use ct_core::feed::{FeedEvent, FeedManager};
    use ct_core::types::CommentId;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_storage() -> (FileSystemStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(temp_dir.path()).unwrap();
        (storage, temp_dir)
    }

    fn catch(id: &str) -> CatchId {
        CatchId::from_string(id).unwrap()
    }

    fn rec(id: &str, parent: Option<&str>, secs: i64) -> CommentRecord {
        let mut record = CommentRecord::new(
            id,
            parent.map(CommentId::from),
            Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        );
        record.body = format!("body of {}", id);
        record
    }

    fn pike_feed(id: &str) -> CommentFeed {
        CommentFeed::from_records(
            catch(id),
            vec![rec("root", None, 1), rec("reply", Some("root"), 2)],
        )
    }

    #[test]
    fn test_new_creates_feed_dir() {
        let temp = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(temp.path().join("nested/store")).unwrap();

        assert!(storage.feeds_dir().is_dir());
        assert_eq!(storage.root(), temp.path().join("nested/store").as_path());
        assert!(storage
            .feed_path(&catch("pike-42"))
            .ends_with("feeds/pike-42.json"));
    }

    #[test]
    fn test_save_and_load() {
        let (storage, _temp) = create_test_storage();
        let feed = pike_feed("c1");

        storage.save(&feed).unwrap();
        assert!(storage.exists(&feed.catch_id));

        let mut loaded = storage.load(&feed.catch_id).unwrap();
        assert_eq!(loaded.records(), feed.records());
        assert_eq!(loaded.digest(), feed.digest());

        let roots = loaded.thread();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].children[0].id().as_str(), "reply");
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let (storage, _temp) = create_test_storage();
        let feed = pike_feed("c1");

        storage.save(&feed).unwrap();

        assert!(!storage.temp_path(&feed.catch_id).exists());
        let content = fs::read_to_string(storage.feed_path(&feed.catch_id)).unwrap();
        assert!(content.contains(&format!("\"schema_version\": \"{}\"", CURRENT_SCHEMA_VERSION)));
        assert!(content.contains("\"catch_id\": \"c1\""));
    }

    #[test]
    fn test_missing_feed_is_not_found() {
        let (storage, _temp) = create_test_storage();

        let result = storage.load(&catch("nope"));
        assert!(matches!(result, Err(CatchThreadError::FeedNotFound(id)) if id == "nope"));

        let result = storage.delete(&catch("nope"));
        assert!(matches!(result, Err(CatchThreadError::FeedNotFound(id)) if id == "nope"));
    }

    #[test]
    fn test_list_and_delete() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.list().unwrap().is_empty());

        storage.save(&pike_feed("a")).unwrap();
        storage.save(&pike_feed("b")).unwrap();

        let mut list = storage.list().unwrap();
        list.sort_by(|x, y| x.catch_id.cmp(&y.catch_id));
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].catch_id.as_str(), "a");
        assert_eq!(list[0].comment_count, 2);

        storage.delete(&catch("a")).unwrap();
        assert!(!storage.exists(&catch("a")));
        assert_eq!(storage.list().unwrap().len(), 1);
    }

    #[test]
    fn test_latest_feed() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.latest().unwrap().is_none());

        let first = pike_feed("first");
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = pike_feed("second");

        storage.save(&second).unwrap();
        storage.save(&first).unwrap();

        let latest = storage.latest().unwrap().unwrap();
        assert_eq!(latest.catch_id.as_str(), "second");
        assert_eq!(latest.len(), 2);
    }

    #[test]
    fn test_reads_newer_minor_version() {
        let (storage, _temp) = create_test_storage();
        let json = r#"{
            "schema_version": "1.2",
            "feed": {
                "catch_id": "old",
                "created_at": "2024-05-01T12:00:00Z",
                "updated_at": "2024-05-01T12:00:00Z",
                "records": []
            }
        }"#;
        fs::write(storage.feeds_dir().join("old.json"), json).unwrap();

        let feed = storage.load(&catch("old")).unwrap();
        assert!(feed.is_empty());
    }

    #[test]
    fn test_rejects_file_named_for_another_catch() {
        let (storage, _temp) = create_test_storage();
        storage.save(&pike_feed("pike-42")).unwrap();
        fs::copy(
            storage.feed_path(&catch("pike-42")),
            storage.feed_path(&catch("perch-7")),
        )
        .unwrap();

        let result = storage.load(&catch("perch-7"));
        assert!(matches!(result, Err(CatchThreadError::Validation(_))));

        let list = storage.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].catch_id.as_str(), "pike-42");
    }

    #[test]
    fn test_scan_skips_strays() {
        let (storage, _temp) = create_test_storage();
        storage.save(&pike_feed("good")).unwrap();

        fs::write(storage.feeds_dir().join("broken.json"), "not json").unwrap();
        fs::write(storage.feeds_dir().join(".good.json.tmp"), "{}").unwrap();
        fs::write(storage.feeds_dir().join("readme.txt"), "test").unwrap();

        let list = storage.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].catch_id.as_str(), "good");

        let err = storage.load(&catch("broken")).unwrap_err();
        assert!(err.to_string().starts_with("Corrupt feed"));
    }

    #[test]
    fn test_manager_over_file_storage() {
        let temp = TempDir::new().unwrap();
        let manager = FeedManager::new(FileSystemStorage::new(temp.path()).unwrap());

        manager.import(catch("c1"), vec![rec("a", None, 1)]).unwrap();
        manager
            .apply_all(
                &catch("c1"),
                vec![
                    FeedEvent::Insert {
                        record: rec("b", Some("a"), 2),
                    },
                    FeedEvent::Delete {
                        id: CommentId::from("a"),
                        at: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
                    },
                ],
            )
            .unwrap();

        let reopened = FeedManager::new(FileSystemStorage::new(temp.path()).unwrap());
        let mut feed = reopened.load(&catch("c1")).unwrap();
        assert_eq!(feed.revision, 2);
        assert!(feed.records()[0].is_deleted());
        assert_eq!(feed.thread()[0].children[0].id().as_str(), "b");
    }
}
