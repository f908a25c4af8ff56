//! File-backed page store
//!
//! One file per page at `<data_dir>/<title>.txt`, raw bytes. Concurrent
//! saves of the same title never interleave; the last write wins.
//!
//! Plain writes truncate in place and are serialized by a store-wide lock.
//! Atomic writes go to a per-save temp file that is renamed over the page,
//! so they need no lock.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::page::{Page, Title};
use crate::config::StorageConfig;
use crate::error::WikiError;
use crate::logger;

// Distinguishes temp files of saves running at the same time
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct PageStore {
    dir: PathBuf,
    file_mode: u32,
    atomic_writes: bool,
    write_lock: Arc<Mutex<()>>,
}

impl PageStore {
    /// Open the store, creating the data directory if needed
    pub fn open(config: &StorageConfig) -> io::Result<Self> {
        let dir = PathBuf::from(&config.data_dir);
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            file_mode: config.file_mode,
            atomic_writes: config.atomic_writes,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path_for(&self, title: &Title) -> PathBuf {
        self.dir.join(title.file_name())
    }

    /// Read a page. Any read failure counts as the page not existing.
    pub async fn load(&self, title: &Title) -> Result<Page, WikiError> {
        match fs::read(self.path_for(title)).await {
            Ok(body) => Ok(Page::new(title.clone(), body)),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    logger::log_warning(&format!("Failed to read page '{title}': {e}"));
                }
                Err(WikiError::NotFound(title.to_string()))
            }
        }
    }

    /// Overwrite the page file with `page.body`
    pub async fn save(&self, page: &Page) -> Result<(), WikiError> {
        let path = self.path_for(&page.title);

        if !self.atomic_writes {
            let _guard = self.write_lock.lock().await;
            write_file(&path, &page.body, self.file_mode, false).await?;
            return Ok(());
        }

        let tmp_path = self.temp_path_for(&page.title);
        let result = match write_file(&tmp_path, &page.body, self.file_mode, true).await {
            Ok(()) => fs::rename(&tmp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            // Only ever our own file: the name is unique to this save
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Hidden sibling of the page file, unique per save
    fn temp_path_for(&self, title: &Title) -> PathBuf {
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            ".{}.{}.{seq}.tmp",
            title.file_name(),
            std::process::id()
        ))
    }
}

/// Write `body` to `path`, creating the file with `mode`. With `create_new`
/// an existing file is an error instead of being truncated.
async fn write_file(path: &Path, body: &[u8], mode: u32, create_new: bool) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true);
    if create_new {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }
    #[cfg(unix)]
    options.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path).await?;
    file.write_all(body).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir, atomic_writes: bool) -> PageStore {
        PageStore::open(&StorageConfig {
            data_dir: dir.path().to_string_lossy().into_owned(),
            file_mode: 0o600,
            atomic_writes,
        })
        .unwrap()
    }

    fn title(raw: &str) -> Title {
        Title::parse(raw).unwrap()
    }

    fn file_names(dir: &TempDir) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);

        for (name, body) in [
            ("Test1", b"hello world".to_vec()),
            ("Empty", Vec::new()),
            ("Binary", vec![0, 159, 146, 150, 255]),
        ] {
            let page = Page::new(title(name), body.clone());
            store.save(&page).await.unwrap();
            let loaded = store.load(&title(name)).await.unwrap();
            assert_eq!(loaded.body, body);
            assert_eq!(loaded.title.as_str(), name);
        }
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);

        let err = store.load(&title("Nope")).await.unwrap_err();
        assert!(matches!(err, WikiError::NotFound(ref t) if t == "Nope"));
        assert!(file_names(&dir).is_empty());
    }

    #[tokio::test]
    async fn test_file_layout() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);

        store
            .save(&Page::new(title("Layout"), b"raw".to_vec()))
            .await
            .unwrap();
        let on_disk = std::fs::read(dir.path().join("Layout.txt")).unwrap();
        assert_eq!(on_disk, b"raw");
        assert_eq!(file_names(&dir), ["Layout.txt"]);
    }

    #[tokio::test]
    async fn test_overwrite_truncates() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);

        store
            .save(&Page::new(title("Shrink"), b"a much longer body".to_vec()))
            .await
            .unwrap();
        store
            .save(&Page::new(title("Shrink"), b"short".to_vec()))
            .await
            .unwrap();
        assert_eq!(store.load(&title("Shrink")).await.unwrap().body, b"short");
    }

    #[tokio::test]
    async fn test_atomic_writes_leave_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, true);

        store
            .save(&Page::new(title("Atomic"), b"v1".to_vec()))
            .await
            .unwrap();
        store
            .save(&Page::new(title("Atomic"), b"v2".to_vec()))
            .await
            .unwrap();

        assert_eq!(store.load(&title("Atomic")).await.unwrap().body, b"v2");
        assert_eq!(file_names(&dir), ["Atomic.txt"]);
    }

    #[test]
    fn test_atomic_temp_names_are_unique() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, true);

        let first = store.temp_path_for(&title("Same"));
        let second = store.temp_path_for(&title("Same"));
        assert_ne!(first, second);
        assert_eq!(first.parent(), Some(dir.path()));
        assert_ne!(first, store.path_for(&title("Same")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_saves_of_one_title() {
        const WRITERS: usize = 8;
        const ROUNDS: usize = 20;

        for atomic in [false, true] {
            let dir = TempDir::new().unwrap();
            let store = Arc::new(store_in(&dir, atomic));
            // Different lengths, so an interleaved write could not pass as any one body
            let bodies: Vec<Vec<u8>> = (0..WRITERS)
                .map(|i| vec![b'a' + i as u8; 512 * (WRITERS - i)])
                .collect();

            for _ in 0..ROUNDS {
                let handles: Vec<_> = bodies
                    .iter()
                    .cloned()
                    .map(|body| {
                        let store = Arc::clone(&store);
                        tokio::spawn(async move {
                            store.save(&Page::new(title("Busy"), body)).await
                        })
                    })
                    .collect();

                for handle in handles {
                    let result = handle.await.unwrap();
                    assert!(result.is_ok(), "atomic={atomic}: {result:?}");
                }

                let on_disk = store.load(&title("Busy")).await.unwrap().body;
                assert!(
                    bodies.contains(&on_disk),
                    "atomic={atomic}: torn page of {} bytes",
                    on_disk.len()
                );
                assert_eq!(file_names(&dir), ["Busy.txt"]);
            }
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_new_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        for atomic in [false, true] {
            let dir = TempDir::new().unwrap();
            let store = store_in(&dir, atomic);
            store
                .save(&Page::new(title("Secret"), b"x".to_vec()))
                .await
                .unwrap();
            let mode = std::fs::metadata(dir.path().join("Secret.txt"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_save_into_missing_dir_fails_with_io() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);
        std::fs::remove_dir_all(dir.path()).unwrap();

        let err = store
            .save(&Page::new(title("Gone"), b"x".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, WikiError::Io(_)));
    }

    #[test]
    fn test_open_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("pages").join("wiki");
        let store = PageStore::open(&StorageConfig {
            data_dir: nested.to_string_lossy().into_owned(),
            file_mode: 0o600,
            atomic_writes: false,
        })
        .unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.path_for(&title("Home")), nested.join("Home.txt"));
    }
}
