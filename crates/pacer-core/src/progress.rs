//! Per-book reading position, saved on every highlight change.
//!
//! Books are identified by file name and size, so the same file resumes
//! across sessions while a different edition with the same name gets its
//! own entry. Saving is best-effort and loading treats anything unreadable
//! as "no saved progress".

use crate::engine::Position;
use crate::store::{KeyValueStore, set_json};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const PROGRESS_KEY_PREFIX: &str = "pacer-progress:";

/// Stable identity of a book file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookIdentity {
    pub name: String,
    pub size: u64,
}

impl BookIdentity {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Identity of a file on disk, from its name and length.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let size = fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Self { name, size })
    }

    pub fn storage_key(&self) -> String {
        format!("{PROGRESS_KEY_PREFIX}{}:{}", self.name, self.size)
    }
}

impl fmt::Display for BookIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}

/// Persist `position` for `book`. Failures are logged and swallowed.
pub fn save(store: &dyn KeyValueStore, book: &BookIdentity, position: Position) {
    match set_json(store, &book.storage_key(), &position) {
        Ok(()) => debug!(
            book = %book,
            container = position.container_index,
            paragraph = position.paragraph_index,
            word = position.word_index,
            "Saved reading position"
        ),
        Err(err) => warn!(book = %book, "Failed to save reading position: {err}"),
    }
}

/// Saved position for `book`, if any readable one exists.
pub fn load(store: &dyn KeyValueStore, book: &BookIdentity) -> Option<Position> {
    let data = match store.get(&book.storage_key()) {
        Ok(Some(data)) => data,
        Ok(None) => return None,
        Err(err) => {
            warn!(book = %book, "Failed to read saved position: {err}");
            return None;
        }
    };
    match serde_json::from_str::<Position>(&data) {
        Ok(position) => Some(position),
        Err(err) => {
            warn!(book = %book, "Ignoring corrupt saved position: {err}");
            None
        }
    }
}

/// Forget the saved position for `book`.
pub fn clear(store: &dyn KeyValueStore, book: &BookIdentity) {
    if let Err(err) = store.remove(&book.storage_key()) {
        warn!(book = %book, "Failed to clear saved position: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::store::MemoryStore;

    struct FullStore;

    impl KeyValueStore for FullStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io(std::io::Error::other("quota exceeded")))
        }

        fn remove(&self, _key: &str) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    #[test]
    fn save_then_load_restores_position() {
        let store = MemoryStore::new();
        let book = BookIdentity::new("moby-dick.epub", 1_234_567);
        let position = Position::new(3, 7, 12);

        save(&store, &book, position);

        assert_eq!(load(&store, &book), Some(position));
    }

    #[test]
    fn same_name_different_size_does_not_collide() {
        let store = MemoryStore::new();
        let first = BookIdentity::new("book.epub", 100);
        let second = BookIdentity::new("book.epub", 200);
        save(&store, &first, Position::new(1, 1, 1));

        assert_eq!(load(&store, &second), None);
        save(&store, &second, Position::new(2, 2, 2));
        assert_eq!(load(&store, &first), Some(Position::new(1, 1, 1)));
    }

    #[test]
    fn corrupt_or_partial_json_is_handled() {
        let store = MemoryStore::new();
        let book = BookIdentity::new("book.epub", 1);
        store.set(&book.storage_key(), "{not json").unwrap();
        assert_eq!(load(&store, &book), None);

        store
            .set(&book.storage_key(), r#"{"paragraph_index": 4, "extra": true}"#)
            .unwrap();
        assert_eq!(load(&store, &book), Some(Position::new(0, 4, 0)));
    }

    #[test]
    fn save_failures_are_swallowed() {
        let book = BookIdentity::new("book.epub", 1);
        save(&FullStore, &book, Position::new(1, 2, 3));
        assert_eq!(load(&FullStore, &book), None);
    }

    #[test]
    fn clear_removes_entry() {
        let store = MemoryStore::new();
        let book = BookIdentity::new("book.epub", 1);
        save(&store, &book, Position::new(1, 0, 0));
        clear(&store, &book);
        assert_eq!(load(&store, &book), None);
    }

    #[test]
    fn identity_from_path_uses_name_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.txt");
        std::fs::write(&path, "twelve bytes").unwrap();
        let book = BookIdentity::from_path(&path).unwrap();
        assert_eq!(book, BookIdentity::new("short.txt", 12));
        assert_eq!(book.storage_key(), "pacer-progress:short.txt:12");
    }
}
