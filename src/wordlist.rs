// Wordlist store for Stolypote
// Category-keyed deduplicated sets, each backed by an append-only text file.
//
// All state sits behind one mutex. A whole request's harvest is recorded while
// holding it, so "check absent, insert, append" never interleaves between requests.

use crate::models::{Category, Harvest};
use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Debug)]
struct Shelves {
    dir: PathBuf,
    shelves: HashMap<Category, HashSet<String>>,
}

impl Shelves {
    fn path_for(&self, category: &Category) -> PathBuf {
        self.dir.join(category.file_name())
    }

    fn insert(&mut self, category: &Category, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let shelf = self.shelves.entry(category.clone()).or_default();
        if !shelf.insert(value.to_string()) {
            return false;
        }

        // kept in memory even when the append fails
        self.append(category, value);

        if *category == Category::Combos {
            if let Some((user, pass)) = value.split_once(':') {
                self.insert(&Category::Users, user);
                self.insert(&Category::Passwords, pass);
            }
        }
        true
    }

    fn append(&self, category: &Category, value: &str) {
        let path = self.path_for(category);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{}", value));
        if let Err(e) = result {
            error!(path = %path.display(), error = %e, "failed to append to wordlist");
        }
    }

    fn load_file(&mut self, category: Category, path: &Path) -> usize {
        let file = match fs::File::open(path) {
            Ok(f) => f,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "wordlist not loaded");
                return 0;
            }
        };
        let shelf = self.shelves.entry(category).or_default();
        let mut loaded = 0;
        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "stopped reading wordlist");
                    break;
                }
            };
            let line = line.trim();
            if !line.is_empty() && shelf.insert(line.to_string()) {
                loaded += 1;
            }
        }
        loaded
    }
}

/// Handle to the wordlist directory and every category seen so far.
#[derive(Debug)]
pub struct WordlistStore {
    inner: Mutex<Shelves>,
}

impl WordlistStore {
    /// Opens a store over `dir`. No I/O happens until [`preload`](Self::preload) or the first insert.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Mutex::new(Shelves {
                dir: dir.into(),
                shelves: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shelves> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("wordlist store lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Marks every line of every existing wordlist file as seen, without rewriting anything.
    /// Extension categories are rediscovered from their file names.
    /// Returns the number of distinct values loaded.
    pub fn preload(&self) -> usize {
        let mut shelves = self.lock();
        let dir = shelves.dir.clone();
        let mut total = 0;

        for category in Category::FIXED {
            let path = dir.join(category.file_name());
            total += shelves.load_file(category, &path);
        }

        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let name = entry.file_name().to_string_lossy();
            if let Some(category @ Category::Extension(_)) = Category::from_file_name(&name) {
                total += shelves.load_file(category, entry.path());
            }
        }

        info!(dir = %dir.display(), values = total, categories = shelves.shelves.len(), "preloaded wordlists");
        total
    }

    /// Inserts `value` (trimmed) into `category` and appends it to the backing file.
    /// Returns false for blank or already-known values. Combos cascade into users and passwords.
    pub fn add_if_absent(&self, category: &Category, value: &str) -> bool {
        self.lock().insert(category, value)
    }

    /// Records a whole harvest in one exclusive pass. Returns how many values were new.
    pub fn record(&self, harvest: &Harvest) -> usize {
        let mut shelves = self.lock();
        harvest
            .entries()
            .iter()
            .filter(|(category, value)| shelves.insert(category, value))
            .count()
    }

    pub fn contains(&self, category: &Category, value: &str) -> bool {
        self.lock()
            .shelves
            .get(category)
            .map_or(false, |s| s.contains(value))
    }

    pub fn len(&self, category: &Category) -> usize {
        self.lock()
            .shelves
            .get(category)
            .map_or(0, |s| s.len())
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.lock().shelves.keys().cloned().collect();
        categories.sort();
        categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(dir: &Path, category: &Category) -> Vec<String> {
        fs::read_to_string(dir.join(category.file_name()))
            .unwrap_or_default()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn insert_twice_writes_once() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WordlistStore::new(tmp.path());
        assert!(store.add_if_absent(&Category::Paths, "/admin"));
        assert!(!store.add_if_absent(&Category::Paths, "/admin"));
        assert!(!store.add_if_absent(&Category::Paths, "  /admin \n"));
        assert_eq!(lines(tmp.path(), &Category::Paths), vec!["/admin"]);
        assert_eq!(store.len(&Category::Paths), 1);
    }

    #[test]
    fn blank_values_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WordlistStore::new(tmp.path());
        assert!(!store.add_if_absent(&Category::Users, "   "));
        assert!(!tmp.path().join(Category::Users.file_name()).exists());
    }

    #[test]
    fn combo_cascades_on_first_colon() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WordlistStore::new(tmp.path());
        assert!(store.add_if_absent(&Category::Combos, "admin:pa:ss"));
        assert!(store.contains(&Category::Users, "admin"));
        assert!(store.contains(&Category::Passwords, "pa:ss"));
        assert_eq!(lines(tmp.path(), &Category::Passwords), vec!["pa:ss"]);
    }

    #[test]
    fn combo_without_colon_does_not_cascade() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WordlistStore::new(tmp.path());
        assert!(store.add_if_absent(&Category::Combos, "lonely"));
        assert_eq!(store.len(&Category::Users), 0);
    }

    #[test]
    fn append_failure_still_marks_value_seen() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WordlistStore::new(tmp.path().join("missing-dir"));
        assert!(store.add_if_absent(&Category::Users, "ghost"));
        assert!(!store.add_if_absent(&Category::Users, "ghost"));
        assert!(store.contains(&Category::Users, "ghost"));
    }

    #[test]
    fn record_counts_only_new_values() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WordlistStore::new(tmp.path());
        let mut harvest = Harvest::new();
        harvest.record(Category::Parameters, "q");
        harvest.record(Category::Parameters, "q");
        harvest.record(Category::Extension("php".into()), "/index.php");
        assert_eq!(store.record(&harvest), 2);
        assert_eq!(store.record(&harvest), 0);
        assert_eq!(
            store.categories(),
            vec![Category::Parameters, Category::Extension("php".into())]
        );
    }
}
