use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::engine::grid::Score;
use crate::error::{Error, Result};

/// Storage key under which the best score is kept.
pub(crate) const BEST_SCORE_KEY: &str = "2048-best";

/// KeyValueStore is the persistence capability handed to a game session by its host.
pub(crate) trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// MemoryStore keeps values for the lifetime of the process. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
struct Entries(BTreeMap<String, String>);

/// JsonFileStore persists entries as a single JSON object on disk.
#[derive(Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
    entries: Entries,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file opens as an empty store.
    pub(crate) fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| Error::StoreDecode {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no score store at {:?}, starting empty", path);
                Entries::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<()> {
        let encoded = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encoded)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|source| Error::StoreWrite {
                path: self.path.clone(),
                source,
            })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.0.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// BestScore is the single persisted scalar of the game.
pub(crate) struct BestScore {
    store: Box<dyn KeyValueStore>,
    value: Score,
}

impl BestScore {
    pub(crate) fn load(store: Box<dyn KeyValueStore>) -> Result<Self> {
        let value = match store.get(BEST_SCORE_KEY)? {
            Some(raw) => parse_leading_score(&raw).unwrap_or_else(|| {
                log::warn!("ignoring unreadable best score {:?}", raw);
                0
            }),
            None => 0,
        };
        Ok(Self { store, value })
    }

    pub(crate) fn value(&self) -> Score {
        self.value
    }

    /// Persist `score` if it beats the best so far. Returns whether it did. The in-memory best
    /// is raised even when the store fails to write it.
    pub(crate) fn record(&mut self, score: Score) -> Result<bool> {
        if score <= self.value {
            return Ok(false);
        }
        self.value = score;
        self.store.set(BEST_SCORE_KEY, &score.to_string())?;
        Ok(true)
    }
}

/// Read the integer at the start of `raw`, ignoring leading whitespace and anything after the
/// digits, so "1500.0" reads as 1500.
fn parse_leading_score(raw: &str) -> Option<Score> {
    let raw = raw.trim_start();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}
