//! Store owning the current snapshot.
//!
//! `RunStore` is the only place where effects requested by the reducer are
//! carried out. It holds the latest snapshot behind an `Arc` so readers can
//! keep an old snapshot for as long as they like.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StorageError;
use crate::event::RunEvent;
use crate::payload::InitialPayload;
use crate::state::{Effect, RunState, StartupOptions, reduce};

/// Key holding the user's base-host override.
pub const BASE_HOST_KEY: &str = "_gemini-replace-host";

/// Persistent string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> crate::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> crate::Result<()>;
}

/// In-process store, lost on exit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> crate::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// The file is read once on open. Every `set` rewrites it through a
/// temporary sibling file followed by a rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| StorageError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> crate::Result<()> {
        let write_failed = |path: &Path, e: &dyn std::fmt::Display| StorageError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_failed(parent, &e))?;
        }
        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| write_failed(&self.path, &e))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(|e| write_failed(&tmp_path, &e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| write_failed(&self.path, &e))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> crate::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.write()
    }
}

/// Owner of the current snapshot.
pub struct RunStore {
    state: Arc<RunState>,
    options: StartupOptions,
    host_store: Box<dyn KeyValueStore>,
}

impl RunStore {
    /// Seed the store. The persisted base host is read here, once; `None`
    /// payload seeds the default state.
    pub fn new(
        payload: Option<InitialPayload>,
        options: StartupOptions,
        host_store: Box<dyn KeyValueStore>,
    ) -> Self {
        let mut store = Self {
            state: Arc::new(RunState::default()),
            options,
            host_store,
        };
        store.replace(payload.unwrap_or_default());
        store
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Shared handle to the current snapshot; unaffected by later dispatches.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RunState> {
        Arc::clone(&self.state)
    }

    /// Re-seed from a new full-run payload.
    pub fn replace(&mut self, payload: InitialPayload) {
        let mut options = self.options.clone();
        if options.stored_base_host.is_none() {
            options.stored_base_host = self.stored_base_host();
        }
        self.state = Arc::new(RunState::from_payload(payload, &options));
        tracing::debug!(
            suites = self.state.suite_ids.all.len(),
            failed = self.state.suite_ids.failed.len(),
            "Seeded run state"
        );
    }

    /// Reduce `event` and install the result.
    ///
    /// The new snapshot is installed before effects run, so a failing effect
    /// still leaves the state advanced.
    pub fn dispatch(&mut self, event: RunEvent) -> crate::Result<()> {
        let kind = event.kind();
        let (next, effects) = reduce(&self.state, event);
        self.state = Arc::new(next);
        tracing::trace!(kind, revision = self.state.revision, "Dispatched event");

        for effect in effects {
            self.execute(effect)?;
        }
        Ok(())
    }

    /// Decode one JSON event and dispatch it.
    pub fn dispatch_json(&mut self, json: &str) -> crate::Result<()> {
        let event = RunEvent::from_json(json)?;
        self.dispatch(event)
    }

    fn execute(&mut self, effect: Effect) -> crate::Result<()> {
        match effect {
            Effect::PersistBaseHost(host) => {
                if let Err(e) = self.host_store.set(BASE_HOST_KEY, &host) {
                    tracing::warn!(error = %e, "Failed to persist base host");
                    return Err(e);
                }
                // Later reseeds must see this host, not the startup one.
                self.options.stored_base_host = Some(host);
                Ok(())
            }
        }
    }

    fn stored_base_host(&self) -> Option<String> {
        match self.host_store.get(BASE_HOST_KEY) {
            Ok(host) => host,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored base host");
                None
            }
        }
    }
}
