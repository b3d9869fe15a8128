//! Persistent-store adaptor: a narrow namespace/key/bytes interface.
//!
//! Every store user (the learner bindings, the AC state, the legacy button
//! table) funnels through [`StoreBackend`]. Backends: an in-memory map for
//! tests and a one-file-per-key directory store. Values are opaque bytes;
//! callers pick the encoding (JSON throughout this crate).

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::error::{Error, Result};

/// Legacy button -> code blobs, keys `btn_<i>` and `raw_<i>`.
pub const NS_CODES: &str = "ir_codes";
/// (device, action) -> code blobs, keys `<devprefix>_<ordinal>[_raw]`.
pub const NS_ACTIONS: &str = "ir_actions";
/// Single blob under key `state`: the AC state record.
pub const NS_AC: &str = "ir_ac";

/// Opaque namespace handle returned by [`StoreBackend::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NsHandle(usize);

pub trait StoreBackend: Send {
    fn open(&mut self, namespace: &str) -> Result<NsHandle>;
    fn set(&mut self, handle: NsHandle, key: &str, value: &[u8]) -> Result<()>;
    /// `Ok(None)` means not-found; `Err` is a real storage fault.
    fn get(&self, handle: NsHandle, key: &str) -> Result<Option<Vec<u8>>>;
    /// Erasing a missing key is a no-op.
    fn erase(&mut self, handle: NsHandle, key: &str) -> Result<()>;
    fn erase_all(&mut self, handle: NsHandle) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
}

/// The store is shared between the orchestrator, the AC controller, and
/// application tasks; all of them take this mutex for the minimum span.
pub type SharedStore = Arc<Mutex<Box<dyn StoreBackend>>>;

pub fn shared(backend: impl StoreBackend + 'static) -> SharedStore {
    Arc::new(Mutex::new(Box::new(backend)))
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// Volatile backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: Vec<(String, HashMap<String, Vec<u8>>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for MemoryStore {
    fn open(&mut self, namespace: &str) -> Result<NsHandle> {
        if let Some(idx) = self.namespaces.iter().position(|(n, _)| n == namespace) {
            return Ok(NsHandle(idx));
        }
        self.namespaces.push((namespace.to_string(), HashMap::new()));
        Ok(NsHandle(self.namespaces.len() - 1))
    }

    fn set(&mut self, handle: NsHandle, key: &str, value: &[u8]) -> Result<()> {
        let (_, map) = self
            .namespaces
            .get_mut(handle.0)
            .ok_or_else(|| Error::Storage("stale namespace handle".into()))?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, handle: NsHandle, key: &str) -> Result<Option<Vec<u8>>> {
        let (_, map) = self
            .namespaces
            .get(handle.0)
            .ok_or_else(|| Error::Storage("stale namespace handle".into()))?;
        Ok(map.get(key).cloned())
    }

    fn erase(&mut self, handle: NsHandle, key: &str) -> Result<()> {
        if let Some((_, map)) = self.namespaces.get_mut(handle.0) {
            map.remove(key);
        }
        Ok(())
    }

    fn erase_all(&mut self, handle: NsHandle) -> Result<()> {
        if let Some((_, map)) = self.namespaces.get_mut(handle.0) {
            map.clear();
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

// ─── File backend ────────────────────────────────────────────────────────────

/// One directory per namespace, one file per key, under a base directory
/// (default `~/.config/irkit/store`).
pub struct FileStore {
    base: PathBuf,
    namespaces: Vec<String>,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        fs::create_dir_all(&base)
            .with_context(|| format!("Failed to create store dir: {base:?}"))
            .map_err(storage_err)?;
        tracing::info!("file store at {:?}", base);
        Ok(Self {
            base,
            namespaces: Vec::new(),
        })
    }

    fn ns_dir(&self, handle: NsHandle) -> Result<PathBuf> {
        self.namespaces
            .get(handle.0)
            .map(|ns| self.base.join(ns))
            .ok_or_else(|| Error::Storage("stale namespace handle".into()))
    }
}

fn storage_err(e: anyhow::Error) -> Error {
    tracing::warn!("storage error: {e:#}");
    Error::Storage(format!("{e:#}"))
}

impl StoreBackend for FileStore {
    fn open(&mut self, namespace: &str) -> Result<NsHandle> {
        let dir = self.base.join(namespace);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create namespace dir: {dir:?}"))
            .map_err(storage_err)?;
        if let Some(idx) = self.namespaces.iter().position(|n| n == namespace) {
            return Ok(NsHandle(idx));
        }
        self.namespaces.push(namespace.to_string());
        Ok(NsHandle(self.namespaces.len() - 1))
    }

    fn set(&mut self, handle: NsHandle, key: &str, value: &[u8]) -> Result<()> {
        let path = self.ns_dir(handle)?.join(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write {path:?}"))
            .map_err(storage_err)
    }

    fn get(&self, handle: NsHandle, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.ns_dir(handle)?.join(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_err(
                anyhow::Error::new(e).context(format!("Failed to read {path:?}")),
            )),
        }
    }

    fn erase(&mut self, handle: NsHandle, key: &str) -> Result<()> {
        let path = self.ns_dir(handle)?.join(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err(
                anyhow::Error::new(e).context(format!("Failed to erase {path:?}")),
            )),
        }
    }

    fn erase_all(&mut self, handle: NsHandle) -> Result<()> {
        let dir = self.ns_dir(handle)?;
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("Failed to list {dir:?}"))
            .map_err(storage_err)?
        {
            let entry = entry.map_err(|e| Error::Storage(e.to_string()))?;
            if entry.path().is_file() {
                fs::remove_file(entry.path()).map_err(|e| Error::Storage(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        // Writes land on the filesystem immediately; nothing buffered.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(backend: &mut dyn StoreBackend) {
        let h = backend.open(NS_ACTIONS).unwrap();
        assert_eq!(backend.get(h, "tv_0").unwrap(), None);
        backend.set(h, "tv_0", b"blob").unwrap();
        assert_eq!(backend.get(h, "tv_0").unwrap().as_deref(), Some(&b"blob"[..]));

        // Re-open returns a handle to the same namespace.
        let h2 = backend.open(NS_ACTIONS).unwrap();
        assert_eq!(backend.get(h2, "tv_0").unwrap().as_deref(), Some(&b"blob"[..]));

        backend.erase(h, "tv_0").unwrap();
        backend.erase(h, "tv_0").unwrap(); // missing key is a no-op
        assert_eq!(backend.get(h, "tv_0").unwrap(), None);

        backend.set(h, "a", b"1").unwrap();
        backend.set(h, "b", b"2").unwrap();
        backend.erase_all(h).unwrap();
        assert_eq!(backend.get(h, "a").unwrap(), None);
        backend.commit().unwrap();
    }

    #[test]
    fn memory_store_contract() {
        exercise(&mut MemoryStore::new());
    }

    #[test]
    fn file_store_contract() {
        let dir = std::env::temp_dir().join(format!("irkit-store-test-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        exercise(&mut FileStore::new(&dir).unwrap());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn namespaces_are_isolated() {
        let mut s = MemoryStore::new();
        let codes = s.open(NS_CODES).unwrap();
        let ac = s.open(NS_AC).unwrap();
        s.set(codes, "state", b"code").unwrap();
        s.set(ac, "state", b"acstate").unwrap();
        assert_eq!(s.get(codes, "state").unwrap().unwrap(), b"code");
        assert_eq!(s.get(ac, "state").unwrap().unwrap(), b"acstate");
    }
}
