//! Legal-notice acknowledgement persistence.
//!
//! The notice is shown once per installation. Whether it has been accepted
//! is read and written through the [`NoticeStore`] capability so the
//! reducer and tests never touch the filesystem directly.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

/// Text of the legal-notice overlay.
pub const NOTICE_TITLE: &str = "Aviso Importante";

pub const NOTICE_BODY: &[&str] = &[
    "Esta aplicación forma parte de un proyecto universitario de investigación \
     que utiliza la versión Beta de OpenAI Assistants API.",
    "Aspectos importantes a considerar:",
    "- Las respuestas pueden contener imprecisiones o errores debido a la \
     naturaleza experimental de la tecnología.",
    "- Todas las interacciones son almacenadas de forma anónima y serán \
     utilizadas exclusivamente con fines de investigación académica.",
    "- No se recopila información personal identificable.",
    "Al continuar usando esta aplicación, aceptas estas condiciones y el uso \
     de tus interacciones para fines de investigación.",
];

pub const NOTICE_ACCEPT: &str = "Entendido, continuar (Enter)";

/// Persistence for the one-time legal-notice acknowledgement.
pub trait NoticeStore: Send {
    fn is_acknowledged(&self) -> bool;

    /// Records the acknowledgement.
    ///
    /// # Errors
    /// Returns an error when the acknowledgement cannot be persisted.
    fn acknowledge(&self) -> Result<()>;
}

/// Flag file under the config directory.
pub struct FsNoticeStore {
    path: PathBuf,
}

impl FsNoticeStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl NoticeStore for FsNoticeStore {
    fn is_acknowledged(&self) -> bool {
        self.path.exists()
    }

    fn acknowledge(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, b"")
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

/// In-memory store for tests and headless runs.
#[derive(Default)]
pub struct MemoryNoticeStore {
    acknowledged: AtomicBool,
}

impl MemoryNoticeStore {
    pub fn acknowledged() -> Self {
        Self {
            acknowledged: AtomicBool::new(true),
        }
    }
}

impl NoticeStore for MemoryNoticeStore {
    fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::Relaxed)
    }

    fn acknowledge(&self) -> Result<()> {
        self.acknowledged.store(true, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsNoticeStore::new(dir.path().join("nested").join("legal_notice_ack"));

        assert!(!store.is_acknowledged());
        store.acknowledge().unwrap();
        assert!(store.is_acknowledged());
        // Acknowledging again is fine.
        store.acknowledge().unwrap();
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryNoticeStore::default();
        assert!(!store.is_acknowledged());
        store.acknowledge().unwrap();
        assert!(store.is_acknowledged());
        assert!(MemoryNoticeStore::acknowledged().is_acknowledged());
    }
}
