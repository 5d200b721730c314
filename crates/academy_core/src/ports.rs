//! crates/academy_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of where countdown anchors live and of the wall clock.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for countdown anchors, one string value per namespace.
#[async_trait]
pub trait AnchorStore: Send + Sync {
    /// Returns the raw stored value, or `None` if the namespace has never been written.
    async fn load_anchor(&self, namespace: &str) -> PortResult<Option<String>>;

    /// Overwrites the stored value for the namespace.
    async fn save_anchor(&self, namespace: &str, value: &str) -> PortResult<()>;
}

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Useful for hosts that replay time and for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

//=========================================================================================
// In-Process Adapter
//=========================================================================================

/// An `AnchorStore` kept in process memory. Anchors last as long as the process.
#[derive(Debug, Default)]
pub struct MemoryAnchorStore {
    anchors: Mutex<HashMap<String, String>>,
}

impl MemoryAnchorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnchorStore for MemoryAnchorStore {
    async fn load_anchor(&self, namespace: &str) -> PortResult<Option<String>> {
        let anchors = self
            .anchors
            .lock()
            .map_err(|e| PortError::Unavailable(e.to_string()))?;
        Ok(anchors.get(namespace).cloned())
    }

    async fn save_anchor(&self, namespace: &str, value: &str) -> PortResult<()> {
        let mut anchors = self
            .anchors
            .lock()
            .map_err(|e| PortError::Unavailable(e.to_string()))?;
        anchors.insert(namespace.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_keeps_namespaces_apart() {
        let store = MemoryAnchorStore::new();
        store.save_anchor("a", "1").await.unwrap();
        store.save_anchor("b", "2").await.unwrap();
        store.save_anchor("a", "3").await.unwrap();

        assert_eq!(store.load_anchor("a").await.unwrap().as_deref(), Some("3"));
        assert_eq!(store.load_anchor("b").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.load_anchor("c").await.unwrap(), None);
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);
        clock.set(10);
        assert_eq!(clock.now_millis(), 10);
    }
}
