//! crates/academy_core/src/countdown.rs
//!
//! A recurring countdown whose cycle start ("anchor") lives in an `AnchorStore`,
//! so every instance on the same namespace agrees on the time left.
//!
//! Remaining time is always recomputed from the anchor, never decremented, so
//! late or skipped ticks still report the right value. Storage failures are
//! logged and the countdown carries on with its in-memory anchor.

use crate::domain::{RemainingTime, Rollover, RolloverKind};
use crate::ports::{AnchorStore, Clock};
use std::sync::Arc;
use tracing::{info, warn};

/// Invoked once per cycle restart.
pub type RolloverCallback = Box<dyn FnMut(&Rollover) + Send>;

#[derive(Debug, thiserror::Error)]
pub enum CountdownError {
    #[error("Cycle duration must be between 1 and {max} ms, got {0}", max = i64::MAX)]
    InvalidCycle(u64),
}

pub struct CycleCountdown {
    store: Arc<dyn AnchorStore>,
    clock: Arc<dyn Clock>,
    namespace: String,
    cycle_ms: i64,
    anchor_ms: i64,
    on_rollover: Option<RolloverCallback>,
}

impl std::fmt::Debug for CycleCountdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleCountdown")
            .field("namespace", &self.namespace)
            .field("cycle_ms", &self.cycle_ms)
            .field("anchor_ms", &self.anchor_ms)
            .finish_non_exhaustive()
    }
}

/// What `read_anchor` found under the namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoredAnchor {
    Usable(i64),
    Missing,
    /// Present but not a past, non-negative epoch timestamp.
    Invalid,
    Unreadable,
}

impl CycleCountdown {
    /// Loads (or creates) the anchor for `namespace` and reports the time left.
    ///
    /// A missing, unparseable, negative or future anchor is replaced with "now".
    /// If the store cannot be read the countdown starts a fresh in-memory cycle.
    pub async fn initialize(
        store: Arc<dyn AnchorStore>,
        clock: Arc<dyn Clock>,
        namespace: impl Into<String>,
        cycle_duration_ms: u64,
    ) -> Result<(Self, RemainingTime), CountdownError> {
        let cycle_ms = i64::try_from(cycle_duration_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or(CountdownError::InvalidCycle(cycle_duration_ms))?;
        let namespace = namespace.into();
        let now = clock.now_millis();

        let stored = Self::read_anchor(store.as_ref(), &namespace, now).await;
        let mut countdown = Self {
            store,
            clock,
            namespace,
            cycle_ms,
            anchor_ms: now,
            on_rollover: None,
        };
        match stored {
            StoredAnchor::Usable(anchor) => countdown.anchor_ms = anchor,
            _ => countdown.persist().await,
        }

        let remaining = countdown.observe(now, RolloverKind::Natural).await;
        Ok((countdown, remaining))
    }

    /// Registers the callback fired on every cycle restart, replacing any previous one.
    pub fn on_rollover(&mut self, callback: impl FnMut(&Rollover) + Send + 'static) {
        self.on_rollover = Some(Box::new(callback));
    }

    /// Recomputes the time left, restarting the cycle if it has run out.
    ///
    /// A newer anchor written by another instance on the same namespace counts
    /// as a rollover here too, so every instance notifies its own callback.
    pub async fn tick(&mut self) -> RemainingTime {
        let now = self.clock.now_millis();
        match Self::read_anchor(self.store.as_ref(), &self.namespace, now).await {
            StoredAnchor::Usable(stored) if stored > self.anchor_ms => {
                let expired = self
                    .anchor_ms
                    .checked_add(self.cycle_ms)
                    .map_or(true, |end| end <= stored);
                let kind = if expired {
                    RolloverKind::Natural
                } else {
                    RolloverKind::Manual
                };
                self.anchor_ms = stored;
                info!(namespace = %self.namespace, anchor = stored, ?kind, "Countdown cycle restarted elsewhere");
                self.notify(kind);
            }
            StoredAnchor::Usable(stored) => self.anchor_ms = stored,
            StoredAnchor::Invalid => self.persist().await,
            StoredAnchor::Missing | StoredAnchor::Unreadable => {}
        }
        self.observe(now, RolloverKind::Natural).await
    }

    /// Starts a new cycle immediately.
    pub async fn reset(&mut self) -> RemainingTime {
        let now = self.clock.now_millis();
        self.restart(now, RolloverKind::Manual).await
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn anchor_ms(&self) -> i64 {
        self.anchor_ms
    }

    pub fn cycle_duration_ms(&self) -> u64 {
        self.cycle_ms.unsigned_abs()
    }

    async fn observe(&mut self, now: i64, kind: RolloverKind) -> RemainingTime {
        match now.checked_sub(self.anchor_ms) {
            Some(elapsed) if (0..self.cycle_ms).contains(&elapsed) => {
                RemainingTime::from_millis((self.cycle_ms - elapsed).unsigned_abs())
            }
            _ => self.restart(now, kind).await,
        }
    }

    async fn restart(&mut self, now: i64, kind: RolloverKind) -> RemainingTime {
        self.anchor_ms = now;
        self.persist().await;
        info!(namespace = %self.namespace, anchor = now, ?kind, "Countdown cycle restarted");
        self.notify(kind);
        RemainingTime::from_millis(self.cycle_ms.unsigned_abs())
    }

    fn notify(&mut self, kind: RolloverKind) {
        if let Some(callback) = self.on_rollover.as_mut() {
            callback(&Rollover {
                namespace: self.namespace.clone(),
                anchor_ms: self.anchor_ms,
                kind,
            });
        }
    }

    // `&mut self`: the callback is `Send` but not `Sync`.
    async fn persist(&mut self) {
        if let Err(e) = self
            .store
            .save_anchor(&self.namespace, &self.anchor_ms.to_string())
            .await
        {
            warn!(namespace = %self.namespace, "Could not persist countdown anchor, keeping it in memory: {}", e);
        }
    }

    async fn read_anchor(store: &dyn AnchorStore, namespace: &str, now: i64) -> StoredAnchor {
        match store.load_anchor(namespace).await {
            Ok(Some(raw)) => match raw.trim().parse::<i64>() {
                Ok(anchor) if (0..=now).contains(&anchor) => StoredAnchor::Usable(anchor),
                Ok(anchor) => {
                    warn!(namespace, anchor, now, "Stored countdown anchor is out of range, replacing it");
                    StoredAnchor::Invalid
                }
                Err(_) => {
                    warn!(namespace, raw = %raw, "Stored countdown anchor is not a timestamp, replacing it");
                    StoredAnchor::Invalid
                }
            },
            Ok(None) => StoredAnchor::Missing,
            Err(e) => {
                warn!(namespace, "Countdown anchor store unavailable: {}", e);
                StoredAnchor::Unreadable
            }
        }
    }
}
