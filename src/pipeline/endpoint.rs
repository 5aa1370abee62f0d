//! Endpoint registry: where side-effecting units publish their results.
//!
//! A unit claims a named endpoint in `on_start` and releases it in `dispose`.
//! The registry is owned by the pipeline and handed to units through
//! [`UnitContext`](super::unit::UnitContext), so there is no process-wide state.
//! Requested names are de-duplicated: a second claim of `"camera"` yields
//! `"camera-2"`.

use crate::pipeline::bridge::SinkMessage;
use crate::pipeline::id::NodeId;
use crate::pipeline::value::Value;
use crossbeam_channel::Sender;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Shared state behind one endpoint.
#[derive(Debug, Default)]
struct Slot {
    latest: Mutex<Option<Value>>,
    dropped: AtomicU64,
}

#[derive(Debug)]
struct Claim {
    owner: NodeId,
    slot: Arc<Slot>,
}

/// Handle a unit keeps to publish through its claimed endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    name: String,
    slot: Arc<Slot>,
    tx: Option<Sender<SinkMessage>>,
}

impl Endpoint {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store `value` as the latest and forward it to the bridge, if any.
    /// Never blocks: a full channel counts as a dropped message.
    pub fn publish(&self, value: Value) {
        if let Some(tx) = &self.tx {
            let msg = SinkMessage::Published {
                endpoint: self.name.clone(),
                value: value.clone(),
            };
            if tx.try_send(msg).is_err() {
                self.slot.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
        let mut latest = self
            .slot
            .latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *latest = Some(value);
    }

    pub fn dropped(&self) -> u64 {
        self.slot.dropped.load(Ordering::Relaxed)
    }
}

/// Registry of claimed endpoint names.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    claims: HashMap<String, Claim>,
    tx: Option<Sender<SinkMessage>>,
}

impl EndpointRegistry {
    /// Registry without a bridge. Published values are only kept as "latest".
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that also forwards every published value over `tx`.
    pub fn with_sender(tx: Sender<SinkMessage>) -> Self {
        Self {
            claims: HashMap::new(),
            tx: Some(tx),
        }
    }

    /// Claim `requested` (or the first free `requested-N`) for `owner`.
    pub fn claim(&mut self, requested: &str, owner: NodeId) -> Endpoint {
        let name = self.unique_name(requested);
        let slot = Arc::new(Slot::default());
        self.claims.insert(
            name.clone(),
            Claim {
                owner,
                slot: slot.clone(),
            },
        );
        tracing::debug!("Node {} claimed endpoint '{}'", owner, name);
        Endpoint {
            name,
            slot,
            tx: self.tx.clone(),
        }
    }

    /// Release `name` if `owner` holds it. Returns whether anything was released.
    pub fn release(&mut self, name: &str, owner: NodeId) -> bool {
        match self.claims.get(name) {
            Some(claim) if claim.owner == owner => {
                let dropped = claim.slot.dropped.load(Ordering::Relaxed);
                if dropped > 0 {
                    tracing::warn!(
                        "Endpoint '{}' dropped {} messages due to backpressure",
                        name,
                        dropped
                    );
                }
                self.claims.remove(name);
                tracing::debug!("Node {} released endpoint '{}'", owner, name);
                true
            }
            _ => false,
        }
    }

    /// Latest value published on `name`.
    pub fn latest(&self, name: &str) -> Option<Value> {
        let claim = self.claims.get(name)?;
        let latest = claim
            .slot
            .latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        latest.clone()
    }

    pub fn owner(&self, name: &str) -> Option<NodeId> {
        self.claims.get(name).map(|c| c.owner)
    }

    pub fn is_claimed(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Claimed names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.claims.keys().cloned().collect();
        names.sort();
        names
    }

    fn unique_name(&self, requested: &str) -> String {
        if !self.claims.contains_key(requested) {
            return requested.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", requested, n))
            .find(|candidate| !self.claims.contains_key(candidate))
            .unwrap_or_else(|| requested.to_string())
    }
}
