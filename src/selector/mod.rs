//! Data Plane Selector
//!
//! Registry of live data plane instances. It is the only shared mutable state
//! in flow control.
//!
//! # Concurrency
//!
//! The instance list is copy-on-write: readers clone an `Arc` to the current
//! list under a short read lock and work on that snapshot, writers build a new
//! list and swap it in under the write lock. Readers never block each other and
//! never see a half-applied join or leave.

pub mod instance;
pub mod strategy;

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

pub use instance::{DataPlaneInstance, EMBEDDED_SCHEME};
pub use strategy::{FirstAvailable, Random, RoundRobin, SelectionStrategy, strategy_from_name};

use crate::error::FlowError;

pub struct DataPlaneSelector {
    instances: RwLock<Arc<Vec<DataPlaneInstance>>>,
    strategy: Arc<dyn SelectionStrategy>,
}

impl DataPlaneSelector {
    pub fn new(strategy: Arc<dyn SelectionStrategy>) -> Self {
        Self {
            instances: RwLock::new(Arc::new(Vec::new())),
            strategy,
        }
    }

    /// Selector seeded with `instances`, in order
    pub fn with_instances(
        strategy: Arc<dyn SelectionStrategy>,
        instances: impl IntoIterator<Item = DataPlaneInstance>,
    ) -> Self {
        let selector = Self::new(strategy);
        for instance in instances {
            selector.add_instance(instance);
        }
        selector
    }

    fn snapshot(&self) -> Arc<Vec<DataPlaneInstance>> {
        // The list is only ever swapped whole, so a poisoned lock still holds a valid list
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Pick one instance able to move data from `source_type` to `dest_type`
    pub fn select(&self, source_type: &str, dest_type: &str) -> Result<DataPlaneInstance, FlowError> {
        let snapshot = self.snapshot();
        let candidates: Vec<&DataPlaneInstance> = snapshot
            .iter()
            .filter(|i| i.can_handle(source_type, dest_type))
            .collect();

        match self.strategy.apply(&candidates) {
            Some(instance) => {
                debug!(
                    instance_id = %instance.id,
                    source_type = source_type,
                    dest_type = dest_type,
                    candidates = candidates.len(),
                    strategy = self.strategy.name(),
                    "Data plane selected"
                );
                Ok(instance.clone())
            }
            None => Err(FlowError::NoCapableWorker {
                source_type: source_type.to_string(),
                dest_type: dest_type.to_string(),
            }),
        }
    }

    /// Snapshot of every registered instance, in registration order
    pub fn get_all(&self) -> Vec<DataPlaneInstance> {
        self.snapshot().as_ref().clone()
    }

    pub fn find_by_id(&self, id: &str) -> Option<DataPlaneInstance> {
        self.snapshot().iter().find(|i| i.id == id).cloned()
    }

    /// Register an instance; an existing entry with the same id is replaced in place
    pub fn add_instance(&self, instance: DataPlaneInstance) {
        let mut guard = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.as_ref().clone();
        match next.iter_mut().find(|i| i.id == instance.id) {
            Some(existing) => {
                info!(instance_id = %instance.id, "Data plane instance updated");
                *existing = instance;
            }
            None => {
                info!(
                    instance_id = %instance.id,
                    url = %instance.url,
                    "Data plane instance registered"
                );
                next.push(instance);
            }
        }
        *guard = Arc::new(next);
    }

    /// Unregister an instance, returning it if it was present
    pub fn remove_instance(&self, id: &str) -> Option<DataPlaneInstance> {
        let mut guard = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        let pos = guard.iter().position(|i| i.id == id)?;
        let mut next = guard.as_ref().clone();
        let removed = next.remove(pos);
        *guard = Arc::new(next);
        info!(instance_id = %id, "Data plane instance removed");
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}

impl Default for DataPlaneSelector {
    fn default() -> Self {
        Self::new(Arc::new(RoundRobin::new()))
    }
}
