//! Data Flow Manager
//!
//! Ordered registry of flow controllers. The first controller whose
//! `can_handle` accepts a process owns it; overlapping predicates are resolved
//! by position, not specificity, so register the most specific first.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::controller::DataFlowController;
use crate::error::FlowError;
use crate::types::{Asset, DataFlowResponse, Policy, TransferProcess};

struct Entry {
    priority: i32,
    controller: Arc<dyn DataFlowController>,
}

#[derive(Default)]
pub struct DataFlowManager {
    /// Sorted by descending priority, then registration order
    controllers: Vec<Entry>,
}

impl DataFlowManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a controller with default priority
    pub fn register(&mut self, controller: Arc<dyn DataFlowController>) {
        self.register_with_priority(0, controller);
    }

    /// Higher priority is consulted first; equal priorities keep registration order
    pub fn register_with_priority(&mut self, priority: i32, controller: Arc<dyn DataFlowController>) {
        info!(controller = controller.name(), priority = priority, "Flow controller registered");
        let pos = self
            .controllers
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(self.controllers.len());
        self.controllers.insert(
            pos,
            Entry {
                priority,
                controller,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Controller names in evaluation order
    pub fn controller_names(&self) -> Vec<&'static str> {
        self.controllers.iter().map(|e| e.controller.name()).collect()
    }

    /// First controller accepting `process`
    pub fn dispatch(&self, process: &TransferProcess) -> Result<Arc<dyn DataFlowController>, FlowError> {
        match self
            .controllers
            .iter()
            .find(|e| e.controller.can_handle(process))
        {
            Some(entry) => {
                debug!(
                    process_id = %process.id,
                    controller = entry.controller.name(),
                    "Flow controller matched"
                );
                Ok(entry.controller.clone())
            }
            None => {
                warn!(
                    process_id = %process.id,
                    destination_type = %process.destination_type,
                    transfer_type = ?process.transfer_type,
                    "No flow controller matched"
                );
                Err(FlowError::NoMatchingController(process.id.clone()))
            }
        }
    }

    pub async fn initiate(
        &self,
        process: &TransferProcess,
        policy: &Policy,
    ) -> Result<DataFlowResponse, FlowError> {
        self.dispatch(process)?.initiate_flow(process, policy).await
    }

    pub async fn terminate(&self, process: &TransferProcess) -> Result<(), FlowError> {
        self.dispatch(process)?.terminate(process).await
    }

    /// Union of every controller's transfer types for `asset`
    pub fn transfer_types_for(&self, asset: &Asset) -> BTreeSet<String> {
        self.controllers
            .iter()
            .flat_map(|e| e.controller.transfer_types_for(asset))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataAddress;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Controller accepting processes whose destination type is in `accepts`
    struct StubController {
        name: &'static str,
        accepts: &'static [&'static str],
        types: &'static [&'static str],
        initiated: AtomicUsize,
    }

    impl StubController {
        fn new(
            name: &'static str,
            accepts: &'static [&'static str],
            types: &'static [&'static str],
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                accepts,
                types,
                initiated: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DataFlowController for StubController {
        fn name(&self) -> &'static str {
            self.name
        }

        fn can_handle(&self, process: &TransferProcess) -> bool {
            self.accepts.iter().any(|a| *a == process.destination_type)
        }

        async fn initiate_flow(
            &self,
            _process: &TransferProcess,
            _policy: &Policy,
        ) -> Result<DataFlowResponse, FlowError> {
            self.initiated.fetch_add(1, Ordering::SeqCst);
            Ok(DataFlowResponse::default())
        }

        async fn terminate(&self, _process: &TransferProcess) -> Result<(), FlowError> {
            Ok(())
        }

        fn transfer_types_for(&self, _asset: &Asset) -> BTreeSet<String> {
            self.types.iter().map(|t| t.to_string()).collect()
        }
    }

    fn process(dest: &str) -> TransferProcess {
        TransferProcess::new("tp-1", DataAddress::new("HttpData"), DataAddress::new(dest))
    }

    #[test]
    fn test_first_match_wins() {
        let mut manager = DataFlowManager::new();
        manager.register(StubController::new("specific", &["S3"], &[]));
        manager.register(StubController::new("catch-all", &["S3", "HttpData"], &[]));

        assert_eq!(manager.dispatch(&process("S3")).unwrap().name(), "specific");
        assert_eq!(manager.dispatch(&process("HttpData")).unwrap().name(), "catch-all");
    }

    #[test]
    fn test_no_matching_controller() {
        let mut manager = DataFlowManager::new();
        manager.register(StubController::new("s3", &["S3"], &[]));

        let err = manager.dispatch(&process("AzureStorage")).err().unwrap();
        assert_eq!(err, FlowError::NoMatchingController("tp-1".into()));
    }

    #[test]
    fn test_empty_manager_has_no_match() {
        let manager = DataFlowManager::new();
        assert!(manager.dispatch(&process("S3")).is_err());
    }

    #[test]
    fn test_priority_order() {
        let mut manager = DataFlowManager::new();
        manager.register(StubController::new("a", &["S3"], &[]));
        manager.register_with_priority(10, StubController::new("urgent", &["S3"], &[]));
        manager.register(StubController::new("b", &["S3"], &[]));
        manager.register_with_priority(-1, StubController::new("fallback", &["S3"], &[]));

        assert_eq!(manager.controller_names(), vec!["urgent", "a", "b", "fallback"]);
        assert_eq!(manager.dispatch(&process("S3")).unwrap().name(), "urgent");
    }

    #[tokio::test]
    async fn test_initiate_delegates_to_match() {
        let first = StubController::new("first", &["S3"], &[]);
        let second = StubController::new("second", &["S3"], &[]);
        let mut manager = DataFlowManager::new();
        manager.register(first.clone());
        manager.register(second.clone());

        manager.initiate(&process("S3"), &Policy::default()).await.unwrap();
        assert_eq!(first.initiated.load(Ordering::SeqCst), 1);
        assert_eq!(second.initiated.load(Ordering::SeqCst), 0);

        let err = manager
            .initiate(&process("HttpProxy"), &Policy::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NO_MATCHING_CONTROLLER");
    }

    #[test]
    fn test_transfer_types_union() {
        let mut manager = DataFlowManager::new();
        manager.register(StubController::new("push", &[], &["S3-PUSH", "HttpData-PUSH"]));
        manager.register(StubController::new("pull", &[], &["HttpData-PULL", "S3-PUSH"]));

        let asset = Asset::new("asset-1", DataAddress::new("HttpData"));
        let types: Vec<String> = manager.transfer_types_for(&asset).into_iter().collect();
        assert_eq!(types, vec!["HttpData-PULL", "HttpData-PUSH", "S3-PUSH"]);
    }
}
