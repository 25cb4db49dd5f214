//! Flow Controller Contract

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::FlowError;
use crate::types::{Asset, DataFlowResponse, Policy, TransferProcess};

/// Decides whether and how data moves for a transfer process
///
/// Controllers hold no per-call state; concurrent calls for different
/// processes need no coordination.
#[async_trait]
pub trait DataFlowController: Send + Sync {
    /// Controller name for logging
    fn name(&self) -> &'static str;

    /// Pure predicate over a process snapshot
    fn can_handle(&self, process: &TransferProcess) -> bool;

    /// Start the data flow for `process`
    async fn initiate_flow(
        &self,
        process: &TransferProcess,
        policy: &Policy,
    ) -> Result<DataFlowResponse, FlowError>;

    /// Stop the data flow for `process`
    async fn terminate(&self, process: &TransferProcess) -> Result<(), FlowError>;

    /// Transfer types this controller can offer for `asset`
    fn transfer_types_for(&self, asset: &Asset) -> BTreeSet<String>;
}
