//! Embedded Data Plane
//!
//! In-process data plane for `embedded:` instances. It tracks accepted flows
//! by process id; moving bytes is left to whatever drains the flow table.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info};

use super::DataPlaneClient;
use crate::status::{StatusFailure, StatusResult};
use crate::types::DataFlowRequest;

#[derive(Debug, Default)]
pub struct EmbeddedDataPlane {
    /// Active flows keyed by process id
    flows: DashMap<String, DataFlowRequest>,
}

impl EmbeddedDataPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_flows(&self) -> usize {
        self.flows.len()
    }

    /// Latest request accepted for `process_id`
    pub fn get(&self, process_id: &str) -> Option<DataFlowRequest> {
        self.flows.get(process_id).map(|entry| entry.value().clone())
    }
}

fn validate(request: &DataFlowRequest) -> StatusResult<()> {
    if request.process_id.is_empty() {
        return Err(StatusFailure::fatal("request has an empty process id"));
    }
    if request.source_data_address.address_type.is_empty() {
        return Err(StatusFailure::fatal("source address has no type"));
    }
    if request.destination_data_address.address_type.is_empty() {
        return Err(StatusFailure::fatal("destination address has no type"));
    }
    Ok(())
}

#[async_trait]
impl DataPlaneClient for EmbeddedDataPlane {
    async fn transfer(&self, request: &DataFlowRequest) -> StatusResult<()> {
        validate(request)?;

        // A re-dispatch for the same process supersedes the earlier request
        if let Some(previous) = self
            .flows
            .insert(request.process_id.clone(), request.clone())
        {
            debug!(
                process_id = %request.process_id,
                previous_request_id = %previous.id,
                request_id = %request.id,
                "Embedded flow re-dispatched"
            );
        } else {
            info!(
                process_id = %request.process_id,
                request_id = %request.id,
                "Embedded flow accepted"
            );
        }
        Ok(())
    }

    async fn terminate(&self, process_id: &str) -> StatusResult<()> {
        match self.flows.remove(process_id) {
            Some(_) => info!(process_id = %process_id, "Embedded flow terminated"),
            None => debug!(process_id = %process_id, "No embedded flow to terminate"),
        }
        Ok(())
    }
}
