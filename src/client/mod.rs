//! Data Plane Clients
//!
//! A client binds one registry entry to a callable transport. Factories only
//! resolve addressing; every network call happens inside the client.
//!
//! # Idempotency
//!
//! `terminate` for a process the data plane has never seen MUST succeed, so a
//! fan-out over unrelated data planes does not fail the aggregate.

pub mod embedded;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;

pub use embedded::EmbeddedDataPlane;
pub use remote::{RemoteDataPlaneClient, RemoteDataPlaneClientFactory};

use crate::selector::DataPlaneInstance;
use crate::status::StatusResult;
use crate::types::DataFlowRequest;

/// Transport client for a single data plane
#[async_trait]
pub trait DataPlaneClient: Send + Sync {
    /// Ask the data plane to start moving data for `request`
    async fn transfer(&self, request: &DataFlowRequest) -> StatusResult<()>;

    /// Ask the data plane to stop any flow for `process_id`
    ///
    /// # Idempotency
    /// Unknown process ids are a successful no-op.
    async fn terminate(&self, process_id: &str) -> StatusResult<()>;
}

/// Resolves a registry entry into a client; performs no I/O
pub trait DataPlaneClientFactory: Send + Sync {
    fn create_client(&self, instance: &DataPlaneInstance) -> Arc<dyn DataPlaneClient>;
}

/// Routes `embedded:` instances to the in-process data plane, the rest over HTTP
pub struct DefaultDataPlaneClientFactory {
    remote: RemoteDataPlaneClientFactory,
    embedded: Arc<EmbeddedDataPlane>,
}

impl DefaultDataPlaneClientFactory {
    pub fn new(remote: RemoteDataPlaneClientFactory, embedded: Arc<EmbeddedDataPlane>) -> Self {
        Self { remote, embedded }
    }

    pub fn embedded(&self) -> &Arc<EmbeddedDataPlane> {
        &self.embedded
    }
}

impl DataPlaneClientFactory for DefaultDataPlaneClientFactory {
    fn create_client(&self, instance: &DataPlaneInstance) -> Arc<dyn DataPlaneClient> {
        if instance.is_embedded() {
            self.embedded.clone()
        } else {
            self.remote.create_client(instance)
        }
    }
}
