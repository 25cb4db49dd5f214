//! Provider Push Flow Controller
//!
//! Handles every process that is not a consumer pull: a data plane is selected
//! by source and destination address type and pushes the data itself.
//!
//! # Termination
//!
//! No binding between a process and the data plane that served it is kept, so
//! termination fans out to every registered data plane. Data planes answer
//! success for processes they do not know. The per-instance outcomes are
//! merged with every data plane reason kept verbatim, and the ids of the
//! failing instances are reported alongside.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::callback::ControlApiUrl;
use super::controller::DataFlowController;
use crate::client::DataPlaneClientFactory;
use crate::error::FlowError;
use crate::selector::DataPlaneSelector;
use crate::status;
use crate::types::{
    Asset, DataFlowRequest, DataFlowResponse, FlowType, HTTP_PROXY, Policy, TransferProcess,
    TransferType,
};

pub struct PushDataFlowController {
    selector: Arc<DataPlaneSelector>,
    client_factory: Arc<dyn DataPlaneClientFactory>,
    callback_url: Option<Arc<dyn ControlApiUrl>>,
    /// Fail initiation instead of dispatching without a callback address
    require_callback: bool,
}

impl PushDataFlowController {
    pub fn new(
        selector: Arc<DataPlaneSelector>,
        client_factory: Arc<dyn DataPlaneClientFactory>,
    ) -> Self {
        Self {
            selector,
            client_factory,
            callback_url: None,
            require_callback: false,
        }
    }

    pub fn with_callback_url(mut self, callback_url: Arc<dyn ControlApiUrl>) -> Self {
        self.callback_url = Some(callback_url);
        self
    }

    pub fn require_callback(mut self, required: bool) -> Self {
        self.require_callback = required;
        self
    }

    fn build_request(&self, process: &TransferProcess) -> Result<DataFlowRequest, FlowError> {
        let callback = self.callback_url.as_ref().and_then(|c| c.get());
        if self.require_callback && callback.is_none() {
            return Err(FlowError::ConfigurationMissing(
                "control API callback url".to_string(),
            ));
        }
        Ok(DataFlowRequest::for_process(process, callback))
    }
}

#[async_trait]
impl DataFlowController for PushDataFlowController {
    fn name(&self) -> &'static str {
        "provider-push"
    }

    /// Rejects the proxy destination and explicit PULL transfer types
    fn can_handle(&self, process: &TransferProcess) -> bool {
        if process.destination_type == HTTP_PROXY {
            return false;
        }
        !matches!(
            process.parsed_transfer_type(),
            Some(TransferType {
                flow: FlowType::Pull,
                ..
            })
        )
    }

    async fn initiate_flow(
        &self,
        process: &TransferProcess,
        _policy: &Policy,
    ) -> Result<DataFlowResponse, FlowError> {
        let request = self.build_request(process)?;
        let instance = self.selector.select(
            process.content_data_address.address_type(),
            process.data_destination.address_type(),
        )?;

        let client = self.client_factory.create_client(&instance);
        match client.transfer(&request).await {
            Ok(()) => {
                info!(
                    process_id = %process.id,
                    request_id = %request.id,
                    instance_id = %instance.id,
                    "Push flow dispatched"
                );
                Ok(DataFlowResponse::default())
            }
            Err(failure) => {
                warn!(
                    process_id = %process.id,
                    request_id = %request.id,
                    instance_id = %instance.id,
                    status = %failure.status,
                    error = %failure,
                    "Push flow dispatch failed"
                );
                Err(FlowError::DispatchFailure(failure))
            }
        }
    }

    async fn terminate(&self, process: &TransferProcess) -> Result<(), FlowError> {
        let instances = self.selector.get_all();
        debug!(
            process_id = %process.id,
            instances = instances.len(),
            "Terminating push flow on all data planes"
        );

        let calls = instances.iter().map(|instance| {
            let client = self.client_factory.create_client(instance);
            let process_id = process.id.as_str();
            async move { client.terminate(process_id).await }
        });
        let outcomes = join_all(calls).await;

        let failed_instances: Vec<String> = instances
            .iter()
            .zip(&outcomes)
            .filter(|(_, outcome)| outcome.is_err())
            .map(|(instance, _)| instance.id.clone())
            .collect();

        status::reduce(outcomes).map_err(|failure| {
            warn!(
                process_id = %process.id,
                failed_instances = ?failed_instances,
                instances = instances.len(),
                error = %failure,
                "Push flow termination incomplete"
            );
            FlowError::TerminationPartialFailure {
                failure,
                failed_instances,
            }
        })
    }

    fn transfer_types_for(&self, asset: &Asset) -> BTreeSet<String> {
        let source_type = asset.data_address.address_type();
        self.selector
            .get_all()
            .iter()
            .filter(|i| i.accepts_source(source_type))
            .flat_map(|i| i.allowed_dest_types.iter())
            .map(|dest| TransferType::push(dest.as_str()).to_string())
            .collect()
    }
}
