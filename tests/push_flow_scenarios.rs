use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dataflow_control::{
    AppConfig, Asset, DataAddress, DataFlowController, DataFlowManager, DataFlowRequest,
    DataPlaneClient, DataPlaneClientFactory, DataPlaneInstance, DataPlaneSelector, FlowError,
    HTTP_PROXY, Policy, PushDataFlowController, StaticControlApiUrl, StatusFailure, StatusResult,
    TransferProcess,
};
use dataflow_control::selector::{FirstAvailable, RoundRobin};

/// Records calls per data plane; terminate fails for instances listed in `failing`
#[derive(Default)]
struct RecordingFactory {
    transfers: Arc<Mutex<Vec<(String, DataFlowRequest)>>>,
    terminates: Arc<Mutex<Vec<(String, String)>>>,
    failing: HashMap<String, String>,
}

struct RecordingClient {
    instance_id: String,
    transfers: Arc<Mutex<Vec<(String, DataFlowRequest)>>>,
    terminates: Arc<Mutex<Vec<(String, String)>>>,
    fail_with: Option<String>,
}

#[async_trait]
impl DataPlaneClient for RecordingClient {
    async fn transfer(&self, request: &DataFlowRequest) -> StatusResult<()> {
        self.transfers
            .lock()
            .unwrap()
            .push((self.instance_id.clone(), request.clone()));
        Ok(())
    }

    async fn terminate(&self, process_id: &str) -> StatusResult<()> {
        self.terminates
            .lock()
            .unwrap()
            .push((self.instance_id.clone(), process_id.to_string()));
        match &self.fail_with {
            Some(reason) => Err(StatusFailure::retry(reason.clone())),
            None => Ok(()),
        }
    }
}

impl DataPlaneClientFactory for RecordingFactory {
    fn create_client(&self, instance: &DataPlaneInstance) -> Arc<dyn DataPlaneClient> {
        Arc::new(RecordingClient {
            instance_id: instance.id.clone(),
            transfers: self.transfers.clone(),
            terminates: self.terminates.clone(),
            fail_with: self.failing.get(&instance.id).cloned(),
        })
    }
}

fn data_plane(id: &str, sources: &[&str], dests: &[&str]) -> DataPlaneInstance {
    let mut instance = DataPlaneInstance::new(id, format!("http://{id}:9192/control").parse().unwrap());
    for s in sources {
        instance = instance.allow_source(*s);
    }
    for d in dests {
        instance = instance.allow_dest(*d);
    }
    instance
}

fn http_to_s3(id: &str) -> TransferProcess {
    TransferProcess::new(
        id,
        DataAddress::new("HttpData").with_property("baseUrl", "http://provider/data"),
        DataAddress::new("S3").with_property("bucketName", "consumer-bucket"),
    )
    .with_transfer_type("S3-PUSH")
}

fn push_controller(
    instances: Vec<DataPlaneInstance>,
    factory: Arc<RecordingFactory>,
) -> PushDataFlowController {
    let selector = Arc::new(DataPlaneSelector::with_instances(
        Arc::new(FirstAvailable),
        instances,
    ));
    PushDataFlowController::new(selector, factory)
}

#[test]
fn qa_push_rejects_proxy_and_pull() {
    let controller = push_controller(vec![], Arc::new(RecordingFactory::default()));

    assert!(!controller.can_handle(&http_to_s3("tp-1").with_destination_type(HTTP_PROXY)));
    assert!(!controller.can_handle(&http_to_s3("tp-1").with_transfer_type("HttpData-PULL")));
    assert!(controller.can_handle(&http_to_s3("tp-1")));
}

#[tokio::test]
async fn qa_http_to_s3_dispatch_without_callback() {
    let factory = Arc::new(RecordingFactory::default());
    let controller = push_controller(
        vec![data_plane("dp-1", &["HttpData"], &["S3"])],
        factory.clone(),
    );

    let process = http_to_s3("tp-1");
    controller
        .initiate_flow(&process, &Policy::default())
        .await
        .expect("push flow should be dispatched");

    let transfers = factory.transfers.lock().unwrap();
    assert_eq!(transfers.len(), 1);
    let (instance_id, request) = &transfers[0];
    assert_eq!(instance_id, "dp-1");
    assert_eq!(request.source_data_address, process.content_data_address);
    assert_eq!(request.destination_data_address, process.data_destination);
    assert_eq!(request.transfer_type, process.transfer_type);
    assert!(request.callback_address.is_none());
}

#[tokio::test]
async fn qa_callback_address_from_config() {
    let factory = Arc::new(RecordingFactory::default());
    let selector = Arc::new(DataPlaneSelector::with_instances(
        Arc::new(RoundRobin::new()),
        vec![data_plane("dp-1", &["HttpData"], &["S3"])],
    ));
    let callback = StaticControlApiUrl::new(Some(
        "http://connector:8181/control/callback".parse().unwrap(),
    ));
    let controller = PushDataFlowController::new(selector, factory.clone())
        .with_callback_url(Arc::new(callback));

    controller
        .initiate_flow(&http_to_s3("tp-1"), &Policy::default())
        .await
        .unwrap();

    let transfers = factory.transfers.lock().unwrap();
    let json = serde_json::to_value(&transfers[0].1).unwrap();
    assert_eq!(json["callbackAddress"], "http://connector:8181/control/callback");
    assert_eq!(json["processId"], "tp-1");
}

#[tokio::test]
async fn qa_terminate_partial_failure_names_failing_instance() {
    let mut factory = RecordingFactory::default();
    factory
        .failing
        .insert("dp-2".to_string(), "connection refused".to_string());
    let factory = Arc::new(factory);

    let controller = push_controller(
        vec![
            data_plane("dp-1", &["HttpData"], &["S3"]),
            data_plane("dp-2", &["HttpData"], &["S3"]),
            data_plane("dp-3", &["S3"], &["HttpData"]),
        ],
        factory.clone(),
    );

    let err = controller.terminate(&http_to_s3("tp-9")).await.unwrap_err();
    match &err {
        FlowError::TerminationPartialFailure {
            failure,
            failed_instances,
        } => {
            assert_eq!(failure.reasons, vec!["connection refused".to_string()]);
            assert_eq!(failed_instances, &vec!["dp-2".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());

    let terminates = factory.terminates.lock().unwrap();
    let called: BTreeSet<&str> = terminates.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(called, BTreeSet::from(["dp-1", "dp-2", "dp-3"]));
    assert!(terminates.iter().all(|(_, process_id)| process_id == "tp-9"));
}

#[tokio::test]
async fn qa_terminate_empty_registry() {
    let controller = push_controller(vec![], Arc::new(RecordingFactory::default()));
    assert!(controller.terminate(&http_to_s3("tp-1")).await.is_ok());
}

#[test]
fn qa_transfer_types_for_asset() {
    let controller = push_controller(
        vec![
            data_plane("dp-s3", &["HttpData"], &["S3"]),
            data_plane("dp-http", &["HttpData"], &["HttpData"]),
        ],
        Arc::new(RecordingFactory::default()),
    );

    let asset = Asset::new("asset-1", DataAddress::new("HttpData"));
    assert_eq!(
        controller.transfer_types_for(&asset),
        BTreeSet::from(["S3-PUSH".to_string(), "HttpData-PUSH".to_string()])
    );

    let unmatched = Asset::new("asset-2", DataAddress::new("AzureStorage"));
    assert!(controller.transfer_types_for(&unmatched).is_empty());
}

#[tokio::test]
async fn qa_manager_reports_unhandled_process() {
    let mut manager = DataFlowManager::new();
    manager.register(Arc::new(push_controller(
        vec![data_plane("dp-1", &["HttpData"], &["S3"])],
        Arc::new(RecordingFactory::default()),
    )));

    let pull = http_to_s3("tp-pull").with_transfer_type("HttpData-PULL");
    let err = manager.initiate(&pull, &Policy::default()).await.unwrap_err();
    assert_eq!(err.code(), "NO_MATCHING_CONTROLLER");
}

#[test]
fn qa_dev_config_loads() {
    let config = AppConfig::load("dev").expect("config/dev.yaml should load");
    let selector = config.build_selector().unwrap();
    assert!(!selector.is_empty());
    assert!(selector.find_by_id("embedded").unwrap().is_embedded());
    assert!(
        selector
            .find_by_id("dp-http")
            .unwrap()
            .can_handle("HttpData", "AmazonS3")
    );
}
