//! Data Flow Control Plane
//!
//! Entry point: loads configuration, seeds the data plane selector and
//! registers the push controller.
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌────────────┐    ┌────────────┐
//! │ Process  │───▶│ FlowManager  │───▶│  Selector  │───▶│ Data Plane │
//! │  (JSON)  │    │ (first match)│    │ (src, dst) │    │  (client)  │
//! └──────────┘    └──────────────┘    └────────────┘    └────────────┘
//! ```
//!
//! Usage:
//! - `dataflow_control --env dev` prints the push transfer types per source type
//! - `dataflow_control --env dev --process tp.json` dispatches the process
//! - add `--terminate` to terminate it on every data plane instead

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;

use dataflow_control::client::{
    DefaultDataPlaneClientFactory, EmbeddedDataPlane, RemoteDataPlaneClientFactory,
};
use dataflow_control::config::AppConfig;
use dataflow_control::flow::{DataFlowManager, PushDataFlowController};
use dataflow_control::types::{Asset, DataAddress, Policy, TransferProcess};

fn get_arg(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if names.iter().any(|n| *n == args[i]) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn get_env() -> String {
    get_arg(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

fn use_terminate_mode() -> bool {
    std::env::args().any(|a| a == "--terminate")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env).context("loading configuration")?;
    let _log_guard = dataflow_control::logging::init_logging(&app_config)
        .context("installing log subscriber")?;

    tracing::info!("Starting data flow control plane in {} mode", env);

    let selector = app_config.build_selector()?;
    let remote = RemoteDataPlaneClientFactory::new(app_config.control.client_timeout())?;
    let factory = Arc::new(DefaultDataPlaneClientFactory::new(
        remote,
        Arc::new(EmbeddedDataPlane::new()),
    ));

    let push = PushDataFlowController::new(selector.clone(), factory)
        .with_callback_url(Arc::new(app_config.control.control_api_url()?))
        .require_callback(app_config.control.require_callback);

    let mut manager = DataFlowManager::new();
    manager.register(Arc::new(push));

    tracing::info!(
        data_planes = selector.len(),
        strategy = selector.strategy_name(),
        controllers = ?manager.controller_names(),
        "Flow control ready"
    );

    let Some(path) = get_arg(&["--process", "-p"]) else {
        let source_types: BTreeSet<String> = selector
            .get_all()
            .into_iter()
            .flat_map(|i| i.allowed_source_types)
            .collect();
        for source_type in source_types {
            let asset = Asset::new(source_type.clone(), DataAddress::new(source_type.clone()));
            let types: Vec<String> = manager.transfer_types_for(&asset).into_iter().collect();
            println!("{}: {}", source_type, types.join(", "));
        }
        return Ok(());
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading transfer process {}", path))?;
    let process: TransferProcess =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path))?;

    let outcome = if use_terminate_mode() {
        manager.terminate(&process).await.map(|()| "terminated".to_string())
    } else {
        manager
            .initiate(&process, &Policy::default())
            .await
            .map(|_| "dispatched".to_string())
    };

    match outcome {
        Ok(verdict) => {
            println!("{}: {}", process.id, verdict);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                process_id = %process.id,
                code = e.code(),
                retryable = e.is_retryable(),
                error = %e,
                "Flow request failed"
            );
            println!("{}: {} ({})", process.id, e.code(), e);
            for reason in e.reasons() {
                println!("  - {}", reason);
            }
            if !e.failed_instances().is_empty() {
                println!("  failed on: {}", e.failed_instances().join(", "));
            }
            Err(e.into())
        }
    }
}
