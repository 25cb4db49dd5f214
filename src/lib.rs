//! Data Flow Control Plane
//!
//! Decides how a transfer process moves its data (push or pull) and which
//! data plane executes it, dispatches the request, and coordinates
//! termination across data planes.
//!
//! # Modules
//!
//! - [`status`] - Success-or-failure results and their merge algebra
//! - [`error`] - Flow control and configuration errors
//! - [`types`] - Addresses, transfer processes, transfer types, wire requests
//! - [`selector`] - Registry of live data plane instances
//! - [`client`] - Data plane clients (HTTP and embedded) and their factories
//! - [`flow`] - Flow controllers, the ordered controller manager, push controller
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing subscriber setup

pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod logging;
pub mod selector;
pub mod status;
pub mod types;

// Convenient re-exports at crate root
pub use client::{
    DataPlaneClient, DataPlaneClientFactory, DefaultDataPlaneClientFactory, EmbeddedDataPlane,
    RemoteDataPlaneClientFactory,
};
pub use config::AppConfig;
pub use error::{ConfigError, FlowError};
pub use flow::{
    ControlApiUrl, DataFlowController, DataFlowManager, PushDataFlowController,
    StaticControlApiUrl,
};
pub use selector::{DataPlaneInstance, DataPlaneSelector, SelectionStrategy};
pub use status::{ResponseStatus, StatusFailure, StatusResult};
pub use types::{
    Asset, DataAddress, DataFlowRequest, DataFlowResponse, FlowType, HTTP_PROXY, Policy,
    TransferProcess, TransferType,
};
