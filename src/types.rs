//! Core Types
//!
//! Data model shared by the selector, the data plane clients and the flow
//! controllers. Everything here is read-only input or a per-call value; no
//! type in this module is persisted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Destination type reserved for consumer-pull transfers through the proxy endpoint
pub const HTTP_PROXY: &str = "HttpProxy";

/// Endpoint description: protocol type plus location and credential references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAddress {
    #[serde(rename = "type")]
    pub address_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl DataAddress {
    pub fn new(address_type: impl Into<String>) -> Self {
        Self {
            address_type: address_type.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn address_type(&self) -> &str {
        &self.address_type
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Logical data item offered by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub data_address: DataAddress,
}

impl Asset {
    pub fn new(id: impl Into<String>, data_address: DataAddress) -> Self {
        Self {
            id: id.into(),
            data_address,
        }
    }
}

/// Snapshot of a transfer process owned by the transfer state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProcess {
    pub id: String,
    /// `"<Kind>-<PUSH|PULL>"`; absent for processes created before transfer types existed
    #[serde(default)]
    pub transfer_type: Option<String>,
    pub destination_type: String,
    pub content_data_address: DataAddress,
    pub data_destination: DataAddress,
}

impl TransferProcess {
    /// Process whose destination type is taken from the destination address
    pub fn new(id: impl Into<String>, source: DataAddress, destination: DataAddress) -> Self {
        Self {
            id: id.into(),
            transfer_type: None,
            destination_type: destination.address_type.clone(),
            content_data_address: source,
            data_destination: destination,
        }
    }

    pub fn with_transfer_type(mut self, transfer_type: impl Into<String>) -> Self {
        self.transfer_type = Some(transfer_type.into());
        self
    }

    pub fn with_destination_type(mut self, destination_type: impl Into<String>) -> Self {
        self.destination_type = destination_type.into();
        self
    }

    /// Parsed transfer type, `None` when absent or malformed
    pub fn parsed_transfer_type(&self) -> Option<TransferType> {
        self.transfer_type.as_deref().and_then(|t| t.parse().ok())
    }
}

/// Contract policy; opaque to flow control and passed through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policy(pub serde_json::Value);

/// Direction of a data flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlowType {
    /// The data plane sends data to the destination
    Push,
    /// The destination fetches data from an endpoint the data plane exposes
    Pull,
}

impl FlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Push => "PUSH",
            FlowType::Pull => "PULL",
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferTypeError {
    #[error("Transfer type `{0}` has no flow suffix")]
    MissingFlow(String),

    #[error("Transfer type `{0}` has an empty kind")]
    EmptyKind(String),

    #[error("Unknown flow type `{0}`")]
    UnknownFlow(String),
}

impl FromStr for FlowType {
    type Err = TransferTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUSH" => Ok(FlowType::Push),
            "PULL" => Ok(FlowType::Pull),
            other => Err(TransferTypeError::UnknownFlow(other.to_string())),
        }
    }
}

/// Parsed `"<Kind>-<PUSH|PULL>"` transfer type, e.g. `HttpData-PULL`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferType {
    pub kind: String,
    pub flow: FlowType,
}

impl TransferType {
    pub fn new(kind: impl Into<String>, flow: FlowType) -> Self {
        Self {
            kind: kind.into(),
            flow,
        }
    }

    pub fn push(kind: impl Into<String>) -> Self {
        Self::new(kind, FlowType::Push)
    }

    pub fn pull(kind: impl Into<String>) -> Self {
        Self::new(kind, FlowType::Pull)
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.flow)
    }
}

impl FromStr for TransferType {
    type Err = TransferTypeError;

    /// Splits at the last `-` so kinds may themselves contain dashes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, flow) = s
            .rsplit_once('-')
            .ok_or_else(|| TransferTypeError::MissingFlow(s.to_string()))?;
        if kind.is_empty() {
            return Err(TransferTypeError::EmptyKind(s.to_string()));
        }
        Ok(Self::new(kind, flow.parse()?))
    }
}

/// Request dispatched to a data plane; built fresh for every dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFlowRequest {
    #[serde(rename = "requestId")]
    pub id: Uuid,
    pub process_id: String,
    pub trackable: bool,
    pub source_data_address: DataAddress,
    pub destination_data_address: DataAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_address: Option<Url>,
}

impl DataFlowRequest {
    /// Trackable request for `process` with a newly generated request id
    pub fn for_process(process: &TransferProcess, callback_address: Option<Url>) -> Self {
        Self {
            id: Uuid::new_v4(),
            process_id: process.id.clone(),
            trackable: true,
            source_data_address: process.content_data_address.clone(),
            destination_data_address: process.data_destination.clone(),
            transfer_type: process.transfer_type.clone(),
            callback_address,
        }
    }
}

/// Controller response to a successful initiation
///
/// Push flows carry no payload; pull flows would return the endpoint address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFlowResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_address: Option<DataAddress>,
}
