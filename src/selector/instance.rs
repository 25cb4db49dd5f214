//! Data Plane Instance
//!
//! Registry entry describing one data plane and the address types it accepts.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use url::Url;

/// URL scheme marking a data plane that runs inside this process
pub const EMBEDDED_SCHEME: &str = "embedded";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPlaneInstance {
    /// Registry key; registering the same id again replaces the entry
    pub id: String,
    /// Control endpoint of the data plane
    pub url: Url,
    /// camelCase on the wire, snake_case accepted in YAML config
    #[serde(default, alias = "allowed_source_types")]
    pub allowed_source_types: BTreeSet<String>,
    #[serde(default, alias = "allowed_dest_types")]
    pub allowed_dest_types: BTreeSet<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl DataPlaneInstance {
    pub fn new(id: impl Into<String>, url: Url) -> Self {
        Self {
            id: id.into(),
            url,
            allowed_source_types: BTreeSet::new(),
            allowed_dest_types: BTreeSet::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn allow_source(mut self, source_type: impl Into<String>) -> Self {
        self.allowed_source_types.insert(source_type.into());
        self
    }

    pub fn allow_dest(mut self, dest_type: impl Into<String>) -> Self {
        self.allowed_dest_types.insert(dest_type.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn accepts_source(&self, source_type: &str) -> bool {
        self.allowed_source_types.contains(source_type)
    }

    #[inline]
    pub fn accepts_dest(&self, dest_type: &str) -> bool {
        self.allowed_dest_types.contains(dest_type)
    }

    /// True when this instance can move data from `source_type` to `dest_type`
    pub fn can_handle(&self, source_type: &str, dest_type: &str) -> bool {
        self.accepts_source(source_type) && self.accepts_dest(dest_type)
    }

    pub fn is_embedded(&self) -> bool {
        self.url.scheme() == EMBEDDED_SCHEME
    }
}
