//! Callback address of this connector's control endpoint
//!
//! Data planes report flow completion to this address.

use url::Url;

pub trait ControlApiUrl: Send + Sync {
    fn get(&self) -> Option<Url>;
}

/// Fixed address taken from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticControlApiUrl(Option<Url>);

impl StaticControlApiUrl {
    pub fn new(url: Option<Url>) -> Self {
        Self(url)
    }
}

impl ControlApiUrl for StaticControlApiUrl {
    fn get(&self) -> Option<Url> {
        self.0.clone()
    }
}
