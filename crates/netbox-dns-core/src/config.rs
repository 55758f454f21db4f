//! Configuration types for the NetBox DNS source
//!
//! This module defines the configuration consumed when a source is
//! constructed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Which zones a source looks at, by DNS view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewSelector {
    /// No view filter
    #[default]
    Any,
    /// Only zones without a view
    Unassigned,
    /// Only zones in the named view
    Named(String),
}

impl ViewSelector {
    pub fn is_any(&self) -> bool {
        matches!(self, ViewSelector::Any)
    }

    /// Parse the environment spelling: `null` means zones without a view
    pub fn from_env_value(value: &str) -> Self {
        if value == "null" {
            ViewSelector::Unassigned
        } else {
            ViewSelector::Named(value.to_string())
        }
    }
}

impl fmt::Display for ViewSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewSelector::Any => write!(f, "any"),
            ViewSelector::Unassigned => write!(f, "null"),
            ViewSelector::Named(name) => write!(f, "{}", name),
        }
    }
}

// Only reached for a present field; an absent field takes the default.
fn deserialize_view<'de, D>(deserializer: D) -> std::result::Result<ViewSelector, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<String>::deserialize(deserializer)? {
        Some(name) => ViewSelector::Named(name),
        None => ViewSelector::Unassigned,
    })
}

fn serialize_view<S>(view: &ViewSelector, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match view {
        ViewSelector::Named(name) => serializer.serialize_some(name),
        _ => serializer.serialize_none(),
    }
}

fn default_ttl() -> u32 {
    3600
}

/// Connection and translation settings of a NetBox DNS source
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the NetBox instance
    pub url: String,

    /// API token
    pub token: String,

    /// View filter for zone lookups
    #[serde(
        default,
        deserialize_with = "deserialize_view",
        serialize_with = "serialize_view",
        skip_serializing_if = "ViewSelector::is_any"
    )]
    pub view: ViewSelector,

    /// Default TTL for zones that report none
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Append the zone name to relative CNAME, MX and SRV targets
    #[serde(default)]
    pub make_absolute: bool,

    /// Let populated records replace same-key records already in the zone
    #[serde(default)]
    pub replace_duplicates: bool,
}

impl SourceConfig {
    /// Create a configuration with defaults for everything but the endpoint
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            view: ViewSelector::Any,
            ttl: default_ttl(),
            make_absolute: false,
            replace_duplicates: false,
        }
    }

    pub fn with_view(mut self, view: ViewSelector) -> Self {
        self.view = view;
        self
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: SourceConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::config("NetBox URL cannot be empty"));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(Error::config(format!(
                "NetBox URL must use http or https: {}",
                self.url
            )));
        }
        if self.token.is_empty() {
            return Err(Error::config("NetBox API token cannot be empty"));
        }
        if let ViewSelector::Named(name) = &self.view
            && name.is_empty()
        {
            return Err(Error::config("View name cannot be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("url", &self.url)
            .field("token", &"<REDACTED>")
            .field("view", &self.view)
            .field("ttl", &self.ttl)
            .field("make_absolute", &self.make_absolute)
            .field("replace_duplicates", &self.replace_duplicates)
            .finish()
    }
}
