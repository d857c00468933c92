//! Resource data model
//!
//! Traits every cacheable resource implements, the id-or-name lookup key,
//! and the schema-less resource type used when no typed model exists.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A remote resource uniquely identified by a positive integer id
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> u64;
}

/// A resource that may also carry a name, unique within its category
/// when compared case-insensitively
pub trait NamedResource: Resource {
    fn name(&self) -> Option<&str>;
}

/// Normalize a resource name for index lookups
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Lookup key accepted by named endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Id(u64),
    Name(String),
}

impl From<u64> for ResourceKey {
    fn from(id: u64) -> Self {
        ResourceKey::Id(id)
    }
}

impl From<&str> for ResourceKey {
    fn from(name: &str) -> Self {
        ResourceKey::Name(name.to_string())
    }
}

impl From<String> for ResourceKey {
    fn from(name: String) -> Self {
        ResourceKey::Name(name)
    }
}

impl FromStr for ResourceKey {
    type Err = Infallible;

    /// All-digit input becomes an id, anything else a name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = s.parse() {
                return Ok(ResourceKey::Id(id));
            }
        }
        Ok(ResourceKey::Name(s.to_string()))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Id(id) => write!(f, "{}", id),
            ResourceKey::Name(name) => f.write_str(name),
        }
    }
}

/// Reference to a resource as it appears in listing results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
}

impl ResourceRef {
    /// Id parsed from the last path segment of `url`, if numeric
    pub fn id(&self) -> Option<u64> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
    }
}

/// Schema-less resource: `id`, optional `name`, everything else kept as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericResource {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Resource for GenericResource {
    fn id(&self) -> u64 {
        self.id
    }
}

impl NamedResource for GenericResource {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
