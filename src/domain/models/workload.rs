//! Workload identity.
//!
//! A workload is a Kubernetes deployment, statefulset or daemonset. Newer
//! schedule records are keyed by the workload's stable uid; older ones were
//! keyed by a `type-name-direction` composite name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of Kubernetes workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "deploy", alias = "deployment")]
    Deploy,
    #[serde(rename = "sts", alias = "statefulset")]
    Sts,
    #[serde(rename = "ds", alias = "daemonset")]
    Ds,
}

impl ResourceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Sts => "sts",
            Self::Ds => "ds",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deploy" | "deployment" => Some(Self::Deploy),
            "sts" | "statefulset" => Some(Self::Sts),
            "ds" | "daemonset" => Some(Self::Ds),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which lifecycle action a schedule triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type, name and namespace of a workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Workload {
    pub resource_type: ResourceType,
    pub name: String,
    pub namespace: String,
}

impl Workload {
    pub fn new(
        resource_type: ResourceType,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            resource_type,
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// The `type-name-direction` name schedules were originally keyed by.
pub fn composite_name(resource_type: ResourceType, name: &str, direction: Direction) -> String {
    format!("{resource_type}-{name}-{direction}")
}

/// Split a composite name back into its parts.
///
/// The workload name itself may contain dashes, so only the first and last
/// segments are taken as type and direction.
pub fn parse_composite_name(composite: &str) -> Option<(ResourceType, String, Direction)> {
    let (resource_type, rest) = composite.split_once('-')?;
    let (name, direction) = rest.rsplit_once('-')?;
    if name.is_empty() {
        return None;
    }
    Some((
        ResourceType::from_str(resource_type)?,
        name.to_string(),
        Direction::from_str(direction)?,
    ))
}

/// How the editor identifies the workload it is editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum WorkloadIdentity {
    /// Keyed by the workload's stable uid.
    Uid {
        uid: String,
        workload: Workload,
        direction: Direction,
    },
    /// Keyed by type, name and direction (composite name).
    Composite {
        workload: Workload,
        direction: Direction,
    },
}

impl WorkloadIdentity {
    pub const fn workload(&self) -> &Workload {
        match self {
            Self::Uid { workload, .. } | Self::Composite { workload, .. } => workload,
        }
    }

    pub const fn direction(&self) -> Direction {
        match self {
            Self::Uid { direction, .. } | Self::Composite { direction, .. } => *direction,
        }
    }

    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::Uid { uid, .. } => Some(uid),
            Self::Composite { .. } => None,
        }
    }

    /// Name synthesized for a newly created record.
    pub fn composite_name(&self) -> String {
        let workload = self.workload();
        composite_name(workload.resource_type, &workload.name, self.direction())
    }

    /// Short label for logs and messages.
    pub fn label(&self) -> String {
        match self {
            Self::Uid { uid, .. } => format!("uid={uid}"),
            Self::Composite { .. } => format!("name={}", self.composite_name()),
        }
    }

    /// Reason this identity cannot be resolved against the store, if any.
    pub fn unresolved_reason(&self) -> Option<String> {
        if let Self::Uid { uid, .. } = self {
            if uid.trim().is_empty() {
                return Some("workload uid is empty".to_string());
            }
        }
        let workload = self.workload();
        if workload.name.trim().is_empty() {
            return Some("workload name is empty".to_string());
        }
        if workload.namespace.trim().is_empty() {
            return Some(format!("namespace of workload '{}' is empty", workload.name));
        }
        None
    }
}
