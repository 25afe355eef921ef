//! Schedule records as stored by the Schedule Store.
//!
//! Two backend contract versions coexist. The legacy shape carries a single
//! `cron` field bounded by `start_time`/`end_time` and is keyed by a composite
//! name; the uid shape carries independent `cron_start`/`cron_stop` fields and
//! is keyed by the workload uid. [`ScheduleRecord`] is a tagged variant over
//! both so payload shaping can branch on the tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::workload::{parse_composite_name, Direction, ResourceType, Workload};

/// Backend schema generation a session or record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaGeneration {
    /// Single `cron` field, composite-name lookup, empty expression invalid.
    Legacy,
    /// `cron_start`/`cron_stop` pair keyed by uid, empty expression means unscheduled.
    #[default]
    Uid,
}

impl SchemaGeneration {
    pub const fn empty_means_unscheduled(self) -> bool {
        matches!(self, Self::Uid)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Uid => "uid",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "legacy" => Some(Self::Legacy),
            "uid" => Some(Self::Uid),
            _ => None,
        }
    }
}

/// Backend-assigned schedule id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub i64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derived scheduling status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScheduleStatus {
    #[serde(rename = "scheduled")]
    Scheduled,
    #[default]
    #[serde(rename = "not scheduled", alias = "not_scheduled")]
    NotScheduled,
}

impl ScheduleStatus {
    /// Status implied by a set of cron fields: scheduled iff any is non-empty.
    pub fn from_crons<'a>(crons: impl IntoIterator<Item = &'a str>) -> Self {
        if crons.into_iter().any(|c| !c.trim().is_empty()) {
            Self::Scheduled
        } else {
            Self::NotScheduled
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::NotScheduled => "not scheduled",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uid-keyed record with independent start/stop expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UidSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ScheduleId>,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "workloadUid")]
    pub uid: String,
    #[serde(default, alias = "resourceType", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(default, alias = "resourceName", skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, alias = "resourceNamespace", skip_serializing_if = "Option::is_none")]
    pub resource_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, alias = "cronStart", deserialize_with = "nullable_string")]
    pub cron_start: String,
    #[serde(default, alias = "cronStop", deserialize_with = "nullable_string")]
    pub cron_stop: String,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(
        default,
        alias = "lastUpdate",
        with = "flexible_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_update: Option<DateTime<Utc>>,
}

/// Composite-name keyed record with a single expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ScheduleId>,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        alias = "startTime",
        with = "flexible_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "endTime",
        with = "flexible_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub cron: String,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, alias = "resourceType", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(default, alias = "resourceName", skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, alias = "resourceNamespace", skip_serializing_if = "Option::is_none")]
    pub resource_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

const fn default_active() -> bool {
    true
}

impl LegacySchedule {
    /// Type, name and direction of the workload, falling back to the composite name.
    pub fn resolved_parts(&self) -> Option<(ResourceType, String, Direction)> {
        let parsed = parse_composite_name(&self.name);
        let resource_type = self
            .resource_type
            .or_else(|| parsed.as_ref().map(|p| p.0))?;
        let name = self
            .resource_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| parsed.as_ref().map(|p| p.1.clone()))?;
        let direction = self.direction.or_else(|| parsed.as_ref().map(|p| p.2))?;
        Some((resource_type, name, direction))
    }
}

/// A stored schedule in either backend shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScheduleRecord {
    Legacy(LegacySchedule),
    Uid(UidSchedule),
}

impl ScheduleRecord {
    pub const fn generation(&self) -> SchemaGeneration {
        match self {
            Self::Legacy(_) => SchemaGeneration::Legacy,
            Self::Uid(_) => SchemaGeneration::Uid,
        }
    }

    pub const fn id(&self) -> Option<ScheduleId> {
        match self {
            Self::Legacy(r) => r.id,
            Self::Uid(r) => r.id,
        }
    }

    pub fn set_id(&mut self, id: ScheduleId) {
        match self {
            Self::Legacy(r) => r.id = Some(id),
            Self::Uid(r) => r.id = Some(id),
        }
    }

    /// Empty every cron field and mark the record not scheduled.
    pub fn clear_crons(&mut self) {
        match self {
            Self::Legacy(r) => {
                r.cron.clear();
                r.status = ScheduleStatus::NotScheduled;
            }
            Self::Uid(r) => {
                r.cron_start.clear();
                r.cron_stop.clear();
                r.status = ScheduleStatus::NotScheduled;
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Legacy(r) => &r.name,
            Self::Uid(r) => &r.name,
        }
    }

    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::Legacy(_) => None,
            Self::Uid(r) => Some(&r.uid),
        }
    }

    /// Status as stored by the backend.
    pub const fn stored_status(&self) -> ScheduleStatus {
        match self {
            Self::Legacy(r) => r.status,
            Self::Uid(r) => r.status,
        }
    }

    /// Status implied by the record's cron fields.
    pub fn computed_status(&self) -> ScheduleStatus {
        ScheduleStatus::from_crons(self.cron_fields())
    }

    /// Whether the stored status disagrees with the cron fields.
    pub fn status_drifted(&self) -> bool {
        self.stored_status() != self.computed_status()
    }

    /// Overwrite the stored status with the one implied by the cron fields.
    pub fn recompute_status(&mut self) {
        let status = self.computed_status();
        match self {
            Self::Legacy(r) => r.status = status,
            Self::Uid(r) => r.status = status,
        }
    }

    pub const fn active(&self) -> bool {
        match self {
            Self::Legacy(r) => r.active,
            Self::Uid(r) => r.active,
        }
    }

    /// Raw cron fields carried by this shape.
    pub fn cron_fields(&self) -> Vec<&str> {
        match self {
            Self::Legacy(r) => vec![r.cron.as_str()],
            Self::Uid(r) => vec![r.cron_start.as_str(), r.cron_stop.as_str()],
        }
    }

    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Self::Legacy(r) => r.direction,
            Self::Uid(r) => r.direction,
        }
    }

    /// The workload this record is attached to, when it can be determined.
    pub fn workload(&self) -> Option<Workload> {
        match self {
            Self::Legacy(r) => {
                let (resource_type, name, _) = r.resolved_parts()?;
                Some(Workload::new(
                    resource_type,
                    name,
                    r.resource_namespace.clone().unwrap_or_default(),
                ))
            }
            Self::Uid(r) => Some(Workload::new(
                r.resource_type?,
                r.resource_name.clone()?,
                r.resource_namespace.clone().unwrap_or_default(),
            )),
        }
    }

    /// Whether this record belongs to the given workload and direction.
    ///
    /// Legacy names carry no namespace, so a record without one matches any.
    pub fn belongs_to(&self, target: &Workload, direction: Direction) -> bool {
        let Some(workload) = self.workload() else {
            return false;
        };
        self.resolved_direction() == Some(direction)
            && workload.resource_type == target.resource_type
            && workload.name == target.name
            && (workload.namespace.is_empty() || workload.namespace == target.namespace)
    }

    /// Direction resolved the same way as [`workload`](Self::workload).
    pub fn resolved_direction(&self) -> Option<Direction> {
        match self {
            Self::Legacy(r) => r.resolved_parts().map(|p| p.2),
            Self::Uid(r) => r.direction,
        }
    }
}

impl<'de> Deserialize<'de> for ScheduleRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let value = serde_json::Value::deserialize(deserializer)?;
        let object = value
            .as_object()
            .ok_or_else(|| D::Error::custom("schedule record must be a JSON object"))?;

        let is_uid_shape = ["uid", "workloadUid", "cron_start", "cron_stop", "cronStart", "cronStop"]
            .iter()
            .any(|key| object.contains_key(*key));

        if is_uid_shape {
            serde_json::from_value(value)
                .map(Self::Uid)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Legacy)
                .map_err(D::Error::custom)
        }
    }
}

/// `null` and missing both map to the empty (Unscheduled) expression.
fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps from the backend may be RFC 3339 or naive (assumed UTC).
mod flexible_datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => s.serialize_str(&dt.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        use serde::de::Error;

        let Some(raw) = Option::<String>::deserialize(d)? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Some(naive.and_utc()))
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classifies_uid_shape() {
        let record: ScheduleRecord = serde_json::from_value(json!({
            "id": 7,
            "name": "deploy-web-up",
            "uid": "w1",
            "cron_start": "0 9 * * 1-5",
            "cron_stop": null,
            "status": "scheduled",
            "active": true,
            "last_update": "2025-03-01T10:00:00"
        }))
        .unwrap();

        let ScheduleRecord::Uid(uid) = &record else {
            panic!("expected uid shape");
        };
        assert_eq!(uid.id, Some(ScheduleId(7)));
        assert_eq!(uid.cron_stop, "");
        assert!(uid.last_update.is_some());
        assert_eq!(record.computed_status(), ScheduleStatus::Scheduled);
        assert!(!record.status_drifted());
    }

    #[test]
    fn test_classifies_legacy_shape() {
        let record: ScheduleRecord = serde_json::from_value(json!({
            "id": 3,
            "name": "sts-redis-cache-down",
            "start_time": "2025-01-01T00:00:00Z",
            "end_time": "2026-01-01T00:00:00Z",
            "cron": "*/5 * * * *",
            "status": "scheduled",
            "active": true
        }))
        .unwrap();

        assert_eq!(record.generation(), SchemaGeneration::Legacy);
        let workload = record.workload().unwrap();
        assert_eq!(workload.resource_type, ResourceType::Sts);
        assert_eq!(workload.name, "redis-cache");
        assert_eq!(record.resolved_direction(), Some(Direction::Down));
    }

    #[test]
    fn test_accepts_camel_case_aliases() {
        let record: ScheduleRecord = serde_json::from_value(json!({
            "workloadUid": "w2",
            "cronStart": "",
            "cronStop": "0 18 * * *",
            "resourceType": "deploy",
            "resourceName": "web",
            "resourceNamespace": "prod"
        }))
        .unwrap();
        assert_eq!(record.uid(), Some("w2"));
        assert_eq!(record.stored_status(), ScheduleStatus::NotScheduled);
        assert!(record.status_drifted());
    }

    #[test]
    fn test_serializes_wire_names() {
        let record = ScheduleRecord::Uid(UidSchedule {
            id: None,
            name: "deploy-web-up".to_string(),
            uid: "w1".to_string(),
            resource_type: Some(ResourceType::Deploy),
            resource_name: Some("web".to_string()),
            resource_namespace: Some("prod".to_string()),
            direction: Some(Direction::Up),
            cron_start: "0 9 * * 1-5".to_string(),
            cron_stop: String::new(),
            status: ScheduleStatus::Scheduled,
            active: true,
            last_update: None,
        });
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["uid"], "w1");
        assert_eq!(value["cron_start"], "0 9 * * 1-5");
        assert_eq!(value["cron_stop"], "");
        assert_eq!(value["status"], "scheduled");
        assert_eq!(value["resource_type"], "deploy");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_recompute_status_follows_crons() {
        let mut record: ScheduleRecord = serde_json::from_value(json!({
            "uid": "w1",
            "cron_start": "",
            "cron_stop": "0 18 * * *",
            "status": "not scheduled"
        }))
        .unwrap();
        assert!(record.status_drifted());

        record.recompute_status();
        assert_eq!(record.stored_status(), ScheduleStatus::Scheduled);
        assert!(!record.status_drifted());
    }

    #[test]
    fn test_status_from_crons() {
        assert_eq!(ScheduleStatus::from_crons(["", " "]), ScheduleStatus::NotScheduled);
        assert_eq!(ScheduleStatus::from_crons(["", "0 0 * * *"]), ScheduleStatus::Scheduled);
    }

    #[test]
    fn test_belongs_to_prefers_explicit_fields() {
        let legacy = LegacySchedule {
            id: Some(ScheduleId(1)),
            name: "renamed-by-hand".to_string(),
            start_time: None,
            end_time: None,
            cron: "0 0 * * *".to_string(),
            status: ScheduleStatus::Scheduled,
            active: true,
            resource_type: Some(ResourceType::Deploy),
            resource_name: Some("web".to_string()),
            resource_namespace: Some("prod".to_string()),
            direction: Some(Direction::Up),
        };
        let record = ScheduleRecord::Legacy(legacy);
        let workload = Workload::new(ResourceType::Deploy, "web", "prod");
        assert!(record.belongs_to(&workload, Direction::Up));
        assert!(!record.belongs_to(&workload, Direction::Down));
        assert!(!record.belongs_to(&Workload::new(ResourceType::Deploy, "web", "staging"), Direction::Up));
    }
}
