//! Identifiers for REST resources and reports.
//!
//! Both sets are closed enumerations of the endpoints the client knows about,
//! with a `Custom` variant for anything the API adds later. The server is the
//! only authority on whether a name is valid.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Resource collection an operation targets, e.g. `timesheets`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Users,
    CurrentUser,
    EffectiveSettings,
    Jobcodes,
    JobcodeAssignments,
    CustomFields,
    CustomFieldItems,
    Timesheets,
    TimesheetsDeleted,
    Geolocations,
    LastModifiedTimestamps,
    Notifications,
    Reminders,
    /// Any endpoint not listed above
    Custom(String),
}

impl ObjectType {
    /// Every known resource, in API documentation order
    pub const KNOWN: [ObjectType; 13] = [
        ObjectType::Users,
        ObjectType::CurrentUser,
        ObjectType::EffectiveSettings,
        ObjectType::Jobcodes,
        ObjectType::JobcodeAssignments,
        ObjectType::CustomFields,
        ObjectType::CustomFieldItems,
        ObjectType::Timesheets,
        ObjectType::TimesheetsDeleted,
        ObjectType::Geolocations,
        ObjectType::LastModifiedTimestamps,
        ObjectType::Notifications,
        ObjectType::Reminders,
    ];

    /// Path segment sent on the wire
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Users => "users",
            ObjectType::CurrentUser => "current_user",
            ObjectType::EffectiveSettings => "effective_settings",
            ObjectType::Jobcodes => "jobcodes",
            ObjectType::JobcodeAssignments => "jobcode_assignments",
            ObjectType::CustomFields => "customfields",
            ObjectType::CustomFieldItems => "customfielditems",
            ObjectType::Timesheets => "timesheets",
            ObjectType::TimesheetsDeleted => "timesheets_deleted",
            ObjectType::Geolocations => "geolocations",
            ObjectType::LastModifiedTimestamps => "last_modified_timestamps",
            ObjectType::Notifications => "notifications",
            ObjectType::Reminders => "reminders",
            ObjectType::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ObjectType::Custom(_))
    }
}

impl From<&str> for ObjectType {
    fn from(s: &str) -> Self {
        ObjectType::KNOWN
            .into_iter()
            .find(|known| known.as_str() == s)
            .unwrap_or_else(|| ObjectType::Custom(s.to_string()))
    }
}

impl From<String> for ObjectType {
    fn from(s: String) -> Self {
        ObjectType::from(s.as_str())
    }
}

impl From<&ObjectType> for ObjectType {
    fn from(object_type: &ObjectType) -> Self {
        object_type.clone()
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ObjectType::from)
    }
}

/// Report to run under `reports/`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportType {
    Project,
    Payroll,
    CurrentTotals,
    /// Any report not listed above; may already carry the `reports/` prefix
    Custom(String),
}

impl ReportType {
    pub const KNOWN: [ReportType; 3] =
        [ReportType::Project, ReportType::Payroll, ReportType::CurrentTotals];

    pub fn as_str(&self) -> &str {
        match self {
            ReportType::Project => "project",
            ReportType::Payroll => "payroll",
            ReportType::CurrentTotals => "current_totals",
            ReportType::Custom(name) => name,
        }
    }

    /// Endpoint path for this report, always rooted at `reports/`
    pub fn endpoint(&self) -> String {
        let name = self.as_str();
        if name.starts_with("reports/") {
            name.to_string()
        } else {
            format!("reports/{name}")
        }
    }
}

impl From<&str> for ReportType {
    fn from(s: &str) -> Self {
        ReportType::KNOWN
            .into_iter()
            .find(|known| known.as_str() == s)
            .unwrap_or_else(|| ReportType::Custom(s.to_string()))
    }
}

impl From<String> for ReportType {
    fn from(s: String) -> Self {
        ReportType::from(s.as_str())
    }
}

impl From<&ReportType> for ReportType {
    fn from(report_type: &ReportType) -> Self {
        report_type.clone()
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
