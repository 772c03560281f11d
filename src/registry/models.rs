use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::RegistryError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    #[default]
    Passed,
    Failed,
    NeedsRepair,
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionStatus::Passed => "passed",
            InspectionStatus::Failed => "failed",
            InspectionStatus::NeedsRepair => "needs_repair",
        }
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InspectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "passed" => Ok(InspectionStatus::Passed),
            "failed" => Ok(InspectionStatus::Failed),
            "needs_repair" => Ok(InspectionStatus::NeedsRepair),
            other => Err(format!("Unknown inspection status '{other}'")),
        }
    }
}

/// A registered tool. The barcode never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tool {
    pub id: String,
    pub barcode: String,
    pub name: String,
    pub category: String,
    pub serial_number: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub id: String,
    pub tool_id: String,
    pub inspector_name: String,
    pub inspection_date: NaiveDate,
    pub status: InspectionStatus,
    pub notes: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `tools` row as the registry returns it, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRow {
    pub id: String,
    pub barcode: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `inspections` row as the registry returns it, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectionRow {
    pub id: String,
    pub tool_id: String,
    pub inspector_name: String,
    pub inspection_date: NaiveDate,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn require(field: &str, value: String) -> Result<String, RegistryError> {
    if value.trim().is_empty() {
        Err(RegistryError::InvalidRecord(format!("{field} is empty")))
    } else {
        Ok(value)
    }
}

impl TryFrom<ToolRow> for Tool {
    type Error = RegistryError;

    fn try_from(row: ToolRow) -> Result<Self, Self::Error> {
        Ok(Tool {
            id: require("tool id", row.id)?,
            barcode: require("tool barcode", row.barcode)?,
            name: row.name,
            category: row.category,
            serial_number: non_blank(row.serial_number),
            photo_url: non_blank(row.photo_url),
            created_at: row.created_at,
            updated_at: row.updated_at.unwrap_or(row.created_at),
        })
    }
}

impl TryFrom<InspectionRow> for Inspection {
    type Error = RegistryError;

    fn try_from(row: InspectionRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(RegistryError::InvalidRecord)?;
        Ok(Inspection {
            id: require("inspection id", row.id)?,
            tool_id: require("inspection tool_id", row.tool_id)?,
            inspector_name: row.inspector_name,
            inspection_date: row.inspection_date,
            status,
            notes: row.notes.unwrap_or_default(),
            photo_url: non_blank(row.photo_url),
            created_at: row.created_at,
        })
    }
}

/// Insert payload for `tools`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTool {
    pub barcode: String,
    pub name: String,
    pub category: String,
    pub serial_number: Option<String>,
    pub photo_url: Option<String>,
}

/// Insert payload for `inspections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewInspection {
    pub tool_id: String,
    pub inspector_name: String,
    pub inspection_date: NaiveDate,
    pub status: InspectionStatus,
    pub notes: String,
    pub photo_url: Option<String>,
}
