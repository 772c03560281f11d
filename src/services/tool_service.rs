use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::ServiceError;
use crate::barcode::generate_barcode;
use crate::registry::storage::{self, PhotoUpload};
use crate::registry::{Inspection, InspectionStatus, NewInspection, NewTool, Registry, Tool};

pub const TOOL_NOT_FOUND: &str = "Tool not found. Please check the barcode and try again.";

/// Registration form: the tool plus its first inspection.
#[derive(Debug, Clone, Default)]
pub struct RegisterTool {
    pub name: String,
    pub category: String,
    pub serial_number: Option<String>,
    pub photo: Option<PhotoUpload>,
    pub inspector_name: String,
    pub inspection_status: InspectionStatus,
    pub inspection_notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct AddInspection {
    pub inspector_name: String,
    /// Defaults to today (UTC).
    pub inspection_date: Option<NaiveDate>,
    pub status: InspectionStatus,
    pub notes: String,
    pub photo: Option<PhotoUpload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredTool {
    pub tool: Tool,
    pub inspection: Inspection,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDetails {
    pub tool: Tool,
    pub inspections: Vec<Inspection>,
}

fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Registers a tool under a fresh barcode and records its initial inspection.
///
/// The steps are not transactional. A failure after the tool row exists
/// leaves the tool without an initial inspection.
pub async fn register_tool(
    registry: &dyn Registry,
    form: RegisterTool,
) -> Result<RegisteredTool, ServiceError> {
    let name = required("Tool name", &form.name)?;
    let category = required("Category", &form.category)?;
    let inspector_name = required("Inspector name", &form.inspector_name)?;

    let barcode = generate_barcode();

    let photo_url = match form.photo {
        Some(photo) => {
            let path = storage::tool_photo_path(&barcode, &photo.extension());
            let content_type = photo.content_type();
            Some(registry.upload_photo(&path, photo.bytes, &content_type).await?)
        }
        None => None,
    };

    let tool = registry
        .create_tool(NewTool {
            barcode: barcode.clone(),
            name,
            category,
            serial_number: optional(form.serial_number),
            photo_url,
        })
        .await?;
    info!(barcode = %tool.barcode, id = %tool.id, "Tool registered.");

    let inspection = registry
        .create_inspection(NewInspection {
            tool_id: tool.id.clone(),
            inspector_name,
            inspection_date: Utc::now().date_naive(),
            status: form.inspection_status,
            notes: form.inspection_notes.trim().to_string(),
            photo_url: None,
        })
        .await
        .map_err(|e| {
            warn!(barcode = %tool.barcode, error = %e, "Tool created without its initial inspection.");
            e
        })?;

    Ok(RegisteredTool { tool, inspection })
}

/// Looks a tool up by a scanned or typed barcode.
pub async fn find_tool(registry: &dyn Registry, raw_barcode: &str) -> Result<Tool, ServiceError> {
    let barcode = raw_barcode.trim();
    if barcode.is_empty() {
        return Err(ServiceError::InvalidInput("Barcode is required".to_string()));
    }
    registry
        .find_tool_by_barcode(barcode)
        .await?
        .ok_or_else(|| ServiceError::NotFound(TOOL_NOT_FOUND.to_string()))
}

/// Reloads the tool list, optionally filtered by a case-insensitive substring
/// of name, barcode or category.
pub async fn list_tools(registry: &dyn Registry, query: Option<&str>) -> Result<Vec<Tool>, ServiceError> {
    let tools = registry.list_tools().await?;
    let Some(needle) = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty()) else {
        return Ok(tools);
    };
    Ok(tools
        .into_iter()
        .filter(|tool| {
            tool.name.to_lowercase().contains(&needle)
                || tool.barcode.to_lowercase().contains(&needle)
                || tool.category.to_lowercase().contains(&needle)
        })
        .collect())
}

pub async fn tool_details(registry: &dyn Registry, barcode: &str) -> Result<ToolDetails, ServiceError> {
    let tool = find_tool(registry, barcode).await?;
    let inspections = registry.list_inspections(&tool.id).await?;
    Ok(ToolDetails { tool, inspections })
}

/// Appends an inspection to the tool identified by `barcode`.
pub async fn add_inspection(
    registry: &dyn Registry,
    barcode: &str,
    form: AddInspection,
) -> Result<Inspection, ServiceError> {
    let inspector_name = required("Inspector name", &form.inspector_name)?;
    let tool = find_tool(registry, barcode).await?;

    let photo_url = match form.photo {
        Some(photo) => {
            let path = storage::inspection_photo_path(Utc::now(), &photo.extension());
            let content_type = photo.content_type();
            Some(registry.upload_photo(&path, photo.bytes, &content_type).await?)
        }
        None => None,
    };

    let inspection = registry
        .create_inspection(NewInspection {
            tool_id: tool.id,
            inspector_name,
            inspection_date: form.inspection_date.unwrap_or_else(|| Utc::now().date_naive()),
            status: form.status,
            notes: form.notes.trim().to_string(),
            photo_url,
        })
        .await?;
    info!(barcode = %tool.barcode, status = %inspection.status, "Inspection recorded.");
    Ok(inspection)
}
