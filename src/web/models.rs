use axum::extract::Multipart;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use crate::registry::storage::PhotoUpload;
use crate::registry::InspectionStatus;
use crate::services::tool_service::{AddInspection, RegisterTool};
use crate::web::AppError;

pub const PHOTO_FIELD: &str = "photo";

#[derive(Deserialize, Debug, Default)]
pub struct ListToolsQuery {
    pub q: Option<String>,
}

/// Text fields and the optional photo of a multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    photo: Option<PhotoUpload>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = FormData::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == PHOTO_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers submit an empty part when no file was picked.
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.photo = Some(PhotoUpload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn status(&self, name: &str) -> Result<InspectionStatus, AppError> {
        match self.fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(value) => value.parse().map_err(AppError::InvalidInput),
            None => Ok(InspectionStatus::default()),
        }
    }

    fn date(&self, name: &str) -> Result<Option<NaiveDate>, AppError> {
        match self.fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| AppError::InvalidInput(format!("Invalid {name} '{value}', expected YYYY-MM-DD"))),
            None => Ok(None),
        }
    }

    pub fn into_register_tool(self) -> Result<RegisterTool, AppError> {
        Ok(RegisterTool {
            name: self.text("name"),
            category: self.text("category"),
            serial_number: self.fields.get("serial_number").cloned(),
            inspector_name: self.text("inspector_name"),
            inspection_status: self.status("inspection_status")?,
            inspection_notes: self.text("inspection_notes"),
            photo: self.photo,
        })
    }

    pub fn into_add_inspection(self) -> Result<AddInspection, AppError> {
        Ok(AddInspection {
            inspector_name: self.text("inspector_name"),
            inspection_date: self.date("inspection_date")?,
            status: self.status("status")?,
            notes: self.text("notes"),
            photo: self.photo,
        })
    }
}
