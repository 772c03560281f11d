#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use toolcheck::registry::{Inspection, NewInspection, NewTool, Registry, RegistryError, Tool};

#[derive(Default)]
struct Store {
    tools: Vec<Tool>,
    inspections: Vec<Inspection>,
    photos: HashMap<String, (Vec<u8>, String)>,
    sequence: i64,
}

/// In-memory registry with the ordering and uniqueness rules of the hosted one.
#[derive(Default)]
pub struct MemoryRegistry {
    store: Mutex<Store>,
    fail_inspections: AtomicBool,
}

pub const PUBLIC_BASE: &str = "https://registry.test/storage/v1/object/public/tool-photos";

impl MemoryRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_inspection_inserts(&self) {
        self.fail_inspections.store(true, Ordering::SeqCst);
    }

    pub async fn tools(&self) -> Vec<Tool> {
        self.store.lock().await.tools.clone()
    }

    pub async fn inspection_count(&self) -> usize {
        self.store.lock().await.inspections.len()
    }

    pub async fn photo(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.store.lock().await.photos.get(path).cloned()
    }

    /// Inserts a tool row bypassing barcode generation.
    pub async fn seed_tool(&self, barcode: &str, name: &str, category: &str, serial: Option<&str>) -> Tool {
        self.create_tool(NewTool {
            barcode: barcode.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            serial_number: serial.map(str::to_string),
            photo_url: None,
        })
        .await
        .unwrap()
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn create_tool(&self, tool: NewTool) -> Result<Tool, RegistryError> {
        let mut store = self.store.lock().await;
        if store.tools.iter().any(|t| t.barcode == tool.barcode) {
            return Err(RegistryError::Conflict(format!(
                "duplicate key value violates unique constraint \"tools_barcode_key\": {}",
                tool.barcode
            )));
        }
        store.sequence += 1;
        let created_at = Utc::now() + Duration::milliseconds(store.sequence);
        let tool = Tool {
            id: uuid::Uuid::new_v4().to_string(),
            barcode: tool.barcode,
            name: tool.name,
            category: tool.category,
            serial_number: tool.serial_number,
            photo_url: tool.photo_url,
            created_at,
            updated_at: created_at,
        };
        store.tools.push(tool.clone());
        Ok(tool)
    }

    async fn create_inspection(&self, inspection: NewInspection) -> Result<Inspection, RegistryError> {
        if self.fail_inspections.load(Ordering::SeqCst) {
            return Err(RegistryError::Status {
                status: 500,
                body: "inspection insert failed".to_string(),
            });
        }
        let mut store = self.store.lock().await;
        if !store.tools.iter().any(|t| t.id == inspection.tool_id) {
            return Err(RegistryError::Status {
                status: 409,
                body: "violates foreign key constraint".to_string(),
            });
        }
        store.sequence += 1;
        let inspection = Inspection {
            id: uuid::Uuid::new_v4().to_string(),
            tool_id: inspection.tool_id,
            inspector_name: inspection.inspector_name,
            inspection_date: inspection.inspection_date,
            status: inspection.status,
            notes: inspection.notes,
            photo_url: inspection.photo_url,
            created_at: Utc::now() + Duration::milliseconds(store.sequence),
        };
        store.inspections.push(inspection.clone());
        Ok(inspection)
    }

    async fn find_tool_by_barcode(&self, barcode: &str) -> Result<Option<Tool>, RegistryError> {
        let store = self.store.lock().await;
        Ok(store.tools.iter().find(|t| t.barcode == barcode).cloned())
    }

    async fn list_tools(&self) -> Result<Vec<Tool>, RegistryError> {
        let mut tools = self.store.lock().await.tools.clone();
        tools.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tools)
    }

    async fn list_inspections(&self, tool_id: &str) -> Result<Vec<Inspection>, RegistryError> {
        let mut inspections: Vec<Inspection> = self
            .store
            .lock()
            .await
            .inspections
            .iter()
            .filter(|i| i.tool_id == tool_id)
            .cloned()
            .collect();
        inspections.sort_by(|a, b| b.inspection_date.cmp(&a.inspection_date));
        Ok(inspections)
    }

    async fn upload_photo(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RegistryError> {
        let mut store = self.store.lock().await;
        store
            .photos
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(format!("{PUBLIC_BASE}/{path}"))
    }
}

const BOUNDARY: &str = "toolcheck-test-boundary";

/// Builds a `multipart/form-data` POST request.
pub fn multipart_request(uri: &str, fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
