//! Tool registry client.
//!
//! The registry is the hosted backend that stores tools, inspections and
//! photos. Everything above this module talks to it through the [`Registry`]
//! trait, so the HTTP layer and services receive an explicitly constructed
//! client instead of reaching for a global handle.

use async_trait::async_trait;
use thiserror::Error;

pub mod models;
pub mod storage;
pub mod supabase;

pub use models::{Inspection, InspectionStatus, NewInspection, NewTool, Tool};
pub use supabase::SupabaseRegistry;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Registry returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid record from registry: {0}")]
    InvalidRecord(String),
    #[error("Registry returned no {0} record")]
    EmptyResponse(&'static str),
}

/// CRUD and blob storage surface of the registry.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Inserts a tool and returns it with its registry-assigned id.
    async fn create_tool(&self, tool: NewTool) -> Result<Tool, RegistryError>;

    /// Inserts an inspection. Inspections are never updated or deleted.
    async fn create_inspection(&self, inspection: NewInspection) -> Result<Inspection, RegistryError>;

    /// Exact-match lookup on the barcode column.
    async fn find_tool_by_barcode(&self, barcode: &str) -> Result<Option<Tool>, RegistryError>;

    /// All tools, newest first.
    async fn list_tools(&self) -> Result<Vec<Tool>, RegistryError>;

    /// Inspections of one tool, latest inspection date first.
    async fn list_inspections(&self, tool_id: &str) -> Result<Vec<Inspection>, RegistryError>;

    /// Stores a photo at `path`, overwriting any existing object, and returns its public URL.
    async fn upload_photo(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RegistryError>;
}
