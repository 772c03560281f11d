use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::models::{InspectionRow, ToolRow};
use super::{Inspection, NewInspection, NewTool, Registry, RegistryError, Tool};

const TOOLS_TABLE: &str = "tools";
const INSPECTIONS_TABLE: &str = "inspections";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Postgres unique_violation, reported by PostgREST in the error body.
const UNIQUE_VIOLATION: &str = "23505";

/// Registry backed by a Supabase project: PostgREST for rows, Storage for photos.
pub struct SupabaseRegistry {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl SupabaseRegistry {
    pub fn new(base_url: &str, api_key: &str, bucket: &str) -> Result<Self, RegistryError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn encoded_path(path: &str) -> String {
        path.split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            Self::encoded_path(path)
        )
    }

    /// Durable public URL of a stored object.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            Self::encoded_path(path)
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn insert<T, R>(&self, table: &str, row: &T) -> Result<Vec<R>, RegistryError>
    where
        T: serde::Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        Ok(check(response).await?.json::<Vec<R>>().await?)
    }

    async fn select<R>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<R>, RegistryError>
    where
        R: DeserializeOwned,
    {
        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        Ok(check(response).await?.json::<Vec<R>>().await?)
    }
}

/// Maps non-success responses to registry errors.
async fn check(response: Response) -> Result<Response, RegistryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    if status == StatusCode::CONFLICT || body.contains(UNIQUE_VIOLATION) {
        return Err(RegistryError::Conflict(body));
    }
    Err(RegistryError::Status { status: status.as_u16(), body })
}

#[async_trait]
impl Registry for SupabaseRegistry {
    async fn create_tool(&self, tool: NewTool) -> Result<Tool, RegistryError> {
        let rows: Vec<ToolRow> = self.insert(TOOLS_TABLE, &tool).await?;
        let row = rows.into_iter().next().ok_or(RegistryError::EmptyResponse("tool"))?;
        debug!(barcode = %row.barcode, id = %row.id, "Tool row created.");
        row.try_into()
    }

    async fn create_inspection(&self, inspection: NewInspection) -> Result<Inspection, RegistryError> {
        let rows: Vec<InspectionRow> = self.insert(INSPECTIONS_TABLE, &inspection).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or(RegistryError::EmptyResponse("inspection"))?;
        row.try_into()
    }

    async fn find_tool_by_barcode(&self, barcode: &str) -> Result<Option<Tool>, RegistryError> {
        let rows: Vec<ToolRow> = self
            .select(
                TOOLS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("barcode", format!("eq.{barcode}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        rows.into_iter().next().map(Tool::try_from).transpose()
    }

    async fn list_tools(&self) -> Result<Vec<Tool>, RegistryError> {
        let rows: Vec<ToolRow> = self
            .select(
                TOOLS_TABLE,
                &[("select", "*".to_string()), ("order", "created_at.desc".to_string())],
            )
            .await?;
        rows.into_iter().map(Tool::try_from).collect()
    }

    async fn list_inspections(&self, tool_id: &str) -> Result<Vec<Inspection>, RegistryError> {
        let rows: Vec<InspectionRow> = self
            .select(
                INSPECTIONS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("tool_id", format!("eq.{tool_id}")),
                    ("order", "inspection_date.desc".to_string()),
                ],
            )
            .await?;
        rows.into_iter().map(Inspection::try_from).collect()
    }

    async fn upload_photo(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RegistryError> {
        let response = self
            .authorized(self.client.post(self.object_url(path)))
            .header("x-upsert", "true")
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        check(response).await?;
        debug!(path, "Photo uploaded.");
        Ok(self.public_url(path))
    }
}
