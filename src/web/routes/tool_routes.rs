use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::registry::{Inspection, Tool};
use crate::services::tool_service::{self, RegisteredTool, ToolDetails};
use crate::web::models::{FormData, ListToolsQuery};
use crate::web::{AppError, AppState};

async fn list_tools_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListToolsQuery>,
) -> Result<Json<Vec<Tool>>, AppError> {
    let tools = tool_service::list_tools(app_state.registry.as_ref(), query.q.as_deref()).await?;
    Ok(Json(tools))
}

async fn register_tool_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<RegisteredTool>), AppError> {
    let form = FormData::read(multipart).await?.into_register_tool()?;
    let registered = tool_service::register_tool(app_state.registry.as_ref(), form).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

async fn tool_details_handler(
    State(app_state): State<Arc<AppState>>,
    Path(barcode): Path<String>,
) -> Result<Json<ToolDetails>, AppError> {
    let details = tool_service::tool_details(app_state.registry.as_ref(), &barcode).await?;
    Ok(Json(details))
}

async fn add_inspection_handler(
    State(app_state): State<Arc<AppState>>,
    Path(barcode): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Inspection>), AppError> {
    let form = FormData::read(multipart).await?.into_add_inspection()?;
    let inspection = tool_service::add_inspection(app_state.registry.as_ref(), &barcode, form).await?;
    Ok((StatusCode::CREATED, Json(inspection)))
}

pub fn create_tools_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tools_handler).post(register_tool_handler))
        .route("/{barcode}", get(tool_details_handler))
        .route("/{barcode}/inspections", post(add_inspection_handler))
}
