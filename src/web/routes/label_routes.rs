use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::error;

use crate::label::{self, LabelError, LabelFields, LabelScene};
use crate::registry::Tool;
use crate::services::tool_service;
use crate::web::{AppError, AppState};

fn label_fields(tool: &Tool) -> LabelFields {
    LabelFields {
        name: tool.name.clone(),
        category: tool.category.clone(),
        serial_number: tool.serial_number.clone(),
    }
}

fn render_failed(barcode: &str, err: LabelError) -> AppError {
    error!(barcode, error = %err, "Failed to render barcode label.");
    err.into()
}

/// Vector label, used for display and printing.
async fn label_svg_handler(
    State(app_state): State<Arc<AppState>>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tool = tool_service::find_tool(app_state.registry.as_ref(), &barcode).await?;
    let scene = LabelScene::compose(&tool.barcode, &label_fields(&tool), &app_state.label_options)
        .map_err(|e| render_failed(&tool.barcode, e))?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], scene.to_svg()))
}

/// Raster label as a download.
async fn label_png_handler(
    State(app_state): State<Arc<AppState>>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tool = tool_service::find_tool(app_state.registry.as_ref(), &barcode).await?;
    let rendered = label::render_label(&tool.barcode, &label_fields(&tool), &app_state.label_options)
        .map_err(|e| render_failed(&tool.barcode, e))?;
    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", rendered.filename),
        ),
    ];
    Ok((headers, rendered.png))
}

pub fn create_labels_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{barcode}/label.svg", get(label_svg_handler))
        .route("/{barcode}/label.png", get(label_png_handler))
}
