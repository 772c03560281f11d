mod common;

use axum::http::{header, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

use common::{body_bytes, body_json, get_request, multipart_request, MemoryRegistry};
use toolcheck::barcode::{code128, identity};
use toolcheck::label::LabelOptions;
use toolcheck::registry::Registry;
use toolcheck::web::{create_axum_router, create_config_error_router};

fn app(registry: &Arc<MemoryRegistry>) -> Router {
    let registry: Arc<dyn Registry> = registry.clone();
    create_axum_router(registry, LabelOptions::default())
}

fn registration_fields<'a>() -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", "Power Drill"),
        ("category", "Power Tools"),
        ("serial_number", "SN123456"),
        ("inspector_name", "Sam Rivera"),
        ("inspection_status", "passed"),
        ("inspection_notes", "Chuck tight, cable intact"),
    ]
}

#[tokio::test]
async fn test_health() {
    let registry = MemoryRegistry::new();
    let response = app(&registry).oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn test_register_tool_mints_barcode_and_initial_inspection() {
    let registry = MemoryRegistry::new();
    let request = multipart_request("/api/tools", &registration_fields(), Some(("drill.PNG", b"fake-png")));
    let response = app(&registry).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let barcode = json["tool"]["barcode"].as_str().unwrap().to_string();
    assert!(identity::is_generated_barcode(&barcode), "unexpected barcode {barcode}");
    assert_eq!(json["tool"]["serial_number"], "SN123456");
    assert_eq!(json["inspection"]["status"], "passed");
    assert_eq!(json["inspection"]["tool_id"], json["tool"]["id"]);

    let photo_path = format!("tools/{barcode}.png");
    assert_eq!(
        json["tool"]["photo_url"].as_str().unwrap(),
        format!("{}/{photo_path}", common::PUBLIC_BASE)
    );
    let (bytes, content_type) = registry.photo(&photo_path).await.unwrap();
    assert_eq!(bytes, b"fake-png");
    assert_eq!(content_type, "image/png");
    assert_eq!(registry.inspection_count().await, 1);
}

#[tokio::test]
async fn test_register_tool_requires_name() {
    let registry = MemoryRegistry::new();
    let fields: Vec<_> = registration_fields()
        .into_iter()
        .map(|(k, v)| if k == "name" { (k, "  ") } else { (k, v) })
        .collect();
    let response = app(&registry)
        .oneshot(multipart_request("/api/tools", &fields, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(registry.tools().await.is_empty());
}

#[tokio::test]
async fn test_register_tool_rejects_unknown_status() {
    let registry = MemoryRegistry::new();
    let mut fields = registration_fields();
    fields[4] = ("inspection_status", "great");
    let response = app(&registry)
        .oneshot(multipart_request("/api/tools", &fields, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_barcode_is_not_found() {
    let registry = MemoryRegistry::new();
    let response = app(&registry)
        .oneshot(get_request("/api/tools/TOOL-0-AAAAAAAAA"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Tool not found. Please check the barcode and try again.");
}

#[tokio::test]
async fn test_list_tools_newest_first_with_search() {
    let registry = MemoryRegistry::new();
    registry.seed_tool("TOOL-1-AAAAAAAAA", "Power Drill", "Power Tools", None).await;
    registry.seed_tool("TOOL-2-BBBBBBBBB", "Torque Wrench", "Hand Tools", None).await;
    registry.seed_tool("TOOL-3-CCCCCCCCC", "Angle Grinder", "Power Tools", None).await;

    let json = body_json(app(&registry).oneshot(get_request("/api/tools")).await.unwrap()).await;
    let barcodes: Vec<&str> = json.as_array().unwrap().iter().map(|t| t["barcode"].as_str().unwrap()).collect();
    assert_eq!(barcodes, vec!["TOOL-3-CCCCCCCCC", "TOOL-2-BBBBBBBBB", "TOOL-1-AAAAAAAAA"]);

    let json = body_json(app(&registry).oneshot(get_request("/api/tools?q=power")).await.unwrap()).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let json = body_json(app(&registry).oneshot(get_request("/api/tools?q=bbbb")).await.unwrap()).await;
    assert_eq!(json[0]["name"], "Torque Wrench");
}

#[tokio::test]
async fn test_add_inspection_and_history_order() {
    let registry = MemoryRegistry::new();
    registry.seed_tool("TOOL-1-AAAAAAAAA", "Power Drill", "Power Tools", None).await;

    for (date, status) in [("2024-01-10", "passed"), ("2024-03-05", "needs_repair"), ("2024-02-01", "failed")] {
        let request = multipart_request(
            "/api/tools/TOOL-1-AAAAAAAAA/inspections",
            &[
                ("inspector_name", "Sam Rivera"),
                ("inspection_date", date),
                ("status", status),
                ("notes", "checked"),
            ],
            None,
        );
        let response = app(&registry).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(
        app(&registry)
            .oneshot(get_request("/api/tools/TOOL-1-AAAAAAAAA"))
            .await
            .unwrap(),
    )
    .await;
    let dates: Vec<&str> = json["inspections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["inspection_date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-03-05", "2024-02-01", "2024-01-10"]);
    assert_eq!(json["inspections"][0]["status"], "needs_repair");
}

#[tokio::test]
async fn test_add_inspection_photo_stored_under_inspections() {
    let registry = MemoryRegistry::new();
    registry.seed_tool("TOOL-1-AAAAAAAAA", "Power Drill", "Power Tools", None).await;
    let request = multipart_request(
        "/api/tools/TOOL-1-AAAAAAAAA/inspections",
        &[("inspector_name", "Sam Rivera")],
        Some(("crack.jpg", b"jpeg-bytes")),
    );
    let json = body_json(app(&registry).oneshot(request).await.unwrap()).await;
    let url = json["photo_url"].as_str().unwrap();
    let path = url.strip_prefix(&format!("{}/", common::PUBLIC_BASE)).unwrap();
    assert!(path.starts_with("inspections/inspection-") && path.ends_with(".jpg"), "{path}");
    assert_eq!(json["status"], "passed");
}

#[tokio::test]
async fn test_add_inspection_to_unknown_tool() {
    let registry = MemoryRegistry::new();
    let request = multipart_request(
        "/api/tools/TOOL-9-ZZZZZZZZZ/inspections",
        &[("inspector_name", "Sam Rivera")],
        None,
    );
    let response = app(&registry).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(registry.inspection_count().await, 0);
}

#[tokio::test]
async fn test_png_label_download() {
    let registry = MemoryRegistry::new();
    registry.seed_tool("TOOL-123-XYZ", "Power Drill", "Power Tools", None).await;

    let response = app(&registry)
        .oneshot(get_request("/api/tools/TOOL-123-XYZ/label.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"barcode-TOOL-123-XYZ.png\""
    );

    let png = body_bytes(response).await;
    let image = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
        .unwrap()
        .to_rgb8();
    // Scan the row through the middle of the bars.
    let scene = toolcheck::label::LabelScene::compose(
        "TOOL-123-XYZ",
        &toolcheck::label::LabelFields {
            name: "Power Drill".to_string(),
            category: "Power Tools".to_string(),
            serial_number: None,
        },
        &LabelOptions::default(),
    )
    .unwrap();
    let row_y = match scene.bars().next().unwrap() {
        toolcheck::label::Shape::Rect { y, height, .. } => y + height / 2,
        _ => unreachable!(),
    };
    let row: Vec<bool> = (0..image.width()).map(|x| image.get_pixel(x, row_y).0 == [0, 0, 0]).collect();
    assert_eq!(code128::decode_modules(&row).unwrap(), "TOOL-123-XYZ");
}

#[tokio::test]
async fn test_svg_label_for_print() {
    let registry = MemoryRegistry::new();
    registry.seed_tool("TOOL-123-XYZ", "Power Drill", "Power Tools", Some("SN9")).await;

    let response = app(&registry)
        .oneshot(get_request("/api/tools/TOOL-123-XYZ/label.svg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    let svg = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(svg.contains("TOOL INSPECTION"));
    assert!(svg.contains("S/N: SN9"));
}

#[tokio::test]
async fn test_label_render_failure_reported() {
    let registry = MemoryRegistry::new();
    registry.seed_tool("TOOL-Ω", "Odd Tool", "Misc", None).await;

    let response = app(&registry)
        .oneshot(get_request("/api/tools/TOOL-%CE%A9/label.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("not supported by Code 128"));
}

#[tokio::test]
async fn test_config_error_mode_blocks_everything() {
    let app = create_config_error_router(vec!["SUPABASE_URL", "SUPABASE_ANON_KEY"]);
    for uri in ["/api/health", "/api/tools", "/"] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        let message = json["error"].as_str().unwrap();
        assert!(message.contains("SUPABASE_URL") && message.contains("SUPABASE_ANON_KEY"));
    }
}
