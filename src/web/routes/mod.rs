pub mod label_routes;
pub mod tool_routes;
