pub mod barcode;
pub mod config;
pub mod label;
pub mod registry;
pub mod services;
pub mod version;
pub mod web;
