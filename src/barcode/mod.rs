pub mod code128;
pub mod identity;

pub use identity::generate_barcode;
