const fn unwrap_or_cargo_version(opt: Option<&'static str>) -> &'static str {
    match opt {
        Some(val) => val,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Build version, `TOOLCHECK_VERSION` at compile time when set by the release pipeline.
pub const VERSION: &str = unwrap_or_cargo_version(option_env!("TOOLCHECK_VERSION"));
