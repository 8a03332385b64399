/// Version reported in logs and `@PG` records.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
