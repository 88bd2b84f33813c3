use std::sync::Once;

use log::LevelFilter;

mod archive;
mod solver;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// test_resources/ relative path
pub fn resource(relative: &str) -> std::path::PathBuf {
    std::path::PathBuf::new()
        .join(env!("CARGO_MANIFEST_DIR"))
        .join("test_resources")
        .join(relative)
}
