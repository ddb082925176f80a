//! Sample documents under `test-fixtures/`.

use std::path::PathBuf;

use chsync_model::CodeTemplateLibrary;

/// TCP source with credentials, two transformer steps, a filter rule and two
/// destinations (`Archive`, `Lab Feed`).
pub const ADT_RECEIVER: &str = include_str!("../../../test-fixtures/channels/adt-receiver.json");

/// Disabled HTTP source, one database destination.
pub const LAB_RESULTS: &str = include_str!("../../../test-fixtures/channels/lab-results.json");

/// `Util Lib`, enabled for `ADT Receiver`.
pub const UTIL_LIB: &str = include_str!("../../../test-fixtures/code-templates/util-lib.json");

pub const ADT_RECEIVER_ID: &str = "5f1c2b0e-0001";

/// Absolute path of a file under `test-fixtures/`.
pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures")
        .join(relative)
}

/// # Panics
/// Panics if the fixture is not a valid library.
pub fn util_lib() -> CodeTemplateLibrary {
    serde_json::from_str(UTIL_LIB).unwrap()
}
