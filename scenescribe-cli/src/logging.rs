// ============================================================================
// scenescribe-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: Helper Functions for Logging
//
// The main logging implementation uses the standard `log` crate with
// `env_logger` as the backend, configured in main.rs. The application honors
// the RUST_LOG environment variable (info by default, debug/trace for more
// detail).

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// Used to generate unique names for per-run log files.
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
