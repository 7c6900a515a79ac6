//! Logging utilities for tracemap.
//!
//! This module provides structured logging functionality so that each rendering run
//! leaves searchable records of what was loaded, drawn and written.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG`, when set, takes precedence over the configured level. Returns `false`
/// when a global subscriber was already installed, in which case that one is kept.
pub fn init_tracing(log_level: &str) -> bool {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "Tracing subscriber already installed");
            false
        }
    }
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let run_id = generate_run_id();

    debug!(
        operation = operation,
        run_id = %run_id,
        "Starting operation"
    );

    let result = f();

    info!(
        operation = operation,
        run_id = %run_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log what was read from one input dataset
pub fn log_dataset_stats(file_path: &str, kind: &str, loaded: usize, skipped: usize) {
    info!(
        operation = "data_load",
        file_path = file_path,
        kind = kind,
        loaded = loaded,
        skipped = skipped,
        "Dataset loaded"
    );
}

/// Log an error with context
pub fn log_error(error: &crate::error::TracemapError, context: &str) {
    error!(
        error = %error,
        context = context,
        "Error occurred"
    );
}

/// Generate a unique run ID
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}
