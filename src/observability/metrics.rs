//! Parse metrics recorded through the `metrics` facade.

use std::time::Duration;

/// Record metrics for one parsed sentence
pub fn record_parse_metrics(
    operation: &str,
    duration: Duration,
    token_count: usize,
    amounts_found: usize,
    warnings: usize,
) {
    let operation = operation.to_string();
    metrics::counter!("ingredient_parse_operations_total", "operation" => operation.clone())
        .increment(1);
    metrics::histogram!("ingredient_parse_duration_seconds", "operation" => operation.clone())
        .record(duration.as_secs_f64());
    metrics::histogram!("ingredient_parse_token_count", "operation" => operation.clone())
        .record(token_count as f64);
    metrics::histogram!("ingredient_parse_amounts_found", "operation" => operation.clone())
        .record(amounts_found as f64);

    if warnings > 0 {
        metrics::counter!("ingredient_parse_warnings_total", "operation" => operation)
            .increment(warnings as u64);
    }
}

/// Record a fallback pass and whether it recovered anything
pub fn record_fallback_metrics(amounts_found: usize) {
    let outcome = if amounts_found > 0 { "recovered" } else { "empty" };
    metrics::counter!("ingredient_parse_fallback_total", "outcome" => outcome).increment(1);
}
