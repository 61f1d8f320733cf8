//! Span builder helpers for shadow-rule instrumentation.

/// Create a tracing span for one admin HTTP request.
///
/// Usage: `let span = admin_request_span!(operation_id, "drop_shadow_rule");`
#[macro_export]
macro_rules! admin_request_span {
    ($operation_id:expr, $operation:expr) => {
        tracing::info_span!(
            "admin_request",
            operation_id = %$operation_id,
            operation = %$operation,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    };
}

/// Create a tracing span for a rule update against one logical database.
///
/// `changed` and `rule_dropped` are recorded once the update completes.
#[macro_export]
macro_rules! rule_update_span {
    ($database:expr, $statement:expr) => {
        tracing::info_span!(
            "rule_update",
            database = %$database,
            rule_type = "shadow",
            names = ?$statement.names,
            if_exists = $statement.if_exists,
            changed = tracing::field::Empty,
            rule_dropped = tracing::field::Empty,
        )
    };
}

/// Create a tracing span for schema introspection of a migration source.
#[macro_export]
macro_rules! schema_introspection_span {
    ($source:expr, $table_pattern:expr) => {
        tracing::info_span!(
            "schema_introspection",
            source = %$source,
            table_pattern = ?$table_pattern,
            schema_count = tracing::field::Empty,
            table_count = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    };
}
