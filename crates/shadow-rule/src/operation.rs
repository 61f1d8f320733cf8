//! Operation IDs tying an admin request to its log lines.

use uuid::Uuid;

/// Response header echoing the operation ID.
pub const OPERATION_HEADER: &str = "x-shadow-rule-operation-id";

/// Generate a new operation ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
