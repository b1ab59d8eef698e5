//! State file fixtures.
//!
//! Provides the on-disk representations of the persisted intentional-stop record,
//! including malformed variants used to exercise fallback behaviour.

use serde_json::json;

/// Content that is not valid JSON at all.
pub const CORRUPT: &str = "{\"intentional_stop\": tr";

/// Valid JSON that lacks the `intentional_stop` field.
pub const MISSING_FIELD: &str = "{\"something_else\": 1}";

/// Serialized state record for the given intentional-stop value.
///
/// # Returns
/// - `Ok(String)` - e.g. `{"intentional_stop":false}`
/// - `Err(serde_json::Error)` - Serialization failed
pub fn contents(intentional_stop: bool) -> Result<String, serde_json::Error> {
    serde_json::to_string(&json!({ "intentional_stop": intentional_stop }))
}
