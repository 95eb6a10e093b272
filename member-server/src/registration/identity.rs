//! Member id allocation
//!
//! Random v4 UUIDs. There is no lookup against the store: a collision is
//! treated as practically impossible, and the store still refuses to
//! overwrite an existing id.

use uuid::Uuid;

/// Allocate a new member id (hyphenated, lowercase)
pub fn allocate_member_id() -> String {
    Uuid::new_v4().to_string()
}
