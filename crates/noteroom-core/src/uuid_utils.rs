//! UUIDv7 utilities for time-ordered identifiers.
//!
//! UUIDv7 embeds a millisecond Unix timestamp in the first 48 bits, so ids
//! generated later sort lexicographically greater. Notes keyed by v7 ids can
//! therefore be listed in insertion order with a plain `ORDER BY id`.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check whether a UUID is version 7.
pub fn is_v7(id: &Uuid) -> bool {
    id.get_version_num() == 7
}
