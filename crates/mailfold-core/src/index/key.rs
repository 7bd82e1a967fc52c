//! Composite sort keys.
//!
//! Folder indexes order messages by recency through the key shape alone:
//! a 15-digit zero-padded epoch-millisecond timestamp, a colon, and the
//! message id. Lexicographic comparison of such keys equals chronological
//! comparison of the timestamps; 15 digits hold epoch millis until
//! roughly the year 33658.

/// Build the composite sort key for a message.
#[must_use]
pub fn sort_key(timestamp_ms: i64, message_id: &str) -> String {
    format!("{timestamp_ms:015}:{message_id}")
}

/// Recover the message id from a composite sort key.
///
/// Returns `None` for keys that don't contain the separator.
#[must_use]
pub fn message_id_of(key: &str) -> Option<&str> {
    key.split_once(':').map(|(_, id)| id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sort_key_is_zero_padded() {
        assert_eq!(sort_key(1000, "abc"), "000000000001000:abc");
    }

    #[test]
    fn test_message_id_roundtrip() {
        let key = sort_key(1_700_000_000_000, "msg-1");
        assert_eq!(message_id_of(&key), Some("msg-1"));
    }

    #[test]
    fn test_message_id_survives_colons_in_id() {
        let key = sort_key(5, "urn:mail:1");
        assert_eq!(message_id_of(&key), Some("urn:mail:1"));
    }

    #[test]
    fn test_message_id_of_malformed_key() {
        assert_eq!(message_id_of("no-separator"), None);
    }

    proptest! {
        // Chronological order must fall out of plain string comparison,
        // regardless of the ids involved.
        #[test]
        fn prop_key_order_follows_timestamp_order(
            a in 0i64..1_000_000_000_000_000,
            b in 0i64..1_000_000_000_000_000,
            id_a in "[a-z0-9-]{1,36}",
            id_b in "[a-z0-9-]{1,36}",
        ) {
            let key_a = sort_key(a, &id_a);
            let key_b = sort_key(b, &id_b);
            if a < b {
                prop_assert!(key_a < key_b);
            } else if a > b {
                prop_assert!(key_a > key_b);
            }
        }
    }
}
