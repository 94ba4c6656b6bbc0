//! Record identifiers and storage keys.

use uuid::Uuid;

/// Key the aggregate is stored under when no other key is configured.
pub const DEFAULT_STORAGE_KEY: &str = "studioData";

/// Generate a new record id.
///
/// UUIDv7 in its 32-char hex form: a millisecond timestamp followed by
/// random bits. Unique within one store; no cross-process guarantee is
/// needed since a store has a single writer.
pub fn generate_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Build a storage key inside a namespace: `"{namespace}:{key}"`.
///
/// An empty namespace leaves the key unchanged.
pub fn namespaced(namespace: &str, key: &str) -> String {
    if namespace.is_empty() {
        key.to_string()
    } else {
        format!("{}:{}", namespace, key)
    }
}

/// Invoice number printed for a payment: `INV-<PAYMENT ID>`.
pub fn invoice_number(payment_id: &str) -> String {
    format!("INV-{}", payment_id.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_namespaced_key() {
        assert_eq!(namespaced("studio", "studioData"), "studio:studioData");
        assert_eq!(namespaced("", "studioData"), "studioData");
    }

    #[test]
    fn test_invoice_number() {
        assert_eq!(invoice_number("m1x9abc"), "INV-M1X9ABC");
    }
}
