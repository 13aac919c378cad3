use uuid::Uuid;

/// Namespace every derivative identifier is hashed into.
pub const DERIVATIVE_NAMESPACE: Uuid = Uuid::NAMESPACE_OID;

/// Fresh identifier for an uploaded original.
pub fn new_original_id() -> Uuid {
    Uuid::new_v4()
}

/// Deterministic identifier for a processed variant of `source`.
///
/// The same input always yields the same identifier, so repeated processing
/// of one original lands on the same derivative name.
pub fn derived_id(source: &str) -> Uuid {
    Uuid::new_v3(&DERIVATIVE_NAMESPACE, source.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_id_is_deterministic() {
        let source = "6f1d5c2e-8b4a-4c0e-9a57-2f3b1d7e9c41";
        assert_eq!(derived_id(source), derived_id(source));
        assert_eq!(
            derived_id(source).to_string(),
            "06ece88d-5444-37f8-8a67-14af1ba4c472"
        );
    }

    #[test]
    fn test_derived_id_from_storage_path() {
        let path = "./uploads/6f1d5c2e-8b4a-4c0e-9a57-2f3b1d7e9c41.png";
        assert_eq!(
            derived_id(path).to_string(),
            "bdc6ddb2-766f-38f5-8ca7-3039f189f131"
        );
    }

    #[test]
    fn test_distinct_sources_do_not_collide() {
        assert_ne!(derived_id("a"), derived_id("b"));
        assert_ne!(new_original_id(), new_original_id());
    }
}
