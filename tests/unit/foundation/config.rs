use super::*;

#[test]
fn empty_document_uses_defaults() {
    let cfg = EngineConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, EngineConfig::default());
}

#[test]
fn partial_document_overrides_fields() {
    let cfg = EngineConfig::from_json_str(r#"{"threads": 3, "pool_capacity_scale": 2}"#).unwrap();
    assert_eq!(cfg.threads, Some(3));
    assert_eq!(cfg.pool_capacity_scale, 2);
    assert_eq!(cfg.initial_slots, 16);
}

#[test]
fn zero_values_are_rejected() {
    assert!(EngineConfig::from_json_str(r#"{"threads": 0}"#).is_err());
    assert!(EngineConfig::from_json_str(r#"{"initial_slots": 0}"#).is_err());
    assert!(EngineConfig::from_json_str(r#"{"pool_capacity_scale": 0}"#).is_err());
}

#[test]
fn unknown_fields_are_rejected() {
    let err = EngineConfig::from_json_str(r#"{"thread": 2}"#).unwrap_err();
    assert!(matches!(err, TexError::Other(_)));
}
