use cipherwatch::logging::{init_logging_for, is_production};

#[test]
fn test_is_production() {
    assert!(is_production("production"));
    assert!(is_production("prod"));
    assert!(!is_production("sandbox"));
    assert!(!is_production("Production "));
}

#[test]
fn test_init_logging_is_idempotent() {
    init_logging_for("sandbox");
    init_logging_for("production");
}
