use eavstore_core::errors::{EavError, ExError, ExErrorKind};

#[test]
fn test_not_found_verifiable_by_kind() {
    let err = EavError::EntityNotFound {
        selector: "slug=book".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert!(ex_err.message().contains("slug=book"));
}

#[test]
fn test_value_not_found_carries_pair() {
    let err = EavError::ValueNotFound {
        item_id: 4,
        attribute_id: 9,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.item_id(), Some(4));
    assert_eq!(ex_err.attribute_id(), Some(9));
    assert_eq!(ex_err.entity_id(), None);
}

#[test]
fn test_link_not_found_carries_pair() {
    let ex_err: ExError = EavError::LinkNotFound {
        entity_id: 1,
        attribute_id: 2,
    }
    .into();

    assert_eq!(ex_err.entity_id(), Some(1));
    assert_eq!(ex_err.attribute_id(), Some(2));
}

#[test]
fn test_validation_errors_are_invalid_input() {
    let errors = vec![
        EavError::InvalidAttributeType {
            tag: "varchar".to_string(),
        },
        EavError::InvalidLookup {
            reason: "either id or slug is required".to_string(),
        },
        EavError::InvalidValue {
            attribute_type: "int8".to_string(),
            input: "300".to_string(),
        },
        EavError::TypeMismatch {
            attribute_type: "bool".to_string(),
            reason: "expected 0 or 1, found 7".to_string(),
        },
    ];

    for err in errors {
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
        assert_eq!(ex_err.code(), "ERR_INVALID_INPUT");
    }
}

#[test]
fn test_malformed_payload_is_decode() {
    let ex_err: ExError = EavError::MalformedPayload {
        reason: "expected value at line 1 column 1".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::Decode);
    assert_eq!(ex_err.code(), "ERR_DECODE");
    assert!(ex_err.to_string().starts_with("[ERR_DECODE]"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::Conflict, "ERR_CONFLICT"),
        (ExErrorKind::Decode, "ERR_DECODE"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_serde_json_error_converts() {
    let json_err = serde_json::from_str::<Vec<i64>>("[1,").unwrap_err();
    let err: EavError = json_err.into();
    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::Serialization);
}
