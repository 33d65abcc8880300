use super::*;
use approx::assert_relative_eq;

#[test]
fn test_zero_literal() {
    assert_eq!(encode_real(0.0).unwrap(), ZERO_FIELD);
    assert_eq!(encode_real(-0.0).unwrap(), ZERO_FIELD);
}

#[test]
fn test_powers_of_ten() {
    assert_eq!(encode_real(1.0).unwrap(), "1.+0    ");
    assert_eq!(encode_real(100.0).unwrap(), "1.+2    ");
    assert_eq!(encode_real(1.0e7).unwrap(), "1.+7    ");
    assert_eq!(encode_real(1.0e10).unwrap(), "1.+10   ");
    assert_eq!(encode_real(0.001).unwrap(), "1.-3    ");
    assert_eq!(encode_real(-100.0).unwrap(), "-1.+2   ");
}

#[test]
fn test_rounding_snaps_to_power_of_ten() {
    assert_eq!(encode_real(0.99999999).unwrap(), "1.+0    ");
    assert_eq!(encode_real(999999.99).unwrap(), "1.+6    ");
}

#[test]
fn test_power_of_ten_uses_significant_digits() {
    assert_eq!(encode_real(6.2e-8).unwrap(), "6.2000-8");
    assert_eq!(encode_real(6.205627270743454e-8).unwrap(), "6.2056-8");
    assert_eq!(encode_real(1.4e-7).unwrap(), "1.4000-7");
    assert_eq!(encode_real(1.04e-6).unwrap(), "1.0400-6");
    assert_eq!(encode_real(-1.04e-6).unwrap(), "-1.040-6");
    assert_eq!(encode_real(1.0000001e-7).unwrap(), "1.-7    ");
}

#[test]
fn test_fixed_point() {
    assert_eq!(encode_real(3.25).unwrap(), "3.250000");
    assert_eq!(encode_real(0.5).unwrap(), ".5000000");
    assert_eq!(encode_real(-0.0042).unwrap(), "-.004200");
    assert_eq!(encode_real(999999.5).unwrap(), "999999.5");
    assert_eq!(encode_real(-99999.5).unwrap(), "-99999.5");
}

#[test]
fn test_fixed_point_drops_fraction_when_full() {
    assert_eq!(encode_real(-99999.99).unwrap(), "-100000.");
}

#[test]
fn test_exponential_large() {
    assert_eq!(encode_real(12345678.0).unwrap(), "1.2346+7");
    assert_eq!(encode_real(-1234567.0).unwrap(), "-1.235+6");
}

#[test]
fn test_exponential_small() {
    assert_eq!(encode_real(0.00012345).unwrap(), "1.2345-4");
    assert_eq!(encode_real(1.5e-8).unwrap(), "1.5000-8");
}

#[test]
fn test_extremes_fit() {
    for x in [f64::MAX, f64::MIN, f64::MIN_POSITIVE, 5e-324, -5e-324] {
        let field = encode_real(x).unwrap();
        assert_eq!(field.len(), FIELD_WIDTH, "{x} -> {field:?}");
    }
}

#[test]
fn test_non_finite_rejected() {
    assert!(matches!(
        encode_real(f64::NAN),
        Err(BulkError::NonFiniteValue { .. })
    ));
    assert!(matches!(
        encode_real(f64::INFINITY),
        Err(BulkError::NonFiniteValue { .. })
    ));
}

#[test]
fn test_text_and_id_fields() {
    assert_eq!(text_field("GRID").unwrap(), "GRID    ");
    assert_eq!(id_field(42u32).unwrap(), "42      ");
    assert_eq!(id_field(12345678u32).unwrap(), "12345678");
    assert!(matches!(
        id_field(123456789u32),
        Err(BulkError::FieldOverflow { width: 8, .. })
    ));
    assert_eq!(blank(), "        ");
}

#[test]
fn test_parse_encoder_forms() {
    assert_relative_eq!(parse_real("1.+0    ").unwrap(), 1.0);
    assert_relative_eq!(parse_real("-1.+2   ").unwrap(), -100.0);
    assert_relative_eq!(parse_real("1.2346+7").unwrap(), 1.2346e7);
    assert_relative_eq!(parse_real("1.2345-4").unwrap(), 1.2345e-4);
    assert_relative_eq!(parse_real("-.004200").unwrap(), -0.0042);
    assert_relative_eq!(parse_real(ZERO_FIELD).unwrap(), 0.0);
}

#[test]
fn test_parse_explicit_exponents() {
    assert_relative_eq!(parse_real("1.5E+3").unwrap(), 1500.0);
    assert_relative_eq!(parse_real("1.5e3").unwrap(), 1500.0);
    assert_relative_eq!(parse_real("1.5D3").unwrap(), 1500.0);
    assert_relative_eq!(parse_real("-2.5-2").unwrap(), -0.025);
}

#[test]
fn test_parse_rejects() {
    assert_eq!(parse_real(""), None);
    assert_eq!(parse_real("15"), None);
    assert_eq!(parse_real("1.5x"), None);
    assert_eq!(parse_real("--1."), None);
}

#[test]
fn test_is_valid_real() {
    assert!(is_valid_real("3.250000"));
    assert!(is_valid_real("1.+0    "));
    assert!(!is_valid_real("3.2500000"));
    assert!(!is_valid_real("3"));
}
