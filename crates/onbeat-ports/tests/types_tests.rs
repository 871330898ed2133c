use onbeat_ports::transport::TransportSnapshot;
use onbeat_ports::types::{Bpm, TimeSignature, TimeSignatureError};
use pretty_assertions::assert_eq;

#[test]
fn time_signature_deserializes_through_validation() {
    let meter: TimeSignature =
        serde_json::from_str(r#"{"numerator":3,"denominator":4}"#).expect("3/4 is valid");
    assert_eq!(meter, TimeSignature::new(3, 4).expect("valid"));

    let zero_numerator = serde_json::from_str::<TimeSignature>(r#"{"numerator":0,"denominator":4}"#);
    let err = zero_numerator.expect_err("0/4 must be rejected");
    assert!(err.to_string().contains("invalid time signature 0/4"), "{err}");

    assert!(serde_json::from_str::<TimeSignature>(r#"{"numerator":4,"denominator":0}"#).is_err());
}

#[test]
fn time_signature_serializes_as_fields() {
    let meter = TimeSignature::new(7, 8).expect("valid");
    let json = serde_json::to_string(&meter).expect("serialize");
    assert_eq!(json, r#"{"numerator":7,"denominator":8}"#);
}

#[test]
fn constructor_reports_both_parts() {
    assert_eq!(
        TimeSignature::new(0, 4),
        Err(TimeSignatureError {
            numerator: 0,
            denominator: 4
        })
    );
}

#[test]
fn host_snapshot_with_zero_meter_is_rejected() {
    let json = r#"{"bpm":90.0,"time_signature":{"numerator":0,"denominator":4},"is_recording":false}"#;
    assert!(serde_json::from_str::<TransportSnapshot>(json).is_err());

    let json = r#"{"bpm":90.0,"time_signature":{"numerator":6,"denominator":8},"is_recording":false}"#;
    let snapshot: TransportSnapshot = serde_json::from_str(json).expect("valid snapshot");
    assert_eq!(snapshot.time_signature, TimeSignature::new(6, 8).ok());
}

#[test]
fn bpm_rejects_non_positive_values_from_json() {
    assert!(serde_json::from_str::<Bpm>("0.0").is_err());
    assert!(serde_json::from_str::<Bpm>("-12.5").is_err());
    let bpm: Bpm = serde_json::from_str("96.0").expect("valid tempo");
    assert_eq!(bpm.get(), 96.0);
}
