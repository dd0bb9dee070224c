//! Rendered artifacts read back into the same notifications

mod common;

use common::rpn_response_json;
use paye_sync::core::render::{parse_rendered, render_batch, write_artifact};
use paye_sync::domain::RpnResponse;

fn response(total: u32, ppsns: &[&str]) -> RpnResponse {
    serde_json::from_value(rpn_response_json(total, ppsns)).unwrap()
}

#[test]
fn test_rendered_artifact_parses_back() {
    let original = response(2, &["1234567T", "7654321W"]);

    let xml = render_batch(&original).unwrap();
    let parsed = parse_rendered(&xml).unwrap();

    assert_eq!(parsed, original);
    assert_eq!(parsed.employee_ppsns(), vec!["1234567T", "7654321W"]);
}

#[test]
fn test_normalized_free_text_survives_render() {
    let mut json = rpn_response_json(1, &["1234567T"]);
    json["employerName"] = serde_json::json!("  Acme  Ltd ");
    json["rpns"][0]["name"]["familyName"] = serde_json::json!(" Ó Ceallaigh\n");
    let mut original: RpnResponse = serde_json::from_value(json).unwrap();
    original.validate_and_normalize().unwrap();

    let parsed = parse_rendered(&render_batch(&original).unwrap()).unwrap();

    assert_eq!(parsed, original);
    assert_eq!(parsed.employer_name, "Acme  Ltd");
    assert_eq!(parsed.rpns[0].name.family_name, "Ó Ceallaigh");
}

#[test]
fn test_empty_response_renders() {
    let original = response(0, &[]);

    let xml = render_batch(&original).unwrap();

    assert!(xml.contains("<totalRPNCount>0</totalRPNCount>"));
    assert!(!xml.contains("<rpns>"));
    assert_eq!(parse_rendered(&xml).unwrap().rpns.len(), 0);
}

#[test]
fn test_text_is_escaped() {
    let xml = render_batch(&response(1, &["1234567T"])).unwrap();

    assert!(xml.contains("<employerName>Murphy &amp; Sons Ltd</employerName>"));
    assert!(xml.contains("<familyName>Ó Ceallaigh</familyName>"));
}

#[tokio::test]
async fn test_written_artifact_matches_render() {
    let dir = tempfile::tempdir().unwrap();
    let original = response(1, &["1234567T"]);
    let xml = render_batch(&original).unwrap();

    let path = write_artifact(dir.path(), "RPN_20240301.XML", &xml)
        .await
        .unwrap();
    let on_disk = std::fs::read_to_string(path).unwrap();

    assert_eq!(parse_rendered(&on_disk).unwrap(), original);
}
