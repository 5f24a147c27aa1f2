//! Tests for capability detection

use fleet_batcher::registry::Capability;

#[test]
fn test_program_names_round_trip() {
    let caps = Capability::from_programs(Capability::ALL.iter().map(|c| c.program()));
    assert_eq!(caps, Capability::ALL.to_vec());
}

#[test]
fn test_display_uses_program_name() {
    assert_eq!(Capability::FtpCrack.to_string(), "FTPCrack.exe");
}

#[test]
fn test_serde_names() {
    let json = serde_json::to_string(&Capability::HttpWorm).expect("serialize");
    assert_eq!(json, "\"http_worm\"");
}
