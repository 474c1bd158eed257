use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WalkError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        WalkError::pipeline("x")
            .to_string()
            .contains("pipeline error:")
    );
    assert!(WalkError::encode("x").to_string().contains("encode error:"));
    assert!(
        WalkError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn config_errors_name_their_cause() {
    let missing = WalkError::ConfigMissing(PathBuf::from("dreams/run/prompt_config.json"));
    let msg = missing.to_string();
    assert!(msg.contains("configuration missing"));
    assert!(msg.contains("dreams/run/prompt_config.json"));

    let mismatch = WalkError::ConfigMismatch {
        prompts: 2,
        seeds: 3,
    };
    assert_eq!(
        mismatch.to_string(),
        "configuration mismatch: 2 prompts but 3 seeds"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WalkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
