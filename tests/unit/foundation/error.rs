use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        Error::insufficient_data("x")
            .to_string()
            .contains("insufficient data:")
    );
    assert!(
        Error::invalid_policy("x")
            .to_string()
            .contains("invalid policy:")
    );
    assert!(
        Error::invalid_input("x")
            .to_string()
            .contains("invalid input:")
    );
    assert!(
        Error::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert_eq!(Error::Cancelled.to_string(), "animation cancelled");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = Error::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
