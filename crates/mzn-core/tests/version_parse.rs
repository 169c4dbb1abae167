use mzn_core::{MznError, SolverVersion};
use proptest::prelude::*;

#[test]
fn parses_plain_triple() {
    let version = SolverVersion::parse("1.2.3").expect("valid version");
    assert_eq!(version, SolverVersion::new(1, 2, 3));
    assert_eq!(version.to_string(), "1.2.3");
}

#[test]
fn extracts_triple_from_free_form_text() {
    let version: SolverVersion = "Gecode version 6.3.0 (build 42)".parse().expect("valid");
    assert_eq!(version, SolverVersion::new(6, 3, 0));
}

#[test]
fn first_triple_wins() {
    let version = SolverVersion::parse("v2.8.1-rc uses lib 1.0.0").expect("valid");
    assert_eq!(version, SolverVersion::new(2, 8, 1));
}

#[test]
fn rejects_text_without_triple() {
    for input in ["", "dev", "1.2", "1..2.3", "a.b.c"] {
        let err = SolverVersion::parse(input).expect_err("no triple");
        assert!(matches!(err, MznError::Config(_)), "{input}: {err}");
        assert_eq!(err.code(), "mzn_core.version_format");
    }
}

#[test]
fn accepts_date_stamped_build_numbers() {
    let version = SolverVersion::parse("Foo 2024.10.20241018123").expect("valid");
    assert_eq!(version, SolverVersion::new(2024, 10, 20_241_018_123));
    assert_eq!(version.to_string(), "2024.10.20241018123");
}

#[test]
fn rejects_components_out_of_range() {
    let err = SolverVersion::parse("1.2.99999999999999999999").expect_err("overflow");
    assert_eq!(err.code(), "mzn_core.version_component");
}

#[test]
fn serializes_as_dotted_string() {
    let json = serde_json::to_string(&SolverVersion::new(0, 6, 1)).expect("serialize");
    assert_eq!(json, "\"0.6.1\"");
    let decoded: SolverVersion = serde_json::from_str("\"2023.04.11\"").expect("deserialize");
    assert_eq!(decoded, SolverVersion::new(2023, 4, 11));
    assert!(serde_json::from_str::<SolverVersion>("\"latest\"").is_err());
}

proptest! {
    #[test]
    fn embedded_triples_parse_exactly(
        major in 0u64..100_000,
        minor in 0u64..100_000,
        patch in 0u64..100_000,
        prefix in "[a-zA-Z ]{0,8}",
        suffix in "[a-zA-Z -]{0,8}",
    ) {
        let text = format!("{prefix}{major}.{minor}.{patch}{suffix}");
        let version = SolverVersion::parse(&text).unwrap();
        prop_assert_eq!(version, SolverVersion::new(major, minor, patch));
        prop_assert_eq!(version.to_string().parse::<SolverVersion>().unwrap(), version);
    }

    #[test]
    fn components_beyond_u32_parse_exactly(
        major in (u64::from(u32::MAX) + 1)..u64::MAX,
        minor in 0u64..=u64::MAX,
        patch in (u64::from(u32::MAX) + 1)..=u64::MAX,
    ) {
        let text = format!("solver {major}.{minor}.{patch}");
        let version = SolverVersion::parse(&text).unwrap();
        prop_assert_eq!(version, SolverVersion::new(major, minor, patch));
    }

    #[test]
    fn text_without_dots_never_parses(text in "[a-zA-Z0-9 ]{0,24}") {
        prop_assert!(SolverVersion::parse(&text).is_err());
    }
}
