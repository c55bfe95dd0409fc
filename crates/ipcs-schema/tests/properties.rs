//! Property tests for the acceptance rules.

use proptest::prelude::*;

use ipcs_schema::{parse, validate, Rule};

/// A document with `hot` hot keys of type `double` and `cold` ordinary keys.
fn document_with_keys(hot: usize, cold: usize) -> String {
    let mut yaml = String::from(
        "schema_version: '1.0.0'\neventbus_events: {}\ndatastore_keys:\n  anchor: { type: bool }\n",
    );
    for i in 0..hot {
        yaml.push_str(&format!(
            "  hot_{i}: {{ type: double, hot_key: true, access: {{ rt_read: true, rt_write: true }} }}\n"
        ));
    }
    for i in 0..cold {
        yaml.push_str(&format!("  cold_{i}: {{ type: 'array<int32_t, 8>' }}\n"));
    }
    yaml
}

fn hot_key_errors(yaml: &str) -> usize {
    let doc = parse(yaml).unwrap();
    validate(&doc)
        .errors
        .iter()
        .filter(|e| e.rule == Rule::HotKeys)
        .count()
}

proptest! {
    /// N hot keys are rejected iff N > 32.
    #[test]
    fn hot_key_count_budget(hot in 0usize..48, cold in 0usize..4) {
        let yaml = document_with_keys(hot, cold);
        let report = validate(&parse(&yaml).unwrap());
        prop_assert_eq!(report.accepted, hot <= 32);
        prop_assert_eq!(hot_key_errors(&yaml), usize::from(hot > 32));
    }

    /// A hot `array<double, N>` is rejected iff 8 * N > 512.
    #[test]
    fn hot_key_size_budget(count in 1u64..128) {
        let yaml = format!(
            "schema_version: '1.0.0'\neventbus_events: {{}}\ndatastore_keys:\n  axes: {{ type: 'array<double, {count}>', hot_key: true }}\n"
        );
        let report = validate(&parse(&yaml).unwrap());
        prop_assert_eq!(report.accepted, count <= 64);
    }

    /// One duplicate error per repeat beyond the first.
    #[test]
    fn duplicate_errors_per_repeat(repeats in 1usize..6) {
        let mut yaml = String::from("schema_version: '1.0.0'\neventbus_events: {}\ndatastore_keys:\n");
        for _ in 0..repeats {
            yaml.push_str("  robot_mode: { type: int32_t }\n");
        }
        let report = validate(&parse(&yaml).unwrap());
        let duplicates = report
            .errors
            .iter()
            .filter(|e| e.message.starts_with("Duplicate key name: robot_mode"))
            .count();
        prop_assert_eq!(duplicates, repeats - 1);
    }

    /// `rt_write` without `rt_read` is always rejected; with it, always accepted.
    #[test]
    fn access_coherence(rt_read in any::<bool>(), rt_write in any::<bool>(), nonrt in any::<bool>()) {
        let yaml = format!(
            "schema_version: '1.0.0'\neventbus_events: {{}}\ndatastore_keys:\n  k: {{ type: double, access: {{ rt_read: {rt_read}, rt_write: {rt_write}, nonrt_read: {nonrt} }} }}\n"
        );
        let report = validate(&parse(&yaml).unwrap());
        prop_assert_eq!(report.accepted, !rt_write || rt_read);
    }

    /// Any well-formed MAJOR.MINOR.PATCH version is accepted; majors other
    /// than 1 add exactly one warning.
    #[test]
    fn version_strings(major in 0u32..5, minor in 0u32..100, patch in 0u32..100) {
        let yaml = format!(
            "schema_version: '{major}.{minor}.{patch}'\neventbus_events: {{}}\ndatastore_keys: {{}}\n"
        );
        let report = validate(&parse(&yaml).unwrap());
        prop_assert!(report.accepted);
        prop_assert_eq!(report.warnings.len(), usize::from(major != 1));
    }

    /// Positive TTLs pass, zero and negative TTLs fail.
    #[test]
    fn ttl_sign(ttl in -10_000i64..10_000) {
        let yaml = format!(
            "schema_version: '1.0.0'\ndatastore_keys: {{}}\neventbus_events:\n  E: {{ priority: HIGH, ttl_ms: {ttl} }}\n"
        );
        let report = validate(&parse(&yaml).unwrap());
        prop_assert_eq!(report.accepted, ttl > 0);
    }

    /// An integer default for `uint32_t` is accepted iff it lies in 0..=u32::MAX.
    #[test]
    fn unsigned_default_range(value in -(1i64 << 33)..(1i64 << 33)) {
        let yaml = format!(
            "schema_version: '1.0.0'\neventbus_events: {{}}\ndatastore_keys:\n  count: {{ type: uint32_t, default: {value} }}\n"
        );
        let report = validate(&parse(&yaml).unwrap());
        prop_assert_eq!(report.accepted, (0..=i64::from(u32::MAX)).contains(&value));
    }
}
