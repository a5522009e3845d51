//! Integration tests for report rendering and the ensure boundary

use pretty_assertions::assert_eq;
use serde_json::Value;

use checktrace::prelude::*;

fn length_report(config: ReportConfig) -> Report {
    let check: Check<str> = not(transform(length()).check(less_than(100)));
    let record = Evaluator::default().explain(&check, "").unwrap();
    ReportRenderer::new(config).render(&record)
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_full_report_layout() {
    let rendered = length_report(ReportConfig::full()).to_string();
    let expected = concat!(
        "EXPECTED                      ACTUAL\n",
        "-------------------------------------------\n",
        ">> !(length <[100]) -> true   \"\" -> false\n",
        ">>   length <[100] -> false     \"\" -> true\n",
        "       length                     \"\" -> 0\n",
        ">>     <[100] -> false            0 -> true\n",
    );
    assert_eq!(rendered, expected);
}

#[test]
fn test_columns_render_separately() {
    let report = length_report(ReportConfig::default());
    assert_eq!(
        report.expected(),
        concat!(
            ">> !(length <[100]) -> true\n",
            ">>   length <[100] -> false\n",
            "       length\n",
            ">>     <[100] -> false",
        )
    );
    assert_eq!(report.outcome(), Some(false));
}

#[test]
fn test_custom_marker_and_indent() {
    let config = ReportConfig {
        indent_width: 4,
        mismatch_marker: "* ".to_string(),
        show_header: false,
        ..ReportConfig::default()
    };
    let report = length_report(config);
    let expected: Vec<&str> = report.rows().iter().map(ReportRow::expected).collect();
    assert_eq!(
        expected,
        vec![
            "* !(length <[100]) -> true",
            "*     length <[100] -> false",
            "          length",
            "*         <[100] -> false",
        ]
    );
}

#[test]
fn test_mismatch_only_keeps_failing_path() {
    let check: Check<i32> = less_than(10).or(greater_than(20)).and(not_equal_to(15));
    let record = check.explain(&15).unwrap();
    let report = ReportRenderer::new(ReportConfig::mismatches()).render(&record);

    let expected: Vec<&str> = report.rows().iter().map(ReportRow::expected).collect();
    assert_eq!(
        expected,
        vec![
            ">> (<[10]||>[20])&&!=[15] -> true",
            ">>   <[10]||>[20] -> true",
            ">>     <[10] -> true",
            ">>     >[20] -> true",
        ]
    );
}

#[test]
fn test_unconsumed_elements_are_listed() {
    let words = vec!["ok", "fine", "no", "yes", "maybe"];
    let check: Check<[&str]> = all_match(transform(length()).check(less_than(3)));
    let record = check.explain(&words).unwrap();
    let report = ReportRenderer::default().render(&record);

    let last = report.rows().last().unwrap();
    assert_eq!(last.expected(), "     unconsumed");
    assert_eq!(last.actual(), "  [\"no\", \"yes\", \"maybe\"]");
    assert!(report.rows().iter().any(|row| row.actual().starts_with("  [1] ")));
}

#[test]
fn test_truncated_remaining_ends_with_ellipsis() {
    let evaluator = Evaluator::new(ExplainConfig {
        max_remaining: 2,
        ..ExplainConfig::default()
    });
    let values: Vec<i32> = (0..10).collect();
    let check: Check<[i32]> = any_match(equal_to(1));
    let record = evaluator.explain(&check, &values).unwrap();
    let report = ReportRenderer::default().render(&record);
    assert_eq!(report.rows().last().unwrap().actual(), "  [2, 3, ...]");
}

// =============================================================================
// Fault Rendering Tests
// =============================================================================

fn parse_positive() -> Check<str> {
    Check::try_named("parse", |s: &str| s.parse::<i32>().map(|n| n > 0)).unwrap()
}

#[test]
fn test_fault_inside_conjunction_renders() {
    let check: Check<str> = starts_with("1").and(parse_positive());
    let err = Evaluator::default().explain(&check, "1x").unwrap_err();
    let report = ReportRenderer::default().render(err.record());

    assert_eq!(report.outcome(), None);
    let expected: Vec<&str> = report.rows().iter().map(ReportRow::expected).collect();
    assert_eq!(
        expected,
        vec!["   starts_with[\"1\"]&&parse", "     starts_with[\"1\"]", ">>   parse"]
    );
    assert_eq!(
        report.actual(),
        concat!(
            "\"1x\" -> aborted\n",
            "  \"1x\" -> true\n",
            "  \"1x\" -> raised invalid digit found in string",
        )
    );
    assert!(!report.rows()[0].is_mismatch());
    assert!(report.rows()[2].is_mismatch());
}

#[test]
fn test_fault_report_mismatch_only_keeps_origin() {
    let check: Check<str> = starts_with("1").and(parse_positive());
    let err = Evaluator::default().explain(&check, "1x").unwrap_err();
    let report = ReportRenderer::new(ReportConfig::mismatches()).render(err.record());

    let expected: Vec<&str> = report.rows().iter().map(ReportRow::expected).collect();
    assert_eq!(expected, vec!["   starts_with[\"1\"]&&parse", ">>   parse"]);
}

#[test]
fn test_unbuffered_replay_source_reports_unavailable() {
    let source = ReplaySource::new(vec![1, 5, 2, 0]);
    let check: Check<ReplaySource<_>> = quantify(QuantifierKind::All, less_than(3));
    assert!(!check.test(&source).unwrap());

    let record = Evaluator::default().explain(&check, &source).unwrap();
    let report = ReportRenderer::default().render(&record);
    assert_eq!(report.rows().len(), 4);

    let last = report.rows().last().unwrap();
    assert_eq!(last.expected(), "     unconsumed");
    assert_eq!(last.actual(), "  detail unavailable");
    assert!(!last.is_mismatch());
}

#[test]
fn test_ensure_renders_explain_fault() {
    let calls = std::sync::atomic::AtomicUsize::new(0);
    let calls = std::sync::Arc::new(calls);
    let counter = calls.clone();
    // Quietly false on the fast path, raises on the replay.
    let unstable: Check<i32> = Check::try_named("unstable", move |_: &i32| {
        match counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) {
            0 => Ok(false),
            _ => Err("replay diverged"),
        }
    })
    .unwrap();
    let check = always_true().and(unstable);

    let err = ensure(&check, &7).unwrap_err();
    assert_eq!(err.code(), "CHECK_EVALUATION_FAULT");

    let message = err.to_string();
    let mut lines = message.lines();
    assert_eq!(lines.next(), Some("check `true&&unstable` raised while explaining"));
    assert_eq!(lines.next().map(|l| l.starts_with("EXPECTED")), Some(true));
    assert!(message.contains(">>   unstable"));
    assert!(message.contains("7 -> raised replay diverged"));
    assert!(err.report().is_some());
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_record_serializes_to_json() {
    let check: Check<str> = not(transform(length()).check(less_than(100)));
    let record = check.explain("").unwrap();
    let json: Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();

    assert_eq!(json["root"]["kind"]["type"], "not");
    assert_eq!(json["root"]["output"]["status"], "bool");
    assert_eq!(json["root"]["output"]["value"], false);
    assert_eq!(json["root"]["expected"], true);
    assert_eq!(json["root"]["mismatch"], true);

    let transform = &json["root"]["children"][0];
    assert_eq!(transform["kind"]["type"], "transform");
    assert_eq!(transform["description"], "length <[100]");

    let mapper = &transform["children"][0];
    assert_eq!(mapper["kind"]["type"], "mapper");
    assert_eq!(mapper["output"]["value"], "0");
    assert!(mapper.get("expected").is_none());
}

// =============================================================================
// Ensure Tests
// =============================================================================

#[test]
fn test_ensure_message_embeds_report() {
    let check: Check<str> = starts_with("http").and(ends_with(".rs"));
    let err = ensure(&check, "ftp://example.rs").unwrap_err();
    assert_eq!(err.code(), "CHECK_VIOLATED");

    let message = err.to_string();
    let mut lines = message.lines();
    assert_eq!(lines.next(), Some("check `starts_with[\"http\"]&&ends_with[\".rs\"]` failed"));
    assert_eq!(lines.next().map(|l| l.starts_with("EXPECTED")), Some(true));
}

#[test]
fn test_ensure_passes_silently() {
    let check: Check<str> = starts_with("http").and(ends_with(".rs"));
    assert!(ensure(&check, "https://example.rs").is_ok());
}
