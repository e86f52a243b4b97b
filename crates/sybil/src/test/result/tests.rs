use super::*;

#[test]
fn test_outcome_predicates() {
    assert!(TestOutcome::Passed.is_passed());
    assert!(!TestOutcome::Passed.is_failed());
    assert!(TestOutcome::Failed("error".into()).is_failed());
    assert!(TestOutcome::Skipped("reason".into()).is_skipped());
}

#[test]
fn test_file_summary() {
    let mut summary = FileSummary::new(PathBuf::from("doc.rst"));
    summary.add_result(TestResult::passed(
        "line:1,column:1".into(),
        Duration::from_millis(10),
    ));
    summary.add_result(TestResult::failed(
        "line:3,column:1".into(),
        "boom".into(),
        Duration::from_millis(5),
    ));
    summary.add_result(TestResult::skipped("line:5,column:1".into(), "later".into()));

    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.duration, Duration::from_millis(15));
    assert!(summary.has_failures());
}

#[test]
fn test_file_errors_are_failures() {
    let mut summary = FileSummary::new(PathBuf::from("doc.rst"));
    summary.add_error("does not compile".into());
    assert_eq!(summary.total(), 0);
    assert!(summary.has_failures());

    let mut overall = TestSummary::new();
    overall.add_file(summary);
    assert_eq!(overall.error_files, 1);
    assert_eq!(overall.exit_code(), 1);
}

#[test]
fn test_summary_exit_code() {
    let mut summary = TestSummary::new();
    assert_eq!(summary.exit_code(), 2);

    summary.passed = 1;
    assert_eq!(summary.exit_code(), 0);

    summary.skipped = 3;
    assert_eq!(summary.exit_code(), 0);

    summary.failed = 1;
    assert_eq!(summary.exit_code(), 1);
}
