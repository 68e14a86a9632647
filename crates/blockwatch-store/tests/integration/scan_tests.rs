use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use blockwatch_core::models::{ProbeFailure, ProbeOutcome};
use blockwatch_core::{NullReporter, RetryPolicy, ScanConfig, Scanner, load_domains_from_path};
use blockwatch_store::{CsvResultSink, FsEvidenceStore};

use crate::common::{BLOCK_PAGE, ScriptedProber, read_rows};

fn fast_config() -> ScanConfig {
    ScanConfig::default().with_retry(RetryPolicy::new(3, Duration::from_millis(1)))
}

#[test]
fn domain_file_is_cleaned_and_deduplicated() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "a.com\nb.com\na.com\nnotadomain\n.bad\n").unwrap();

    let domains = load_domains_from_path(file.path()).unwrap();
    let names: Vec<_> = domains.iter().map(|d| d.as_str()).collect();
    assert_eq!(names, vec!["a.com", "b.com"]);
}

#[tokio::test]
async fn block_on_second_attempt_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("domains.txt");
    std::fs::write(&input, "blocked.example\nclean.example\n").unwrap();
    let output = dir.path().join("results.csv");
    let evidence_root = dir.path().join("html_content");

    let prober = ScriptedProber::default()
        .script(
            "blocked.example",
            vec![
                ProbeOutcome::TransientError(ProbeFailure::Timeout),
                ProbeOutcome::Blocked(BLOCK_PAGE.into()),
            ],
        )
        .script("clean.example", vec![ProbeOutcome::NotBlocked]);

    let scanner = Scanner::new(
        prober.clone(),
        FsEvidenceStore::new(&evidence_root),
        CsvResultSink::create(&output).unwrap(),
        fast_config(),
    )
    .unwrap();

    let domains = load_domains_from_path(&input).unwrap();
    let summary = scanner.run(domains, Arc::new(NullReporter)).await.unwrap();

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.blocked, 1);

    let mut rows = read_rows(&output);
    rows.sort();
    assert_eq!(
        rows,
        vec![
            vec!["blocked.example", "ES_DigiSpain", "True"],
            vec!["clean.example", "ES_DigiSpain", "False"],
        ]
    );

    let attempt2 = evidence_root.join("blocked.example/ES_DigiSpain_attempt2.html");
    assert_eq!(std::fs::read_to_string(&attempt2).unwrap(), BLOCK_PAGE);
    assert!(!evidence_root.join("blocked.example/ES_DigiSpain_attempt1.html").exists());
    assert!(!evidence_root.join("clean.example").exists());

    assert_eq!(prober.calls("blocked.example"), 2);
    assert_eq!(prober.calls("clean.example"), 3);
}

#[tokio::test]
async fn row_count_matches_unique_domains_under_failures() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("domains.txt");
    let mut lines = String::new();
    for i in 0..40 {
        lines.push_str(&format!("d{i}.example\n"));
        lines.push_str(&format!("d{i}.example\n"));
    }
    lines.push_str("garbage\n.hidden.example\n\n");
    std::fs::write(&input, lines).unwrap();
    let output = dir.path().join("results.csv");

    let mut prober = ScriptedProber::default();
    for i in (0..40).step_by(2) {
        prober = prober.script(
            &format!("d{i}.example"),
            vec![ProbeOutcome::TransientError(ProbeFailure::Connect("refused".into())); 3],
        );
    }

    let scanner = Scanner::new(
        prober,
        FsEvidenceStore::new(dir.path().join("html_content")),
        CsvResultSink::create(&output).unwrap(),
        fast_config().with_concurrency(5),
    )
    .unwrap();

    let domains = load_domains_from_path(&input).unwrap();
    assert_eq!(domains.len(), 40);
    scanner.run(domains, Arc::new(NullReporter)).await.unwrap();

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 40);
    assert!(rows.iter().all(|r| r[2] == "False"));
}

#[tokio::test]
async fn inconclusive_flag_marks_unreachable_domains() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("results.csv");

    let prober = ScriptedProber::default().script(
        "down.example",
        vec![ProbeOutcome::TransientError(ProbeFailure::Timeout); 3],
    );
    let scanner = Scanner::new(
        prober,
        FsEvidenceStore::new(dir.path()),
        CsvResultSink::create(&output).unwrap().with_inconclusive(true),
        fast_config(),
    )
    .unwrap();

    let domains = vec![
        blockwatch_core::Domain::parse("down.example").unwrap(),
        blockwatch_core::Domain::parse("up.example").unwrap(),
    ];
    let summary = scanner.run(domains, Arc::new(NullReporter)).await.unwrap();
    assert_eq!(summary.inconclusive, 1);

    let mut rows = read_rows(&output);
    rows.sort();
    assert_eq!(rows[0], vec!["down.example", "ES_DigiSpain", "Inconclusive"]);
    assert_eq!(rows[1], vec!["up.example", "ES_DigiSpain", "False"]);
}
