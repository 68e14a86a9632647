use std::collections::HashSet;

use blockwatch_core::models::Evidence;
use blockwatch_core::traits::EvidenceStore;
use blockwatch_core::Domain;
use blockwatch_store::FsEvidenceStore;

fn evidence(domain: &str, attempt: u32, body: &str) -> Evidence {
    Evidence {
        domain: Domain::parse(domain).unwrap(),
        isp_label: "ES_DigiSpain".into(),
        attempt,
        body: body.into(),
    }
}

#[tokio::test]
async fn save_creates_directories_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsEvidenceStore::new(dir.path().join("html_content"));

    let path = store.save(&evidence("a.com", 1, "<html>a</html>")).await.unwrap();

    assert_eq!(
        path,
        dir.path().join("html_content/a.com/ES_DigiSpain_attempt1.html")
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html>a</html>");
}

#[tokio::test]
async fn attempts_never_overwrite_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsEvidenceStore::new(dir.path());

    let first = store.save(&evidence("a.com", 1, "first")).await.unwrap();
    let second = store.save(&evidence("a.com", 2, "second")).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(std::fs::read_to_string(&first).unwrap(), "first");
    assert_eq!(std::fs::read_to_string(&second).unwrap(), "second");
}

#[tokio::test]
async fn domains_never_collide() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsEvidenceStore::new(dir.path());

    let mut paths = HashSet::new();
    for domain in ["a.com", "b.com", "a.co", "www.a.com"] {
        let path = store.save(&evidence(domain, 1, domain)).await.unwrap();
        assert!(paths.insert(path.clone()), "collision at {}", path.display());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), domain);
    }
}

#[tokio::test]
async fn unwritable_root_is_evidence_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("not_a_dir");
    std::fs::write(&file, "x").unwrap();
    let store = FsEvidenceStore::new(&file);

    let err = store.save(&evidence("a.com", 1, "x")).await.unwrap_err();
    assert!(matches!(err, blockwatch_core::AppError::EvidenceError(_)));
}
