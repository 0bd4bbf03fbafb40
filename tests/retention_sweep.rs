//! Retention sweep tests
//!
//! Trashed versions are purged once the retention window has fully elapsed.

mod fixtures;

use std::sync::Arc;

use fixtures::{FlakyDeletes, TestVault};
use snapvault::{FileStore, RetentionPolicy, VersionIndex};

#[test]
fn test_retention_boundary() {
    for (days, purged) in [(29, false), (30, true), (31, true)] {
        let t = TestVault::new();
        let v = t.vault.create_version(None).unwrap();
        t.vault.trash(&v.id).unwrap();

        t.clock.advance_days(days);
        let report = t.vault.daily_cleanup().unwrap();

        assert_eq!(report.purged.len() == 1, purged, "after {} days", days);
        assert_eq!(t.index.get(&v.id).unwrap().is_none(), purged);
        assert_eq!(t.archive_file(&v.filename).exists(), !purged);
    }
}

#[test]
fn test_days_left_counts_down() {
    let t = TestVault::new();
    let v = t.vault.create_version(None).unwrap();
    let trashed = t.vault.trash(&v.id).unwrap();

    assert_eq!(t.vault.days_left(&trashed), Some(30));
    t.clock.advance_days(29);
    assert_eq!(t.vault.days_left(&trashed), Some(1));
    t.clock.advance_days(5);
    assert_eq!(t.vault.days_left(&trashed), Some(0));
}

#[test]
fn test_cleanup_is_idempotent() {
    let t = TestVault::new();
    let a = t.vault.create_version(Some("a")).unwrap();
    let b = t.vault.create_version(Some("b")).unwrap();
    t.vault.trash(&a.id).unwrap();
    t.clock.advance_days(40);

    let first = t.vault.daily_cleanup().unwrap();
    let after_first = t.index.load().unwrap();
    let second = t.vault.daily_cleanup().unwrap();

    assert_eq!(first.purged, vec![a.id]);
    assert!(second.purged.is_empty());
    assert_eq!(t.index.load().unwrap(), after_first);
    assert!(after_first.contains_key(&b.id));
}

#[test]
fn test_active_versions_never_purged() {
    let t = TestVault::new();
    let v = t.vault.create_version(None).unwrap();
    t.clock.advance_days(400);

    let report = t.vault.daily_cleanup().unwrap();
    assert_eq!(report.scanned, 0);
    assert!(t.index.get(&v.id).unwrap().is_some());
}

#[test]
fn test_dry_run_reports_without_deleting() {
    let t = TestVault::new();
    let v = t.vault.create_version(None).unwrap();
    t.vault.trash(&v.id).unwrap();
    t.clock.advance_days(31);

    let report = t
        .vault
        .daily_cleanup_with(RetentionPolicy::default().with_dry_run())
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.purged, vec![v.id.clone()]);
    assert!(t.index.get(&v.id).unwrap().is_some());
    assert!(t.archive_file(&v.filename).exists());
}

#[test]
fn test_failed_delete_keeps_version_and_purges_rest() {
    let mut flaky = None;
    let t = TestVault::build(|dir| {
        let store = Arc::new(FlakyDeletes::new(dir));
        flaky = Some(store.clone());
        store as Arc<dyn FileStore>
    });
    let flaky = flaky.unwrap();

    let stuck = t.vault.create_version(Some("stuck")).unwrap();
    let gone = t.vault.create_version(Some("gone")).unwrap();
    t.vault.bulk_trash(&[stuck.id.as_str(), gone.id.as_str()]).unwrap();
    flaky.fail_delete_of(&stuck.filename);
    t.clock.advance_days(31);

    let report = t.vault.daily_cleanup().unwrap();

    assert_eq!(report.purged, vec![gone.id.clone()]);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains(&stuck.id));
    assert!(t.index.get(&stuck.id).unwrap().is_some());
    assert!(t.index.get(&gone.id).unwrap().is_none());
    assert!(flaky.exists(&stuck.filename));

    // Next sweep retries
    flaky.heal();
    let retry = t.vault.daily_cleanup().unwrap();
    assert_eq!(retry.purged, vec![stuck.id.clone()]);
    assert!(t.index.load().unwrap().is_empty());
}
