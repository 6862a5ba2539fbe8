use super::*;
use crate::source::ChangeEvent;
use std::collections::{BTreeSet, HashMap};

#[tokio::test]
async fn records_subscribe_and_refresh_calls() {
    let fake = FakeFileChangeSource::new();
    let mut targets = HashMap::new();
    targets.insert("app".to_string(), vec!["src/**".to_string()]);

    fake.subscribe_targets(&targets).await.unwrap();
    fake.refresh_targets(&targets).await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            WatchCall::Subscribe(targets.clone()),
            WatchCall::Refresh(targets),
        ]
    );
}

#[tokio::test]
async fn delivers_pushed_batches_in_order() {
    let fake = FakeFileChangeSource::new();
    let batch = FileChangeBatch {
        files: vec![ChangeEvent::new("src/a.rs", true, None)],
        targets: BTreeSet::from(["app".to_string()]),
    };
    fake.push_batch(batch.clone());

    let received = fake.recv_batch().await.unwrap();
    assert_eq!(received, batch);
}

#[tokio::test]
async fn stop_is_recorded() {
    let fake = FakeFileChangeSource::new();
    assert!(!fake.was_stopped());
    fake.stop().await;
    assert!(fake.was_stopped());
}
