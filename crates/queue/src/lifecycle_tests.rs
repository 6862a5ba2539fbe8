use super::*;
use crate::builder::fake::FakeBuilder;
use parking_lot::Mutex as SyncMutex;
use poltergeist_core::{BuildSchedulingConfig, FakeClock};
use poltergeist_state::StateStoreConfig;
use poltergeist_watch::FakeFileChangeSource;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

struct MapBuilderFactory {
    builders: SyncMutex<HashMap<String, Arc<FakeBuilder>>>,
}

impl MapBuilderFactory {
    fn new() -> Self {
        Self {
            builders: SyncMutex::new(HashMap::new()),
        }
    }

    fn builder_for(&self, name: &str) -> Arc<FakeBuilder> {
        self.builders
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(FakeBuilder::new(name)))
            .clone()
    }
}

impl BuilderFactory for MapBuilderFactory {
    fn create(&self, target: &Target) -> Result<SharedBuilder, String> {
        Ok(self.builder_for(&target.name))
    }
}

fn make_target(name: &str) -> Target {
    Target {
        name: name.to_string(),
        target_type: poltergeist_core::TargetType::Executable,
        enabled: true,
        watch_paths: vec!["src/".to_string()],
        settling_delay_ms: 1000,
        auto_run: None,
        environment: HashMap::new(),
        output_path: None,
    }
}

fn harness() -> (
    Arc<Lifecycle<FakeClock>>,
    Arc<StateStore<FakeClock>>,
    Arc<FakeFileChangeSource>,
    Arc<MapBuilderFactory>,
) {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let config = StateStoreConfig {
        state_dir: dir.path().to_path_buf(),
        project_path: PathBuf::from("/tmp/project"),
        project_name: "project".to_string(),
        config_path: "poltergeist.config.json".to_string(),
        heartbeat_interval: Duration::from_secs(10),
        stale_threshold: Duration::from_secs(30),
    };
    std::mem::forget(dir);
    let store = StateStore::with_clock_and_writer(config, Arc::clone(&clock), poltergeist_state::FsStateWriter);
    let watcher = Arc::new(FakeFileChangeSource::new());
    let factory = Arc::new(MapBuilderFactory::new());
    let queue = IntelligentBuildQueue::new(BuildSchedulingConfig::default(), Arc::clone(&clock), store.clone());
    let lifecycle = Arc::new(Lifecycle::new(
        queue,
        watcher.clone() as Arc<dyn poltergeist_watch::FileChangeSource>,
        store.clone(),
        factory.clone() as Arc<dyn BuilderFactory>,
        clock,
        PathBuf::from("/tmp/project"),
    ));
    (lifecycle, store, watcher, factory)
}

#[tokio::test]
async fn add_targets_registers_subscribes_and_queues_initial_build() {
    let (lifecycle, _store, watcher, factory) = harness();
    let errors = lifecycle.add_targets(vec![make_target("app")]).await;
    assert!(errors.is_empty());

    assert_eq!(factory.builder_for("app").build_count(), 0);
    let states = lifecycle.get_target_states();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].name, "app");

    assert!(watcher
        .calls()
        .iter()
        .any(|c| matches!(c, poltergeist_watch::WatchCall::Subscribe(_))));
}

#[tokio::test]
async fn validation_failure_is_isolated_to_its_own_target() {
    let (lifecycle, store, _watcher, factory) = harness();
    let bad_builder = Arc::new(FakeBuilder::new("bad").with_validation_failure());
    factory.builders.lock().insert("bad".to_string(), bad_builder);

    let errors = lifecycle
        .add_targets(vec![make_target("bad"), make_target("good")])
        .await;
    assert_eq!(errors.len(), 1);

    let states = lifecycle.get_target_states();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].name, "good");

    let bad_state = store.read_state("bad").unwrap().unwrap();
    let status = bad_state.last_build.unwrap();
    assert!(!status.is_success());
}

#[tokio::test]
async fn remove_targets_clears_in_memory_and_persisted_state() {
    let (lifecycle, store, _watcher, _factory) = harness();
    lifecycle.add_targets(vec![make_target("app")]).await;
    assert!(store.read_state("app").unwrap().is_some());

    lifecycle.remove_targets(&["app".to_string()]).await;
    assert!(lifecycle.get_target_states().is_empty());
    assert!(store.read_state("app").unwrap().is_none());
}

#[tokio::test]
async fn stop_targets_stops_the_builder_and_removes_state() {
    let (lifecycle, store, _watcher, factory) = harness();
    lifecycle.add_targets(vec![make_target("app")]).await;
    let builder = factory.builder_for("app");

    lifecycle.stop_targets(Some(&["app".to_string()])).await;

    assert!(builder.was_stopped());
    assert!(store.read_state("app").unwrap().is_none());
}

#[tokio::test]
async fn update_targets_preserves_builder_when_kind_unchanged() {
    let (lifecycle, _store, _watcher, factory) = harness();
    lifecycle.add_targets(vec![make_target("app")]).await;
    let before = Arc::as_ptr(&factory.builder_for("app"));

    let mut updated = make_target("app");
    updated.watch_paths = vec!["src/".to_string(), "assets/".to_string()];
    let errors = lifecycle.update_targets(vec![updated]).await;
    assert!(errors.is_empty());

    let after = Arc::as_ptr(&factory.builder_for("app"));
    assert_eq!(before, after);
}
