// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor (spec §15): owns the startup/shutdown sequence and
//! the run loop that wires the watcher, the Debouncer, the Config-Reload
//! Orchestrator, and signal handling together. Everything it drives is
//! already generic over `Clock`/`StateWriter` — the supervisor just
//! assembles one instance of each per process, the same "own the timer,
//! don't reach for statics" shape spec §9 asks for.

use crate::config::{resolve_config_path, DEFAULT_CONFIG_POLL_INTERVAL, SHUTDOWN_GRACE_PERIOD};
use crate::error::DaemonError;
use parking_lot::Mutex;
use poltergeist_config::{self as config, ConfigDiff, ValidatedConfig};
use poltergeist_core::Clock;
use poltergeist_queue::{BuilderFactory, Debouncer, IntelligentBuildQueue, Lifecycle};
use poltergeist_state::{StateStore, StateStoreConfig, StateWriter};
use poltergeist_watch::{FileChangeBatch, FileChangeSource, NotifyFileChangeSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};

/// Owns the mutable wiring a `buildSchedulingChanged` reload replaces
/// (spec §4.I: the queue and lifecycle are rebuilt, targets are not
/// lost). Kept behind a lock rather than re-derived from `Supervisor`
/// fields so a reload is one atomic swap.
struct Wiring<C: Clock, W: StateWriter + Clone> {
    queue: Arc<IntelligentBuildQueue<C, W>>,
    lifecycle: Arc<Lifecycle<C, W>>,
}

pub struct Supervisor<C: Clock + 'static, W: StateWriter + Clone + 'static> {
    project_root: PathBuf,
    config_path: PathBuf,
    clock: Arc<C>,
    state_store: Arc<StateStore<C, W>>,
    watcher: Arc<dyn FileChangeSource>,
    debouncer: Arc<Debouncer<C>>,
    builder_factory: Arc<dyn BuilderFactory>,
    wiring: Mutex<Wiring<C, W>>,
    current_config: Mutex<ValidatedConfig>,
}

impl<C: Clock + 'static, W: StateWriter + Clone + 'static> Supervisor<C, W> {
    /// Steps 1-5 of spec §15: load config, bring up the State Store,
    /// the watcher, the queue, and every enabled target.
    pub async fn start(
        project_root: PathBuf,
        explicit_config_path: Option<PathBuf>,
        state_dir: PathBuf,
        clock: Arc<C>,
        writer: W,
        builder_factory: Arc<dyn BuilderFactory>,
    ) -> Result<Arc<Self>, DaemonError> {
        let config_path = resolve_config_path(&project_root, explicit_config_path);
        if !config_path.exists() {
            return Err(DaemonError::ConfigNotFound(config_path.display().to_string()));
        }
        let validated = config::load_file(&config_path)?; // step 1

        let project_name = project_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let mut store_config =
            StateStoreConfig::new(project_root.clone(), project_name, config_path.display().to_string());
        store_config.state_dir = state_dir;
        let state_store = StateStore::with_clock_and_writer(store_config, Arc::clone(&clock), writer); // step 2
        state_store.start_heartbeat();

        let watcher: Arc<dyn FileChangeSource> =
            Arc::new(NotifyFileChangeSource::new(project_root.clone())); // step 3

        let queue = IntelligentBuildQueue::new(validated.build_scheduling.clone(), Arc::clone(&clock), Arc::clone(&state_store)); // step 4

        let lifecycle = Arc::new(Lifecycle::new(
            Arc::clone(&queue),
            Arc::clone(&watcher),
            Arc::clone(&state_store),
            Arc::clone(&builder_factory),
            Arc::clone(&clock),
            project_root.clone(),
        ));
        queue.add_observer(lifecycle.clone());

        let errors = lifecycle
            .add_targets(validated.enabled_targets().cloned().collect()) // step 5
            .await;
        for err in errors {
            tracing::warn!(error = %err, "target failed to come up during startup");
        }

        let debouncer = Arc::new(Debouncer::new(Arc::clone(&clock)));

        Ok(Arc::new(Self {
            project_root,
            config_path,
            clock,
            state_store,
            watcher,
            debouncer,
            builder_factory,
            wiring: Mutex::new(Wiring { queue, lifecycle }),
            current_config: Mutex::new(validated),
        }))
    }

    fn queue(&self) -> Arc<IntelligentBuildQueue<C, W>> {
        Arc::clone(&self.wiring.lock().queue)
    }

    fn lifecycle(&self) -> Arc<Lifecycle<C, W>> {
        Arc::clone(&self.wiring.lock().lifecycle)
    }

    fn settling_delay_ms(&self, target_name: &str) -> u64 {
        self.current_config
            .lock()
            .target(target_name)
            .map(|t| t.settling_delay_ms)
            .unwrap_or(1000)
    }

    fn on_batch(&self, batch: FileChangeBatch) {
        let files = batch.changed_names();
        for target in &batch.targets {
            let delay = self.settling_delay_ms(target);
            self.debouncer.on_files_changed(target, files.iter().cloned(), delay);
        }
    }

    fn flush_settled(&self) {
        let now = self.clock.epoch_ms();
        let queue = self.queue();
        for (target, files) in self.debouncer.poll_ready(now) {
            queue.handle_file_changed(&target, files);
        }
    }

    /// Rebuild the queue and lifecycle from scratch against `new_config`
    /// (spec §4.I: on `buildSchedulingChanged`, migrating every
    /// in-flight entry rather than dropping it).
    async fn reload_scheduling(&self, new_config: &ValidatedConfig) {
        let old_queue = self.queue();
        let drained = old_queue.drain_entries();

        let new_queue = IntelligentBuildQueue::new(
            new_config.build_scheduling.clone(),
            Arc::clone(&self.clock),
            Arc::clone(&self.state_store),
        );
        let new_lifecycle = Arc::new(Lifecycle::new(
            Arc::clone(&new_queue),
            Arc::clone(&self.watcher),
            Arc::clone(&self.state_store),
            Arc::clone(&self.builder_factory),
            Arc::clone(&self.clock),
            self.project_root.clone(),
        ));
        new_queue.add_observer(new_lifecycle.clone());

        let errors = new_lifecycle
            .add_targets(new_config.enabled_targets().cloned().collect())
            .await;
        for err in errors {
            tracing::warn!(error = %err, "target failed to come up during build-scheduling reload");
        }
        for entry in drained {
            new_queue.migrate_entry(entry);
        }
        new_queue.try_dispatch();

        *self.wiring.lock() = Wiring {
            queue: new_queue,
            lifecycle: new_lifecycle,
        };
    }

    async fn apply_diff(&self, diff: ConfigDiff, new_config: ValidatedConfig) {
        if diff.build_scheduling_changed {
            self.reload_scheduling(&new_config).await;
        } else {
            let lifecycle = self.lifecycle();
            if !diff.targets_removed.is_empty() {
                lifecycle.remove_targets(&diff.targets_removed).await;
            }
            if !diff.targets_added.is_empty() {
                for err in lifecycle.add_targets(diff.targets_added).await {
                    tracing::warn!(error = %err, "target failed to come up on reload");
                }
            }
            if !diff.targets_modified.is_empty() {
                for err in lifecycle.update_targets(diff.targets_modified).await {
                    tracing::warn!(error = %err, "target failed to update on reload");
                }
            }
        }
        if diff.watchman_changed {
            tracing::info!("watchman settings changed on reload; watcher tuning is an external collaborator");
        }
        if diff.notifications_changed {
            tracing::info!("notification settings changed on reload; dispatcher is an external collaborator");
        }
        *self.current_config.lock() = new_config;
    }

    /// Re-read the config file if its mtime advanced, diff it against the
    /// live config, and apply the delta (spec §4.I).
    async fn maybe_reload(&self, last_mtime: &mut Option<std::time::SystemTime>) {
        let Ok(metadata) = std::fs::metadata(&self.config_path) else {
            return;
        };
        let Ok(modified) = metadata.modified() else {
            return;
        };
        if *last_mtime == Some(modified) {
            return;
        }
        *last_mtime = Some(modified);

        let new_config = match config::load_file(&self.config_path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "config reload failed, keeping previous configuration");
                return;
            }
        };
        let diff = {
            let old = self.current_config.lock();
            config::diff(&old, &new_config)
        };
        if diff.is_empty() {
            return;
        }
        tracing::info!(
            added = diff.targets_added.len(),
            removed = diff.targets_removed.len(),
            modified = diff.targets_modified.len(),
            scheduling_changed = diff.build_scheduling_changed,
            "applying configuration reload"
        );
        self.apply_diff(diff, new_config).await;
    }

    /// Step 6 (run loop) and step 7 (shutdown) of spec §15.
    pub async fn run(self: Arc<Self>) -> Result<(), DaemonError> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut config_poll = tokio::time::interval(DEFAULT_CONFIG_POLL_INTERVAL);
        let mut last_config_mtime = std::fs::metadata(&self.config_path).and_then(|m| m.modified()).ok();

        loop {
            let deadline = self.debouncer.next_deadline_ms();
            let sleep_for = match deadline {
                Some(fires_at) => Duration::from_millis(fires_at.saturating_sub(self.clock.epoch_ms())),
                None => Duration::from_secs(3600),
            };

            tokio::select! {
                batch = self.watcher.recv_batch() => {
                    match batch {
                        Some(batch) => self.on_batch(batch),
                        None => {
                            tracing::warn!("file-change source closed unexpectedly");
                            break;
                        }
                    }
                }
                () = tokio::time::sleep(sleep_for), if deadline.is_some() => {
                    self.flush_settled();
                }
                _ = config_poll.tick() => {
                    self.maybe_reload(&mut last_config_mtime).await;
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT, shutting down");
                    break;
                }
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM, shutting down");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Spec §15 step 7.
    async fn shutdown(&self) {
        self.watcher.stop().await;

        let queue = self.queue();
        let deadline = std::time::Instant::now() + SHUTDOWN_GRACE_PERIOD;
        while queue.in_flight_count() > 0 && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        if queue.in_flight_count() > 0 {
            queue.stop_all_builders().await;
        }

        self.state_store.stop_heartbeat();
    }
}
