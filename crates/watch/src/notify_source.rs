// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `notify`-backed [`FileChangeSource`] (spec §4.B). One OS-level watch
//! per distinct root directory a normalized pattern implies; every
//! incoming filesystem event is matched against the full pattern ->
//! target reverse map so one real watch can serve many glob patterns
//! rooted under it.

use crate::error::WatchError;
use crate::pattern::normalize;
use crate::source::{ChangeEvent, FileChangeBatch, FileChangeSource, TargetPatterns};
use async_trait::async_trait;
use notify::{Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

struct Subscriptions {
    /// Normalized pattern -> the targets that registered it.
    by_pattern: HashMap<String, BTreeSet<String>>,
    /// Root directories currently watched by `watcher`, so re-subscribing
    /// with an overlapping pattern doesn't install a duplicate watch.
    watched_roots: HashSet<PathBuf>,
    watcher: Option<RecommendedWatcher>,
}

/// Watches a project tree and resolves raw filesystem events into
/// per-target batches (spec §4.B).
pub struct NotifyFileChangeSource {
    project_root: PathBuf,
    subs: Mutex<Subscriptions>,
    batch_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<FileChangeBatch>>,
    batch_tx: mpsc::UnboundedSender<FileChangeBatch>,
}

/// The directory component of a normalized pattern up to its first glob
/// wildcard, used as the root of the real OS-level watch.
fn pattern_root(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    for component in pattern.split('/') {
        if component.contains('*') || component.contains('?') || component.contains('[') {
            break;
        }
        root.push(component);
    }
    root
}

impl NotifyFileChangeSource {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        Self {
            project_root: project_root.into(),
            subs: Mutex::new(Subscriptions {
                by_pattern: HashMap::new(),
                watched_roots: HashSet::new(),
                watcher: None,
            }),
            batch_rx: tokio::sync::Mutex::new(batch_rx),
            batch_tx,
        }
    }

    fn ensure_watcher(&self, subs: &mut Subscriptions) -> Result<(), WatchError> {
        if subs.watcher.is_some() {
            return Ok(());
        }
        let tx = self.batch_tx.clone();
        let project_root = self.project_root.clone();
        let watcher = notify::recommended_watcher(move |res: notify::Result<NotifyEvent>| {
            let Ok(event) = res else { return };
            let batch = raw_batch(&project_root, &event);
            if !batch.files.is_empty() {
                // The reverse-map resolution happens on receive (see
                // `recv_batch`), not here — the watcher callback only
                // forwards raw paths, it never touches `subs`.
                let _ = tx.send(batch);
            }
        })
        .map_err(|e| WatchError::SubscribeFailed {
            target: "<watch>".to_string(),
            source: e,
        })?;
        subs.watcher = Some(watcher);
        Ok(())
    }

    fn watch_root(&self, subs: &mut Subscriptions, root: &Path) -> Result<(), WatchError> {
        if subs.watched_roots.contains(root) {
            return Ok(());
        }
        let absolute = self.project_root.join(root);
        if !absolute.exists() {
            // Watching a not-yet-created directory is not fatal: the
            // pattern simply won't see events until it exists.
            tracing::debug!(path = %absolute.display(), "watch root does not exist yet, skipping");
            return Ok(());
        }
        self.ensure_watcher(subs)?;
        if let Some(watcher) = subs.watcher.as_mut() {
            watcher
                .watch(&absolute, RecursiveMode::Recursive)
                .map_err(|e| WatchError::SubscribeFailed {
                    target: "<watch>".to_string(),
                    source: e,
                })?;
        }
        subs.watched_roots.insert(root.to_path_buf());
        Ok(())
    }
}

fn raw_batch(project_root: &Path, event: &NotifyEvent) -> FileChangeBatch {
    let exists = !matches!(event.kind, notify::EventKind::Remove(_));
    let files = event
        .paths
        .iter()
        .filter_map(|p| {
            let rel = p.strip_prefix(project_root).unwrap_or(p);
            rel.to_str().map(|s| ChangeEvent::new(s.replace('\\', "/"), exists, None))
        })
        .collect();
    FileChangeBatch {
        files,
        targets: BTreeSet::new(),
    }
}

#[async_trait]
impl FileChangeSource for NotifyFileChangeSource {
    async fn subscribe_targets(&self, targets: &TargetPatterns) -> Result<(), WatchError> {
        let mut subs = self.subs.lock();
        for (target_name, patterns) in targets {
            for raw_pattern in patterns {
                let normalized = match normalize(raw_pattern) {
                    Ok(p) => p,
                    Err(err) => {
                        tracing::warn!(target = %target_name, pattern = raw_pattern, error = %err, "failed to subscribe pattern");
                        continue;
                    }
                };
                let root = pattern_root(&normalized);
                if let Err(err) = self.watch_root(&mut subs, &root) {
                    tracing::warn!(target = %target_name, pattern = %normalized, error = %err, "failed to watch pattern root");
                    continue;
                }
                subs.by_pattern
                    .entry(normalized)
                    .or_default()
                    .insert(target_name.clone());
            }
        }
        Ok(())
    }

    async fn refresh_targets(&self, targets: &TargetPatterns) -> Result<(), WatchError> {
        let desired: HashSet<(String, String)> = targets
            .iter()
            .flat_map(|(name, patterns)| {
                patterns
                    .iter()
                    .filter_map(|p| normalize(p).ok())
                    .map(move |p| (p, name.clone()))
            })
            .collect();

        {
            let mut subs = self.subs.lock();
            let current: HashSet<(String, String)> = subs
                .by_pattern
                .iter()
                .flat_map(|(pattern, names)| names.iter().map(move |n| (pattern.clone(), n.clone())))
                .collect();
            for (pattern, name) in current.difference(&desired) {
                if let Some(names) = subs.by_pattern.get_mut(pattern) {
                    names.remove(name);
                    if names.is_empty() {
                        subs.by_pattern.remove(pattern);
                    }
                }
            }
        }
        self.subscribe_targets(targets).await
    }

    async fn recv_batch(&self) -> Option<FileChangeBatch> {
        let mut rx = self.batch_rx.lock().await;
        loop {
            let mut batch = rx.recv().await?;
            let subs = self.subs.lock();
            let mut affected = BTreeSet::new();
            for (pattern, names) in &subs.by_pattern {
                let Ok(glob_pattern) = glob::Pattern::new(pattern) else { continue };
                if batch.files.iter().any(|f| glob_pattern.matches(&f.name)) {
                    affected.extend(names.iter().cloned());
                }
            }
            drop(subs);
            if affected.is_empty() {
                continue;
            }
            batch.targets = affected;
            return Some(batch);
        }
    }

    async fn stop(&self) {
        let mut subs = self.subs.lock();
        subs.watcher = None;
        subs.by_pattern.clear();
        subs.watched_roots.clear();
    }
}

#[cfg(test)]
#[path = "notify_source_tests.rs"]
mod tests;
