// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The File-Change Source contract (spec §4.B): "a capability, not an
//! implementation." The Debouncer is the sole consumer of delivered
//! batches (spec §9: "the queue must not receive raw filesystem
//! events") — it drains them through [`FileChangeSource::recv_batch`].

use crate::error::WatchError;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

/// One changed path, delivered even when it no longer exists so removal
/// events propagate (spec §4.B).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub name: String,
    pub exists: bool,
    /// Best-effort kind tag (`"file"`/`"dir"`), absent when unknown.
    pub kind: Option<String>,
}

impl ChangeEvent {
    pub fn new(name: impl Into<String>, exists: bool, kind: Option<String>) -> Self {
        Self {
            name: name.into(),
            exists,
            kind,
        }
    }
}

/// A batch of changes delivered in a single `onFilesChanged` call (spec
/// §4.B), already resolved to the targets whose patterns matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChangeBatch {
    pub files: Vec<ChangeEvent>,
    pub targets: BTreeSet<String>,
}

impl FileChangeBatch {
    pub fn changed_names(&self) -> BTreeSet<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }
}

/// Per-target raw `watchPaths` entries (pre-normalization), keyed by
/// target name, as the Lifecycle hands them to the watcher.
pub type TargetPatterns = HashMap<String, Vec<String>>;

/// The File-Change Source contract (spec §4.B). One subscription per
/// distinct normalized pattern across targets; a reverse map pattern ->
/// set<targetName> lets a single filesystem event fan out to every
/// affected target in one `onFilesChanged` call.
#[async_trait]
pub trait FileChangeSource: Send + Sync {
    /// Register a subscription for every distinct pattern in `targets`.
    /// A failed subscription is fatal to the owning target only — other
    /// targets keep operating (spec §4.B).
    async fn subscribe_targets(&self, targets: &TargetPatterns) -> Result<(), WatchError>;

    /// Diff `targets` against the live subscription set: unsubscribe
    /// patterns no longer referenced, subscribe new ones.
    async fn refresh_targets(&self, targets: &TargetPatterns) -> Result<(), WatchError>;

    /// Await the next delivered batch. Returns `None` once the source
    /// has been stopped and will never deliver again.
    async fn recv_batch(&self) -> Option<FileChangeBatch>;

    /// Unsubscribe everything and disconnect (spec §4.B).
    async fn stop(&self);
}
