// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake [`FileChangeSource`] for tests (spec §14), the same shape as
//! the teacher's `session::fake`/`notify::fake` adapters: record calls,
//! let the test script exactly what gets delivered.
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::error::WatchError;
use crate::source::{FileChangeBatch, FileChangeSource, TargetPatterns};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCall {
    Subscribe(TargetPatterns),
    Refresh(TargetPatterns),
    Stop,
}

pub struct FakeFileChangeSource {
    calls: Mutex<Vec<WatchCall>>,
    batch_tx: mpsc::UnboundedSender<FileChangeBatch>,
    batch_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<FileChangeBatch>>,
    stopped: Mutex<bool>,
}

impl Default for FakeFileChangeSource {
    fn default() -> Self {
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        Self {
            calls: Mutex::new(Vec::new()),
            batch_tx,
            batch_rx: tokio::sync::Mutex::new(batch_rx),
            stopped: Mutex::new(false),
        }
    }
}

impl FakeFileChangeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a batch as if the watcher had just delivered it.
    pub fn push_batch(&self, batch: FileChangeBatch) {
        let _ = self.batch_tx.send(batch);
    }

    pub fn calls(&self) -> Vec<WatchCall> {
        self.calls.lock().clone()
    }

    pub fn was_stopped(&self) -> bool {
        *self.stopped.lock()
    }
}

#[async_trait]
impl FileChangeSource for FakeFileChangeSource {
    async fn subscribe_targets(&self, targets: &TargetPatterns) -> Result<(), WatchError> {
        self.calls.lock().push(WatchCall::Subscribe(targets.clone()));
        Ok(())
    }

    async fn refresh_targets(&self, targets: &TargetPatterns) -> Result<(), WatchError> {
        self.calls.lock().push(WatchCall::Refresh(targets.clone()));
        Ok(())
    }

    async fn recv_batch(&self) -> Option<FileChangeBatch> {
        let mut rx = self.batch_rx.lock().await;
        rx.recv().await
    }

    async fn stop(&self) {
        *self.stopped.lock() = true;
        self.calls.lock().push(WatchCall::Stop);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
