//! Detection file watcher
//!
//! Polls a detection JSON file and publishes every new version into a
//! [`DetectionSlot`], standing in for a recognizer delivering frames.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use crate::detection::{DetectionFrame, DetectionSlot};

/// Background thread that reloads a detection file on change
pub struct DetectionWatcher {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl DetectionWatcher {
    /// Start polling `path` every `interval`; `on_update` runs after each publish
    pub fn spawn<F>(path: PathBuf, interval: Duration, slot: DetectionSlot, on_update: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (stop, stop_rx) = bounded::<()>(1);
        let handle = std::thread::spawn(move || {
            info!("Watching detection file {:?}", path);
            let mut last_modified = modified(&path);
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    _ => break,
                }

                let current = modified(&path);
                if current.is_none() || current == last_modified {
                    continue;
                }
                match reload(&path, &slot) {
                    Ok(()) => {
                        last_modified = current;
                        on_update();
                    }
                    // Retried next tick; the file may be mid-write
                    Err(e) => warn!("Failed to reload detections: {:#}", e),
                }
            }
            info!("Detection watcher exiting...");
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

/// Load `path` and publish it, unless its frame cannot be mapped
fn reload(path: &Path, slot: &DetectionSlot) -> Result<()> {
    let frame = DetectionFrame::load(path)?;
    frame
        .check_resolution()
        .with_context(|| format!("Rejected detections from {:?}", path))?;
    debug!("Reloaded {} blocks from {:?}", frame.document.blocks.len(), path);
    slot.publish(frame);
    Ok(())
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl Drop for DetectionWatcher {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
