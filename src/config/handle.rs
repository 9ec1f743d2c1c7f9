//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads: the watcher, server, and task
//! threads all read the config without coordination.

use crate::config::PipelineConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
static CONFIG: LazyLock<ArcSwap<PipelineConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(PipelineConfig::default()));

/// Current config snapshot.
#[inline]
pub fn cfg() -> Arc<PipelineConfig> {
    CONFIG.load_full()
}

/// Install the loaded config as the process-wide snapshot.
#[inline]
pub fn init_config(config: PipelineConfig) -> Arc<PipelineConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
