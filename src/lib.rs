#![allow(clippy::multiple_crate_versions)]
pub mod aggregate;
pub mod args;
pub mod catalog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod context;
pub mod counters;
pub mod error;
pub mod filter;
pub mod generated;
pub mod output;
pub mod verify;
pub mod walker;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use std::sync::atomic::{AtomicU32, Ordering};

static DEBUG: AtomicU32 = AtomicU32::new(0);

/// デバッグレベルを設定 (CLI の `-d N`)
pub fn set_debug(level: u32) {
    DEBUG.store(level, Ordering::Relaxed);
}

pub(crate) fn debug_level() -> u32 {
    DEBUG.load(Ordering::Relaxed)
}
