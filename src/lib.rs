//! ScoutBench: curate a football player dataset into named, pre-filtered
//! "ready lists" and explore the full dataset interactively.
//!
//! The [`engine`] module evaluates declarative filter definitions and
//! persists named views; the [`data`] module owns the typed table model,
//! loading, and the interactive filter state; [`state`], [`app`], and
//! [`ui`] wire both into the egui explorer.

pub mod app;
pub mod config;
pub mod data;
pub mod engine;
pub mod state;
pub mod ui;
