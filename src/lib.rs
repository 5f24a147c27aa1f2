//! # Fleet Batcher
//!
//! Capacity-aware job placement across a fleet of compute nodes, plus a batch
//! timing engine that keeps a remote target in a steady hack/weaken/grow/weaken
//! cycle.
//!
//! ## Core Problem Solved
//!
//! A job is a set of tasks, each asking for some number of instances of one
//! executable. Nodes have a fixed amount of RAM and other work is already
//! running on them. Several independent callers may try to place jobs at once:
//!
//! - **All-or-nothing placement**: a job either fits in full or nothing runs
//! - **Priority fill order**: nodes are filled lowest priority value first
//! - **Fleet lock**: only one caller places at a time; the rest poll and wait
//! - **Precise timing**: batch stages must finish in a fixed order, a fixed
//!   spacing apart, even though they take different amounts of time
//!
//! ## Cluster
//!
//! ```rust,ignore
//! use fleet_batcher::builders::build_cluster;
//! use fleet_batcher::config::FleetConfig;
//! use fleet_batcher::core::{Job, ResourceCost, Task};
//!
//! let cfg = FleetConfig::from_env()?;
//! let cluster = build_cluster(&cfg, probe, dispatcher, None)?;
//!
//! let job = Job::new("share").with_task(Task::new(
//!     "/scripts/share.js",
//!     "home",
//!     64,
//!     ResourceCost::uniform(4.0),
//! ));
//! let report = cluster.execute(&job).await?;
//! ```
//!
//! ## Batch manager
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fleet_batcher::builders::build_manager;
//! use fleet_batcher::timing::FormulaAnalyzer;
//!
//! let manager = build_manager(&cfg, Arc::new(cluster), FormulaAnalyzer::default(), "joesguns");
//! manager.run(None).await?;
//! ```
//!
//! For complete flows, see `tests/cluster_test.rs` and
//! `tests/batch_manager_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core placement types, the fleet lock, and the scheduler.
pub mod core;
/// Configuration models for the fleet and batches.
pub mod config;
/// Builders to construct clusters and managers from configuration.
pub mod builders;
/// Dispatch of placed jobs onto nodes.
pub mod dispatch;
/// In-memory adapters for the probe and dispatch boundaries.
pub mod infra;
/// Node discovery, refresh, and persistence.
pub mod registry;
/// The fleet as one schedulable unit.
pub mod runtime;
/// Batch timing, target preparation, and the batch loop.
pub mod timing;
/// Shared utilities.
pub mod util;
