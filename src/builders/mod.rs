//! Builders to construct clusters and batch managers from configuration.

pub mod cluster_builder;

pub use cluster_builder::{build_cluster, build_manager, build_registry, build_scheduler};
