//! Runtime composition: registry, scheduler, and dispatcher wired together.

pub mod cluster;

pub use cluster::{Cluster, ExecutionReport};
