//! Node discovery and refresh.
//!
//! The registry owns every [`ComputeNode`] in an arena indexed by [`NodeId`].
//! Discovery walks the host graph breadth-first from a root host; refresh
//! re-reads live facts through the [`HostProbe`] boundary and opportunistically
//! escalates privileges on hosts we do not yet control.

pub mod capability;
pub mod snapshot;

use std::collections::{HashMap, HashSet, VecDeque};

pub use capability::{can_escalate, Capability};
pub use snapshot::{FleetSnapshot, SnapshotEntry};

use crate::core::{ComputeNode, FleetError, HostFacts, NodeId, NodeOptions};

/// Boundary to whatever can see and act on the host network.
pub trait HostProbe: Send + Sync {
    /// Direct neighbours of `host`.
    fn scan(&self, host: &str) -> Result<Vec<String>, FleetError>;
    /// Current facts about `host`.
    fn facts(&self, host: &str) -> Result<HostFacts, FleetError>;
    /// Capabilities currently available to us.
    fn available_capabilities(&self) -> Vec<Capability>;
    /// Our current hacking level.
    fn hacking_level(&self) -> u32;
    /// Run one capability against `host`.
    fn apply_capability(&self, capability: Capability, host: &str) -> Result<(), FleetError>;
    /// Request admin rights on `host`.
    fn grant_admin(&self, host: &str) -> Result<(), FleetError>;
}

/// Arena of discovered nodes plus the probe used to refresh them.
pub struct NodeRegistry<P> {
    probe: P,
    root: String,
    nodes: Vec<ComputeNode>,
    index: HashMap<String, NodeId>,
    overrides: HashMap<String, NodeOptions>,
}

impl<P: HostProbe> NodeRegistry<P> {
    /// Empty registry rooted at `root`.
    pub fn new(probe: P, root: impl Into<String>) -> Self {
        Self {
            probe,
            root: root.into(),
            nodes: Vec::new(),
            index: HashMap::new(),
            overrides: HashMap::new(),
        }
    }

    /// Options applied to `hostname` when it is (or was) discovered.
    #[must_use]
    pub fn with_override(mut self, hostname: impl Into<String>, options: NodeOptions) -> Self {
        self.set_options(hostname, options);
        self
    }

    /// Build a registry from a persisted snapshot, skipping discovery.
    ///
    /// Facts are read live for each listed host; entries are kept in file order.
    pub fn from_snapshot(
        probe: P,
        root: impl Into<String>,
        snapshot: &FleetSnapshot,
    ) -> Result<Self, FleetError> {
        let mut registry = Self::new(probe, root);
        for entry in &snapshot.nodes {
            registry.overrides.insert(entry.hostname.clone(), entry.options());
            if !registry.index.contains_key(&entry.hostname) {
                let facts = registry.probe.facts(&entry.hostname)?;
                registry.insert(facts);
            }
        }
        tracing::info!(nodes = registry.len(), "initialized fleet from snapshot");
        Ok(registry)
    }

    /// Walk the host graph from the root and register every unseen host.
    ///
    /// Returns the number of newly registered nodes. Re-running against an
    /// unchanged topology registers nothing.
    pub fn discover(&mut self) -> Result<usize, FleetError> {
        let before = self.nodes.len();
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<String> = VecDeque::new();

        visited.insert(self.root.clone());
        frontier.push_back(self.root.clone());

        while let Some(host) = frontier.pop_front() {
            if !self.index.contains_key(&host) {
                tracing::debug!(hostname = %host, "probing host");
                let facts = self.probe.facts(&host)?;
                self.insert(facts);
            }
            for neighbour in self.probe.scan(&host)? {
                if visited.insert(neighbour.clone()) {
                    frontier.push_back(neighbour);
                }
            }
        }

        let added = self.nodes.len() - before;
        tracing::info!(added, total = self.nodes.len(), "discovery finished");
        Ok(added)
    }

    fn insert(&mut self, facts: HostFacts) -> NodeId {
        let id = NodeId(self.nodes.len());
        let options = self
            .overrides
            .get(&facts.hostname)
            .copied()
            .unwrap_or_default();
        self.index.insert(facts.hostname.clone(), id);
        self.nodes.push(ComputeNode::new(id, facts, options));
        id
    }

    /// Re-read one node's facts, escalating privileges first when possible.
    pub fn refresh(&mut self, id: NodeId) -> Result<&ComputeNode, FleetError> {
        let hostname = self
            .nodes
            .get(id.0)
            .map(|n| n.facts().hostname.clone())
            .ok_or_else(|| FleetError::UnknownNode(id.to_string()))?;

        let mut facts = self.probe.facts(&hostname)?;
        if self.try_escalate(&facts)? {
            facts = self.probe.facts(&hostname)?;
        }

        let node = &mut self.nodes[id.0];
        node.update_facts(facts);
        Ok(node)
    }

    /// Refresh a node by hostname.
    pub fn refresh_host(&mut self, hostname: &str) -> Result<&ComputeNode, FleetError> {
        let id = self
            .index
            .get(hostname)
            .copied()
            .ok_or_else(|| FleetError::UnknownNode(hostname.to_string()))?;
        self.refresh(id)
    }

    /// Refresh every node in discovery order.
    pub fn refresh_all(&mut self) -> Result<(), FleetError> {
        for i in 0..self.nodes.len() {
            self.refresh(NodeId(i))?;
        }
        Ok(())
    }

    fn try_escalate(&self, facts: &HostFacts) -> Result<bool, FleetError> {
        if facts.has_admin_rights {
            return Ok(false);
        }
        let capabilities = self.probe.available_capabilities();
        if !can_escalate(
            capabilities.len(),
            facts.ports_required,
            self.probe.hacking_level(),
            facts.required_hacking_level,
        ) {
            return Ok(false);
        }

        tracing::info!(
            hostname = %facts.hostname,
            required_open_ports = facts.ports_required,
            available_crackers = capabilities.len(),
            "rooting new host"
        );
        for capability in capabilities {
            self.probe.apply_capability(capability, &facts.hostname)?;
        }
        self.probe.grant_admin(&facts.hostname)?;
        Ok(true)
    }

    /// Eligible nodes with free capacity, stably sorted by priority.
    pub fn schedulable_nodes(&self) -> Vec<ComputeNode> {
        let mut nodes: Vec<ComputeNode> = self
            .nodes
            .iter()
            .filter(|n| n.is_eligible() && n.schedulable_capacity() > 0.0)
            .cloned()
            .collect();
        nodes.sort_by_key(ComputeNode::priority);
        nodes
    }

    /// Replace the operator options of `hostname`, now and on future discovery.
    pub fn set_options(&mut self, hostname: impl Into<String>, options: NodeOptions) {
        let hostname = hostname.into();
        if let Some(id) = self.index.get(&hostname) {
            self.nodes[id.0].set_options(options);
        }
        self.overrides.insert(hostname, options);
    }

    /// Every node in discovery order.
    pub fn nodes(&self) -> &[ComputeNode] {
        &self.nodes
    }

    /// Node by arena id.
    pub fn node(&self, id: NodeId) -> Option<&ComputeNode> {
        self.nodes.get(id.0)
    }

    /// Node by hostname.
    pub fn find(&self, hostname: &str) -> Option<&ComputeNode> {
        self.index.get(hostname).and_then(|id| self.node(*id))
    }

    /// Root hostname.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The probe backing this registry.
    pub const fn probe(&self) -> &P {
        &self.probe
    }

    /// Persistable view of the registry.
    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            nodes: self
                .nodes
                .iter()
                .map(|n| SnapshotEntry {
                    hostname: n.facts().hostname.clone(),
                    schedulable: n.options().schedulable,
                    priority: n.options().priority,
                    reserved: n.options().reserved,
                })
                .collect(),
        }
    }
}
