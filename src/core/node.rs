//! Compute nodes and the read-only host facts they expose.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable arena index assigned to a node at discovery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only facts about a host, as the scheduler and timing engine see them.
///
/// Implemented by [`HostFacts`] (a static fixture or snapshot) and by
/// [`ComputeNode`] (refreshed from the live probe on every registry pass).
pub trait NodeFacts {
    /// Stable hostname.
    fn hostname(&self) -> &str;
    /// Total RAM of the host.
    fn max_ram(&self) -> f64;
    /// RAM currently in use.
    fn used_ram(&self) -> f64;
    /// Whether we hold admin rights on the host.
    fn has_admin_rights(&self) -> bool;
    /// Lowest reachable security level.
    fn min_security(&self) -> f64;
    /// Current security level.
    fn current_security(&self) -> f64;
    /// Money ceiling.
    fn max_money(&self) -> f64;
    /// Money currently available.
    fn current_money(&self) -> f64;
    /// Duration of a hack against this host, in milliseconds.
    fn hack_time(&self) -> f64;
    /// Duration of a grow against this host, in milliseconds.
    fn grow_time(&self) -> f64;
    /// Duration of a weaken against this host, in milliseconds.
    fn weaken_time(&self) -> f64;
}

/// Snapshot of everything the probe reports about one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFacts {
    /// Hostname.
    pub hostname: String,
    /// Total RAM.
    pub max_ram: f64,
    /// RAM in use.
    pub used_ram: f64,
    /// Admin rights held.
    pub has_admin_rights: bool,
    /// Open ports needed before admin rights can be granted.
    pub ports_required: u32,
    /// Hacking level needed before admin rights can be granted.
    pub required_hacking_level: u32,
    /// Minimum security.
    pub min_security: f64,
    /// Current security.
    pub current_security: f64,
    /// Maximum money.
    pub max_money: f64,
    /// Current money.
    pub current_money: f64,
    /// Hack duration (ms).
    pub hack_time: f64,
    /// Grow duration (ms).
    pub grow_time: f64,
    /// Weaken duration (ms).
    pub weaken_time: f64,
}

impl HostFacts {
    /// A host with the given RAM and admin rights, zeroed target facts.
    pub fn with_ram(hostname: impl Into<String>, max_ram: f64, used_ram: f64) -> Self {
        Self {
            hostname: hostname.into(),
            max_ram,
            used_ram,
            has_admin_rights: true,
            ports_required: 0,
            required_hacking_level: 0,
            min_security: 0.0,
            current_security: 0.0,
            max_money: 0.0,
            current_money: 0.0,
            hack_time: 0.0,
            grow_time: 0.0,
            weaken_time: 0.0,
        }
    }
}

impl NodeFacts for HostFacts {
    fn hostname(&self) -> &str {
        &self.hostname
    }
    fn max_ram(&self) -> f64 {
        self.max_ram
    }
    fn used_ram(&self) -> f64 {
        self.used_ram
    }
    fn has_admin_rights(&self) -> bool {
        self.has_admin_rights
    }
    fn min_security(&self) -> f64 {
        self.min_security
    }
    fn current_security(&self) -> f64 {
        self.current_security
    }
    fn max_money(&self) -> f64 {
        self.max_money
    }
    fn current_money(&self) -> f64 {
        self.current_money
    }
    fn hack_time(&self) -> f64 {
        self.hack_time
    }
    fn grow_time(&self) -> f64 {
        self.grow_time
    }
    fn weaken_time(&self) -> f64 {
        self.weaken_time
    }
}

/// Operator-controlled scheduling options for a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeOptions {
    /// Whether the operator allows scheduling on this node at all.
    pub schedulable: bool,
    /// Fill order; lower values are filled first.
    pub priority: u32,
    /// Capacity permanently withheld from scheduling.
    pub reserved: f64,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            schedulable: true,
            priority: 0,
            reserved: 0.0,
        }
    }
}

/// One fleet member: identity, options, and last observed facts.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeNode {
    id: NodeId,
    options: NodeOptions,
    facts: HostFacts,
}

impl ComputeNode {
    /// Create a node from discovered facts.
    pub const fn new(id: NodeId, facts: HostFacts, options: NodeOptions) -> Self {
        Self { id, options, facts }
    }

    /// Arena identity.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Scheduling options.
    pub const fn options(&self) -> &NodeOptions {
        &self.options
    }

    /// Replace scheduling options.
    pub fn set_options(&mut self, options: NodeOptions) {
        self.options = options;
    }

    /// Last observed facts.
    pub const fn facts(&self) -> &HostFacts {
        &self.facts
    }

    /// Replace facts after a refresh. Identity is kept.
    pub(crate) fn update_facts(&mut self, facts: HostFacts) {
        self.facts = facts;
    }

    /// Scheduling priority; lower is filled first.
    pub const fn priority(&self) -> u32 {
        self.options.priority
    }

    /// Total capacity.
    pub const fn total_capacity(&self) -> f64 {
        self.facts.max_ram
    }

    /// Capacity in use.
    pub const fn used_capacity(&self) -> f64 {
        self.facts.used_ram
    }

    /// Capacity withheld from scheduling.
    pub const fn reserved_capacity(&self) -> f64 {
        self.options.reserved
    }

    /// Eligible when admin rights are held and the operator allows scheduling.
    pub const fn is_eligible(&self) -> bool {
        self.options.schedulable && self.facts.has_admin_rights
    }

    /// `max(0, total - used - reserved)`, computed from the latest refresh.
    pub fn schedulable_capacity(&self) -> f64 {
        (self.total_capacity() - self.used_capacity() - self.reserved_capacity()).max(0.0)
    }
}

impl NodeFacts for ComputeNode {
    fn hostname(&self) -> &str {
        &self.facts.hostname
    }
    fn max_ram(&self) -> f64 {
        self.facts.max_ram
    }
    fn used_ram(&self) -> f64 {
        self.facts.used_ram
    }
    fn has_admin_rights(&self) -> bool {
        self.facts.has_admin_rights
    }
    fn min_security(&self) -> f64 {
        self.facts.min_security
    }
    fn current_security(&self) -> f64 {
        self.facts.current_security
    }
    fn max_money(&self) -> f64 {
        self.facts.max_money
    }
    fn current_money(&self) -> f64 {
        self.facts.current_money
    }
    fn hack_time(&self) -> f64 {
        self.facts.hack_time
    }
    fn grow_time(&self) -> f64 {
        self.facts.grow_time
    }
    fn weaken_time(&self) -> f64 {
        self.facts.weaken_time
    }
}
