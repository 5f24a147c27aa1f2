//! In-memory host network for development and testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{FleetError, HostFacts};
use crate::registry::{Capability, HostProbe};

#[derive(Default)]
struct ProbeState {
    hosts: HashMap<String, HostFacts>,
    links: HashMap<String, Vec<String>>,
    capabilities: Vec<Capability>,
    hacking_level: u32,
    open_ports: HashMap<String, HashSet<Capability>>,
    applied: Vec<(Capability, String)>,
}

/// Simulated host graph.
///
/// Clones share state, so a test can keep one handle to mutate the network
/// while the registry owns another.
#[derive(Clone, Default)]
pub struct InMemoryProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl InMemoryProbe {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a host.
    #[must_use]
    pub fn with_host(self, facts: HostFacts) -> Self {
        self.set_facts(facts);
        self
    }

    /// Connect two hosts in both directions.
    #[must_use]
    pub fn with_link(self, a: &str, b: &str) -> Self {
        {
            let mut state = self.state.lock();
            state.links.entry(a.to_string()).or_default().push(b.to_string());
            state.links.entry(b.to_string()).or_default().push(a.to_string());
        }
        self
    }

    /// Set the capabilities available to us.
    #[must_use]
    pub fn with_capabilities(self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.state.lock().capabilities = capabilities.into_iter().collect();
        self
    }

    /// Set our hacking level.
    #[must_use]
    pub fn with_hacking_level(self, level: u32) -> Self {
        self.state.lock().hacking_level = level;
        self
    }

    /// Replace the facts of a host, adding it when unknown.
    pub fn set_facts(&self, facts: HostFacts) {
        self.state.lock().hosts.insert(facts.hostname.clone(), facts);
    }

    /// Mutate the facts of a known host. Returns `false` if the host is unknown.
    pub fn update(&self, host: &str, f: impl FnOnce(&mut HostFacts)) -> bool {
        let mut state = self.state.lock();
        state.hosts.get_mut(host).map(f).is_some()
    }

    /// Current facts of a host.
    pub fn facts_of(&self, host: &str) -> Option<HostFacts> {
        self.state.lock().hosts.get(host).cloned()
    }

    /// Every capability application so far, in order.
    pub fn applied(&self) -> Vec<(Capability, String)> {
        self.state.lock().applied.clone()
    }
}

impl HostProbe for InMemoryProbe {
    fn scan(&self, host: &str) -> Result<Vec<String>, FleetError> {
        let state = self.state.lock();
        if !state.hosts.contains_key(host) {
            return Err(FleetError::UnknownNode(host.to_string()));
        }
        Ok(state.links.get(host).cloned().unwrap_or_default())
    }

    fn facts(&self, host: &str) -> Result<HostFacts, FleetError> {
        self.state
            .lock()
            .hosts
            .get(host)
            .cloned()
            .ok_or_else(|| FleetError::UnknownNode(host.to_string()))
    }

    fn available_capabilities(&self) -> Vec<Capability> {
        self.state.lock().capabilities.clone()
    }

    fn hacking_level(&self) -> u32 {
        self.state.lock().hacking_level
    }

    fn apply_capability(&self, capability: Capability, host: &str) -> Result<(), FleetError> {
        let mut state = self.state.lock();
        if !state.hosts.contains_key(host) {
            return Err(FleetError::UnknownNode(host.to_string()));
        }
        if !state.capabilities.contains(&capability) {
            return Err(FleetError::Probe(format!("{capability} is not available")));
        }
        state
            .open_ports
            .entry(host.to_string())
            .or_default()
            .insert(capability);
        state.applied.push((capability, host.to_string()));
        Ok(())
    }

    fn grant_admin(&self, host: &str) -> Result<(), FleetError> {
        let mut state = self.state.lock();
        let open = state.open_ports.get(host).map_or(0, HashSet::len);
        let level = state.hacking_level;
        let facts = state
            .hosts
            .get_mut(host)
            .ok_or_else(|| FleetError::UnknownNode(host.to_string()))?;

        let ports_ok = u32::try_from(open).unwrap_or(u32::MAX) >= facts.ports_required;
        if !ports_ok || level < facts.required_hacking_level {
            return Err(FleetError::Probe(format!(
                "{host} refused admin: {open} of {} ports open, level {level} of {}",
                facts.ports_required, facts.required_hacking_level
            )));
        }
        facts.has_admin_rights = true;
        Ok(())
    }
}
