//! Fleet and batch configuration structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::{NodeOptions, ResourceCost, Task};

/// Environment variable holding the path of a JSON config file.
pub const CONFIG_PATH_ENV: &str = "FLEET_CONFIG";
/// Environment variable overriding the root host.
pub const ROOT_HOST_ENV: &str = "FLEET_ROOT_HOST";

/// One executable used by batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSpec {
    /// Script path on the source host.
    pub path: String,
    /// RAM cost of one instance.
    pub ram: f64,
}

impl ScriptSpec {
    fn new(path: &str, ram: f64) -> Self {
        Self {
            path: path.to_string(),
            ram,
        }
    }

    /// A task running this script with no delay.
    pub fn task(&self, source: &str, instances: u32) -> Task {
        Task::new(self.path.clone(), source, instances, ResourceCost::uniform(self.ram))
    }
}

/// The three worker scripts of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchScripts {
    /// Hack worker.
    pub hack: ScriptSpec,
    /// Grow worker.
    pub grow: ScriptSpec,
    /// Weaken worker.
    pub weaken: ScriptSpec,
}

impl Default for BatchScripts {
    fn default() -> Self {
        Self {
            hack: ScriptSpec::new("/lib/hwgwbatch/scripts/hack.js", 1.70),
            grow: ScriptSpec::new("/lib/hwgwbatch/scripts/grow.js", 1.75),
            weaken: ScriptSpec::new("/lib/hwgwbatch/scripts/weaken.js", 1.75),
        }
    }
}

/// Batch timing and sizing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Gap between consecutive stage finishes (ms).
    pub spacing_ms: f64,
    /// Share of maximum money a batch extracts, in `(0, 1)`.
    pub extraction_factor: f64,
    /// Security removed by one weaken instance.
    pub weaken_security_per_instance: f64,
    /// Delay before retrying a cycle that failed to schedule (ms).
    pub retry_delay_ms: f64,
    /// Worker scripts.
    pub scripts: BatchScripts,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            spacing_ms: 200.0,
            extraction_factor: 0.25,
            weaken_security_per_instance: crate::timing::WEAKEN_SECURITY_PER_INSTANCE,
            retry_delay_ms: 1000.0,
            scripts: BatchScripts::default(),
        }
    }
}

impl BatchConfig {
    /// Validate batch configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.spacing_ms > 0.0) {
            return Err("spacing_ms must be greater than 0".into());
        }
        if !(self.extraction_factor > 0.0 && self.extraction_factor < 1.0) {
            return Err("extraction_factor must be between 0 and 1 (exclusive)".into());
        }
        if !(self.weaken_security_per_instance > 0.0) {
            return Err("weaken_security_per_instance must be greater than 0".into());
        }
        if self.retry_delay_ms < 0.0 {
            return Err("retry_delay_ms must not be negative".into());
        }
        for (name, script) in [
            ("hack", &self.scripts.hack),
            ("grow", &self.scripts.grow),
            ("weaken", &self.scripts.weaken),
        ] {
            if script.path.is_empty() {
                return Err(format!("{name} script path must not be empty"));
            }
            if !(script.ram > 0.0) {
                return Err(format!("{name} script ram must be greater than 0"));
            }
        }
        Ok(())
    }
}

/// Operator overrides for one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOverride {
    /// Hostname.
    pub hostname: String,
    /// Allow scheduling on this host.
    #[serde(default = "default_true")]
    pub schedulable: bool,
    /// Fill order; lower first.
    #[serde(default)]
    pub priority: u32,
    /// Withheld capacity.
    #[serde(default)]
    pub reserved: f64,
}

const fn default_true() -> bool {
    true
}

impl NodeOverride {
    /// Options carried by this override.
    pub const fn options(&self) -> NodeOptions {
        NodeOptions {
            schedulable: self.schedulable,
            priority: self.priority,
            reserved: self.reserved,
        }
    }
}

/// Root fleet configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Host discovery starts from.
    pub root_host: String,
    /// Poll interval for lock waiters (ms).
    pub lock_poll_interval_ms: u64,
    /// Node-list snapshot read at startup, if present.
    pub snapshot_path: Option<PathBuf>,
    /// Per-host overrides.
    pub nodes: Vec<NodeOverride>,
    /// Batch parameters.
    pub batch: BatchConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            root_host: "home".to_string(),
            lock_poll_interval_ms: 1000,
            snapshot_path: None,
            // The operator's own host is filled last and keeps room for local scripts.
            nodes: vec![NodeOverride {
                hostname: "home".to_string(),
                schedulable: true,
                priority: 1,
                reserved: 32.0,
            }],
            batch: BatchConfig::default(),
        }
    }
}

impl FleetConfig {
    /// Validate the fleet and nested batch configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.root_host.is_empty() {
            return Err("root_host must not be empty".into());
        }
        if self.lock_poll_interval_ms == 0 {
            return Err("lock_poll_interval_ms must be greater than 0".into());
        }
        for node in &self.nodes {
            if node.hostname.is_empty() {
                return Err("node override hostname must not be empty".into());
            }
            if node.reserved < 0.0 {
                return Err(format!("node `{}` reserved must not be negative", node.hostname));
            }
        }
        self.batch
            .validate()
            .map_err(|e| format!("batch invalid: {e}"))
    }

    /// Parse fleet configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment.
    ///
    /// Reads a `.env` file if present, then the JSON file named by
    /// `FLEET_CONFIG` (defaults when unset), then applies `FLEET_ROOT_HOST`.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                let data = std::fs::read_to_string(&path)
                    .map_err(|e| format!("read {path}: {e}"))?;
                serde_json::from_str(&data).map_err(|e| format!("parse error: {e}"))?
            }
            Err(_) => Self::default(),
        };
        if let Ok(root) = std::env::var(ROOT_HOST_ENV) {
            cfg.root_host = root;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Lock poll interval as a duration.
    pub const fn lock_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.lock_poll_interval_ms)
    }
}
