use std::fmt;

use tracing::debug;

use crate::platform::{Platform, Provisioner, SharedFolder};

pub const DEFAULT_IMAGE: &str = "centos/7";
pub const DEFAULT_SUBNET: &str = "192.168.100";
pub const DEFAULT_PROVIDER: &str = "virtualbox";
pub const DEFAULT_SCRIPT_DIR: &str = "multihost";
pub const DEFAULT_SCRIPT_EXT: &str = "bash";

/// Host addresses start at `.2`; `.1` belongs to the controlling host.
const FIRST_HOST_OCTET: usize = 2;

// ── descriptors ──────────────────────────────────────────

/// One machine in the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDescriptor {
    pub name: String,
    pub memory_mb: u64,
}

impl HostDescriptor {
    pub fn new(name: impl Into<String>, memory_mb: u64) -> Self {
        Self {
            name: name.into(),
            memory_mb,
        }
    }

    pub fn hostname(&self) -> String {
        format!("{}.local", self.name)
    }
}

/// Where provisioning scripts live relative to the platform's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLayout {
    pub dir: String,
    pub ext: String,
}

impl Default for ScriptLayout {
    fn default() -> Self {
        Self {
            dir: DEFAULT_SCRIPT_DIR.into(),
            ext: DEFAULT_SCRIPT_EXT.into(),
        }
    }
}

impl ScriptLayout {
    /// `<dir>/provision.<ext>`
    pub fn global_script(&self) -> String {
        self.join("provision")
    }

    /// `<dir>/provision-<name>.<ext>`
    pub fn host_script(&self, name: &str) -> String {
        self.join(&format!("provision-{name}"))
    }

    fn join(&self, stem: &str) -> String {
        let file = if self.ext.is_empty() {
            stem.to_string()
        } else {
            format!("{stem}.{}", self.ext)
        };
        if self.dir.is_empty() {
            file
        } else {
            format!("{}/{file}", self.dir.trim_end_matches('/'))
        }
    }
}

// ── roster ───────────────────────────────────────────────

/// Everything one configuration pass needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub image: String,
    /// First three octets of the private network, e.g. `192.168.100`.
    pub subnet: String,
    pub provider: String,
    pub scripts: ScriptLayout,
    /// Whether the environment-wide provisioning script runs as root.
    pub privileged: bool,
    pub shared_folder: SharedFolder,
    pub hosts: Vec<HostDescriptor>,
}

impl Roster {
    /// An empty roster with the default image, subnet, provider and folders.
    pub fn new(hosts: Vec<HostDescriptor>) -> Self {
        Self {
            image: DEFAULT_IMAGE.into(),
            subnet: DEFAULT_SUBNET.into(),
            provider: DEFAULT_PROVIDER.into(),
            scripts: ScriptLayout::default(),
            privileged: true,
            shared_folder: default_shared_folder(),
            hosts,
        }
    }

    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Multihost => Self::new(vec![
                HostDescriptor::new("standby-agent", 2048),
                HostDescriptor::new("segment-agent", 8192),
                HostDescriptor::new("hub", 2048),
            ]),
            Preset::Pair => Self {
                privileged: false,
                ..Self::new(vec![
                    HostDescriptor::new("hub", 2048),
                    HostDescriptor::new("agent", 8192),
                ])
            },
        }
    }

    /// Private-network address of the host at `index`.
    pub fn address(&self, index: usize) -> String {
        format!("{}.{}", self.subnet, index + FIRST_HOST_OCTET)
    }

    pub fn global_provisioner(&self) -> Provisioner {
        Provisioner {
            path: self.scripts.global_script(),
            privileged: self.privileged,
        }
    }

    pub fn host_provisioner(&self, host: &HostDescriptor) -> Provisioner {
        Provisioner {
            path: self.scripts.host_script(&host.name),
            privileged: false,
        }
    }

    /// Emit the whole roster against `platform`.
    ///
    /// Environment-wide steps are emitted once, before any machine. Nothing
    /// here is validated; the platform reports bad input when it applies it.
    pub fn declare(&self, platform: &mut impl Platform) {
        debug!(
            hosts = self.hosts.len(),
            subnet = %self.subnet,
            "declaring roster"
        );

        platform.set_box(&self.image);
        platform.add_provisioner(&self.global_provisioner());
        platform.set_shared_folder(&self.shared_folder);

        for (index, host) in self.hosts.iter().enumerate() {
            let ip = self.address(index);
            debug!(name = %host.name, %ip, memory_mb = host.memory_mb, "declaring host");

            let provisioner = self.host_provisioner(host);
            let memory = host.memory_mb.to_string();
            platform.define_vm(&host.name, |guest| {
                guest.set_network(&ip);
                guest.set_hostname(&host.hostname());
                guest.add_provisioner(&provisioner);
                guest.set_provider_override(&self.provider, "memory", &memory);
            });
        }
    }
}

pub fn default_shared_folder() -> SharedFolder {
    SharedFolder {
        host_path: ".".into(),
        guest_path: "/vagrant".into(),
        kind: "nfs".into(),
    }
}

// ── presets ──────────────────────────────────────────────

/// Built-in rosters for the upgrade test environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// standby-agent, segment-agent and hub; root-level global provisioning
    Multihost,
    /// hub and agent; unprivileged global provisioning
    Pair,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Multihost => write!(f, "multihost"),
            Preset::Pair => write!(f, "pair"),
        }
    }
}
