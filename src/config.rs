use std::path::{Path, PathBuf};

use facet::Facet;
use tracing::debug;

use crate::error::MultihostError;
use crate::paths;
use crate::platform::SharedFolder;
use crate::roster::{self, HostDescriptor, Preset, Roster, ScriptLayout};

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct Config {
    #[facet(default)]
    pub image: ImageConfig,
    #[facet(default)]
    pub network: NetworkConfig,
    #[facet(default)]
    pub provider: ProviderConfig,
    #[facet(default)]
    pub provision: ProvisionConfig,
    #[facet(default)]
    pub shared_folder: SharedFolderConfig,
    #[facet(default)]
    pub hosts: Vec<HostConfig>,
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct ImageConfig {
    #[facet(default = "centos/7")]
    pub base: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base: roster::DEFAULT_IMAGE.into(),
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct NetworkConfig {
    #[facet(default = "192.168.100")]
    pub subnet: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            subnet: roster::DEFAULT_SUBNET.into(),
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct ProviderConfig {
    #[facet(default = "virtualbox")]
    pub name: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: roster::DEFAULT_PROVIDER.into(),
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct ProvisionConfig {
    #[facet(default = "multihost")]
    pub dir: String,
    #[facet(default = "bash")]
    pub ext: String,
    #[facet(default = true)]
    pub privileged: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            dir: roster::DEFAULT_SCRIPT_DIR.into(),
            ext: roster::DEFAULT_SCRIPT_EXT.into(),
            privileged: true,
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct SharedFolderConfig {
    #[facet(default = ".")]
    pub host: String,
    #[facet(default = "/vagrant")]
    pub guest: String,
    #[facet(default = "nfs")]
    pub kind: String,
}

impl Default for SharedFolderConfig {
    fn default() -> Self {
        let folder = roster::default_shared_folder();
        Self {
            host: folder.host_path,
            guest: folder.guest_path,
            kind: folder.kind,
        }
    }
}

#[derive(Debug, Clone, Facet)]
pub struct HostConfig {
    pub name: String,
    pub memory_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: ImageConfig::default(),
            network: NetworkConfig::default(),
            provider: ProviderConfig::default(),
            provision: ProvisionConfig::default(),
            shared_folder: SharedFolderConfig::default(),
            hosts: Vec::new(),
        }
    }
}

impl Config {
    pub fn preset(preset: Preset) -> Self {
        Self::from_roster(&Roster::preset(preset))
    }

    pub fn from_roster(roster: &Roster) -> Self {
        Self {
            image: ImageConfig {
                base: roster.image.clone(),
            },
            network: NetworkConfig {
                subnet: roster.subnet.clone(),
            },
            provider: ProviderConfig {
                name: roster.provider.clone(),
            },
            provision: ProvisionConfig {
                dir: roster.scripts.dir.clone(),
                ext: roster.scripts.ext.clone(),
                privileged: roster.privileged,
            },
            shared_folder: SharedFolderConfig {
                host: roster.shared_folder.host_path.clone(),
                guest: roster.shared_folder.guest_path.clone(),
                kind: roster.shared_folder.kind.clone(),
            },
            hosts: roster
                .hosts
                .iter()
                .map(|h| HostConfig {
                    name: h.name.clone(),
                    memory_mb: h.memory_mb,
                })
                .collect(),
        }
    }

    pub fn roster(&self) -> Roster {
        Roster {
            image: self.image.base.clone(),
            subnet: self.network.subnet.clone(),
            provider: self.provider.name.clone(),
            scripts: ScriptLayout {
                dir: self.provision.dir.clone(),
                ext: self.provision.ext.clone(),
            },
            privileged: self.provision.privileged,
            shared_folder: SharedFolder {
                host_path: self.shared_folder.host.clone(),
                guest_path: self.shared_folder.guest.clone(),
                kind: self.shared_folder.kind.clone(),
            },
            hosts: self
                .hosts
                .iter()
                .map(|h| HostDescriptor::new(h.name.clone(), h.memory_mb))
                .collect(),
        }
    }
}

// ── SystemConfig ──────────────────────────────────────────

/// A roster config together with where it came from.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Canonicalized path to the config file; `None` for built-in presets.
    pub config_path: Option<PathBuf>,
    pub config: Config,
}

impl SystemConfig {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            config_path: None,
            config: Config::preset(preset),
        }
    }

    /// Directory that relative script and folder paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn display_source(&self) -> String {
        match &self.config_path {
            Some(path) => path.display().to_string(),
            None => "built-in preset".into(),
        }
    }
}

// ── public API ────────────────────────────────────────────

/// Pick the config file: an explicit path, then `./multihost.toml`,
/// then the per-user config file.
pub fn locate_config(explicit: Option<&Path>) -> Result<PathBuf, MultihostError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let candidates = [PathBuf::from(paths::CONFIG_FILE_NAME), paths::user_config_file()];
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        debug!(path = %found.display(), "using roster config");
        return Ok(found.clone());
    }

    Err(MultihostError::NoConfig {
        searched: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

pub fn parse_config(contents: &str, path: &Path) -> Result<Config, MultihostError> {
    facet_toml::from_str(contents).map_err(|e| MultihostError::ConfigParse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub fn load_config(path: &Path) -> Result<SystemConfig, MultihostError> {
    let contents = std::fs::read_to_string(path).map_err(|source| MultihostError::ConfigLoad {
        path: path.display().to_string(),
        source,
    })?;

    let config = parse_config(&contents, path)?;

    let canonical = path.canonicalize().map_err(|source| MultihostError::ConfigLoad {
        path: path.display().to_string(),
        source,
    })?;

    debug!(path = %canonical.display(), hosts = config.hosts.len(), "loaded roster config");

    Ok(SystemConfig {
        config_path: Some(canonical),
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        parse_config(toml, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse(
            r#"
[[hosts]]
name = "hub"
memory_mb = 2048
"#,
        );
        let roster = config.roster();
        assert_eq!(roster.image, "centos/7");
        assert_eq!(roster.subnet, "192.168.100");
        assert_eq!(roster.provider, "virtualbox");
        assert_eq!(roster.scripts, ScriptLayout::default());
        assert!(roster.privileged);
        assert_eq!(roster.shared_folder, roster::default_shared_folder());
        assert_eq!(roster.hosts, vec![HostDescriptor::new("hub", 2048)]);
    }

    #[test]
    fn empty_config_is_an_empty_roster() {
        let config = parse("");
        assert!(config.roster().hosts.is_empty());
    }

    #[test]
    fn full_config_overrides_everything() {
        let config = parse(
            r#"
[image]
base = "rockylinux/9"

[network]
subnet = "10.20.30"

[provider]
name = "libvirt"

[provision]
dir = "scripts"
ext = "sh"
privileged = false

[shared_folder]
host = "../src"
guest = "/src"
kind = "rsync"

[[hosts]]
name = "hub"
memory_mb = 2048

[[hosts]]
name = "agent"
memory_mb = 8192
"#,
        );
        let roster = config.roster();
        assert_eq!(roster.image, "rockylinux/9");
        assert_eq!(roster.address(1), "10.20.30.3");
        assert_eq!(roster.provider, "libvirt");
        assert_eq!(roster.scripts.host_script("agent"), "scripts/provision-agent.sh");
        assert!(!roster.privileged);
        assert_eq!(roster.shared_folder.kind, "rsync");
        assert_eq!(roster.hosts.len(), 2);
    }

    #[test]
    fn host_without_memory_is_rejected() {
        let result = parse_config(
            r#"
[[hosts]]
name = "hub"
"#,
            Path::new("bad.toml"),
        );
        assert!(matches!(result, Err(MultihostError::ConfigParse { .. })));
    }

    #[test]
    fn preset_round_trips_through_config() {
        for preset in [Preset::Multihost, Preset::Pair] {
            assert_eq!(Config::preset(preset).roster(), Roster::preset(preset));
        }
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Path::new("/nonexistent/multihost.toml")).unwrap_err();
        assert!(matches!(err, MultihostError::ConfigLoad { .. }));
    }

    #[test]
    fn load_config_sets_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.toml");
        std::fs::write(&path, "[network]\nsubnet = \"10.1.1\"\n").unwrap();

        let sys = load_config(&path).unwrap();
        assert_eq!(sys.config.network.subnet, "10.1.1");
        assert_eq!(sys.base_dir(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn explicit_path_wins_lookup() {
        let found = locate_config(Some(Path::new("/some/where.toml"))).unwrap();
        assert_eq!(found, PathBuf::from("/some/where.toml"));
    }

    #[test]
    fn preset_source_has_no_path() {
        let sys = SystemConfig::from_preset(Preset::Pair);
        assert!(sys.config_path.is_none());
        assert_eq!(sys.display_source(), "built-in preset");
    }
}
