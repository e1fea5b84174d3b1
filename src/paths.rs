use std::path::PathBuf;

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "multihost.toml";

/// Rendered Vagrantfile name.
pub const VAGRANTFILE_NAME: &str = "Vagrantfile";

/// Per-user fallback config: `~/.config/multihost/multihost.toml`
pub fn user_config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("multihost")
        .join(CONFIG_FILE_NAME)
}
