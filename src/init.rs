use std::path::Path;

use inquire::validator::Validation;
use inquire::{Confirm, CustomType, Select, Text};

use crate::check::{validate_name, validate_subnet};
use crate::config::{Config, HostConfig};
use crate::error::MultihostError;
use crate::paths;
use crate::roster::Preset;

// ── public entry point ───────────────────────────────────

pub fn run(preset: Option<Preset>, defaults: bool) -> Result<(), MultihostError> {
    run_in(Path::new("."), preset, defaults)
}

fn run_in(dir: &Path, preset: Option<Preset>, defaults: bool) -> Result<(), MultihostError> {
    let output_path = dir.join(paths::CONFIG_FILE_NAME);

    if output_path.exists() {
        if defaults {
            return Err(MultihostError::Validation {
                message: format!(
                    "{} already exists (use interactive mode to overwrite)",
                    paths::CONFIG_FILE_NAME
                ),
            });
        }
        let overwrite = Confirm::new(&format!(
            "{} already exists. Overwrite?",
            paths::CONFIG_FILE_NAME
        ))
        .with_default(false)
        .prompt()
        .map_err(map_inquire_err)?;
        if !overwrite {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let config = if defaults {
        Config::preset(preset.unwrap_or(Preset::Multihost))
    } else {
        run_wizard(preset)?
    };

    let toml = generate_toml(&config);
    std::fs::write(&output_path, &toml).map_err(|source| MultihostError::ConfigWrite {
        path: output_path.display().to_string(),
        source,
    })?;

    println!("Created {}", paths::CONFIG_FILE_NAME);
    println!("Run `multihost render --out Vagrantfile` to generate the environment.");
    Ok(())
}

// ── interactive wizard ───────────────────────────────────

fn run_wizard(preset: Option<Preset>) -> Result<Config, MultihostError> {
    println!();

    let preset = match preset {
        Some(p) => p,
        None => prompt_preset()?,
    };
    let mut config = Config::preset(preset);

    config.image.base = Text::new("Base box:")
        .with_default(&config.image.base)
        .prompt()
        .map_err(map_inquire_err)?;

    config.network.subnet = Text::new("Private subnet:")
        .with_default(&config.network.subnet)
        .with_help_message("First three octets; hosts get .2, .3, ... in roster order")
        .with_validator(|input: &str| match validate_subnet(input) {
            Ok(()) => Ok(Validation::Valid),
            Err(message) => Ok(Validation::Invalid(message.into())),
        })
        .prompt()
        .map_err(map_inquire_err)?;

    config.provision.privileged = Confirm::new("Run the global provisioning script as root?")
        .with_default(config.provision.privileged)
        .prompt()
        .map_err(map_inquire_err)?;

    let customize = Confirm::new("Customize hosts?")
        .with_default(false)
        .with_help_message("Otherwise the preset's hosts are kept")
        .prompt()
        .map_err(map_inquire_err)?;
    if customize {
        config.hosts = prompt_hosts()?;
    }

    Ok(config)
}

fn prompt_preset() -> Result<Preset, MultihostError> {
    let options = vec![Preset::Multihost, Preset::Pair];
    Select::new("Roster preset:", options)
        .with_help_message("multihost: standby-agent, segment-agent, hub; pair: hub, agent")
        .prompt()
        .map_err(map_inquire_err)
}

fn prompt_hosts() -> Result<Vec<HostConfig>, MultihostError> {
    let mut hosts: Vec<HostConfig> = Vec::new();

    loop {
        let existing: Vec<String> = hosts.iter().map(|h| h.name.clone()).collect();
        let name = Text::new("  Host name:")
            .with_help_message("Leave empty to finish")
            .with_validator(move |input: &str| {
                if input.is_empty() {
                    return Ok(Validation::Valid);
                }
                if existing.iter().any(|n| n == input) {
                    return Ok(Validation::Invalid("Host name already used".into()));
                }
                match validate_name(input) {
                    Ok(()) => Ok(Validation::Valid),
                    Err(message) => Ok(Validation::Invalid(message.into())),
                }
            })
            .prompt()
            .map_err(map_inquire_err)?;

        if name.is_empty() {
            break;
        }

        let memory_mb: u64 = CustomType::new("  Memory (MB):")
            .with_default(2048)
            .with_error_message("Please enter a valid number")
            .with_validator(|val: &u64| {
                if *val > 0 {
                    Ok(Validation::Valid)
                } else {
                    Ok(Validation::Invalid("Must be positive".into()))
                }
            })
            .prompt()
            .map_err(map_inquire_err)?;

        hosts.push(HostConfig { name, memory_mb });
    }

    Ok(hosts)
}

// ── TOML generation ──────────────────────────────────────

fn generate_toml(config: &Config) -> String {
    let mut out = String::new();

    out.push_str("[image]\n");
    out.push_str(&format!("base = {}\n", toml_str(&config.image.base)));
    out.push('\n');

    out.push_str("[network]\n");
    out.push_str(&format!("subnet = {}\n", toml_str(&config.network.subnet)));
    out.push('\n');

    out.push_str("[provider]\n");
    out.push_str(&format!("name = {}\n", toml_str(&config.provider.name)));
    out.push('\n');

    out.push_str("# scripts: <dir>/provision.<ext> and <dir>/provision-<host>.<ext>\n");
    out.push_str("[provision]\n");
    out.push_str(&format!("dir = {}\n", toml_str(&config.provision.dir)));
    out.push_str(&format!("ext = {}\n", toml_str(&config.provision.ext)));
    out.push_str(&format!("privileged = {}\n", config.provision.privileged));
    out.push('\n');

    out.push_str("[shared_folder]\n");
    out.push_str(&format!("host = {}\n", toml_str(&config.shared_folder.host)));
    out.push_str(&format!("guest = {}\n", toml_str(&config.shared_folder.guest)));
    out.push_str(&format!("kind = {}\n", toml_str(&config.shared_folder.kind)));

    for host in &config.hosts {
        out.push('\n');
        out.push_str("[[hosts]]\n");
        out.push_str(&format!("name = {}\n", toml_str(&host.name)));
        out.push_str(&format!("memory_mb = {}\n", host.memory_mb));
    }

    out
}

fn toml_str(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

// ── error mapping ────────────────────────────────────────

fn map_inquire_err(e: inquire::InquireError) -> MultihostError {
    match e {
        inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted => {
            MultihostError::InitCancelled
        }
        other => MultihostError::Validation {
            message: format!("prompt error: {other}"),
        },
    }
}

// ── tests ────────────────────────────────────────────────
