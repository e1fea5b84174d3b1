use std::path::{Path, PathBuf};

use clap::Parser;
use console::style;
use facet::Facet;
use tracing::info;

use multihost::check::{self, Severity};
use multihost::cli::{Cli, Command, Target};
use multihost::config::{self, SystemConfig};
use multihost::declaration::Declaration;
use multihost::error::MultihostError;
use multihost::roster::Roster;
use multihost::{libvirt, logging, paths, vagrant};

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Handle skill and init before loading config — neither needs a roster
    match cli.command {
        Command::Skill => {
            print!("{}", multihost::skill::SKILL_DOC);
            return Ok(());
        }
        Command::Init { defaults } => {
            return multihost::init::run(cli.preset, defaults).map_err(Into::into);
        }
        _ => {}
    }

    let sys_config = match cli.preset {
        Some(preset) => SystemConfig::from_preset(preset),
        None => {
            let path = config::locate_config(cli.config.as_deref())?;
            config::load_config(&path)?
        }
    };
    info!(source = %sys_config.display_source(), "roster loaded");
    let roster = sys_config.config.roster();

    match cli.command {
        Command::Skill | Command::Init { .. } => unreachable!(),
        Command::Render { target, out } => {
            render(&sys_config, &roster, target, out.as_deref())?
        }
        Command::Hosts { json } => print_hosts(&roster, json),
        Command::Check => run_check(&sys_config, &roster)?,
    }

    Ok(())
}

// ── render ───────────────────────────────────────────────

fn render(
    sys_config: &SystemConfig,
    roster: &Roster,
    target: Target,
    out: Option<&Path>,
) -> Result<(), MultihostError> {
    let mut decl = Declaration::default();
    roster.declare(&mut decl);

    match target {
        Target::Vagrant => {
            let text = vagrant::render(&decl);
            match out {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(paths::VAGRANTFILE_NAME)
                    } else {
                        path.to_path_buf()
                    };
                    write_file(&path, &text)?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{text}"),
            }
        }
        Target::Libvirt => {
            let docs = libvirt::render(&decl, &sys_config.base_dir());
            match out {
                Some(dir) => {
                    for path in docs.write_to(dir)? {
                        println!("Wrote {}", path.display());
                    }
                }
                None => print!("{}", docs.combined()),
            }
        }
        Target::Json => {
            let json = decl.to_json();
            match out {
                Some(path) => {
                    write_file(path, &json)?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), MultihostError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| MultihostError::Io {
            context: format!("creating {}", parent.display()),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| MultihostError::Io {
        context: format!("writing {}", path.display()),
        source,
    })
}

// ── hosts ────────────────────────────────────────────────

#[derive(Facet)]
struct HostJson {
    name: String,
    ip: String,
    hostname: String,
    memory_mb: u64,
    script: String,
}

fn host_rows(roster: &Roster) -> Vec<HostJson> {
    roster
        .hosts
        .iter()
        .enumerate()
        .map(|(i, h)| HostJson {
            name: h.name.clone(),
            ip: roster.address(i),
            hostname: h.hostname(),
            memory_mb: h.memory_mb,
            script: roster.host_provisioner(h).path,
        })
        .collect()
}

fn print_hosts(roster: &Roster, json: bool) {
    let rows = host_rows(roster);

    if json {
        println!(
            "{}",
            facet_json::to_string(&rows).expect("JSON serialization")
        );
        return;
    }

    if rows.is_empty() {
        println!("No hosts declared.");
        return;
    }

    let header = ["NAME", "ADDRESS", "HOSTNAME", "MEMORY", "SCRIPT"];
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.ip.clone(),
                r.hostname.clone(),
                format!("{} MB", r.memory_mb),
                r.script.clone(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let line = |cols: [&str; 5]| -> String {
        cols.iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", style(line(header)).bold());
    for row in &cells {
        println!("{}", line(row.each_ref().map(String::as_str)));
    }
}

// ── check ────────────────────────────────────────────────

fn run_check(sys_config: &SystemConfig, roster: &Roster) -> Result<(), MultihostError> {
    // Presets have no script directory of their own to look in
    let base_dir: Option<PathBuf> = sys_config
        .config_path
        .as_ref()
        .map(|_| sys_config.base_dir());
    let findings = check::check(roster, base_dir.as_deref());

    for finding in &findings {
        let label = match finding.severity {
            Severity::Error => style("error").red().bold(),
            Severity::Warning => style("warning").yellow().bold(),
        };
        println!("{label}: {finding}");
    }

    let errors = findings.iter().filter(|f| f.is_error()).count();
    if errors > 0 {
        return Err(MultihostError::CheckFailed { errors });
    }

    println!(
        "{} {} host(s) from {}",
        style("ok").green().bold(),
        roster.hosts.len(),
        sys_config.display_source()
    );
    Ok(())
}
