//! Vagrantfile rendering.

use std::fmt::Write;

use crate::declaration::{Declaration, Machine};
use crate::platform::Provisioner;

const INDENT: &str = "  ";

/// Render a full `Vagrantfile` for the declaration.
pub fn render(decl: &Declaration) -> String {
    let mut out = String::new();
    out.push_str("# -*- mode: ruby -*-\n");
    out.push_str("# vi: set ft=ruby :\n");
    out.push_str("#\n");
    out.push_str("# Generated by multihost. Edit multihost.toml and re-render instead.\n");
    out.push('\n');
    out.push_str("Vagrant.configure(\"2\") do |config|\n");

    if let Some(image) = &decl.image {
        let _ = writeln!(out, "{INDENT}config.vm.box = {}", ruby_str(image));
        out.push('\n');
    }

    if !decl.provisioners.is_empty() {
        let _ = writeln!(out, "{INDENT}# provisioning applicable to all hosts");
        for p in &decl.provisioners {
            write_provisioner(&mut out, INDENT, "config", p);
        }
        out.push('\n');
    }

    for folder in &decl.shared_folders {
        let _ = writeln!(
            out,
            "{INDENT}config.vm.synced_folder {}, {}, type: {}",
            ruby_str(&folder.host_path),
            ruby_str(&folder.guest_path),
            ruby_str(&folder.kind),
        );
    }
    if !decl.shared_folders.is_empty() {
        out.push('\n');
    }

    for (i, machine) in decl.machines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_machine(&mut out, machine);
    }

    out.push_str("end\n");
    out
}

fn write_machine(out: &mut String, machine: &Machine) {
    let inner = format!("{INDENT}{INDENT}");
    let _ = writeln!(
        out,
        "{INDENT}config.vm.define {} do |guest|",
        ruby_str(&machine.name)
    );

    if let Some(ip) = &machine.ip {
        let _ = writeln!(
            out,
            "{inner}guest.vm.network \"private_network\", ip: {}",
            ruby_str(ip)
        );
    }
    if let Some(hostname) = &machine.hostname {
        let _ = writeln!(out, "{inner}guest.vm.hostname = {}", ruby_str(hostname));
    }
    for p in &machine.provisioners {
        write_provisioner(out, &inner, "guest", p);
    }

    for (provider, entries) in machine.overrides_by_provider() {
        out.push('\n');
        let _ = writeln!(out, "{inner}# {provider} specific overrides");
        let _ = writeln!(
            out,
            "{inner}guest.vm.provider {} do |vm|",
            ruby_str(provider)
        );
        for o in entries {
            let _ = writeln!(
                out,
                "{inner}{INDENT}vm.{} = {}",
                ruby_ident(&o.key),
                ruby_str(&o.value)
            );
        }
        let _ = writeln!(out, "{inner}end");
    }

    let _ = writeln!(out, "{INDENT}end");
}

fn write_provisioner(out: &mut String, indent: &str, receiver: &str, p: &Provisioner) {
    let _ = writeln!(out, "{indent}{receiver}.vm.provision \"shell\",");
    let _ = writeln!(out, "{indent}{INDENT}path: {},", ruby_str(&p.path));
    let _ = writeln!(out, "{indent}{INDENT}privileged: {}", p.privileged);
}

/// Double-quoted Ruby literal. `#` is escaped so `#{...}` never interpolates.
fn ruby_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '#' => out.push_str("\\#"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Provider keys become method calls; anything that is not an identifier
/// character is folded to `_`.
fn ruby_ident(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
