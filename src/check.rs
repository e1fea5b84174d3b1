//! Roster lint.
//!
//! Declaring a roster never validates anything; this pass is what
//! `multihost check` runs to catch mistakes before the platform does.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::roster::Roster;

/// Highest usable last octet; `.255` is broadcast.
const MAX_HOST_OCTET: usize = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    /// Host the finding is about, if any.
    pub host: Option<String>,
    pub message: String,
}

impl Finding {
    fn error(host: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            host: host.map(str::to_string),
            message: message.into(),
        }
    }

    fn warning(host: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            host: host.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Some(host) => write!(f, "{host}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Lint `roster`. When `base_dir` is given, provisioning scripts are
/// also looked up on disk relative to it.
pub fn check(roster: &Roster, base_dir: Option<&Path>) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Err(message) = validate_subnet(&roster.subnet) {
        findings.push(Finding::error(None, message));
    }

    if roster.hosts.is_empty() {
        findings.push(Finding::warning(None, "roster has no hosts"));
    }

    let mut seen = HashSet::new();
    for (index, host) in roster.hosts.iter().enumerate() {
        let name = Some(host.name.as_str());

        if !seen.insert(host.name.as_str()) {
            findings.push(Finding::error(name, "duplicate host name"));
        }
        if let Err(message) = validate_name(&host.name) {
            findings.push(Finding::error(name, message));
        }
        if host.memory_mb == 0 {
            findings.push(Finding::error(name, "memory_mb must be positive"));
        }
        if index + 2 > MAX_HOST_OCTET {
            findings.push(Finding::error(
                name,
                format!(
                    "position {index} would need address {}.{}, past .{MAX_HOST_OCTET}",
                    roster.subnet,
                    index + 2
                ),
            ));
        }
    }

    if let Some(dir) = base_dir {
        let scripts = std::iter::once((None, roster.scripts.global_script())).chain(
            roster
                .hosts
                .iter()
                .map(|h| (Some(h.name.as_str()), roster.scripts.host_script(&h.name))),
        );
        for (host, script) in scripts {
            if !dir.join(&script).is_file() {
                findings.push(Finding::warning(
                    host,
                    format!("provisioning script {script} not found"),
                ));
            }
        }
    }

    findings
}

/// Three dot-separated octets, each 0..=255.
pub(crate) fn validate_subnet(subnet: &str) -> Result<(), String> {
    let octets: Vec<&str> = subnet.split('.').collect();
    let valid = octets.len() == 3
        && octets
            .iter()
            .all(|o| !o.is_empty() && o.len() <= 3 && o.parse::<u8>().is_ok());
    if valid {
        Ok(())
    } else {
        Err(format!(
            "subnet must be three octets like 192.168.100 (got '{subnet}')"
        ))
    }
}

/// Names become hostnames and file names, so stick to `[a-zA-Z0-9][a-zA-Z0-9-]*`.
pub(crate) fn validate_name(name: &str) -> Result<(), String> {
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(format!(
            "host name must match [a-zA-Z0-9][a-zA-Z0-9-]* (got '{name}')"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{HostDescriptor, Preset};

    fn errors(findings: &[Finding]) -> Vec<&Finding> {
        findings.iter().filter(|f| f.is_error()).collect()
    }

    #[test]
    fn presets_are_clean() {
        for preset in [Preset::Multihost, Preset::Pair] {
            let findings = check(&Roster::preset(preset), None);
            assert!(findings.is_empty(), "{preset}: {findings:?}");
        }
    }

    #[test]
    fn duplicate_names_flagged() {
        let roster = Roster::new(vec![
            HostDescriptor::new("hub", 1024),
            HostDescriptor::new("hub", 2048),
        ]);
        let findings = check(&roster, None);
        assert_eq!(errors(&findings).len(), 1);
        assert_eq!(findings[0].to_string(), "hub: duplicate host name");
    }

    #[test]
    fn zero_memory_flagged() {
        let findings = check(&Roster::new(vec![HostDescriptor::new("hub", 0)]), None);
        assert_eq!(findings[0].message, "memory_mb must be positive");
    }

    #[test]
    fn empty_roster_is_a_warning() {
        let findings = check(&Roster::new(vec![]), None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn bad_subnets_flagged() {
        for subnet in ["192.168", "192.168.100.0", "192.168.300", "a.b.c", "", "10..1"] {
            let roster = Roster {
                subnet: subnet.into(),
                ..Roster::preset(Preset::Pair)
            };
            assert_eq!(
                errors(&check(&roster, None)).len(),
                1,
                "expected subnet '{subnet}' to be rejected"
            );
        }
    }

    #[test]
    fn invalid_names_flagged() {
        for name in ["", "-bad", "a_b", "a.b", "hello world", "a/b"] {
            assert!(validate_name(name).is_err(), "expected '{name}' to be rejected");
        }
        for name in ["hub", "standby-agent", "Agent01"] {
            validate_name(name).unwrap();
        }
    }

    #[test]
    fn address_overflow_flagged() {
        let hosts = (0..254)
            .map(|i| HostDescriptor::new(format!("n{i}"), 512))
            .collect();
        let findings = check(&Roster::new(hosts), None);
        let errs = errors(&findings);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].host.as_deref(), Some("n253"));
    }

    #[test]
    fn missing_scripts_are_warnings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("multihost")).unwrap();
        std::fs::write(dir.path().join("multihost/provision.bash"), "").unwrap();
        std::fs::write(dir.path().join("multihost/provision-hub.bash"), "").unwrap();

        let findings = check(&Roster::preset(Preset::Pair), Some(dir.path()));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].host.as_deref(), Some("agent"));
        assert!(findings[0].message.contains("multihost/provision-agent.bash"));
    }
}
