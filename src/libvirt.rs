//! Libvirt XML rendering: one private network plus one domain per machine.

use std::path::{Path, PathBuf};

use facet::Facet;
use facet_xml as xml;
use tracing::warn;

use crate::declaration::{Declaration, Machine};
use crate::error::MultihostError;
use crate::platform::SharedFolder;

pub const NETWORK_NAME: &str = "multihost-private";
const DEFAULT_MEMORY_MB: u64 = 1024;
const NETWORK_FILE_STEM: &str = "network";
const DHCP_RANGE_START: u16 = 100;
const DHCP_RANGE_END: u16 = 254;

// ── network XML ────────────────────────────────────────────

#[derive(Debug, Facet)]
#[facet(rename = "network")]
struct NetworkDef {
    name: String,
    ip: NetworkIp,
}

#[derive(Debug, Facet)]
struct NetworkIp {
    #[facet(xml::attribute)]
    address: String,
    #[facet(xml::attribute)]
    netmask: String,
    dhcp: NetworkDhcp,
}

#[derive(Debug, Facet)]
struct NetworkDhcp {
    range: Option<DhcpRange>,
    host: Vec<DhcpHost>,
}

#[derive(Debug, Facet)]
struct DhcpRange {
    #[facet(xml::attribute)]
    start: String,
    #[facet(xml::attribute)]
    end: String,
}

#[derive(Debug, Facet)]
struct DhcpHost {
    #[facet(xml::attribute)]
    name: String,
    #[facet(xml::attribute)]
    ip: String,
}

// ── domain XML fragments ───────────────────────────────────

#[derive(Debug, Facet)]
#[facet(rename = "name")]
struct DomainName {
    #[facet(xml::text)]
    value: String,
}

#[derive(Debug, Facet)]
#[facet(rename = "disk")]
struct DiskDef {
    #[facet(xml::attribute, rename = "type")]
    kind: String,
    #[facet(xml::attribute)]
    device: String,
    driver: DiskDriver,
    source: FileSource,
    target: DiskTarget,
}

#[derive(Debug, Facet)]
struct DiskDriver {
    #[facet(xml::attribute)]
    name: String,
    #[facet(xml::attribute, rename = "type")]
    format: String,
}

#[derive(Debug, Facet)]
struct FileSource {
    #[facet(xml::attribute)]
    file: String,
}

#[derive(Debug, Facet)]
struct DiskTarget {
    #[facet(xml::attribute)]
    dev: String,
    #[facet(xml::attribute)]
    bus: String,
}

#[derive(Debug, Facet)]
#[facet(rename = "filesystem")]
struct FilesystemDef {
    #[facet(xml::attribute, rename = "type")]
    kind: String,
    #[facet(xml::attribute)]
    accessmode: String,
    source: DirRef,
    target: DirRef,
}

#[derive(Debug, Facet)]
struct DirRef {
    #[facet(xml::attribute)]
    dir: String,
}

/// Rendered libvirt documents.
#[derive(Debug, Clone, Default)]
pub struct LibvirtDocs {
    /// Absent when no machine has an address.
    pub network: Option<String>,
    /// `(machine name, domain XML)` in declaration order.
    pub domains: Vec<(String, String)>,
}

impl LibvirtDocs {
    /// All documents in one stream, each preceded by its file name as a comment.
    pub fn combined(&self) -> String {
        let mut out = String::new();
        if let Some(net) = &self.network {
            out.push_str("<!-- network.xml -->\n");
            out.push_str(net);
        }
        for (name, xml) in &self.domains {
            out.push_str(&format!("<!-- {name}.xml -->\n"));
            out.push_str(xml);
        }
        out
    }

    /// Write `network.xml` and `<name>.xml` files into `dir`.
    ///
    /// Every file name is checked before anything is written: a machine name
    /// must be usable as a plain file stem inside `dir` and must not collide
    /// with the network document or another machine.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, MultihostError> {
        let mut stems: Vec<&str> = Vec::new();
        for (name, _) in &self.domains {
            validate_stem(name)?;
            if stems.contains(&name.as_str()) {
                return Err(MultihostError::Validation {
                    message: format!("machine '{name}' is declared twice; its domain file would be overwritten"),
                });
            }
            stems.push(name);
        }

        std::fs::create_dir_all(dir).map_err(|source| MultihostError::Io {
            context: format!("creating {}", dir.display()),
            source,
        })?;

        let mut written = Vec::new();
        let files = self
            .network
            .iter()
            .map(|xml| (NETWORK_FILE_STEM, xml))
            .chain(self.domains.iter().map(|(name, xml)| (name.as_str(), xml)));
        for (stem, xml) in files {
            let path = dir.join(format!("{stem}.xml"));
            std::fs::write(&path, xml).map_err(|source| MultihostError::Io {
                context: format!("writing {}", path.display()),
                source,
            })?;
            written.push(path);
        }
        Ok(written)
    }
}

fn validate_stem(name: &str) -> Result<(), MultihostError> {
    let problem = if name.is_empty() {
        Some("is empty")
    } else if name == NETWORK_FILE_STEM {
        Some("collides with network.xml")
    } else if name.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if name.contains("..") {
        Some("contains '..'")
    } else {
        None
    };
    match problem {
        Some(problem) => Err(MultihostError::Validation {
            message: format!("machine name '{name}' {problem} and cannot be used as a domain file name"),
        }),
        None => Ok(()),
    }
}

/// Render the declaration. Relative paths (image, shared-folder sources) resolve against `root`.
pub fn render(decl: &Declaration, root: &Path) -> LibvirtDocs {
    let provisioned =
        !decl.provisioners.is_empty() || decl.machines.iter().any(|m| !m.provisioners.is_empty());
    if provisioned {
        warn!("libvirt has no provisioner support; shell provisioning steps are skipped");
    }

    let image = decl.image.as_deref().map(|image| resolve(root, image));
    if image.is_none() && !decl.machines.is_empty() {
        warn!("no image declared; domains are rendered without a boot disk");
    }

    let network = decl
        .machines
        .iter()
        .find_map(|m| m.ip.as_deref())
        .and_then(subnet_of)
        .map(|subnet| generate_network_xml(NETWORK_NAME, subnet, &decl.machines));

    let domains = decl
        .machines
        .iter()
        .map(|m| {
            let xml = generate_domain_xml(
                m,
                image.as_deref(),
                network.is_some(),
                &decl.shared_folders,
                root,
            );
            (m.name.clone(), xml)
        })
        .collect();

    LibvirtDocs { network, domains }
}

/// `192.168.100.4` → `192.168.100`
fn subnet_of(ip: &str) -> Option<&str> {
    ip.rsplit_once('.').map(|(prefix, _)| prefix)
}

/// Mount tag for a guest path. E.g. `/vagrant` → `vagrant`
pub(crate) fn sanitize_tag(target: &str) -> String {
    target.replace('/', "_").trim_start_matches('_').to_string()
}

/// `.` is `root` itself; absolute paths are kept.
fn resolve(root: &Path, path: &str) -> PathBuf {
    match path {
        "." => root.to_path_buf(),
        other if Path::new(other).is_absolute() => PathBuf::from(other),
        other => root.join(other),
    }
}

fn memory_mb(machine: &Machine) -> u64 {
    match machine.override_value("memory") {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(machine = %machine.name, value = raw, "memory override is not a number, using default");
            DEFAULT_MEMORY_MB
        }),
        None => DEFAULT_MEMORY_MB,
    }
}

/// First octet of the dynamic DHCP range: `.100`, or just past the highest
/// static address in `subnet` when the roster reaches that far.
/// `None` when no address is left for the range.
fn dhcp_range_start(subnet: &str, machines: &[Machine]) -> Option<u16> {
    let last_static = machines
        .iter()
        .filter_map(|m| m.ip.as_deref())
        .filter_map(|ip| ip.rsplit_once('.'))
        .filter(|(prefix, _)| *prefix == subnet)
        .filter_map(|(_, octet)| octet.parse::<u16>().ok())
        .max()
        .unwrap_or(0);
    let start = DHCP_RANGE_START.max(last_static.saturating_add(1));
    (start <= DHCP_RANGE_END).then_some(start)
}

fn generate_network_xml(name: &str, subnet: &str, machines: &[Machine]) -> String {
    let range = dhcp_range_start(subnet, machines).map(|start| DhcpRange {
        start: format!("{subnet}.{start}"),
        end: format!("{subnet}.{DHCP_RANGE_END}"),
    });
    if range.is_none() {
        warn!(subnet, "static addresses fill the subnet; network has no dynamic DHCP range");
    }

    let host = machines
        .iter()
        .filter_map(|m| {
            let ip = m.ip.as_ref()?;
            Some(DhcpHost {
                name: m.hostname.clone().unwrap_or_else(|| m.name.clone()),
                ip: ip.clone(),
            })
        })
        .collect();

    let net = NetworkDef {
        name: name.into(),
        ip: NetworkIp {
            address: format!("{subnet}.1"),
            netmask: "255.255.255.0".into(),
            dhcp: NetworkDhcp { range, host },
        },
    };

    let mut xml = facet_xml::to_string(&net).expect("network XML serialization should not fail");
    xml.push('\n');
    xml
}

fn generate_domain_xml(
    machine: &Machine,
    image: Option<&Path>,
    on_private_network: bool,
    folders: &[SharedFolder],
    root: &Path,
) -> String {
    let name = fragment(&DomainName {
        value: machine.name.clone(),
    });
    let memory = memory_mb(machine);

    let mut devices = String::new();
    if let Some(image) = image {
        let disk = DiskDef {
            kind: "file".into(),
            device: "disk".into(),
            driver: DiskDriver {
                name: "qemu".into(),
                format: "qcow2".into(),
            },
            source: FileSource {
                file: image.display().to_string(),
            },
            target: DiskTarget {
                dev: "vda".into(),
                bus: "virtio".into(),
            },
        };
        devices.push_str(&format!("    {}\n", fragment(&disk)));
    }
    if on_private_network {
        devices.push_str(&format!(
            "    <interface type='network'>\n      <source network='{NETWORK_NAME}'/>\n      <model type='virtio'/>\n    </interface>\n"
        ));
    }
    for folder in folders {
        let fs = FilesystemDef {
            kind: "mount".into(),
            accessmode: "mapped".into(),
            source: DirRef {
                dir: resolve(root, &folder.host_path).display().to_string(),
            },
            target: DirRef {
                dir: sanitize_tag(&folder.guest_path),
            },
        };
        devices.push_str(&format!("    {}\n", fragment(&fs)));
    }

    format!(
        r#"<domain type='kvm'>
  {name}
  <memory unit='MiB'>{memory}</memory>
  <vcpu>1</vcpu>
  <os>
    <type arch='x86_64' machine='q35'>hvm</type>
    <boot dev='hd'/>
  </os>
  <features>
    <acpi/>
    <apic/>
  </features>
  <devices>
{devices}    <serial type='pty'>
      <target port='0'/>
    </serial>
    <console type='pty'>
      <target type='serial' port='0'/>
    </console>
  </devices>
</domain>
"#
    )
}

/// Serialize one element of the domain that carries declared values.
fn fragment<'a, T: Facet<'a>>(value: &T) -> String {
    facet_xml::to_string(value).expect("domain XML fragment serialization should not fail")
}
