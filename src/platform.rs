//! The configuration API of the virtualization platform a roster is declared against.
//!
//! The builder only ever talks to these two traits. What the platform does
//! with the calls (record them, render a Vagrantfile, ...) is its own business.

use facet::Facet;

/// A shell provisioning step: a script path and whether it runs as root.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Provisioner {
    pub path: String,
    pub privileged: bool,
}

/// A bidirectional mount of a host directory into every guest.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct SharedFolder {
    pub host_path: String,
    pub guest_path: String,
    /// Mount mechanism understood by the platform, e.g. `nfs`.
    pub kind: String,
}

/// Declarations that apply to the whole environment.
pub trait Platform {
    fn set_box(&mut self, image: &str);
    fn add_provisioner(&mut self, provisioner: &Provisioner);
    fn set_shared_folder(&mut self, folder: &SharedFolder);

    /// Declare a machine; `configure` receives the guest scope for it.
    fn define_vm(&mut self, name: &str, configure: impl FnOnce(&mut dyn Guest));
}

/// Declarations scoped to a single machine.
pub trait Guest {
    fn set_network(&mut self, ip: &str);
    fn set_hostname(&mut self, hostname: &str);
    fn add_provisioner(&mut self, provisioner: &Provisioner);
    fn set_provider_override(&mut self, provider: &str, key: &str, value: &str);
}
