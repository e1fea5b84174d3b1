//! In-memory record of one configuration pass.
//!
//! `Declaration` is the `Platform` the CLI declares against. Renderers
//! (`vagrant`, `libvirt`) and the JSON output all read from it.

use facet::Facet;

use crate::platform::{Guest, Platform, Provisioner, SharedFolder};

#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct Declaration {
    pub image: Option<String>,
    pub provisioners: Vec<Provisioner>,
    pub shared_folders: Vec<SharedFolder>,
    pub machines: Vec<Machine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct Machine {
    pub name: String,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub provisioners: Vec<Provisioner>,
    pub overrides: Vec<ProviderOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ProviderOverride {
    pub provider: String,
    pub key: String,
    pub value: String,
}

impl Declaration {
    pub fn machine(&self, name: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.name == name)
    }

    pub fn to_json(&self) -> String {
        facet_json::to_string(self).expect("declaration JSON serialization")
    }
}

impl Machine {
    /// Override value for `key` on any provider, last one wins.
    pub fn override_value(&self, key: &str) -> Option<&str> {
        self.overrides
            .iter()
            .rev()
            .find(|o| o.key == key)
            .map(|o| o.value.as_str())
    }

    /// Overrides grouped by provider, in first-seen provider order.
    pub fn overrides_by_provider(&self) -> Vec<(&str, Vec<&ProviderOverride>)> {
        let mut groups: Vec<(&str, Vec<&ProviderOverride>)> = Vec::new();
        for o in &self.overrides {
            match groups.iter_mut().find(|(p, _)| *p == o.provider) {
                Some((_, entries)) => entries.push(o),
                None => groups.push((o.provider.as_str(), vec![o])),
            }
        }
        groups
    }
}

impl Platform for Declaration {
    fn set_box(&mut self, image: &str) {
        self.image = Some(image.to_string());
    }

    fn add_provisioner(&mut self, provisioner: &Provisioner) {
        self.provisioners.push(provisioner.clone());
    }

    fn set_shared_folder(&mut self, folder: &SharedFolder) {
        self.shared_folders.push(folder.clone());
    }

    fn define_vm(&mut self, name: &str, configure: impl FnOnce(&mut dyn Guest)) {
        let mut machine = Machine {
            name: name.to_string(),
            ..Machine::default()
        };
        configure(&mut machine);
        self.machines.push(machine);
    }
}

impl Guest for Machine {
    fn set_network(&mut self, ip: &str) {
        self.ip = Some(ip.to_string());
    }

    fn set_hostname(&mut self, hostname: &str) {
        self.hostname = Some(hostname.to_string());
    }

    fn add_provisioner(&mut self, provisioner: &Provisioner) {
        self.provisioners.push(provisioner.clone());
    }

    fn set_provider_override(&mut self, provider: &str, key: &str, value: &str) {
        self.overrides.push(ProviderOverride {
            provider: provider.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}
