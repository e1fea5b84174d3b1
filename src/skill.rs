/// Concise markdown reference for agents and humans driving multihost.
pub const SKILL_DOC: &str = r#"# multihost — multi-host VM test environments

multihost declares a hub plus agent VMs for upgrade testing and renders the
declaration for a virtualization platform (Vagrant or libvirt). It never
starts, stops or provisions machines itself.

## Addressing

Hosts get `<subnet>.2`, `<subnet>.3`, ... in roster order, hostname
`<name>.local`, and run `<dir>/provision-<name>.<ext>` unprivileged. The
environment-wide script `<dir>/provision.<ext>` and the shared folder are
declared once.

## multihost.toml Config Schema

Every section is optional.

### [image]

| Field  | Type   | Default    | Description             |
|--------|--------|------------|-------------------------|
| `base` | string | "centos/7" | Base box for every host |

### [network]

| Field    | Type   | Default       | Description                   |
|----------|--------|---------------|-------------------------------|
| `subnet` | string | "192.168.100" | First three octets of the private network |

### [provider]

| Field  | Type   | Default      | Description                         |
|--------|--------|--------------|-------------------------------------|
| `name` | string | "virtualbox" | Provider that receives the memory override |

### [provision]

| Field        | Type   | Default     | Description                                |
|--------------|--------|-------------|--------------------------------------------|
| `dir`        | string | "multihost" | Script directory (empty for none)          |
| `ext`        | string | "bash"      | Script extension                           |
| `privileged` | bool   | true        | Run the global script as root              |

### [shared_folder]

| Field   | Type   | Default    | Description          |
|---------|--------|------------|----------------------|
| `host`  | string | "."        | Host directory       |
| `guest` | string | "/vagrant" | Mount point in guests|
| `kind`  | string | "nfs"      | Mount mechanism      |

### [[hosts]]

| Field       | Type   | Default | Description     |
|-------------|--------|---------|-----------------|
| `name`      | string | —       | VM identifier   |
| `memory_mb` | u64    | —       | RAM in megabytes|

## Presets

- `multihost`: standby-agent (2048), segment-agent (8192), hub (2048); global script privileged
- `pair`: hub (2048), agent (8192); global script unprivileged

## Commands

| Command | Description |
|---------|-------------|
| `multihost render [--target vagrant\|libvirt\|json] [--out PATH]` | Render the declaration |
| `multihost hosts [--json]` | List name, address, hostname, memory, script |
| `multihost check` | Lint the roster; non-zero exit on errors |
| `multihost init [--defaults]` | Write a starter multihost.toml |
| `multihost skill` | Print this reference |

Global flags: `--config <file>`, `--preset multihost|pair`, `--verbose`.
"#;
