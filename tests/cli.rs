use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;

fn multihost() -> assert_cmd::Command {
    cargo_bin_cmd!("multihost").into()
}

fn write_test_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let config_path = dir.path().join("multihost.toml");
    let mut f = std::fs::File::create(&config_path).unwrap();
    write!(f, "{body}").unwrap();
    config_path
}

const PAIR_CONFIG: &str = r#"
[network]
subnet = "10.9.8"

[provision]
privileged = false

[[hosts]]
name = "hub"
memory_mb = 2048

[[hosts]]
name = "agent"
memory_mb = 8192
"#;

#[test]
fn help_works() {
    multihost()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Declare multi-host VM test environments"));
}

#[test]
fn render_multihost_preset_as_vagrantfile() {
    multihost()
        .args(["--preset", "multihost", "render"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.vm.box = \"centos/7\""))
        .stdout(predicate::str::contains("config.vm.define \"standby-agent\" do |guest|"))
        .stdout(predicate::str::contains("ip: \"192.168.100.4\""))
        .stdout(predicate::str::contains("guest.vm.hostname = \"segment-agent.local\""))
        .stdout(predicate::str::contains("privileged: true"));
}

#[test]
fn render_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(&dir, PAIR_CONFIG);

    multihost()
        .args(["--config", config_path.to_str().unwrap(), "render"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ip: \"10.9.8.2\""))
        .stdout(predicate::str::contains("ip: \"10.9.8.3\""))
        .stdout(predicate::str::contains("vm.memory = \"8192\""));
}

#[test]
fn render_vagrantfile_into_directory() {
    let dir = tempfile::tempdir().unwrap();

    multihost()
        .args(["--preset", "pair", "render", "--out", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vagrantfile"));

    let written = std::fs::read_to_string(dir.path().join("Vagrantfile")).unwrap();
    assert!(written.contains("config.vm.define \"agent\""));
}

#[test]
fn render_json() {
    multihost()
        .args(["--preset", "pair", "render", "--target", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\":\"agent\""))
        .stdout(predicate::str::contains("192.168.100.3"));
}

#[test]
fn render_libvirt_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("xml");

    multihost()
        .args([
            "--preset",
            "multihost",
            "render",
            "--target",
            "libvirt",
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    for file in ["network.xml", "standby-agent.xml", "segment-agent.xml", "hub.xml"] {
        assert!(out.join(file).is_file(), "missing {file}");
    }
    let hub = std::fs::read_to_string(out.join("hub.xml")).unwrap();
    assert!(hub.contains("<memory unit='MiB'>2048</memory>"));
}

#[test]
fn render_libvirt_refuses_unsafe_file_names() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(
        &dir,
        r#"
[[hosts]]
name = "hub"
memory_mb = 2048

[[hosts]]
name = "network"
memory_mb = 2048
"#,
    );
    let out = dir.path().join("xml");

    multihost()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "render",
            "--target",
            "libvirt",
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("collides with network.xml"));

    assert!(!out.join("network.xml").exists());
}

#[test]
fn hosts_table() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(&dir, PAIR_CONFIG);

    multihost()
        .args(["--config", config_path.to_str().unwrap(), "hosts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NAME"))
        .stdout(predicate::str::contains("hub.local"))
        .stdout(predicate::str::contains("8192 MB"))
        .stdout(predicate::str::contains("multihost/provision-agent.bash"));
}

#[test]
fn hosts_json() {
    multihost()
        .args(["--preset", "multihost", "hosts", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hostname\":\"hub.local\""));
}

#[test]
fn missing_config_shows_error() {
    multihost()
        .args(["--config", "/nonexistent/multihost.toml", "hosts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn no_config_anywhere() {
    let dir = tempfile::tempdir().unwrap();

    multihost()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .arg("hosts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no roster config found"));
}

#[test]
fn config_found_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_test_config(&dir, PAIR_CONFIG);

    multihost()
        .current_dir(dir.path())
        .arg("hosts")
        .assert()
        .success()
        .stdout(predicate::str::contains("10.9.8.3"));
}

#[test]
fn invalid_toml_shows_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(&dir, "[[hosts]]\nname = \"hub\"\n");

    multihost()
        .args(["--config", config_path.to_str().unwrap(), "render"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn check_rejects_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(
        &dir,
        r#"
[[hosts]]
name = "hub"
memory_mb = 2048

[[hosts]]
name = "hub"
memory_mb = 4096
"#,
    );

    multihost()
        .args(["--config", config_path.to_str().unwrap(), "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("duplicate host name"))
        .stderr(predicate::str::contains("roster check found 1 error(s)"));
}

#[test]
fn check_warns_about_missing_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(&dir, PAIR_CONFIG);

    multihost()
        .args(["--config", config_path.to_str().unwrap(), "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("provisioning script multihost/provision.bash not found"))
        .stdout(predicate::str::contains("2 host(s)"));
}

#[test]
fn render_does_not_validate() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(
        &dir,
        r#"
[network]
subnet = "not-a-subnet"

[[hosts]]
name = "dup"
memory_mb = 0

[[hosts]]
name = "dup"
memory_mb = 0
"#,
    );

    multihost()
        .args(["--config", config_path.to_str().unwrap(), "render"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ip: \"not-a-subnet.3\""));
}

#[test]
fn init_defaults_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();

    multihost()
        .current_dir(dir.path())
        .args(["init", "--defaults", "--preset", "pair"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created multihost.toml"));

    let written = std::fs::read_to_string(dir.path().join("multihost.toml")).unwrap();
    assert!(written.contains("name = \"agent\""));
    assert!(written.contains("privileged = false"));

    multihost()
        .current_dir(dir.path())
        .args(["init", "--defaults"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn skill_prints_reference() {
    multihost()
        .arg("skill")
        .assert()
        .success()
        .stdout(predicate::str::contains("multihost.toml Config Schema"));
}
