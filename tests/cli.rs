// End-to-end tests driving the dnssecctl binary against fake external
// tools (shell scripts standing in for dnssec-keygen, dnssec-signzone and
// rndc) so no BIND installation is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct FakeTools {
    dir: TempDir,
}

impl FakeTools {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();

        // emits a key pair named like the real generator would
        write_script(
            &dir.path().join("dnssec-keygen"),
            r#"#!/bin/sh
kdir=""
tag="11111"
prev=""
last=""
for a in "$@"; do
  if [ "$prev" = "-K" ]; then kdir="$a"; fi
  if [ "$a" = "KSK" ]; then tag="22222"; fi
  prev="$a"
  last="$a"
done
echo "$last DNSKEY $tag" > "$kdir/K$last.+008+$tag.key"
echo "Private-key-format: v1.3 $tag" > "$kdir/K$last.+008+$tag.private"
echo "K$last.+008+$tag"
"#,
        );

        // copies the input zone to the -f output and appends a unique
        // signature line so every signing pass changes the output
        write_script(
            &dir.path().join("dnssec-signzone"),
            r#"#!/bin/sh
out=""
prev=""
last=""
for a in "$@"; do
  if [ "$prev" = "-f" ]; then out="$a"; fi
  prev="$a"
  last="$a"
done
tmp=$(mktemp)
cat "$last" > "$tmp"
echo "; RRSIG fake $(date +%s%N).$$" >> "$tmp"
mv "$tmp" "$out"
"#,
        );

        // records every invocation for later assertions
        write_script(
            &dir.path().join("rndc"),
            r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/rndc.log"
"#,
        );

        Self { dir }
    }

    fn tool(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn rndc_log(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("rndc.log")).unwrap_or_default()
    }
}

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, body).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

fn dnssecctl(tools: &FakeTools, base: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dnssecctl").unwrap();
    cmd.arg("-b")
        .arg(base)
        .arg("-k")
        .arg(tools.tool("dnssec-keygen"))
        .arg("-s")
        .arg(tools.tool("dnssec-signzone"))
        .arg("-c")
        .arg(tools.tool("rndc"))
        .args(["-u", "no-such-user-xyzzy", "-g", "no-such-group-xyzzy"]);
    cmd
}

fn write_source(dir: &Path, name: &str) -> PathBuf {
    let source = dir.join(name);
    std::fs::write(
        &source,
        "$TTL 300\n@ IN SOA ns.example. hostmaster.example. 1 7200 3600 1209600 300\n",
    )
    .unwrap();
    source
}

#[test]
fn init_produces_signed_zone_keys_and_aggregate() {
    let tools = FakeTools::new();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("zones");
    std::fs::create_dir_all(&base).unwrap();
    let source = write_source(tmp.path(), "example.com");

    dnssecctl(&tools, &base)
        .arg("init")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 zone(s) initialized"));

    let domain = base.join("example.com");
    assert!(domain.join("original.zone").is_file());
    assert!(domain.join("include_keys.zone").is_file());
    assert!(domain.join("signed.zone").is_file());
    assert!(domain.join("named.block").is_file());
    for alias in ["zsk.key", "zsk.private", "ksk.key", "ksk.private"] {
        assert!(domain.join(alias).exists(), "missing {alias}");
    }

    let signed = std::fs::read_to_string(domain.join("signed.zone")).unwrap();
    assert!(signed.contains("RRSIG"));

    let aggregate = std::fs::read_to_string(base.join("named.conf.local.signed")).unwrap();
    let includes: Vec<_> = aggregate.lines().collect();
    assert_eq!(includes.len(), 1);
    assert!(includes[0].starts_with("$INCLUDE "));
    assert!(includes[0].ends_with("example.com/named.block"));

    assert!(tools.rndc_log().contains("reload"));
}

#[test]
fn init_with_missing_source_skips_and_does_not_reload() {
    let tools = FakeTools::new();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("zones");
    std::fs::create_dir_all(&base).unwrap();

    dnssecctl(&tools, &base)
        .arg("init")
        .arg(tmp.path().join("no-such-file.example"))
        .assert()
        .success()
        .stderr(predicate::str::contains("zone file not found"))
        .stdout(predicate::str::contains("1 zone(s) failed"));

    assert!(!base.join("named.conf.local.signed").exists());
    assert!(!tools.rndc_log().contains("reload"));
}

#[test]
fn init_mixed_batch_reports_both_counts() {
    let tools = FakeTools::new();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("zones");
    std::fs::create_dir_all(&base).unwrap();
    let source = write_source(tmp.path(), "example.com");

    dnssecctl(&tools, &base)
        .arg("init")
        .arg(&source)
        .arg(tmp.path().join("no-such-file.example"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("1 zone(s) initialized")
                .and(predicate::str::contains("1 zone(s) failed")),
        );

    assert!(base.join("example.com").join("signed.zone").is_file());
    assert!(tools.rndc_log().contains("reload"));
}

#[test]
fn freeze_creates_marker_and_double_freeze_is_skipped() {
    let tools = FakeTools::new();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("zones");
    std::fs::create_dir_all(&base).unwrap();
    let source = write_source(tmp.path(), "example.com");

    dnssecctl(&tools, &base).arg("init").arg(&source).assert().success();
    dnssecctl(&tools, &base)
        .args(["freeze", "example.com"])
        .assert()
        .success();

    let marker = base.join("example.com").join("signed.zone.freezed");
    assert!(marker.is_file());
    assert_eq!(tools.rndc_log().matches("freeze example.com").count(), 1);

    dnssecctl(&tools, &base)
        .args(["freeze", "example.com"])
        .assert()
        .success()
        .stderr(predicate::str::contains("already frozen"));
    assert_eq!(tools.rndc_log().matches("freeze example.com").count(), 1);
}

#[test]
fn thaw_unchanged_zone_stays_frozen() {
    let tools = FakeTools::new();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("zones");
    std::fs::create_dir_all(&base).unwrap();
    let source = write_source(tmp.path(), "example.com");

    dnssecctl(&tools, &base).arg("init").arg(&source).assert().success();
    dnssecctl(&tools, &base)
        .args(["freeze", "example.com"])
        .assert()
        .success();
    dnssecctl(&tools, &base)
        .args(["thaw", "example.com"])
        .assert()
        .success()
        .stderr(predicate::str::contains("was not changed"));

    assert!(base.join("example.com").join("signed.zone.freezed").is_file());
    assert!(!tools.rndc_log().contains("thaw"));
}

#[test]
fn edited_zone_is_resigned_on_thaw() {
    let tools = FakeTools::new();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("zones");
    std::fs::create_dir_all(&base).unwrap();
    let source = write_source(tmp.path(), "example.com");

    dnssecctl(&tools, &base).arg("init").arg(&source).assert().success();
    dnssecctl(&tools, &base)
        .args(["freeze", "example.com"])
        .assert()
        .success();

    let signed = base.join("example.com").join("signed.zone");
    let snapshot = std::fs::read_to_string(&signed).unwrap();
    std::fs::write(&signed, format!("{snapshot}www IN A 192.0.2.7\n")).unwrap();

    dnssecctl(&tools, &base)
        .args(["thaw", "example.com"])
        .assert()
        .success();

    assert!(!base.join("example.com").join("signed.zone.freezed").exists());
    assert!(tools.rndc_log().contains("thaw example.com"));
    let resigned = std::fs::read_to_string(&signed).unwrap();
    assert_ne!(resigned, snapshot);
    assert!(resigned.contains("www IN A 192.0.2.7"));
}

#[test]
fn freeze_of_unknown_zone_reports_zone_not_found() {
    let tools = FakeTools::new();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("zones");
    std::fs::create_dir_all(&base).unwrap();

    dnssecctl(&tools, &base)
        .args(["freeze", "ghost.example"])
        .assert()
        .success()
        .stderr(predicate::str::contains("zone not found: ghost.example"));
    assert!(tools.rndc_log().is_empty());
}

#[test]
fn remove_deletes_domain_and_reports_unknown_ones() {
    let tools = FakeTools::new();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("zones");
    std::fs::create_dir_all(&base).unwrap();
    let source = write_source(tmp.path(), "example.com");

    dnssecctl(&tools, &base).arg("init").arg(&source).assert().success();
    dnssecctl(&tools, &base)
        .args(["remove", "example.com", "never-there.example"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "domain not found: never-there.example",
        ));

    assert!(!base.join("example.com").exists());
}

#[test]
fn remove_refuses_zone_names_that_escape_the_base_dir() {
    let tools = FakeTools::new();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("zones");
    std::fs::create_dir_all(&base).unwrap();
    let sibling = tmp.path().join("sibling");
    std::fs::create_dir_all(&sibling).unwrap();
    std::fs::write(sibling.join("precious"), "keep me").unwrap();

    dnssecctl(&tools, &base)
        .args(["remove", "../sibling"])
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid zone name"));
    assert!(sibling.join("precious").is_file());

    dnssecctl(&tools, &base)
        .arg("remove")
        .arg(&sibling)
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid zone name"));
    assert!(sibling.join("precious").is_file());
}

#[test]
fn unknown_command_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("dnssecctl").unwrap();
    cmd.arg("defrost").assert().failure();
}

#[test]
fn help_lists_all_commands() {
    let mut cmd = Command::cargo_bin("dnssecctl").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("cron"))
                .and(predicate::str::contains("edit"))
                .and(predicate::str::contains("remove"))
                .and(predicate::str::contains("freeze"))
                .and(predicate::str::contains("thaw")),
        );
}
