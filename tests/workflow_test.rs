//! End-to-end runs against a stand-in interpreter and a mock registry.
//!
//! The stand-in is a shell script that understands just enough of
//! `python -m venv`, `python -m pip show` and `python -m pip install` to
//! keep a package list in `<env>/installed.txt`. Anything else is treated
//! as the analysis program: it prints its arguments and exits with 7.
#![cfg(unix)]
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const PROGRAM_EXIT: i32 = 7;

const FAKE_PYTHON: &str = r#"#!/bin/sh
here="$(cd "$(dirname "$0")" && pwd)"
state="$here/../installed.txt"
log="$here/../pip.log"

record() {
    spec="$1"
    case "$spec" in
        ''|'#'*) return ;;
        *==*) name="${spec%%==*}"; ver="${spec#*==}" ;;
        *) name="$spec"; ver="1.0.0" ;;
    esac
    echo "$name $ver" >> "$state"
}

if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
    mkdir -p "$3/bin"
    cp "$0" "$3/bin/python"
    chmod +x "$3/bin/python"
    exit 0
fi

if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
    echo "$*" >> "$log"
    sub="$3"
    shift 3
    case "$sub" in
        show)
            found=0
            missing=""
            for name in "$@"; do
                case "$name" in -*) continue ;; esac
                line=$(grep "^$name " "$state" 2>/dev/null | tail -n 1)
                if [ -n "$line" ]; then
                    [ "$found" -eq 1 ] && echo "---"
                    echo "Name: $name"
                    echo "Version: ${line#* }"
                    found=1
                else
                    missing="$missing $name"
                fi
            done
            if [ -n "$missing" ]; then
                echo "WARNING: Package(s) not found:$missing" >&2
                exit 1
            fi
            exit 0
            ;;
        install)
            while [ $# -gt 0 ]; do
                case "$1" in
                    -r)
                        shift
                        while read -r req; do record "$req"; done < "$1"
                        ;;
                    -*) ;;
                    *) record "$1" ;;
                esac
                shift
            done
            exit 0
            ;;
    esac
    exit 2
fi

echo "analysis ran with: $*"
echo "VIRTUAL_ENV=$VIRTUAL_ENV"
exit 7
"#;

struct Project {
    temp: TempDir,
}

impl Project {
    /// Project with an entry point and a config pointing at `index_url`.
    fn new(index_url: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let base_python = root.join("fake-python");
        write_executable(&base_python, FAKE_PYTHON);

        let dir = root.join("src").join("main");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stock_analyzer.py"), "").unwrap();

        fs::create_dir_all(root.join(".basecamp")).unwrap();
        fs::write(
            root.join(".basecamp").join("config.yml"),
            format!(
                "python: {}\nregistry:\n  index_url: {}\n  timeout_ms: 500\n",
                base_python.display(),
                index_url
            ),
        )
        .unwrap();

        Self { temp }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn env_dir(&self) -> PathBuf {
        self.root().join("venv")
    }

    /// Pre-create the environment with the given packages installed.
    fn with_environment(self, packages: &[(&str, &str)]) -> Self {
        let bin = self.env_dir().join("bin");
        fs::create_dir_all(&bin).unwrap();
        write_executable(&bin.join("python"), FAKE_PYTHON);
        let state: String = packages
            .iter()
            .map(|(name, version)| format!("{} {}\n", name, version))
            .collect();
        fs::write(self.env_dir().join("installed.txt"), state).unwrap();
        self
    }

    /// Point the base interpreter somewhere that does not exist.
    fn without_base_python(self) -> Self {
        fs::remove_file(self.root().join("fake-python")).unwrap();
        self
    }

    fn installed_version(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.env_dir().join("installed.txt"))
            .unwrap_or_default()
            .lines()
            .filter_map(|l| l.split_once(' '))
            .filter(|(n, _)| *n == name)
            .map(|(_, v)| v.to_string())
            .last()
    }

    fn pip_log(&self) -> String {
        fs::read_to_string(self.env_dir().join("pip.log")).unwrap_or_default()
    }

    fn basecamp(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("basecamp"));
        cmd.arg("--project")
            .arg(self.root())
            .env_remove("BASECAMP_PROJECT")
            .env_remove("BASECAMP_INDEX_URL")
            .env_remove("BASECAMP_UPGRADE")
            .env_remove("PYTHONHOME")
            .env("NO_COLOR", "1");
        cmd
    }
}

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn akshare_latest<'a>(server: &'a MockServer, version: &str) -> httpmock::Mock<'a> {
    let body = format!(r#"{{"info": {{"name": "akshare", "version": "{}"}}}}"#, version);
    server.mock(|when, then| {
        when.method(GET).path("/pypi/akshare/json");
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

#[test]
fn empty_project_creates_environment_and_installs_defaults() {
    let server = MockServer::start();
    // Would trigger an upgrade under --yes if the version check ran.
    akshare_latest(&server, "9.9.9");
    let project = Project::new(&server.base_url());

    project
        .basecamp()
        .args(["run", "--yes"])
        .assert()
        .code(PROGRAM_EXIT)
        .stdout(predicate::str::contains(
            "analysis ran with: -m src.main.stock_analyzer",
        ));

    assert!(project.env_dir().join("bin").join("python").is_file());
    assert_eq!(project.installed_version("akshare").as_deref(), Some("1.0.0"));
    assert_eq!(project.installed_version("pandas").as_deref(), Some("1.0.0"));
    assert_eq!(project.installed_version("numpy").as_deref(), Some("1.0.0"));
    assert!(!project.pip_log().contains("--upgrade"));
}

#[test]
fn manifest_is_installed_when_present() {
    let project = Project::new("http://127.0.0.1:9");
    fs::write(project.root().join("requirements.txt"), "akshare\nmatplotlib\n").unwrap();

    project
        .basecamp()
        .args(["run", "--offline"])
        .assert()
        .code(PROGRAM_EXIT);

    assert!(project.pip_log().contains("install --disable-pip-version-check -r"));
    assert_eq!(
        project.installed_version("matplotlib").as_deref(),
        Some("1.0.0")
    );
    assert!(project.installed_version("pandas").is_none());
}

#[test]
fn accepted_upgrade_installs_latest_then_launches() {
    let server = MockServer::start();
    let latest = akshare_latest(&server, "1.3.0");
    let project = Project::new(&server.base_url())
        .with_environment(&[("akshare", "1.2.0"), ("pandas", "2.2.0"), ("numpy", "1.26.0")])
        .without_base_python();

    project
        .basecamp()
        .args(["run", "--yes"])
        .assert()
        .code(PROGRAM_EXIT)
        .stdout(predicate::str::contains("analysis ran with"));

    latest.assert();
    assert!(project.pip_log().contains("--upgrade akshare==1.3.0"));
    assert_eq!(project.installed_version("akshare").as_deref(), Some("1.3.0"));
}

#[test]
fn headless_run_declines_upgrade() {
    let server = MockServer::start();
    let latest = akshare_latest(&server, "1.3.0");
    let project = Project::new(&server.base_url())
        .with_environment(&[("akshare", "1.2.0"), ("pandas", "2.2.0"), ("numpy", "1.26.0")]);

    project
        .basecamp()
        .args(["run", "--non-interactive"])
        .assert()
        .code(PROGRAM_EXIT)
        .stdout(predicate::str::contains("Keeping akshare 1.2.0"));

    latest.assert();
    assert!(!project.pip_log().contains("--upgrade"));
    assert_eq!(project.installed_version("akshare").as_deref(), Some("1.2.0"));
}

#[test]
fn unreachable_registry_launches_with_installed_version() {
    let project = Project::new("http://127.0.0.1:9")
        .with_environment(&[("akshare", "1.2.0"), ("pandas", "2.2.0"), ("numpy", "1.26.0")]);

    project
        .basecamp()
        .args(["run", "--yes"])
        .assert()
        .code(PROGRAM_EXIT);

    assert!(!project.pip_log().contains("install"));
    assert_eq!(project.installed_version("akshare").as_deref(), Some("1.2.0"));
}

#[test]
fn registry_timeout_launches_with_installed_version() {
    let server = MockServer::start();
    // Slower than the configured 500ms timeout.
    server.mock(|when, then| {
        when.method(GET).path("/pypi/akshare/json");
        then.status(200)
            .delay(Duration::from_secs(3))
            .header("content-type", "application/json")
            .body(r#"{"info": {"name": "akshare", "version": "1.3.0"}}"#);
    });
    let project = Project::new(&server.base_url())
        .with_environment(&[("akshare", "1.2.0"), ("pandas", "2.2.0"), ("numpy", "1.26.0")]);

    project
        .basecamp()
        .args(["run", "--yes"])
        .assert()
        .code(PROGRAM_EXIT)
        .stdout(predicate::str::contains("Could not check for a newer akshare"))
        .stdout(predicate::str::contains("Upgrade akshare").not())
        .stdout(predicate::str::contains("analysis ran with"));

    assert!(!project.pip_log().contains("install"));
    assert_eq!(project.installed_version("akshare").as_deref(), Some("1.2.0"));
}

#[test]
fn same_version_means_no_changes() {
    let server = MockServer::start();
    akshare_latest(&server, "1.2.0");
    let project = Project::new(&server.base_url())
        .with_environment(&[("akshare", "1.2.0"), ("pandas", "2.2.0"), ("numpy", "1.26.0")]);

    project
        .basecamp()
        .args(["run", "--yes"])
        .assert()
        .code(PROGRAM_EXIT)
        .stdout(predicate::str::contains("up to date"));

    assert!(!project.pip_log().contains("install"));
}

#[test]
fn program_arguments_and_activation_are_passed_through() {
    let project = Project::new("http://127.0.0.1:9")
        .with_environment(&[("akshare", "1.2.0"), ("pandas", "2.2.0"), ("numpy", "1.26.0")]);
    let env_dir = project.env_dir().canonicalize().unwrap();

    project
        .basecamp()
        .args(["run", "--offline", "--", "--symbol", "600519"])
        .assert()
        .code(PROGRAM_EXIT)
        .stdout(predicate::str::contains(
            "analysis ran with: -m src.main.stock_analyzer --symbol 600519",
        ))
        .stdout(predicate::str::contains(format!(
            "VIRTUAL_ENV={}",
            env_dir.display()
        )));
}

#[test]
fn failed_install_still_launches() {
    let project = Project::new("http://127.0.0.1:9")
        .with_environment(&[("pandas", "2.2.0")]);
    let bin = project.env_dir().join("bin").join("python");
    write_executable(
        &bin,
        &FAKE_PYTHON.replace("        install)\n", "        install)\n            echo 'ERROR: no network' >&2; exit 1\n"),
    );

    project
        .basecamp()
        .args(["run", "--offline"])
        .assert()
        .code(PROGRAM_EXIT)
        .stderr(predicate::str::contains("Could not install requirements"));
}
