//! Integration tests for sdpcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use serial_test::serial;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn sdpcache() -> Command {
        cargo_bin_cmd!("sdpcache")
    }

    /// Command isolated from the user's config file
    fn isolated(tmp: &Path) -> Command {
        let mut cmd = sdpcache();
        cmd.env_remove("SDPCACHE_CONFIG")
            .arg("--config")
            .arg(tmp.join("config.toml"));
        cmd
    }

    fn artifacts(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.file_name().into_string().ok())
                    .filter(|n| n.starts_with("relaxation-"))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[test]
    fn help_displays() {
        sdpcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cached SDP relaxations"));
    }

    #[test]
    fn version_displays() {
        sdpcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("sdpcache"));
    }

    #[test]
    fn fingerprint_prints_short_and_full() {
        let tmp = TempDir::new().unwrap();
        isolated(tmp.path())
            .args(["fingerprint", "--length", "4", "--level", "1", "--n", "2"])
            .arg("--output-dir")
            .arg(tmp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("short _lat=4x1_level=1"))
            .stdout(predicate::str::contains("_n=2"));
    }

    #[test]
    fn fingerprint_rejects_unknown_model() {
        let tmp = TempDir::new().unwrap();
        isolated(tmp.path())
            .args(["fingerprint", "--model", "ising"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown model"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn build_persists_under_short_fingerprint() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("artifacts");

        isolated(tmp.path())
            .args(["build", "--length", "4", "--level", "1", "-p", "U=2"])
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("rebuilt"));

        assert_eq!(artifacts(&out), vec!["relaxation-bose-hubbard_lat=4x1_level=1.json"]);
    }

    #[test]
    fn second_build_recycles_stored_relaxation() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("artifacts");

        isolated(tmp.path())
            .args(["build", "--length", "3", "--level", "1"])
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success();

        isolated(tmp.path())
            .args(["build", "--length", "3", "--level", "1", "-p", "t=1"])
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("recycled"));
    }

    #[test]
    fn build_keeps_models_on_one_lattice_apart() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("artifacts");

        for model in ["bose-hubbard", "fermi-hubbard"] {
            isolated(tmp.path())
                .args(["build", "--model", model, "--length", "2", "--level", "1"])
                .arg("--output-dir")
                .arg(&out)
                .assert()
                .success()
                .stdout(predicate::str::contains("rebuilt"));
        }

        assert_eq!(
            artifacts(&out),
            vec![
                "relaxation-bose-hubbard_lat=2x1_level=1.json",
                "relaxation-fermi-hubbard_lat=2x1_level=1.json",
            ]
        );
    }

    #[test]
    fn build_into_unwritable_dir_still_succeeds() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        isolated(tmp.path())
            .args(["build", "--length", "2", "--level", "1"])
            .arg("--output-dir")
            .arg(&blocker)
            .assert()
            .success()
            .stdout(predicate::str::contains("Relaxation was not written"));
    }

    #[test]
    fn build_without_store_fails() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[store]\nenabled = false\n").unwrap();

        isolated(tmp.path())
            .args(["build", "--length", "2"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Persistence is disabled"));
    }

    #[test]
    fn run_without_solver_keeps_relaxation() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("artifacts");

        isolated(tmp.path())
            .args(["run", "--length", "2", "--level", "1"])
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .failure()
            .stderr(predicate::str::contains("No solver command configured"));

        assert_eq!(artifacts(&out), vec!["relaxation-bose-hubbard_lat=2x1_level=1.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn run_reports_solver_failure() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[solver]\nname = \"broken\"\ncommand = \"sh\"\nargs = [\"-c\", \"cat >/dev/null; echo diverged >&2; exit 3\"]\n",
        )
        .unwrap();

        isolated(tmp.path())
            .args(["run", "--length", "2", "--level", "1"])
            .arg("--output-dir")
            .arg(tmp.path().join("artifacts"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Solver broken failed"))
            .stderr(predicate::str::contains("diverged"));
    }

    #[test]
    fn store_list_and_clear() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("artifacts");

        isolated(tmp.path())
            .args(["store", "list"])
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("No stored relaxations"));

        isolated(tmp.path())
            .args(["build", "--length", "2", "--level", "1"])
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success();

        isolated(tmp.path())
            .args(["store", "list"])
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("bose-hubbard"))
            .stdout(predicate::str::contains("_lat=2x1_level=1"));

        isolated(tmp.path())
            .args(["store", "clear", "--yes"])
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 1 relaxation(s)"));

        assert!(artifacts(&out).is_empty());
    }

    #[test]
    fn config_init_then_show() {
        let tmp = TempDir::new().unwrap();

        isolated(tmp.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(tmp.path().join("config.toml").exists());

        isolated(tmp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[solver]"));
    }

    #[test]
    #[serial]
    fn config_path_follows_env() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("from-env.toml");

        sdpcache()
            .env("SDPCACHE_CONFIG", &path)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("from-env.toml"));
    }

    #[test]
    #[serial]
    fn invalid_config_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.toml");
        fs::write(&path, "[store\n").unwrap();

        sdpcache()
            .env("SDPCACHE_CONFIG", &path)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("broken.toml"));
    }
}
