//! Integration tests for bootenv

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn bootenv() -> Command {
        let mut cmd = cargo_bin_cmd!("bootenv");
        cmd.env_remove("RUST_LOG")
            .env_remove("BOOTENV_DIR")
            .env_remove("BOOTENV_CONFIG")
            .env("CI", "1");
        cmd
    }

    fn in_project(dir: &Path) -> Command {
        let mut cmd = bootenv();
        cmd.env("XDG_CONFIG_HOME", dir.join(".xdg")).arg("-C").arg(dir);
        cmd
    }

    /// A project that looks provisioned and tested
    fn built_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("requirements.txt"), "coverage\n").unwrap();
        fs::create_dir_all(root.join(".pkg/bin")).unwrap();
        fs::write(root.join(".pkg/.stamp"), "{}").unwrap();
        fs::create_dir_all(root.join("build/report/xunit")).unwrap();
        fs::write(root.join("build/report/coverage.xml"), "<coverage/>").unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join(".coverage"), "").unwrap();
        fs::create_dir_all(root.join(".cache/virtualenv")).unwrap();
        fs::create_dir_all(root.join(".cache/pip")).unwrap();
        fs::write(root.join("bootenv.local.toml"), "").unwrap();
        dir
    }

    #[test]
    fn help_displays() {
        bootenv()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("isolated Python environment"))
            .stdout(predicate::str::contains("maintainer-clean"));
    }

    #[test]
    fn version_displays() {
        bootenv()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("bootenv"));
    }

    #[test]
    fn plan_lists_prerequisites_first() {
        bootenv()
            .args(["plan", "check"])
            .assert()
            .success()
            .stdout(predicate::str::is_match(r"(?s)1\. provision.*2\. check").unwrap());
    }

    #[test]
    fn plan_maintainer_clean_chains_distclean() {
        bootenv()
            .args(["plan", "maintainer-clean"])
            .assert()
            .success()
            .stdout(
                predicate::str::is_match(r"(?s)1\. clean.*2\. distclean.*3\. maintainer-clean")
                    .unwrap(),
            );
    }

    #[test]
    fn status_on_empty_project() {
        let dir = TempDir::new().unwrap();
        in_project(dir.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("not provisioned"))
            .stdout(predicate::str::contains("No manifests"));
    }

    #[test]
    fn check_without_manifests_fails() {
        let dir = TempDir::new().unwrap();
        in_project(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No requirement manifests"));
        assert!(!dir.path().join(".cache").exists());
    }

    #[test]
    fn dist_without_setup_script_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("requirements.txt"), "").unwrap();
        in_project(dir.path())
            .arg("dist")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Required input not found"));
    }

    #[test]
    fn clean_keeps_cache() {
        let dir = built_project();
        in_project(dir.path()).arg("clean").assert().success();

        let root = dir.path();
        assert!(!root.join(".pkg").exists());
        assert!(!root.join("build").exists());
        assert!(!root.join("dist").exists());
        assert!(!root.join(".coverage").exists());
        assert!(root.join(".cache/pip").is_dir());
        assert!(root.join("bootenv.local.toml").exists());
        assert!(root.join("requirements.txt").exists());
    }

    #[test]
    fn clean_twice_succeeds() {
        let dir = TempDir::new().unwrap();
        in_project(dir.path()).arg("clean").assert().success();
        in_project(dir.path()).arg("clean").assert().success();
    }

    #[test]
    fn distclean_removes_cache_and_override() {
        let dir = built_project();
        in_project(dir.path()).arg("distclean").assert().success();

        let root = dir.path();
        assert!(!root.join(".pkg").exists());
        assert!(!root.join(".cache").exists());
        assert!(!root.join("bootenv.local.toml").exists());
    }

    #[test]
    fn maintainer_clean_prints_notice() {
        let dir = built_project();
        in_project(dir.path())
            .arg("maintainer-clean")
            .assert()
            .success()
            .stdout(predicate::str::contains("intended for maintainers"));

        assert!(!dir.path().join(".cache").exists());
    }

    #[test]
    fn mostlyclean_is_a_no_op() {
        let dir = built_project();
        in_project(dir.path()).arg("mostlyclean").assert().success();
        assert!(dir.path().join(".pkg").is_dir());
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        in_project(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("bootenv.toml"));
    }

    #[test]
    fn config_show_merges_local_override() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("bootenv.local.toml"),
            "[shell]\ninterpreter = \"ipython\"\n",
        )
        .unwrap();

        in_project(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[layout]"))
            .stdout(predicate::str::contains("ipython"));

        in_project(dir.path())
            .args(["--no-local", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ipython").not());
    }

    #[test]
    fn config_init_writes_project_file() {
        let dir = TempDir::new().unwrap();
        in_project(dir.path())
            .args(["config", "init"])
            .assert()
            .success();
        assert!(dir.path().join("bootenv.toml").is_file());

        in_project(dir.path())
            .args(["config", "init"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--force"));
    }

    #[test]
    fn missing_config_file_fails() {
        let dir = TempDir::new().unwrap();
        in_project(dir.path())
            .args(["--config", "nope.toml", "status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"));
    }

    #[test]
    fn missing_project_dir_fails() {
        bootenv()
            .args(["-C", "/definitely/not/here", "status"])
            .assert()
            .failure();
    }

    #[test]
    fn completions_generate() {
        bootenv()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("bootenv"));
    }
}
