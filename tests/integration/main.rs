//! Integration tests for gorun

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn gorun() -> Command {
        cargo_bin_cmd!("gorun")
    }

    #[test]
    fn help_displays() {
        gorun()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Go source files as scripts"));
    }

    #[test]
    fn version_displays() {
        gorun()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("gorun"));
    }
}

mod run_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use gorun::cache::directory_key;
    use predicates::prelude::*;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Stand-in for `go`: logs calls, "compiles" to a shell script printing
    /// "hello" and its arguments, and fails on sources containing BROKEN.
    const FAKE_GO: &str = r#"#!/bin/sh
here=$(dirname "$0")
echo "$*" >> "$here/calls.log"
case "$1" in
  env) echo "$here/modcache" ;;
  mod)
    case "$2" in
      init) echo "module $3" > go.mod ;;
      tidy) : > go.sum ;;
    esac ;;
  build)
    if grep -q BROKEN ./*.go; then echo "bad.go:2:1: syntax error" >&2; exit 1; fi
    cat > "$3" <<'EOF'
#!/bin/sh
echo hello "$@"
EOF
    chmod 700 "$3" ;;
  *) exit 2 ;;
esac
"#;

    struct Env {
        tools: TempDir,
        sources: TempDir,
        cache: TempDir,
    }

    impl Env {
        fn new() -> Self {
            let tools = TempDir::new().unwrap();
            let go = tools.path().join("go");
            fs::write(&go, FAKE_GO).unwrap();
            fs::set_permissions(&go, fs::Permissions::from_mode(0o755)).unwrap();
            Self {
                tools,
                sources: TempDir::new().unwrap(),
                cache: TempDir::new().unwrap(),
            }
        }

        fn source(&self, name: &str, content: &str) -> PathBuf {
            let path = self.sources.path().join(name);
            fs::write(&path, content).unwrap();
            path
        }

        fn gorun(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("gorun");
            cmd.env("GORUN_TOOLCHAIN", self.tools.path().join("go"))
                .env("GORUN_CACHE_DIR", self.cache.path())
                .env("GORUN_CONFIG", self.tools.path().join("absent.toml"));
            cmd
        }

        fn user_root(&self) -> PathBuf {
            let uid = rustix::process::geteuid().as_raw();
            self.cache.path().join(format!("gorun-{}", uid))
        }

        fn toolchain_calls(&self) -> usize {
            fs::read_to_string(self.tools.path().join("calls.log"))
                .map(|s| s.lines().count())
                .unwrap_or(0)
        }
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    #[serial]
    fn runs_single_file() {
        let env = Env::new();
        let main = env.source("main.go", "package main\n");

        env.gorun()
            .arg(&main)
            .assert()
            .success()
            .stdout("hello\n");
    }

    #[test]
    #[serial]
    fn forwards_arguments() {
        let env = Env::new();
        let main = env.source("main.go", "package main\n");

        env.gorun()
            .arg(&main)
            .args(["a", "-v", "--help"])
            .assert()
            .success()
            .stdout("hello a -v --help\n");
    }

    #[test]
    #[serial]
    fn relative_sources_resolve_against_cwd() {
        let env = Env::new();
        env.source("main.go", "package main\n");
        env.source("util.go", "package main\n");

        env.gorun()
            .current_dir(env.sources.path())
            .arg("util.go,main.go")
            .assert()
            .success()
            .stdout("hello\n");
    }

    #[test]
    #[serial]
    fn relative_cache_dir_resolves_against_cwd() {
        let env = Env::new();
        let main = env.source("main.go", "package main\n");

        env.gorun()
            .current_dir(env.sources.path())
            .env("GORUN_CACHE_DIR", "cache")
            .arg(&main)
            .assert()
            .success()
            .stdout("hello\n");

        let uid = rustix::process::geteuid().as_raw();
        let dir = env
            .sources
            .path()
            .join("cache")
            .join(format!("gorun-{}", uid))
            .join(directory_key(&[main.clone()]));
        assert_eq!(names(&dir).len(), 1);
    }

    #[test]
    #[serial]
    fn relative_toolchain_resolves_against_cwd() {
        let env = Env::new();
        let main = env.source("main.go", "package main\n");

        env.gorun()
            .current_dir(env.tools.path())
            .env("GORUN_TOOLCHAIN", "./go")
            .arg(&main)
            .assert()
            .success()
            .stdout("hello\n");
    }

    #[test]
    #[serial]
    fn parent_components_share_one_cache_dir() {
        let env = Env::new();
        env.source("main.go", "package main\n");
        fs::create_dir(env.sources.path().join("sub")).unwrap();

        env.gorun()
            .current_dir(env.sources.path())
            .arg("main.go,sub/../main.go")
            .assert()
            .success()
            .stdout("hello\n");

        // One key directory and its lock file
        let entries = names(&env.user_root());
        assert_eq!(entries.len(), 2);
        assert_eq!(format!("{}.lock", entries[0]), entries[1]);
    }

    #[test]
    #[serial]
    fn second_run_skips_toolchain() {
        let env = Env::new();
        let main = env.source("main.go", "package main\n");

        env.gorun().arg(&main).assert().success();
        let calls = env.toolchain_calls();
        assert!(calls > 0);

        env.gorun().arg(&main).assert().success().stdout("hello\n");
        assert_eq!(env.toolchain_calls(), calls);
    }

    #[test]
    #[serial]
    fn cache_holds_only_executable() {
        let env = Env::new();
        let main = env.source("main.go", "package main\n");

        env.gorun().arg(&main).assert().success();

        let key = directory_key(&[main.clone()]);
        let dir = env.user_root().join(&key);
        let entries = names(&dir);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].ends_with(".go"));
        assert_eq!(
            fs::metadata(&dir).unwrap().permissions().mode() & 0o777,
            0o700
        );
    }

    #[test]
    #[serial]
    fn compile_failure_leaves_no_executable() {
        let env = Env::new();
        let good = env.source("good.go", "package main\n");
        let bad = env.source("bad.go", "package main\nBROKEN\n");
        let arg = format!("{},{}", good.display(), bad.display());

        env.gorun()
            .arg(&arg)
            .assert()
            .failure()
            .stderr(predicate::str::contains("syntax error"))
            .stderr(predicate::str::contains("Error:"));

        let mut sources = vec![bad, good];
        sources.sort();
        let dir = env.user_root().join(directory_key(&sources));
        assert!(!dir.exists());
    }

    #[test]
    #[serial]
    fn no_sources_fails_before_touching_cache() {
        let env = Env::new();

        env.gorun()
            .assert()
            .failure()
            .stderr(predicate::str::contains("No file(s) to compile"));

        assert!(names(env.cache.path()).is_empty());
        assert_eq!(env.toolchain_calls(), 0);
    }

    #[test]
    #[serial]
    fn tampered_cache_dir_is_refused() {
        let env = Env::new();
        let main = env.source("main.go", "package main\n");
        let dir = env.user_root().join(directory_key(&[main.clone()]));
        fs::create_dir_all(&dir).unwrap();
        fs::set_permissions(env.user_root(), fs::Permissions::from_mode(0o700)).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o777)).unwrap();

        env.gorun()
            .arg(&main)
            .assert()
            .failure()
            .stderr(predicate::str::contains("wrong permissions"));

        assert_eq!(env.toolchain_calls(), 0);
        assert!(dir.exists());
    }

    #[test]
    #[serial]
    fn missing_toolchain_reports_hint() {
        let env = Env::new();
        let main = env.source("main.go", "package main\n");

        env.gorun()
            .env("GORUN_TOOLCHAIN", env.tools.path().join("no-such-go"))
            .arg(&main)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Toolchain not found"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    #[serial]
    fn offline_proxy_does_not_leak_into_program() {
        let env = Env::new();
        let main = env.source("main.go", "package main\n");
        // Program that prints its GOPROXY instead of "hello"
        let go = env.tools.path().join("go");
        let script = FAKE_GO.replace("echo hello \"$@\"", "echo \"proxy=${GOPROXY-unset}\"");
        fs::write(&go, script).unwrap();

        env.gorun()
            .env_remove("GOPROXY")
            .arg(&main)
            .assert()
            .success()
            .stdout("proxy=unset\n");
    }

    /// Requires a Go toolchain on PATH
    #[test]
    #[ignore]
    fn real_go_toolchain() {
        let env = Env::new();
        let main = env.source(
            "main.go",
            "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc main() {\n\tfmt.Println(\"hi\", len(os.Args)-1)\n}\n",
        );

        env.gorun()
            .env_remove("GORUN_TOOLCHAIN")
            .arg(&main)
            .args(["x", "y"])
            .assert()
            .success()
            .stdout("hi 2\n");
    }
}
