//! setup.py binding builds
//!
//! Builds the lxml extension with `setup.py build_ext`, passing the search
//! paths on the command line and `XML_CONFIG` / `XSLT_CONFIG` / `LDSHARED`
//! in the environment, then installs it into the destination and reads
//! back the installed files from the `--record` file.

use std::path::PathBuf;
use std::process::Command;

use crate::config::defaults;
use crate::core::build_env::join_paths;
use crate::core::builder::{BindingBuildSpec, BindingBuilder};
use crate::error::BindingBuildError;
use crate::infra::filesystem::{absolute_path, create_dir_all, read_file};
use crate::infra::process;

const LDSHARED_QUERY: &str =
    "import sysconfig; print(sysconfig.get_config_var('LDSHARED') or '')";

/// Binding builder driving a binding's `setup.py`
#[derive(Debug, Clone)]
pub struct SetupPyBuilder {
    python: PathBuf,
    source_dir: PathBuf,
}

impl SetupPyBuilder {
    /// Create a builder for the source tree in `source_dir`
    ///
    /// `python` is a name looked up on `PATH` or a path to an interpreter.
    pub fn new(python: &str, source_dir: PathBuf) -> Result<Self, BindingBuildError> {
        let python = which::which(python).map_err(|_| BindingBuildError::InterpreterNotFound {
            python: python.to_string(),
        })?;
        tracing::debug!("Using Python interpreter {}", python.display());
        Ok(Self { python, source_dir })
    }

    fn setup_py(&self) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.arg("setup.py").current_dir(&self.source_dir);
        cmd
    }
}

impl BindingBuilder for SetupPyBuilder {
    fn shared_link_command(&self) -> Result<Option<String>, BindingBuildError> {
        let mut cmd = Command::new(&self.python);
        cmd.arg("-c").arg(LDSHARED_QUERY);
        let output = process::run(&mut cmd)?;

        let ldshared = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!ldshared.is_empty()).then_some(ldshared))
    }

    fn build(&self, spec: &BindingBuildSpec) -> Result<Vec<PathBuf>, BindingBuildError> {
        if !self.source_dir.join("setup.py").is_file() {
            return Err(BindingBuildError::NoSetupScript {
                dir: self.source_dir.clone(),
            });
        }
        // setup.py runs from the source tree, the record is read from here
        let destination = absolute_path(&spec.destination)?;
        create_dir_all(&destination)?;

        let separator = if cfg!(windows) { ";" } else { ":" };
        let flags = &spec.flags;

        let mut build_ext = self.setup_py();
        build_ext
            .arg("build_ext")
            .arg("-I")
            .arg(join_paths(&flags.include_dirs, separator))
            .arg("-L")
            .arg(join_paths(&flags.library_dirs, separator))
            .arg("-R")
            .arg(join_paths(&flags.rpath, separator));
        if !flags.libraries.is_empty() {
            let libraries: Vec<&str> = flags.libraries.iter().map(String::as_str).collect();
            build_ext.arg("-l").arg(libraries.join(" "));
        }
        build_ext.envs(&spec.environment);
        tracing::info!("Compiling {}", spec.name);
        process::run(&mut build_ext)?;

        let record = destination.join(defaults::INSTALL_RECORD_FILE);
        let mut install = self.setup_py();
        install
            .arg("install")
            .arg("--single-version-externally-managed")
            .arg("--record")
            .arg(&record)
            .arg("--prefix")
            .arg(&destination)
            .arg("--install-lib")
            .arg(&destination)
            .envs(&spec.environment);
        tracing::info!("Installing {} to {}", spec.name, destination.display());
        process::run(&mut install)?;

        let installed = parse_install_record(&read_file(&record)?);
        tracing::debug!("{} installed {} files", spec.name, installed.len());
        Ok(installed)
    }
}

/// Paths listed in a `--record` file, one per line
pub fn parse_install_record(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build_env::CompileFlags;
    use crate::test_utils::scratch::relative_tempdir;
    use std::collections::HashMap;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_parse_install_record() {
        let record = "/d/lxml/etree.so\n\n  /d/lxml/__init__.py \n";
        assert_eq!(
            parse_install_record(record),
            vec![
                PathBuf::from("/d/lxml/etree.so"),
                PathBuf::from("/d/lxml/__init__.py"),
            ]
        );
    }

    #[test]
    fn test_missing_interpreter() {
        let result = SetupPyBuilder::new("staticlxml-no-such-python", PathBuf::from("."));
        assert!(matches!(
            result,
            Err(BindingBuildError::InterpreterNotFound { ref python })
                if python == "staticlxml-no-such-python"
        ));
    }

    /// Stand-in interpreter answering the LDSHARED query and recording setup.py calls
    #[cfg(unix)]
    fn fake_python(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = r#"#!/bin/sh
if [ "$1" = "-c" ]; then echo "gcc -pthread -shared"; exit 0; fi
shift
cmd="$1"; shift
case "$cmd" in
  build_ext)
    echo "$@" > build_ext.args
    echo "$XML_CONFIG $XSLT_CONFIG $LDSHARED" > build_ext.env
    ;;
  install)
    record=""; lib=""
    while [ $# -gt 0 ]; do
      case "$1" in
        --record) record="$2"; shift ;;
        --install-lib) lib="$2"; shift ;;
      esac
      shift
    done
    mkdir -p "$lib/lxml"
    touch "$lib/lxml/etree.so"
    echo "$lib/lxml/etree.so" > "$record"
    echo "$lib/lxml/__init__.py" >> "$record"
    ;;
esac
"#;
        let path = dir.join("python");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_shared_link_command_queries_interpreter() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path());
        let builder =
            SetupPyBuilder::new(&python.display().to_string(), temp.path().to_path_buf()).unwrap();

        assert_eq!(
            builder.shared_link_command().unwrap().as_deref(),
            Some("gcc -pthread -shared")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_build_passes_flags_and_returns_record() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path());
        let source = temp.path().join("lxml-4.9.4");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("setup.py"), b"").unwrap();

        let builder = SetupPyBuilder::new(&python.display().to_string(), source.clone()).unwrap();
        let destination = temp.path().join("parts").join("lxml");
        let spec = BindingBuildSpec {
            name: "lxml".to_string(),
            destination: destination.clone(),
            flags: CompileFlags {
                include_dirs: vec![
                    PathBuf::from("/x/include/libxml2"),
                    PathBuf::from("/y/include"),
                ],
                library_dirs: vec![PathBuf::from("/x/lib"), PathBuf::from("/y/lib")],
                rpath: vec![PathBuf::from("/x/lib"), PathBuf::from("/y/lib")],
                libraries: ["iconv".to_string()].into_iter().collect(),
            },
            environment: HashMap::from([
                ("XML_CONFIG".to_string(), "/x/bin/xml2-config".to_string()),
                ("XSLT_CONFIG".to_string(), "/y/bin/xslt-config".to_string()),
                ("LDSHARED".to_string(), "gcc -shared".to_string()),
            ]),
        };

        let installed = builder.build(&spec).unwrap();

        assert_eq!(
            installed,
            vec![
                destination.join("lxml").join("etree.so"),
                destination.join("lxml").join("__init__.py"),
            ]
        );
        let args = std::fs::read_to_string(source.join("build_ext.args")).unwrap();
        assert_eq!(
            args.trim(),
            "-I /x/include/libxml2:/y/include -L /x/lib:/y/lib -R /x/lib:/y/lib -l iconv"
        );
        let env = std::fs::read_to_string(source.join("build_ext.env")).unwrap();
        assert_eq!(env.trim(), "/x/bin/xml2-config /y/bin/xslt-config gcc -shared");
    }

    #[cfg(unix)]
    #[test]
    fn test_build_with_relative_destination() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path());
        let source = temp.path().join("lxml-4.9.4");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("setup.py"), b"").unwrap();
        let (_guard, relative) = relative_tempdir();

        let builder = SetupPyBuilder::new(&python.display().to_string(), source).unwrap();
        let spec = BindingBuildSpec {
            name: "lxml".to_string(),
            destination: relative.join("lxml"),
            flags: CompileFlags::default(),
            environment: HashMap::new(),
        };

        let installed = builder.build(&spec).unwrap();

        let expected = std::env::current_dir().unwrap().join(&relative).join("lxml");
        assert_eq!(installed[0], expected.join("lxml").join("etree.so"));
        assert!(expected.join("lxml").join("etree.so").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_setup_script() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path());
        let builder =
            SetupPyBuilder::new(&python.display().to_string(), temp.path().join("empty")).unwrap();
        let spec = BindingBuildSpec {
            name: "lxml".to_string(),
            destination: temp.path().join("out"),
            flags: CompileFlags::default(),
            environment: HashMap::new(),
        };

        assert!(matches!(
            builder.build(&spec),
            Err(BindingBuildError::NoSetupScript { .. })
        ));
    }
}
