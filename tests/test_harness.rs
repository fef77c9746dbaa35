// tests/test_harness.rs
//! Test harness for generator integration tests
//!
//! Loads header fixtures from `tests/test_headers` and builds scratch
//! projects (manifest, module sources, output directories) in a temporary
//! directory.

#![allow(dead_code)]

use mvvmgen::core::{HeaderFile, MvvmError};
use mvvmgen::parser::{HeaderParser, ParsedHeader};
use mvvmgen::{Manifest, Session};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Directory holding the header fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test_headers")
}

/// Read a fixture by file name.
pub fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

/// Parse a fixture as if it lived at `relative` inside `module`.
pub fn parse_fixture(module: &str, relative: &str, name: &str) -> Result<ParsedHeader, MvvmError> {
    let header = Arc::new(HeaderFile::new(module, fixtures_dir().join(name), relative));
    HeaderParser::new(header).parse(&fixture(name))
}

/// Parse a fixture that must be valid.
pub fn parse_fixture_ok(module: &str, relative: &str, name: &str) -> ParsedHeader {
    match parse_fixture(module, relative, name) {
        Ok(parsed) => parsed,
        Err(MvvmError::Parse { error, .. }) => {
            panic!("{}", error.display_with_source(&fixture(name)))
        }
        Err(err) => panic!("failed to parse {name}: {err}"),
    }
}

/// A scratch project: `Source/<Module>/...` inputs, `Intermediate/<Module>`
/// outputs and an `mvvmgen.toml` at the root.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Copy a fixture to `Source/<module>/<relative>`.
    pub fn install_fixture(&self, module: &str, relative: &str, name: &str) {
        self.write_source(module, relative, &fixture(name));
    }

    /// Write header text to `Source/<module>/<relative>`.
    pub fn write_source(&self, module: &str, relative: &str, text: &str) {
        let path = self.root().join("Source").join(module).join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    /// Write a manifest with one discovered-headers entry per module,
    /// followed by `extra` TOML.
    pub fn write_manifest(&self, modules: &[&str], extra: &str) {
        let mut text = String::from(extra);
        for module in modules {
            text.push_str(&format!(
                "\n[[module]]\nname = \"{module}\"\nroot = \"Source/{module}\"\noutput_dir = \"Intermediate/{module}\"\n"
            ));
        }
        fs::write(self.manifest_path(), text).unwrap();
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("mvvmgen.toml")
    }

    /// Session for the project's manifest.
    pub fn session(&self) -> Session {
        let manifest = Manifest::load(&self.manifest_path()).expect("load manifest");
        Session::from_manifest(&manifest, self.root()).expect("configure session")
    }

    pub fn output_dir(&self, module: &str) -> PathBuf {
        self.root().join("Intermediate").join(module)
    }

    pub fn provisional(&self, module: &str) -> PathBuf {
        self.output_dir(module).join(format!("{module}.Mvvm.gen.keep"))
    }

    pub fn artifact(&self, module: &str) -> PathBuf {
        self.output_dir(module).join(format!("{module}.Mvvm.gen.cpp"))
    }

    pub fn read_artifact(&self, module: &str) -> String {
        fs::read_to_string(self.artifact(module)).unwrap()
    }
}

/// The two-module project used by most pipeline tests:
/// `Game` (player state in `Public`, HUD in `Private`) and `Inventory`.
pub fn game_project(extra_manifest: &str) -> TestProject {
    let project = TestProject::new();
    project.install_fixture("Game", "Public/PlayerStateViewModel.h", "player_state_view_model.h");
    project.install_fixture("Game", "Private/HudViewModel.h", "hud_view_model.h");
    project.install_fixture("Inventory", "Public/ItemViewModel.h", "item_view_model.h");
    project.write_manifest(&["Game", "Inventory"], extra_manifest);
    project
}
