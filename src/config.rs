//! The `mvvmgen.toml` manifest.
//!
//! ```toml
//! [generator]
//! visibility_scope = "FViewModelPropertyBase::EAccessorVisibility::"
//!
//! [resolver]
//! known_types = ["UTexture2D"]
//!
//! [[module]]
//! name = "MyGame"
//! root = "Source/MyGame"
//! output_dir = "Intermediate/MyGame"
//! headers = ["Public/PlayerVM.h"]
//! ```
//!
//! Module paths are relative to the manifest's directory. A module without a
//! `headers` list scans every `.h` and `.hpp` file below its root.

use std::io;
use std::path::{Path, PathBuf};

use mvvmgen_codegen::GeneratorConfig;
use mvvmgen_core::{ConfigError, ModuleInfo};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

/// File name looked up when no manifest path is given.
pub const DEFAULT_MANIFEST: &str = "mvvmgen.toml";

/// Header extensions picked up by discovery.
pub const HEADER_EXTENSIONS: [&str; 2] = ["h", "hpp"];

/// Parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleManifest>,
}

/// `[resolver]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Extra owning-reference types accepted by the resolver.
    #[serde(default)]
    pub known_types: Vec<String>,
}

/// One `[[module]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    pub name: String,
    pub root: PathBuf,
    pub output_dir: PathBuf,
    /// Module-relative header paths; discovered when absent.
    pub headers: Option<Vec<String>>,
}

impl Manifest {
    /// Parse manifest text. `path` is only used in diagnostics.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::InvalidManifest {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Build the module list, resolving paths against `base_dir`.
    pub fn modules(&self, base_dir: &Path) -> Result<Vec<ModuleInfo>, ConfigError> {
        let mut seen = FxHashSet::default();
        let mut modules = Vec::with_capacity(self.modules.len());

        for entry in &self.modules {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::InvalidModule {
                    name: entry.name.clone(),
                    message: "module name is empty".into(),
                });
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateModule(entry.name.clone()));
            }
            modules.push(entry.to_module(base_dir)?);
        }
        Ok(modules)
    }
}

impl ModuleManifest {
    fn to_module(&self, base_dir: &Path) -> Result<ModuleInfo, ConfigError> {
        let root = base_dir.join(&self.root);
        let mut module = ModuleInfo::new(&self.name, &root, base_dir.join(&self.output_dir));

        let headers = match &self.headers {
            Some(headers) => headers.clone(),
            None => discover_headers(&root)?,
        };
        for header in headers {
            module.add_header(header);
        }
        debug!(module = %self.name, headers = module.headers().len(), "configured module");
        Ok(module)
    }
}

/// Module-relative paths of every header below `root`, sorted, with forward
/// slashes.
pub fn discover_headers(root: &Path) -> Result<Vec<String>, ConfigError> {
    let mut headers = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| ConfigError::Io {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: io::Error::from(e),
        })?;
        if !entry.file_type().is_file() || !is_header(entry.path()) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            let relative: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect();
            headers.push(relative.join("/"));
        }
    }
    headers.sort();
    Ok(headers)
}

fn is_header(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HEADER_EXTENSIONS.iter().any(|h| ext.eq_ignore_ascii_case(h)))
}
