//! Generation session: the full pipeline over a set of modules.
//!
//! ```text
//! headers ──parallel parse──► CollectionStore ──seal──► resolve ──► generate
//!                                                                      │
//!                                       phase 1 (.keep) ◄──────────────┘
//!                                              │
//!                                       phase 2 (.cpp)
//! ```
//!
//! A syntax error in any header fails the run before anything is resolved.
//! Resolution errors are reported together. Emission errors abort at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mvvmgen_codegen::{
    CollectionStore, GeneratePass, GeneratorConfig, KnownTypeResolver, ModuleArtifact,
    ResolvePass, SealedDeclarations, WriteStatus, commit_provisional, final_path,
};
use mvvmgen_core::{ConfigError, HeaderFile, ModuleInfo, MvvmError, Result};
use mvvmgen_parser::HeaderParser;
use mvvmgen_registry::RegistrationTable;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::config::Manifest;

/// What [`Session::run`] does after generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Write provisional and final artifacts.
    #[default]
    Emit,
    /// Generate in memory only; nothing is written.
    DryRun,
}

/// Outcome of one module.
#[derive(Debug, Clone)]
pub struct ModuleReport {
    pub module: String,
    pub provisional_path: PathBuf,
    pub final_path: PathBuf,
    pub declarations: usize,
    /// Rendered artifact text.
    pub content: String,
    /// `None` in dry runs.
    pub provisional_status: Option<WriteStatus>,
    /// `None` in dry runs.
    pub final_status: Option<WriteStatus>,
    pub table: RegistrationTable,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    /// Headers parsed.
    pub headers: usize,
    /// One entry per module with declarations, in module name order.
    pub modules: Vec<ModuleReport>,
}

impl RunReport {
    pub fn declaration_count(&self) -> usize {
        self.modules.iter().map(|m| m.declarations).sum()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleReport> {
        self.modules.iter().find(|m| m.module == name)
    }

    /// Registration tables of every module, ready for a registry.
    pub fn tables(&self) -> impl Iterator<Item = &RegistrationTable> {
        self.modules.iter().map(|m| &m.table)
    }
}

/// Modules plus the configuration to generate them with.
#[derive(Debug, Default)]
pub struct Session {
    modules: Vec<ModuleInfo>,
    generator: GeneratorConfig,
    known_types: Vec<String>,
    sources: FxHashMap<PathBuf, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for a loaded manifest whose paths are relative to `base_dir`.
    pub fn from_manifest(manifest: &Manifest, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut session = Self::new().with_generator_config(manifest.generator.clone());
        for module in manifest.modules(base_dir)? {
            session.add_module(module)?;
        }
        for name in &manifest.resolver.known_types {
            session.add_known_type(name.clone());
        }
        Ok(session)
    }

    pub fn with_generator_config(mut self, config: GeneratorConfig) -> Self {
        self.generator = config;
        self
    }

    pub fn generator_config(&self) -> &GeneratorConfig {
        &self.generator
    }

    /// Add a module; module names are unique.
    pub fn add_module(&mut self, module: ModuleInfo) -> Result<(), ConfigError> {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            return Err(ConfigError::DuplicateModule(module.name().to_string()));
        }
        self.modules.push(module);
        Ok(())
    }

    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    /// Accept an extra owning-reference type during resolution.
    pub fn add_known_type(&mut self, name: impl Into<String>) {
        self.known_types.push(name.into());
    }

    /// Use `text` instead of reading the header at `path` from disk.
    pub fn add_source(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.sources.insert(path.into(), text.into());
    }

    /// Source text of a header: the in-memory copy if any, else the file.
    pub fn read_source(&self, path: &Path) -> Result<String> {
        if let Some(text) = self.sources.get(path) {
            return Ok(text.clone());
        }
        std::fs::read_to_string(path).map_err(|source| MvvmError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse every header in parallel and seal the result.
    ///
    /// When several headers fail, the error of the first failing header in
    /// module order is returned.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(&self) -> Result<SealedDeclarations> {
        let headers: Vec<&Arc<HeaderFile>> =
            self.modules.iter().flat_map(|m| m.headers()).collect();
        let store = CollectionStore::new();

        let results: Vec<Result<()>> = headers
            .par_iter()
            .map(|header| {
                let source = self.read_source(header.path())?;
                let parsed = HeaderParser::new(Arc::clone(header)).parse(&source)?;
                store.extend(parsed.classes, parsed.declarations);
                Ok(())
            })
            .collect();
        results.into_iter().collect::<Result<Vec<()>>>()?;

        let sealed = store.seal();
        debug!(headers = headers.len(), declarations = sealed.len(), "parse phase finished");
        Ok(sealed)
    }

    /// Run the whole pipeline.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&self, mode: RunMode) -> Result<RunReport> {
        let headers: usize = self.modules.iter().map(|m| m.headers().len()).sum();
        let mut sealed = self.parse()?;

        let mut resolver = KnownTypeResolver::new();
        resolver.add_classes(sealed.classes());
        resolver.extend(self.known_types.iter().cloned());
        let resolved = ResolvePass::new(&resolver).run(sealed.declarations_mut());
        if !resolved.is_success() {
            return Err(MvvmError::Resolve(resolved.errors));
        }

        let artifacts =
            GeneratePass::new(&self.generator, &self.modules).run(sealed.declarations())?;

        let modules = match mode {
            RunMode::DryRun => artifacts
                .into_iter()
                .map(|artifact| report(artifact, None, None))
                .collect::<Result<Vec<_>>>()?,
            RunMode::Emit => {
                let batch = commit_provisional(&artifacts)?;
                let provisional: Vec<_> = batch.commits().iter().map(|c| c.status).collect();
                let finals = batch.promote()?;
                artifacts
                    .into_iter()
                    .zip(provisional)
                    .zip(finals)
                    .map(|((artifact, provisional), fin)| {
                        report(artifact, Some(provisional), Some(fin.status))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        };

        let report = RunReport {
            mode,
            headers,
            modules,
        };
        info!(
            ?mode,
            headers = report.headers,
            modules = report.modules.len(),
            declarations = report.declaration_count(),
            "generation finished"
        );
        Ok(report)
    }
}

fn report(
    artifact: ModuleArtifact,
    provisional_status: Option<WriteStatus>,
    final_status: Option<WriteStatus>,
) -> Result<ModuleReport> {
    Ok(ModuleReport {
        final_path: final_path(&artifact.provisional_path)?,
        declarations: artifact.declaration_count(),
        module: artifact.module,
        provisional_path: artifact.provisional_path,
        content: artifact.content,
        provisional_status,
        final_status,
        table: artifact.table,
    })
}
