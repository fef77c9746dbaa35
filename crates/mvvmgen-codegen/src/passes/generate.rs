//! Generate pass - render one artifact per module.
//!
//! Declarations are grouped by the module of their class. Modules are
//! processed in name order and rendered in parallel; each produces a
//! [`ModuleArtifact`] holding the artifact text, its provisional path and the
//! [`RegistrationTable`] the artifact's registrator registers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use mvvmgen_core::{ConfigError, ModuleInfo, PropertyDeclaration};
use mvvmgen_registry::{ClassRegistration, PropertyDescriptor, RegistrationTable};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::emit::provisional_path;
use crate::render::{render_module, sort_declarations};

/// Rendered output of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArtifact {
    pub module: String,
    /// `<OutputDir>/<Module>.Mvvm.gen.keep`
    pub provisional_path: PathBuf,
    pub content: String,
    /// Registrations performed by the artifact, in artifact order.
    pub table: RegistrationTable,
}

impl ModuleArtifact {
    /// Number of declarations rendered.
    pub fn declaration_count(&self) -> usize {
        self.table.len()
    }
}

/// Renders artifacts for a set of modules.
pub struct GeneratePass<'a> {
    config: &'a GeneratorConfig,
    output_dirs: FxHashMap<&'a str, &'a std::path::Path>,
}

impl<'a> GeneratePass<'a> {
    pub fn new(config: &'a GeneratorConfig, modules: &'a [ModuleInfo]) -> Self {
        let output_dirs = modules
            .iter()
            .map(|module| (module.name(), module.output_dir()))
            .collect();
        Self {
            config,
            output_dirs,
        }
    }

    /// Render every module that has at least one declaration.
    ///
    /// Fails when a declaration belongs to a module without an output
    /// directory. Artifacts are returned in module name order.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(
        &self,
        declarations: &[PropertyDeclaration],
    ) -> Result<Vec<ModuleArtifact>, ConfigError> {
        let mut groups: BTreeMap<&str, Vec<&PropertyDeclaration>> = BTreeMap::new();
        for decl in declarations {
            groups
                .entry(decl.class.module_name())
                .or_default()
                .push(decl);
        }

        let mut jobs = Vec::with_capacity(groups.len());
        for (module, decls) in groups {
            let output_dir =
                self.output_dirs
                    .get(module)
                    .ok_or_else(|| ConfigError::InvalidModule {
                        name: module.to_string(),
                        message: "declarations found but the module is not configured".into(),
                    })?;
            jobs.push((module, *output_dir, decls));
        }

        let artifacts: Vec<ModuleArtifact> = jobs
            .into_par_iter()
            .map(|(module, output_dir, mut decls)| {
                sort_declarations(&mut decls);
                let content = render_module(module, &decls, self.config);
                let artifact = ModuleArtifact {
                    module: module.to_string(),
                    provisional_path: provisional_path(output_dir, module),
                    content,
                    table: registration_table(module, &decls),
                };
                debug!(
                    module,
                    declarations = artifact.declaration_count(),
                    "rendered module"
                );
                artifact
            })
            .collect();

        Ok(artifacts)
    }
}

/// The registrations a module's artifact performs, in artifact order.
///
/// `declarations` must already be sorted.
pub fn registration_table(
    module: &str,
    declarations: &[&PropertyDeclaration],
) -> RegistrationTable {
    let mut classes: BTreeMap<&str, Option<&str>> = BTreeMap::new();
    for decl in declarations {
        classes
            .entry(decl.class.qualified_name())
            .or_insert(decl.class.base());
    }

    RegistrationTable {
        module: module.to_string(),
        classes: classes
            .into_iter()
            .map(|(name, base)| ClassRegistration {
                name: name.to_string(),
                base: base.map(str::to_string),
            })
            .collect(),
        properties: declarations
            .iter()
            .map(|decl| PropertyDescriptor::from_declaration(decl))
            .collect(),
    }
}
