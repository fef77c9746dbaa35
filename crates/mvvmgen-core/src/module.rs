//! Compilation modules and their header files.
//!
//! A [`ModuleInfo`] is the unit of generation: every module with at least one
//! property declaration gets exactly one generated artifact in its output
//! directory. Headers remember which module they belong to so a class can
//! find its module without a back-pointer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the module subdirectory whose headers are included by short path.
pub const PUBLIC_DIR: &str = "Public";

/// A header file that belongs to a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderFile {
    path: PathBuf,
    module_relative_path: String,
    module_name: String,
}

impl HeaderFile {
    /// Create a header description.
    ///
    /// `module_relative_path` is normalized to forward slashes.
    pub fn new(
        module_name: impl Into<String>,
        path: impl Into<PathBuf>,
        module_relative_path: impl AsRef<str>,
    ) -> Self {
        Self {
            path: path.into(),
            module_relative_path: module_relative_path.as_ref().replace('\\', "/"),
            module_name: module_name.into(),
        }
    }

    /// Path used to read the header.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the module root, e.g. `Public/ViewModels/PlayerVM.h`.
    pub fn module_relative_path(&self) -> &str {
        &self.module_relative_path
    }

    /// Name of the owning module.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Whether the header lives under the module's `Public` directory.
    pub fn is_public(&self) -> bool {
        self.module_relative_path
            .split('/')
            .next()
            .is_some_and(|first| first.eq_ignore_ascii_case(PUBLIC_DIR))
    }

    /// Short include path: relative to `Public` for public headers, otherwise
    /// the module-relative path.
    pub fn include_path(&self) -> &str {
        if self.is_public() {
            self.module_relative_path
                .split_once('/')
                .map_or(self.module_relative_path.as_str(), |(_, rest)| rest)
        } else {
            &self.module_relative_path
        }
    }

    /// The include path emitted into generated code.
    ///
    /// Public headers are reachable by their short path from any dependent
    /// module; everything else needs the module name as a prefix.
    pub fn normalized_include_path(&self) -> String {
        if self.is_public() {
            self.include_path().to_string()
        } else {
            format!("{}/{}", self.module_name, self.module_relative_path)
        }
    }
}

/// A compilation module: a named group of headers with one output directory.
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    name: String,
    root_dir: PathBuf,
    output_dir: PathBuf,
    headers: Vec<Arc<HeaderFile>>,
}

impl ModuleInfo {
    /// Create an empty module.
    pub fn new(
        name: impl Into<String>,
        root_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            root_dir: root_dir.into(),
            output_dir: output_dir.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header by its module-relative path and return it.
    pub fn add_header(&mut self, module_relative_path: impl AsRef<str>) -> Arc<HeaderFile> {
        let relative = module_relative_path.as_ref();
        let header = Arc::new(HeaderFile::new(
            self.name.clone(),
            self.root_dir.join(relative),
            relative,
        ));
        self.headers.push(Arc::clone(&header));
        header
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module root directory.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Directory that receives generated artifacts.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Headers scanned for directives.
    pub fn headers(&self) -> &[Arc<HeaderFile>] {
        &self.headers
    }
}
