use std::fmt;
use std::sync::Arc;

use crate::{HeaderFile, TypeHash};

/// A class or struct that declares view-model properties.
///
/// Created by the header scanner when it enters a class body, shared by every
/// declaration inside that body.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mvvmgen_core::{ClassInfo, HeaderFile};
///
/// let header = Arc::new(HeaderFile::new("Game", "PlayerVM.h", "Public/PlayerVM.h"));
/// let class = ClassInfo::new("UPlayerVM", vec!["Game".into(), "UI".into()], header, 12);
/// assert_eq!(class.qualified_name(), "Game::UI::UPlayerVM");
/// assert_eq!(class.module_name(), "Game");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    name: String,
    namespace: Vec<String>,
    qualified_name: String,
    header: Arc<HeaderFile>,
    line: u32,
    base: Option<String>,
}

impl ClassInfo {
    /// Create a class declared at `line` of `header`.
    pub fn new(
        name: impl Into<String>,
        namespace: Vec<String>,
        header: Arc<HeaderFile>,
        line: u32,
    ) -> Self {
        let name = name.into();
        let qualified_name = if namespace.is_empty() {
            name.clone()
        } else {
            format!("{}::{}", namespace.join("::"), name)
        };
        Self {
            name,
            namespace,
            qualified_name,
            header,
            line,
            base: None,
        }
    }

    /// Set the first base class, as written in the class head.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Simple (unqualified) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enclosing namespace path, outermost first.
    pub fn namespace_path(&self) -> &[String] {
        &self.namespace
    }

    /// `A::B::Name`, or just the name in the global namespace.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Identity used by the runtime registry.
    pub fn type_hash(&self) -> TypeHash {
        TypeHash::from_name(&self.qualified_name)
    }

    /// Header the class is declared in.
    pub fn header(&self) -> &Arc<HeaderFile> {
        &self.header
    }

    /// Module the class belongs to.
    pub fn module_name(&self) -> &str {
        self.header.module_name()
    }

    /// Line of the class head.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// First base class, e.g. `UBaseViewModel` or `Game::UBase`.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }
}

impl fmt::Display for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name)
    }
}
