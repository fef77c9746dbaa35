//! View-model property declarations.
//!
//! A [`PropertyDeclaration`] is the result of parsing one `VM_PROP_*`
//! directive. Its accessor and storage policy comes from the directive
//! keyword ([`DirectiveKind`]) and is stored as [`PropertyFlags`].

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::{ClassInfo, Span, TypeHash};

/// Common prefix of all directive keywords.
pub const DIRECTIVE_PREFIX: &str = "VM_PROP_";

bitflags! {
    /// Accessor and storage policy of a property.
    ///
    /// `AUTO_SETTER` always implies `HAS_SETTER`.
    ///
    /// ```
    /// use mvvmgen_core::{DirectiveKind, PropertyFlags};
    ///
    /// let flags = DirectiveKind::MgAsNf.flags();
    /// assert!(flags.contains(PropertyFlags::AUTO_SETTER | PropertyFlags::HAS_SETTER));
    /// assert!(!flags.intersects(PropertyFlags::AUTO_GETTER | PropertyFlags::AUTO_FIELD));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u8 {
        /// The getter body is synthesized.
        const AUTO_GETTER = 1 << 0;
        /// The setter body is synthesized.
        const AUTO_SETTER = 1 << 1;
        /// A storage field named `<Property>Field` exists.
        const AUTO_FIELD = 1 << 2;
        /// The property is writable.
        const HAS_SETTER = 1 << 3;
    }
}

/// The nine directive keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// `VM_PROP_AG_AS`
    AgAs,
    /// `VM_PROP_MG_AS`
    MgAs,
    /// `VM_PROP_AG_MS`
    AgMs,
    /// `VM_PROP_MG_MS`
    MgMs,
    /// `VM_PROP_AG_AS_NF`
    AgAsNf,
    /// `VM_PROP_MG_AS_NF`
    MgAsNf,
    /// `VM_PROP_AG_MS_NF`
    AgMsNf,
    /// `VM_PROP_MG_MS_NF`
    MgMsNf,
    /// `VM_PROP_MG_NF` (read-only)
    MgNf,
}

impl DirectiveKind {
    /// Every directive kind, in keyword table order.
    pub const ALL: [DirectiveKind; 9] = [
        DirectiveKind::AgAs,
        DirectiveKind::MgAs,
        DirectiveKind::AgMs,
        DirectiveKind::MgMs,
        DirectiveKind::AgAsNf,
        DirectiveKind::MgAsNf,
        DirectiveKind::AgMsNf,
        DirectiveKind::MgMsNf,
        DirectiveKind::MgNf,
    ];

    /// Look up a directive by its full keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let suffix = word.strip_prefix(DIRECTIVE_PREFIX)?;
        let kind = match suffix {
            "AG_AS" => DirectiveKind::AgAs,
            "MG_AS" => DirectiveKind::MgAs,
            "AG_MS" => DirectiveKind::AgMs,
            "MG_MS" => DirectiveKind::MgMs,
            "AG_AS_NF" => DirectiveKind::AgAsNf,
            "MG_AS_NF" => DirectiveKind::MgAsNf,
            "AG_MS_NF" => DirectiveKind::AgMsNf,
            "MG_MS_NF" => DirectiveKind::MgMsNf,
            "MG_NF" => DirectiveKind::MgNf,
            _ => return None,
        };
        Some(kind)
    }

    /// The full keyword, e.g. `VM_PROP_AG_AS`.
    pub fn keyword(self) -> &'static str {
        match self {
            DirectiveKind::AgAs => "VM_PROP_AG_AS",
            DirectiveKind::MgAs => "VM_PROP_MG_AS",
            DirectiveKind::AgMs => "VM_PROP_AG_MS",
            DirectiveKind::MgMs => "VM_PROP_MG_MS",
            DirectiveKind::AgAsNf => "VM_PROP_AG_AS_NF",
            DirectiveKind::MgAsNf => "VM_PROP_MG_AS_NF",
            DirectiveKind::AgMsNf => "VM_PROP_AG_MS_NF",
            DirectiveKind::MgMsNf => "VM_PROP_MG_MS_NF",
            DirectiveKind::MgNf => "VM_PROP_MG_NF",
        }
    }

    /// Policy flags encoded by the keyword.
    pub fn flags(self) -> PropertyFlags {
        let suffix = &self.keyword()[DIRECTIVE_PREFIX.len()..];
        let mut flags = PropertyFlags::empty();
        if suffix.starts_with("AG") {
            flags |= PropertyFlags::AUTO_GETTER;
        }
        if suffix.contains("_AS") {
            flags |= PropertyFlags::AUTO_SETTER | PropertyFlags::HAS_SETTER;
        }
        if suffix.contains("_MS") {
            flags |= PropertyFlags::HAS_SETTER;
        }
        if !suffix.ends_with("_NF") {
            flags |= PropertyFlags::AUTO_FIELD;
        }
        flags
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Accessor visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessSpecifier {
    Public,
    Protected,
    Private,
}

impl AccessSpecifier {
    /// Parse `public`, `protected` or `private`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "public" => Some(AccessSpecifier::Public),
            "protected" => Some(AccessSpecifier::Protected),
            "private" => Some(AccessSpecifier::Private),
            _ => None,
        }
    }

    /// The specifier as written in source.
    pub fn as_str(self) -> &'static str {
        match self {
            AccessSpecifier::Public => "public",
            AccessSpecifier::Protected => "protected",
            AccessSpecifier::Private => "private",
        }
    }
}

impl fmt::Display for AccessSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical category of a captured type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTokenKind {
    Identifier,
    Literal,
    Punct,
}

/// One verbatim token of a property type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeToken {
    pub text: String,
    pub kind: TypeTokenKind,
    pub span: Span,
}

impl TypeToken {
    pub fn new(text: impl Into<String>, kind: TypeTokenKind, span: Span) -> Self {
        Self {
            text: text.into(),
            kind,
            span,
        }
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TypeTokenKind::Identifier
    }
}

/// Outcome of the resolve phase for one declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeResolution {
    /// The resolve phase has not run yet.
    #[default]
    Pending,
    /// The type cannot name an owning reference; no resolution needed.
    Skipped,
    /// The resolver accepted the type.
    Resolved,
}

/// One parsed `VM_PROP_*` directive.
#[derive(Debug, Clone)]
pub struct PropertyDeclaration {
    /// The enclosing class.
    pub class: Arc<ClassInfo>,
    /// Directive keyword that produced this declaration.
    pub kind: DirectiveKind,
    /// Property name as written.
    pub name: String,
    /// Type tokens, verbatim, without a leading `const`.
    pub type_tokens: Vec<TypeToken>,
    /// Accessor and storage policy.
    pub flags: PropertyFlags,
    pub getter_access: AccessSpecifier,
    pub setter_access: AccessSpecifier,
    /// Line of the directive keyword.
    pub line: u32,
    /// Span of the directive keyword.
    pub span: Span,
    /// Documentation comment preceding the directive.
    pub tooltip: Option<String>,
    pub resolution: TypeResolution,
}

impl PropertyDeclaration {
    /// Create a declaration with default visibilities and no type tokens.
    pub fn new(
        class: Arc<ClassInfo>,
        kind: DirectiveKind,
        name: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            class,
            kind,
            name: name.into(),
            type_tokens: Vec::new(),
            flags: kind.flags(),
            getter_access: AccessSpecifier::Public,
            setter_access: AccessSpecifier::Private,
            line: span.line,
            span,
            tooltip: None,
            resolution: TypeResolution::Pending,
        }
    }

    pub fn auto_getter(&self) -> bool {
        self.flags.contains(PropertyFlags::AUTO_GETTER)
    }

    pub fn auto_setter(&self) -> bool {
        self.flags.contains(PropertyFlags::AUTO_SETTER)
    }

    pub fn auto_field(&self) -> bool {
        self.flags.contains(PropertyFlags::AUTO_FIELD)
    }

    pub fn has_setter(&self) -> bool {
        self.flags.contains(PropertyFlags::HAS_SETTER)
    }

    /// Runtime identity of this property.
    pub fn type_hash(&self) -> TypeHash {
        TypeHash::from_property(self.class.type_hash(), &self.name)
    }

    /// The type as a single string, for diagnostics.
    ///
    /// Word-like tokens are separated by a space and commas are followed by
    /// one; everything else is joined directly (`TMap<FName, UObject*>`).
    pub fn type_text(&self) -> String {
        let mut text = String::new();
        let mut prev: Option<&TypeToken> = None;
        for token in &self.type_tokens {
            if let Some(prev) = prev {
                let words = prev.kind != TypeTokenKind::Punct && token.kind != TypeTokenKind::Punct;
                if words || prev.text == "," {
                    text.push(' ');
                }
            }
            text.push_str(&token.text);
            prev = Some(token);
        }
        text
    }
}
