//! Resolve pass - validate owning-reference property types.
//!
//! Runs after the parse barrier. Each declaration whose type may reference an
//! engine object (see [`may_reference_object`]) goes through a
//! [`TypeResolver`]; all other declarations are marked
//! [`TypeResolution::Skipped`]. Rejections are collected for the whole pass
//! and reported together.

use std::sync::Arc;

use mvvmgen_core::{
    ClassInfo, PropertyDeclaration, ResolveError, TypeResolution, TypeToken, TypeTokenKind,
};
use mvvmgen_parser::classify::is_owning_reference_name;
use mvvmgen_parser::may_reference_object;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

/// On-demand validation of a property type.
pub trait TypeResolver: Sync {
    /// Accept or reject the type of `decl`.
    fn resolve(&self, decl: &PropertyDeclaration) -> Result<(), ResolveError>;
}

/// Engine object types that are always known.
pub const ENGINE_TYPES: &[&str] = &[
    "UObject",
    "UClass",
    "UStruct",
    "UEnum",
    "UInterface",
    "UWorld",
    "UGameInstance",
    "ULocalPlayer",
    "UTexture",
    "UTexture2D",
    "UMaterialInterface",
    "USoundBase",
    "UDataAsset",
    "UPrimaryDataAsset",
    "UUserWidget",
    "UWidget",
    "UActorComponent",
    "USceneComponent",
    "AActor",
    "APawn",
    "ACharacter",
    "AController",
    "APlayerController",
    "AGameModeBase",
    "AGameStateBase",
    "APlayerState",
    "AHUD",
];

/// Resolver backed by a set of known type names.
///
/// A type is accepted when every identifier with an owning-reference prefix
/// names a known type: an engine type, a class discovered in the pass, or a
/// type added with [`add_known_type`](Self::add_known_type).
#[derive(Debug, Clone)]
pub struct KnownTypeResolver {
    known: FxHashSet<String>,
}

impl Default for KnownTypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl KnownTypeResolver {
    /// Create a resolver knowing only [`ENGINE_TYPES`].
    pub fn new() -> Self {
        Self {
            known: ENGINE_TYPES.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Add one known type name.
    pub fn add_known_type(&mut self, name: impl Into<String>) {
        self.known.insert(name.into());
    }

    /// Add discovered classes, by simple and by qualified name.
    pub fn add_classes<'a>(&mut self, classes: impl IntoIterator<Item = &'a Arc<ClassInfo>>) {
        for class in classes {
            self.known.insert(class.name().to_string());
            self.known.insert(class.qualified_name().to_string());
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known.contains(name)
    }
}

impl Extend<String> for KnownTypeResolver {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.known.extend(iter);
    }
}

impl TypeResolver for KnownTypeResolver {
    fn resolve(&self, decl: &PropertyDeclaration) -> Result<(), ResolveError> {
        let unknown = qualified_names(&decl.type_tokens)
            .into_iter()
            .filter(|name| is_owning_reference_name(name.last))
            .find(|name| !self.is_known(&name.path) && !self.is_known(name.last));

        match unknown {
            Some(name) => Err(ResolveError::UnknownType {
                file: decl.class.header().path().to_path_buf(),
                class: decl.class.qualified_name().to_string(),
                property: decl.name.clone(),
                type_name: name.path,
                line: decl.line,
            }),
            None => Ok(()),
        }
    }
}

/// A name written in a property type, e.g. `UI::UPanel`.
#[derive(Debug, PartialEq, Eq)]
struct QualifiedName<'t> {
    /// Every segment joined with `::`, without a leading `::`.
    path: String,
    /// The final segment; the one that names the type.
    last: &'t str,
}

/// Merge each `Ident (:: Ident)*` run into one name.
///
/// Segments followed by `::` are namespaces or enclosing classes and never
/// stand on their own, so `UI::UPanel*` yields only `UI::UPanel`.
fn qualified_names(tokens: &[TypeToken]) -> Vec<QualifiedName<'_>> {
    let is_scope = |token: &TypeToken| token.kind == TypeTokenKind::Punct && token.text == "::";

    let mut names = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if !tokens[i].is_identifier() {
            i += 1;
            continue;
        }

        let mut segments = vec![tokens[i].text.as_str()];
        i += 1;
        while i + 1 < tokens.len() && is_scope(&tokens[i]) && tokens[i + 1].is_identifier() {
            segments.push(tokens[i + 1].text.as_str());
            i += 2;
        }

        let last = segments[segments.len() - 1];
        names.push(QualifiedName {
            path: segments.join("::"),
            last,
        });
    }
    names
}

/// Output of the resolve pass.
#[derive(Debug, Default)]
pub struct ResolveOutput {
    /// Declarations accepted by the resolver.
    pub resolved: usize,
    /// Declarations that never needed resolution.
    pub skipped: usize,
    /// Rejections, in declaration order.
    pub errors: Vec<ResolveError>,
}

impl ResolveOutput {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Classify every declaration and resolve those that need it.
pub struct ResolvePass<'a, R: TypeResolver + ?Sized> {
    resolver: &'a R,
}

impl<'a, R: TypeResolver + ?Sized> ResolvePass<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Run over all declarations, updating their `resolution`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&self, declarations: &mut [PropertyDeclaration]) -> ResolveOutput {
        let errors: Vec<ResolveError> = declarations
            .par_iter_mut()
            .filter_map(|decl| {
                if !may_reference_object(&decl.type_tokens) {
                    decl.resolution = TypeResolution::Skipped;
                    return None;
                }
                trace!(
                    class = %decl.class,
                    property = %decl.name,
                    ty = %decl.type_text(),
                    "resolving"
                );
                match self.resolver.resolve(decl) {
                    Ok(()) => {
                        decl.resolution = TypeResolution::Resolved;
                        None
                    }
                    Err(err) => Some(err),
                }
            })
            .collect();

        let mut output = ResolveOutput {
            errors,
            ..ResolveOutput::default()
        };
        for decl in declarations.iter() {
            match decl.resolution {
                TypeResolution::Resolved => output.resolved += 1,
                TypeResolution::Skipped => output.skipped += 1,
                TypeResolution::Pending => {}
            }
        }

        debug!(
            resolved = output.resolved,
            skipped = output.skipped,
            errors = output.errors.len(),
            "resolve pass finished"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvvmgen_core::{DirectiveKind, HeaderFile, Span};

    fn class(name: &str) -> Arc<ClassInfo> {
        let header = Arc::new(HeaderFile::new("Game", "Hud.h", "Public/Hud.h"));
        Arc::new(ClassInfo::new(name, Vec::new(), header, 1))
    }

    fn decl(name: &str, ty: &[(&str, TypeTokenKind)]) -> PropertyDeclaration {
        let mut decl =
            PropertyDeclaration::new(class("UHud"), DirectiveKind::AgAs, name, Span::point(4, 5));
        decl.type_tokens = ty
            .iter()
            .map(|(text, kind)| TypeToken::new(*text, *kind, Span::point(4, 19)))
            .collect();
        decl
    }

    use mvvmgen_core::TypeTokenKind::{Identifier as Id, Punct};

    #[test]
    fn value_types_are_skipped() {
        let resolver = KnownTypeResolver::new();
        let mut decls = vec![decl("Score", &[("int32", Id)])];
        let output = ResolvePass::new(&resolver).run(&mut decls);
        assert!(output.is_success());
        assert_eq!(output.skipped, 1);
        assert_eq!(decls[0].resolution, TypeResolution::Skipped);
    }

    #[test]
    fn engine_object_resolves() {
        let resolver = KnownTypeResolver::new();
        let mut decls = vec![decl("Owner", &[("UObject", Id), ("*", Punct)])];
        let output = ResolvePass::new(&resolver).run(&mut decls);
        assert_eq!(output.resolved, 1);
        assert_eq!(decls[0].resolution, TypeResolution::Resolved);
    }

    #[test]
    fn unknown_types_are_collected() {
        let mut resolver = KnownTypeResolver::new();
        resolver.add_classes([&class("UInventory")]);
        let mut decls = vec![
            decl("Items", &[("UInventory", Id), ("*", Punct)]),
            decl("Target", &[("UMissing", Id), ("*", Punct)]),
            decl(
                "Enemies",
                &[("TArray", Id), ("<", Punct), ("AEnemy", Id), ("*", Punct), (">", Punct)],
            ),
        ];
        let output = ResolvePass::new(&resolver).run(&mut decls);
        assert_eq!(output.resolved, 1);
        assert_eq!(output.errors.len(), 2);
        assert_eq!(
            output.errors[0],
            ResolveError::UnknownType {
                file: "Hud.h".into(),
                class: "UHud".into(),
                property: "Target".into(),
                type_name: "UMissing".into(),
                line: 4,
            }
        );
        assert_eq!(decls[1].resolution, TypeResolution::Pending);
    }

    #[test]
    fn namespaced_class_resolves_by_qualified_name() {
        let header = Arc::new(HeaderFile::new("Game", "Panel.h", "Public/Panel.h"));
        let panel = Arc::new(ClassInfo::new("UPanel", vec!["UI".into()], header, 2));
        let mut resolver = KnownTypeResolver::new();
        resolver.add_classes([&panel]);

        let mut decls = vec![
            decl("Panel", &[("UI", Id), ("::", Punct), ("UPanel", Id), ("*", Punct)]),
            decl(
                "Root",
                &[("::", Punct), ("UI", Id), ("::", Punct), ("UPanel", Id), ("*", Punct)],
            ),
            decl(
                "Origin",
                &[("UE", Id), ("::", Punct), ("Math", Id), ("::", Punct), ("FVector", Id)],
            ),
        ];
        let output = ResolvePass::new(&resolver).run(&mut decls);
        assert!(output.is_success(), "{:?}", output.errors);
        assert_eq!(output.resolved, 3);
    }

    #[test]
    fn unknown_qualified_type_is_reported_whole() {
        let resolver = KnownTypeResolver::new();
        let mut decls = vec![decl(
            "Panel",
            &[("UI", Id), ("::", Punct), ("UMissingPanel", Id), ("*", Punct)],
        )];
        let output = ResolvePass::new(&resolver).run(&mut decls);
        assert_eq!(output.errors.len(), 1);
        let ResolveError::UnknownType { type_name, .. } = &output.errors[0] else {
            panic!("expected an unknown type error");
        };
        assert_eq!(type_name, "UI::UMissingPanel");
    }

    #[test]
    fn qualified_names_merge_scope_runs() {
        let tokens: Vec<_> = [
            ("TMap", Id),
            ("<", Punct),
            ("Game", Id),
            ("::", Punct),
            ("FKey", Id),
            (",", Punct),
            ("UObject", Id),
            ("*", Punct),
            (">", Punct),
        ]
        .iter()
        .map(|(text, kind)| TypeToken::new(*text, *kind, Span::point(1, 1)))
        .collect();
        let names: Vec<_> = qualified_names(&tokens)
            .into_iter()
            .map(|name| (name.path, name.last))
            .collect();
        assert_eq!(
            names,
            vec![
                ("TMap".to_string(), "TMap"),
                ("Game::FKey".to_string(), "FKey"),
                ("UObject".to_string(), "UObject"),
            ]
        );
    }

    #[test]
    fn manifest_types_extend_resolver() {
        let mut resolver = KnownTypeResolver::new();
        assert!(!resolver.is_known("UMyAsset"));
        resolver.extend(["UMyAsset".to_string()]);
        resolver.add_known_type("AMyActor");
        assert!(resolver.is_known("UMyAsset"));
        assert!(resolver.is_known("AMyActor"));
    }

    #[test]
    fn custom_resolver_via_trait_object() {
        struct RejectAll;
        impl TypeResolver for RejectAll {
            fn resolve(&self, decl: &PropertyDeclaration) -> Result<(), ResolveError> {
                Err(ResolveError::Rejected {
                    file: decl.class.header().path().to_path_buf(),
                    class: decl.class.qualified_name().into(),
                    property: decl.name.clone(),
                    message: "stale type".into(),
                    line: decl.line,
                })
            }
        }

        let resolver: &dyn TypeResolver = &RejectAll;
        let mut decls = vec![
            decl("Owner", &[("AActor", Id), ("*", Punct)]),
            decl("N", &[("int32", Id)]),
        ];
        let output = ResolvePass::new(resolver).run(&mut decls);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.skipped, 1);
    }
}
