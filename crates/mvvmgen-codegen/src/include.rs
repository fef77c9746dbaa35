//! Include list of a generated artifact.

use std::collections::BTreeSet;

use mvvmgen_core::PropertyDeclaration;

/// Distinct include paths of the headers declaring `declarations`, sorted.
///
/// Public headers are included by their path below `Public`; all other
/// headers by `<Module>/<module-relative path>`.
pub fn sorted_includes<'a>(
    declarations: impl IntoIterator<Item = &'a PropertyDeclaration>,
) -> Vec<String> {
    declarations
        .into_iter()
        .map(|decl| decl.class.header().normalized_include_path())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvvmgen_core::{ClassInfo, DirectiveKind, HeaderFile, Span};
    use std::sync::Arc;

    fn decl(relative: &str, class: &str, name: &str) -> PropertyDeclaration {
        let header = Arc::new(HeaderFile::new("Game", relative, relative));
        let class = Arc::new(ClassInfo::new(class, Vec::new(), header, 1));
        PropertyDeclaration::new(class, DirectiveKind::AgAs, name, Span::point(1, 1))
    }

    #[test]
    fn public_and_private_headers() {
        let decls = [
            decl("Public/Hud/HudVM.h", "UHudVM", "Health"),
            decl("Private/Menu/MenuVM.h", "UMenuVM", "Title"),
            decl("Public/Hud/HudVM.h", "UHudVM", "Ammo"),
            decl("Classes/Legacy.h", "ULegacy", "Value"),
        ];
        assert_eq!(
            sorted_includes(&decls),
            vec!["Game/Classes/Legacy.h", "Game/Private/Menu/MenuVM.h", "Hud/HudVM.h"]
        );
    }

    #[test]
    fn public_prefix_is_case_insensitive() {
        let decls = [decl("public/Score.h", "UScore", "Value")];
        assert_eq!(sorted_includes(&decls), vec!["Score.h"]);
    }
}
