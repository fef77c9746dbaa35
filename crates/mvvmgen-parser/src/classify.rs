//! Owning-reference classification of property types.
//!
//! Engine object classes follow a naming convention: `U` for objects and `A`
//! for actors. A property type that mentions such a name may be an owning
//! reference and must go through type resolution; anything else (`int32`,
//! `FString`, `TArray<FVector>`) is exempt.

use mvvmgen_core::TypeToken;

/// Prefix letters reserved for engine object classes.
pub const OWNING_REFERENCE_PREFIXES: [char; 2] = ['U', 'A'];

/// Whether a type token sequence may denote an owning object reference.
///
/// True iff some identifier token starts with one of
/// [`OWNING_REFERENCE_PREFIXES`]. Purely lexical; no resolution happens here.
pub fn may_reference_object(tokens: &[TypeToken]) -> bool {
    tokens.iter().any(is_owning_reference_candidate)
}

/// Whether this single token is an identifier with an owning-reference prefix.
pub fn is_owning_reference_candidate(token: &TypeToken) -> bool {
    token.is_identifier() && is_owning_reference_name(&token.text)
}

/// Whether a type name starts with an owning-reference prefix.
pub fn is_owning_reference_name(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| OWNING_REFERENCE_PREFIXES.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvvmgen_core::{Span, TypeTokenKind};

    fn ident(text: &str) -> TypeToken {
        TypeToken::new(text, TypeTokenKind::Identifier, Span::point(1, 1))
    }

    fn punct(text: &str) -> TypeToken {
        TypeToken::new(text, TypeTokenKind::Punct, Span::point(1, 1))
    }

    #[test]
    fn plain_value_types_never_trigger() {
        assert!(!may_reference_object(&[ident("int32")]));
        assert!(!may_reference_object(&[ident("FString"), punct("&")]));
        assert!(!may_reference_object(&[]));
    }

    #[test]
    fn object_pointer_always_triggers() {
        assert!(may_reference_object(&[ident("UObject"), punct("*")]));
        assert!(may_reference_object(&[ident("AActor"), punct("*")]));
    }

    #[test]
    fn prefix_inside_template_triggers() {
        let tokens = [
            ident("TArray"),
            punct("<"),
            ident("TObjectPtr"),
            punct("<"),
            ident("UTexture2D"),
            punct(">"),
            punct(">"),
        ];
        assert!(may_reference_object(&tokens));
    }

    #[test]
    fn lowercase_and_literals_do_not_trigger() {
        assert!(!may_reference_object(&[ident("uint8")]));
        assert!(!may_reference_object(&[ident("auto")]));
        let literal = TypeToken::new("U", TypeTokenKind::Literal, Span::point(1, 1));
        assert!(!may_reference_object(&[literal]));
    }

    #[test]
    fn name_prefix_check() {
        assert!(is_owning_reference_name("UPanel"));
        assert!(is_owning_reference_name("AHUD"));
        assert!(!is_owning_reference_name("FVector"));
        assert!(!is_owning_reference_name(""));
    }
}
