//! Deterministic hash-based class and property identity.
//!
//! [`TypeHash`] identifies a view-model class (by qualified name) or one of
//! its properties (by owner hash plus property name). Hashes are computed from
//! names only, so the runtime registry can be queried before any registration
//! happened and independent of registration order.
//!
//! # Examples
//!
//! ```
//! use mvvmgen_core::TypeHash;
//!
//! let class = TypeHash::from_name("UPlayerState");
//! assert_eq!(class, TypeHash::from_name("UPlayerState"));
//!
//! let score = TypeHash::from_property(class, "Score");
//! assert_ne!(score, TypeHash::from_property(class, "Health"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant between owner and member.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for class hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for property hashes.
    pub const PROPERTY: u64 = 0x6b3f0e1c9d24a857;
}

/// A deterministic 64-bit hash identifying a class or a property.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a class hash from a qualified class name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a property hash from its owning class hash and property name.
    #[inline]
    pub fn from_property(owner: TypeHash, name: &str) -> Self {
        let hash = (hash_constants::PROPERTY ^ owner.0)
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(xxh64(name.as_bytes(), 0));
        TypeHash(hash)
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
