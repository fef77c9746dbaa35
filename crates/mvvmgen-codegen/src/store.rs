//! Concurrent collection of parsed declarations.
//!
//! Header files are parsed in parallel and every parse task appends its
//! declarations to a [`CollectionStore`]. The store is a set of mutex-guarded
//! shards picked round-robin, so concurrent appends rarely contend.
//!
//! Nothing can be read back while parsing is in progress: the only way to see
//! the collected declarations is [`CollectionStore::seal`], which consumes the
//! store. Sealing is the barrier between parsing and everything after it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mvvmgen_core::{ClassInfo, PropertyDeclaration};
use parking_lot::Mutex;

const DEFAULT_SHARDS: usize = 8;

#[derive(Debug, Default)]
struct Shard {
    declarations: Vec<PropertyDeclaration>,
    classes: Vec<Arc<ClassInfo>>,
}

/// Sharded append-only buffer filled during the parse phase.
#[derive(Debug)]
pub struct CollectionStore {
    shards: Box<[Mutex<Shard>]>,
    next: AtomicUsize,
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore {
    /// Create a store with one shard per available CPU.
    pub fn new() -> Self {
        let shards = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_SHARDS);
        Self::with_shards(shards)
    }

    /// Create a store with a fixed number of shards (at least one).
    pub fn with_shards(count: usize) -> Self {
        let shards = (0..count.max(1))
            .map(|_| Mutex::new(Shard::default()))
            .collect();
        Self {
            shards,
            next: AtomicUsize::new(0),
        }
    }

    fn shard(&self) -> &Mutex<Shard> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.shards.len();
        &self.shards[index]
    }

    /// Append one declaration.
    pub fn push(&self, declaration: PropertyDeclaration) {
        self.shard().lock().declarations.push(declaration);
    }

    /// Append everything one header produced, under a single lock.
    pub fn extend(
        &self,
        classes: impl IntoIterator<Item = Arc<ClassInfo>>,
        declarations: impl IntoIterator<Item = PropertyDeclaration>,
    ) {
        let mut shard = self.shard().lock();
        shard.classes.extend(classes);
        shard.declarations.extend(declarations);
    }

    /// Merge all shards.
    ///
    /// Declarations come out ordered by module, class and property name so
    /// later phases see the same order regardless of thread scheduling.
    pub fn seal(self) -> SealedDeclarations {
        let mut declarations = Vec::new();
        let mut classes = Vec::new();
        for shard in self.shards.into_vec() {
            let shard = shard.into_inner();
            declarations.extend(shard.declarations);
            classes.extend(shard.classes);
        }

        declarations.sort_by(|a, b| {
            (a.class.module_name(), a.class.qualified_name(), a.name.as_str(), a.line).cmp(&(
                b.class.module_name(),
                b.class.qualified_name(),
                b.name.as_str(),
                b.line,
            ))
        });
        classes.sort_by(|a, b| {
            (a.module_name(), a.qualified_name(), a.line())
                .cmp(&(b.module_name(), b.qualified_name(), b.line()))
        });

        SealedDeclarations {
            declarations,
            classes,
        }
    }
}

/// The complete result of a parse phase.
#[derive(Debug, Default)]
pub struct SealedDeclarations {
    declarations: Vec<PropertyDeclaration>,
    classes: Vec<Arc<ClassInfo>>,
}

impl SealedDeclarations {
    pub fn declarations(&self) -> &[PropertyDeclaration] {
        &self.declarations
    }

    /// Mutable access for the resolve phase.
    pub fn declarations_mut(&mut self) -> &mut [PropertyDeclaration] {
        &mut self.declarations
    }

    /// Every class seen while parsing, with or without properties.
    pub fn classes(&self) -> &[Arc<ClassInfo>] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
