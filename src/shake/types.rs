//! Shared result types of the shaking pipeline.

use std::collections::HashSet;

/// Identity of a field or method: owning class, member name, descriptor.
///
/// A field key's descriptor may be empty while it is still unresolved (a field
/// root is written without one); equality always uses the descriptor as stored,
/// and lookups that must tolerate the unresolved form query both spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    /// Internal name of the owning class
    pub owner: String,
    /// Member name
    pub name: String,
    /// Field or method descriptor
    pub descriptor: String,
}

impl MemberKey {
    /// Construct a key from borrowed parts.
    #[must_use]
    pub fn new(owner: &str, name: &str, descriptor: &str) -> Self {
        MemberKey {
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }
}

impl std::fmt::Display for MemberKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}{}", self.owner, self.name, self.descriptor)
    }
}

/// The three keep sets produced by reachability analysis.
///
/// Classes preserve discovery order because output emission is deterministic by
/// that order; fields and methods are plain sets. Every owner of a kept member is
/// itself a kept class, and every class referenced from a kept class's header is
/// kept, which is what makes the rewritten archive self-contained.
#[derive(Debug, Default)]
pub struct KeepSets {
    classes: Vec<String>,
    class_set: HashSet<String>,
    /// Kept fields
    pub fields: HashSet<MemberKey>,
    /// Kept methods
    pub methods: HashSet<MemberKey>,
}

impl KeepSets {
    /// Create empty keep sets.
    #[must_use]
    pub fn new() -> Self {
        KeepSets::default()
    }

    /// Kept classes in discovery order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns `true` if the class is kept.
    #[must_use]
    pub fn contains_class(&self, name: &str) -> bool {
        self.class_set.contains(name)
    }

    /// Insert a class; returns `true` if it was not already kept.
    pub(crate) fn insert_class(&mut self, name: &str) -> bool {
        if self.class_set.insert(name.to_string()) {
            self.classes.push(name.to_string());
            return true;
        }
        false
    }

    /// Returns `true` if the exact field key, or its unresolved-descriptor
    /// spelling, is kept.
    #[must_use]
    pub fn field_kept(&self, owner: &str, name: &str, descriptor: &str) -> bool {
        self.fields.contains(&MemberKey::new(owner, name, descriptor))
            || self.fields.contains(&MemberKey::new(owner, name, ""))
    }

    /// Returns `true` if the exact method key is kept.
    #[must_use]
    pub fn method_kept(&self, owner: &str, name: &str, descriptor: &str) -> bool {
        self.methods.contains(&MemberKey::new(owner, name, descriptor))
    }
}
