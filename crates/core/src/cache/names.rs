//! Versioned store naming.
//!
//! Store names follow `{namespace}-{kind}-{version}`. The set of stores
//! carrying the current version string is the current generation; every
//! other namespaced store is stale and gets swept at activation.

/// The kinds of store a generation owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Warmed at install time with the configured core routes.
    Precache,
    /// Written by strategies during normal request handling.
    Runtime,
    /// Bounded store for third-party images.
    RuntimeImage,
}

impl StoreKind {
    pub const ALL: [StoreKind; 3] = [StoreKind::Precache, StoreKind::Runtime, StoreKind::RuntimeImage];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Precache => "precache",
            StoreKind::Runtime => "runtime",
            StoreKind::RuntimeImage => "runtime-image",
        }
    }
}

/// Store naming for one deployed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationNames {
    namespace: String,
    version: String,
}

impl GenerationNames {
    pub fn new(namespace: impl Into<String>, version: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), version: version.into() }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Full store name for a kind in this generation.
    pub fn store(&self, kind: StoreKind) -> String {
        format!("{}-{}-{}", self.namespace, kind.as_str(), self.version)
    }

    /// Whether a store name belongs to this namespace at all.
    ///
    /// Stores owned by other software sharing the database are never
    /// touched by the activation sweep.
    pub fn owns(&self, name: &str) -> bool {
        name.len() > self.namespace.len() + 1
            && name.starts_with(&self.namespace)
            && name.as_bytes()[self.namespace.len()] == b'-'
    }

    /// Whether a store name is part of the current generation.
    pub fn is_current(&self, name: &str) -> bool {
        StoreKind::ALL.iter().any(|kind| self.store(*kind) == name)
    }

    /// Namespaced but not current: subject to deletion at activation.
    pub fn is_stale(&self, name: &str) -> bool {
        self.owns(name) && !self.is_current(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_names() {
        let names = GenerationNames::new("haven", "v2");
        assert_eq!(names.store(StoreKind::Precache), "haven-precache-v2");
        assert_eq!(names.store(StoreKind::Runtime), "haven-runtime-v2");
        assert_eq!(names.store(StoreKind::RuntimeImage), "haven-runtime-image-v2");
    }

    #[test]
    fn test_owns_requires_namespace_prefix() {
        let names = GenerationNames::new("haven", "v2");
        assert!(names.owns("haven-runtime-v1"));
        assert!(names.owns("haven-precache-v2"));
        assert!(!names.owns("havenish-runtime-v1"));
        assert!(!names.owns("other-runtime-v2"));
        assert!(!names.owns("haven"));
    }

    #[test]
    fn test_stale_detection() {
        let names = GenerationNames::new("haven", "v2");
        assert!(names.is_stale("haven-runtime-v1"));
        assert!(names.is_stale("haven-runtime-image-v1"));
        assert!(!names.is_stale("haven-runtime-v2"));
        assert!(!names.is_stale("haven-runtime-image-v2"));
        assert!(!names.is_stale("unrelated-store"));
    }

    #[test]
    fn test_version_with_dashes() {
        let names = GenerationNames::new("haven", "2024-06-01");
        let current = names.store(StoreKind::Runtime);
        assert_eq!(current, "haven-runtime-2024-06-01");
        assert!(names.is_current(&current));
        assert!(names.is_stale("haven-runtime-2024-05-01"));
    }
}
