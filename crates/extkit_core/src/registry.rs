//! Per-kind class-identity and instance maps.
//!
//! # Responsibility
//! - Record which extension names are known for a kind and where they come from.
//! - Hold the at-most-one live instance per `(kind, name)`.
//!
//! # Invariants
//! - Registration is last-write-wins per name.
//! - Instances are never replaced or evicted once stored.

use crate::extension::ExtensionInstance;
use crate::identity::{class_identity_for, ClassIdentity};
use crate::kind::{ManagerKind, Namespace};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Registration of one extension name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRecord {
    pub name: String,
    pub class_identity: ClassIdentity,
    /// `{folder}/{name}/src` when registered by discovery.
    pub source_dir: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct KindEntries {
    records: BTreeMap<String, ExtensionRecord>,
    instances: BTreeMap<String, Arc<ExtensionInstance>>,
}

/// Registry of class identities and live instances, partitioned by kind.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    kinds: BTreeMap<ManagerKind, KindEntries>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers bare names without a source location.
    pub fn register_slug_class<I, S>(&mut self, kind: ManagerKind, namespace: &Namespace, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            self.register_record(
                kind,
                ExtensionRecord {
                    name: name.to_string(),
                    class_identity: class_identity_for(namespace, name),
                    source_dir: None,
                },
            );
        }
    }

    /// Upserts `record`, returning the one it replaced.
    pub fn register_record(
        &mut self,
        kind: ManagerKind,
        record: ExtensionRecord,
    ) -> Option<ExtensionRecord> {
        self.kinds
            .entry(kind)
            .or_default()
            .records
            .insert(record.name.clone(), record)
    }

    pub fn record(&self, kind: ManagerKind, name: &str) -> Option<&ExtensionRecord> {
        self.kinds
            .get(&kind)
            .and_then(|entries| entries.records.get(name))
    }

    pub fn records(&self, kind: ManagerKind) -> Vec<ExtensionRecord> {
        self.kinds
            .get(&kind)
            .map(|entries| entries.records.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Registered names in sorted order.
    pub fn names(&self, kind: ManagerKind) -> Vec<String> {
        self.kinds
            .get(&kind)
            .map(|entries| entries.records.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Name -> class identity map for `kind`.
    pub fn classes(&self, kind: ManagerKind) -> BTreeMap<String, ClassIdentity> {
        self.kinds
            .get(&kind)
            .map(|entries| {
                entries
                    .records
                    .iter()
                    .map(|(name, record)| (name.clone(), record.class_identity.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn instance(&self, kind: ManagerKind, name: &str) -> Option<Arc<ExtensionInstance>> {
        self.kinds
            .get(&kind)
            .and_then(|entries| entries.instances.get(name))
            .cloned()
    }

    /// Stores a freshly loaded instance. An instance already stored under the
    /// same name is kept and returned instead.
    pub fn store_instance(
        &mut self,
        kind: ManagerKind,
        instance: ExtensionInstance,
    ) -> Arc<ExtensionInstance> {
        let name = instance.name().to_string();
        self.kinds
            .entry(kind)
            .or_default()
            .instances
            .entry(name)
            .or_insert_with(|| Arc::new(instance))
            .clone()
    }

    pub fn instances(&self, kind: ManagerKind) -> ExtensionCollection {
        let instances = self
            .kinds
            .get(&kind)
            .map(|entries| entries.instances.values().cloned().collect())
            .unwrap_or_default();
        ExtensionCollection { instances }
    }

    pub fn class_count(&self, kind: ManagerKind) -> usize {
        self.kinds
            .get(&kind)
            .map_or(0, |entries| entries.records.len())
    }

    pub fn instance_count(&self, kind: ManagerKind) -> usize {
        self.kinds
            .get(&kind)
            .map_or(0, |entries| entries.instances.len())
    }
}

/// Read-only view over loaded instances, sorted by extension name.
#[derive(Debug, Clone, Default)]
pub struct ExtensionCollection {
    instances: Vec<Arc<ExtensionInstance>>,
}

impl ExtensionCollection {
    pub fn get(&self, name: &str) -> Option<&Arc<ExtensionInstance>> {
        self.instances
            .iter()
            .find(|instance| instance.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.instances.iter().map(|instance| instance.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ExtensionInstance>> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl IntoIterator for ExtensionCollection {
    type Item = Arc<ExtensionInstance>;
    type IntoIter = std::vec::IntoIter<Arc<ExtensionInstance>>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.into_iter()
    }
}
