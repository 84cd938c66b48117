//! Placement records and snapshots.
//!
//! A [`Placement`] is the normalized, codec-independent statement that a
//! service is deployed to a cluster from a given configuration file at a given
//! reference. Every state codec decodes into a [`Snapshot`] of placements.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::reference::Ref;

/// A deployment target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub environment: String,
}

impl Cluster {
    pub fn new(name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: environment.into(),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.environment)
    }
}

/// Identity of a placement across two snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlacementKey {
    pub service: String,
    pub cluster: Cluster,
}

impl fmt::Display for PlacementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service {:?} on cluster {}", self.service, self.cluster)
    }
}

/// One service deployed to one cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Service (resource template) name.
    pub service: String,
    /// Cluster the service is deployed to.
    pub cluster: Cluster,
    /// Version of the configuration repository to read from.
    pub configuration_ref: Ref,
    /// Repository the configuration lives in, as declared by the state.
    pub configuration_url: String,
    /// Path of the configuration file, relative to the repository root.
    pub configuration_path: String,
    /// `${NAME}` substitutions applied to the configuration file.
    pub parameters: BTreeMap<String, String>,
}

impl Placement {
    /// The reconciliation identity of this placement.
    pub fn key(&self) -> PlacementKey {
        PlacementKey {
            service: self.service.clone(),
            cluster: self.cluster.clone(),
        }
    }
}

/// All placements decoded from the state repository at one reference.
///
/// Order is the decode order. Placement keys are unique within a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    placements: Vec<Placement>,
}

impl Snapshot {
    /// Build a snapshot, rejecting two placements with the same key.
    pub fn new(placements: Vec<Placement>) -> Result<Self, TypeError> {
        let mut seen = HashSet::with_capacity(placements.len());
        for p in &placements {
            if !seen.insert(p.key()) {
                return Err(TypeError::DuplicatePlacement {
                    service: p.service.clone(),
                    cluster: p.cluster.to_string(),
                });
            }
        }
        Ok(Self { placements })
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Placement> {
        self.placements.iter()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn contains_key(&self, key: &PlacementKey) -> bool {
        self.placements
            .iter()
            .any(|p| p.service == key.service && p.cluster == key.cluster)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Placement;
    type IntoIter = std::slice::Iter<'a, Placement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}
