//! Diff blocks: one placement's rendered-configuration diff plus the header
//! that identifies it.

use std::fmt;

use serde::Serialize;
use statectl_types::{PlacementKey, Ref};

use crate::content_diff::{diff_contents, ContentDiff};

/// How a placement changed between the two snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present only in the new snapshot.
    Added,
    /// Present only in the base snapshot.
    Removed,
    /// Present in both, rendered content differs.
    Changed,
    /// Present in both, rendered content identical.
    Unchanged,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Changed => "changed",
            ChangeKind::Unchanged => "unchanged",
        })
    }
}

/// Where one side of a diff was read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Side {
    pub reference: Ref,
    pub path: String,
}

impl Side {
    pub fn new(reference: Ref, path: impl Into<String>) -> Self {
        Self {
            reference,
            path: path.into(),
        }
    }

    fn label(side: Option<&Side>) -> String {
        match side {
            Some(s) => format!("{}:{}", s.reference, s.path.trim_start_matches('/')),
            None => "/dev/null".to_string(),
        }
    }
}

/// One placement's diff, ready to print.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffBlock {
    pub key: PlacementKey,
    pub kind: ChangeKind,
    /// Base configuration source; `None` when the placement is new.
    pub base: Option<Side>,
    /// New configuration source; `None` when the placement was removed.
    pub new: Option<Side>,
    pub diff: ContentDiff,
}

impl DiffBlock {
    /// Diff `base` against `new` content. A missing side counts as empty.
    pub fn compute(
        key: PlacementKey,
        base: Option<(Side, &str)>,
        new: Option<(Side, &str)>,
    ) -> Self {
        let base_content = base.as_ref().map_or("", |(_, c)| *c);
        let new_content = new.as_ref().map_or("", |(_, c)| *c);
        let diff = diff_contents(base_content, new_content);

        let kind = match (&base, &new) {
            (None, _) => ChangeKind::Added,
            (_, None) => ChangeKind::Removed,
            _ if diff.is_empty() => ChangeKind::Unchanged,
            _ => ChangeKind::Changed,
        };

        Self {
            key,
            kind,
            base: base.map(|(side, _)| side),
            new: new.map(|(side, _)| side),
            diff,
        }
    }

    /// Header line naming the service and target cluster.
    pub fn header(&self) -> String {
        format!(
            "Service: {:?} Deploying to {}",
            self.key.service, self.key.cluster
        )
    }

    /// The diff body in unified form, with `---`/`+++` source lines when
    /// there is anything to show. Empty when the contents are equal.
    pub fn body(&self) -> String {
        if self.diff.is_empty() {
            return String::new();
        }
        format!(
            "--- {}\n+++ {}\n{}",
            Side::label(self.base.as_ref()),
            Side::label(self.new.as_ref()),
            self.diff.unified()
        )
    }
}

impl fmt::Display for DiffBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        f.write_str(&self.body())
    }
}
