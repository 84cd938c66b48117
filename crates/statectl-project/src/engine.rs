//! Reconciliation of two snapshots into per-placement diffs.
//!
//! [`reconcile`] resolves the configuration every placement of both
//! snapshots points at, pairs placements by [`PlacementKey`], and hands one
//! [`DiffBlock`] per key to a [`DiffSink`] as soon as it is computed. Keys
//! present in the new snapshot come first, in its order; keys only in the
//! base snapshot follow as removals, in base order.
//!
//! A placement whose content cannot be resolved is recorded in the outcome's
//! [`MultiError`] and skipped; every other placement is still diffed.

use std::collections::{HashMap, HashSet};

use statectl_diff::{ChangeKind, DiffBlock, DiffSink, Side};
use statectl_repo::{LocalRepo, RepoError};
use statectl_types::{MultiError, Placement, PlacementKey, Ref, Snapshot};
use tracing::{debug, info, warn};

use crate::error::{ProjectError, ResolutionError};
use crate::substitute::substitute;

/// Where placement configuration is read from.
///
/// Reads go through `&mut self`: a source backed by a single checkout can
/// only serve one reference at a time.
pub trait ContentSource {
    /// Raw content of `path` at `reference`.
    fn read_at(&mut self, reference: &Ref, path: &str) -> Result<String, RepoError>;
}

impl ContentSource for LocalRepo {
    fn read_at(&mut self, reference: &Ref, path: &str) -> Result<String, RepoError> {
        self.reset(reference)?;
        self.read_file(path)
    }
}

/// What a reconciliation produced.
#[derive(Debug, Default)]
pub struct DiffOutcome {
    /// Keys a diff block was emitted for, in emission order.
    pub rendered: Vec<(PlacementKey, ChangeKind)>,
    /// Keys left out because their content could not be resolved.
    pub skipped: Vec<PlacementKey>,
    /// One entry per skipped key.
    pub errors: MultiError,
}

impl DiffOutcome {
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.rendered.iter().filter(|(_, k)| *k == kind).count()
    }

    /// The aggregated resolution error, if any placement failed.
    pub fn into_result(self) -> Result<(), MultiError> {
        self.errors.into_result()
    }
}

/// Diff the rendered configuration of `base` against `new`.
///
/// Only a failing sink aborts; resolution failures end up in the outcome.
pub fn reconcile<C, S>(
    source: &mut C,
    sink: &mut S,
    base_ref: &Ref,
    base: &Snapshot,
    new_ref: &Ref,
    new: &Snapshot,
) -> Result<DiffOutcome, ProjectError>
where
    C: ContentSource + ?Sized,
    S: DiffSink + ?Sized,
{
    let mut outcome = DiffOutcome::default();

    let mut base_contents: HashMap<PlacementKey, (Side, String)> = HashMap::new();
    let mut base_errored: HashSet<PlacementKey> = HashSet::new();
    for placement in base {
        let key = placement.key();
        match materialize(source, placement, base_ref) {
            Ok(content) => {
                base_contents.insert(key, (side_of(placement), content));
            }
            Err(err) => {
                warn!(%key, error = %err.source, "resolving base configuration failed");
                outcome.errors.add(err);
                base_errored.insert(key);
            }
        }
    }

    let mut visited: HashSet<PlacementKey> = HashSet::new();
    for placement in new {
        let key = placement.key();
        visited.insert(key.clone());

        // Already reported on the base side.
        if base_errored.contains(&key) {
            outcome.skipped.push(key);
            continue;
        }

        let content = match materialize(source, placement, new_ref) {
            Ok(content) => content,
            Err(err) => {
                warn!(%key, error = %err.source, "resolving new configuration failed");
                outcome.errors.add(err);
                outcome.skipped.push(key);
                continue;
            }
        };

        let base_side = base_contents.remove(&key);
        let block = DiffBlock::compute(
            key,
            base_side.as_ref().map(|(side, c)| (side.clone(), c.as_str())),
            Some((side_of(placement), content.as_str())),
        );
        emit(sink, block, &mut outcome)?;
    }

    for placement in base {
        let key = placement.key();
        if visited.contains(&key) {
            continue;
        }
        if let Some((side, content)) = base_contents.remove(&key) {
            let block = DiffBlock::compute(key, Some((side, content.as_str())), None);
            emit(sink, block, &mut outcome)?;
        } else {
            outcome.skipped.push(key);
        }
    }

    info!(
        %base_ref,
        %new_ref,
        added = outcome.count(ChangeKind::Added),
        removed = outcome.count(ChangeKind::Removed),
        changed = outcome.count(ChangeKind::Changed),
        unchanged = outcome.count(ChangeKind::Unchanged),
        errored = outcome.errors.len(),
        "state diff complete"
    );
    Ok(outcome)
}

fn side_of(placement: &Placement) -> Side {
    Side::new(
        placement.configuration_ref.clone(),
        placement.configuration_path.clone(),
    )
}

fn materialize<C: ContentSource + ?Sized>(
    source: &mut C,
    placement: &Placement,
    state_ref: &Ref,
) -> Result<String, ResolutionError> {
    debug!(
        key = %placement.key(),
        configuration_ref = %placement.configuration_ref,
        path = %placement.configuration_path,
        "resolving configuration"
    );
    let raw = source
        .read_at(&placement.configuration_ref, &placement.configuration_path)
        .map_err(|source| ResolutionError {
            key: placement.key(),
            state_ref: state_ref.clone(),
            configuration_ref: placement.configuration_ref.clone(),
            path: placement.configuration_path.clone(),
            source,
        })?;
    Ok(substitute(&raw, &placement.parameters))
}

fn emit<S: DiffSink + ?Sized>(
    sink: &mut S,
    block: DiffBlock,
    outcome: &mut DiffOutcome,
) -> Result<(), ProjectError> {
    sink.emit(&block).map_err(ProjectError::Output)?;
    outcome.rendered.push((block.key, block.kind));
    Ok(())
}
