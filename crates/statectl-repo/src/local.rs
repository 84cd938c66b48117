//! Git-backed local repository handle.

use std::fs;
use std::path::{Component, Path, PathBuf};

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    AutotagOption, Cred, CredentialType, ErrorCode, FetchOptions, ObjectType, Oid,
    RemoteCallbacks, Repository, ResetType,
};
use statectl_types::{Ref, RefKind};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::{RepoError, Result};

/// The single remote every handle fetches from and resolves names against.
pub const REMOTE: &str = "origin";

const HEADS_REFSPEC: &str = "+refs/heads/*:refs/remotes/origin/*";
const TAGS_REFSPEC: &str = "+refs/tags/*:refs/tags/*";

/// Credential attempts per transfer before giving up.
const MAX_AUTH_ATTEMPTS: usize = 3;

/// One working copy of a remote repository.
///
/// See the crate docs for the exclusive-access contract.
pub struct LocalRepo {
    repo: Repository,
    dir: PathBuf,
    url: String,
    cancel: CancelToken,
}

impl LocalRepo {
    /// Open the repository at `dir`, or clone `url` there if none exists.
    ///
    /// A fresh clone has no working tree; the first [`reset`](Self::reset)
    /// populates it.
    pub fn open_or_clone(dir: impl Into<PathBuf>, url: &str, cancel: CancelToken) -> Result<Self> {
        let dir = dir.into();
        debug!(url, dir = %dir.display(), "opening repository");

        let repo = match Repository::open(&dir) {
            Ok(repo) => repo,
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!(url, dir = %dir.display(), "repository not found, cloning");
                clone(&dir, url, &cancel)?
            }
            Err(source) => return Err(RepoError::Open { dir, source }),
        };

        if repo.is_bare() {
            return Err(RepoError::Open {
                dir,
                source: git2::Error::from_str("cached repository has no working tree"),
            });
        }

        Ok(Self {
            repo,
            dir,
            url: url.to_string(),
            cancel,
        })
    }

    /// Root of the working tree.
    pub fn workdir(&self) -> &Path {
        &self.dir
    }

    /// URL this handle was opened for.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Update all remote-tracking branches and tags, forcing non-fast-forward
    /// updates. Being already up to date is not an error.
    pub fn fetch(&mut self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(RepoError::Canceled {
                url: self.url.clone(),
            });
        }
        debug!(url = %self.url, "fetching");

        let mut remote = self
            .repo
            .find_remote(REMOTE)
            .map_err(|source| RepoError::Fetch {
                url: self.url.clone(),
                source,
            })?;
        let mut options = fetch_options(&self.cancel);
        options.download_tags(AutotagOption::All);

        remote
            .fetch(&[HEADS_REFSPEC, TAGS_REFSPEC], Some(&mut options), None)
            .map_err(|source| {
                if self.cancel.is_cancelled() {
                    RepoError::Canceled {
                        url: self.url.clone(),
                    }
                } else {
                    RepoError::Fetch {
                        url: self.url.clone(),
                        source,
                    }
                }
            })
    }

    /// Resolve `reference` to a commit id.
    ///
    /// Hash-shaped references are taken literally. Names are looked up as a
    /// tag first (annotated tags are peeled), then as a branch of
    /// [`REMOTE`]. Only refs brought in by [`fetch`](Self::fetch) are
    /// consulted, so the result is stable between fetches.
    pub fn resolve(&self, reference: &Ref) -> Result<Oid> {
        match reference.kind() {
            RefKind::Commit(hash) => {
                Oid::from_str(hash).map_err(|source| RepoError::InvalidCommit {
                    reference: reference.clone(),
                    source,
                })
            }
            RefKind::Name(name) => {
                let candidates = [
                    format!("refs/tags/{name}"),
                    format!("refs/remotes/{REMOTE}/{name}"),
                ];
                for candidate in &candidates {
                    match self.repo.find_reference(candidate) {
                        Ok(found) => {
                            let commit =
                                found
                                    .peel_to_commit()
                                    .map_err(|source| RepoError::Resolve {
                                        reference: reference.clone(),
                                        source,
                                    })?;
                            return Ok(commit.id());
                        }
                        Err(e)
                            if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) =>
                        {
                            continue
                        }
                        Err(source) => {
                            return Err(RepoError::Resolve {
                                reference: reference.clone(),
                                source,
                            })
                        }
                    }
                }
                Err(RepoError::ReferenceNotFound {
                    reference: reference.clone(),
                    url: self.url.clone(),
                })
            }
        }
    }

    /// Force the working tree to exactly the content of `reference`,
    /// discarding local modifications and untracked files. HEAD is left
    /// detached at the commit.
    ///
    /// Every failure, an unresolvable reference included, is returned as
    /// [`RepoError::Reset`] with the underlying error as its source.
    pub fn reset(&mut self, reference: &Ref) -> Result<Oid> {
        self.try_reset(reference)
            .map_err(|source| RepoError::Reset {
                reference: reference.clone(),
                source: Box::new(source),
            })
    }

    fn try_reset(&mut self, reference: &Ref) -> Result<Oid> {
        let oid = self.resolve(reference)?;
        let checkout_err = |source: git2::Error| RepoError::Checkout {
            commit: oid.to_string(),
            source,
        };

        let commit = self
            .repo
            .find_object(oid, None)
            .and_then(|object| object.peel(ObjectType::Commit))
            .map_err(checkout_err)?;

        // Detach first so the reset never moves a local branch.
        self.repo.set_head_detached(oid).map_err(checkout_err)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force().remove_untracked(true);
        self.repo
            .reset(&commit, ResetType::Hard, Some(&mut checkout))
            .map_err(checkout_err)?;

        debug!(url = %self.url, %reference, commit = %oid, "reset working tree");
        Ok(oid)
    }

    /// Read a file from the working tree.
    ///
    /// `relative` is taken relative to the repository root; a leading `/` is
    /// accepted, `..` components are not.
    pub fn read_file(&self, relative: &str) -> Result<String> {
        let trimmed = relative.trim_start_matches('/');
        let rel = Path::new(trimmed);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(RepoError::OutsideWorkdir {
                path: relative.to_string(),
            });
        }

        let path = self.dir.join(rel);
        fs::read_to_string(&path).map_err(|source| RepoError::Read { path, source })
    }
}

impl std::fmt::Debug for LocalRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalRepo")
            .field("dir", &self.dir)
            .field("url", &self.url)
            .finish()
    }
}

fn clone(dir: &Path, url: &str, cancel: &CancelToken) -> Result<Repository> {
    if let Some(parent) = dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut checkout = CheckoutBuilder::new();
    checkout.dry_run();

    RepoBuilder::new()
        .fetch_options(fetch_options(cancel))
        .with_checkout(checkout)
        .clone(url, dir)
        .map_err(|source| {
            if cancel.is_cancelled() {
                RepoError::Canceled {
                    url: url.to_string(),
                }
            } else {
                RepoError::Clone {
                    url: url.to_string(),
                    dir: dir.to_path_buf(),
                    source,
                }
            }
        })
}

/// Transfer options shared by clone and fetch: cancellation through the
/// progress callback, and credentials from the ssh agent or the configured
/// credential helper.
fn fetch_options(cancel: &CancelToken) -> FetchOptions<'static> {
    let token = cancel.clone();
    let mut attempts = 0;

    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(move |_| !token.is_cancelled());
    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > MAX_AUTH_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            let config = git2::Config::open_default()?;
            return Cred::credential_helper(&config, url, username);
        }
        Cred::default()
    });

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}
