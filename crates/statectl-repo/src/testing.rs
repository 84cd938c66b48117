//! Throwaway upstream repositories for tests.
//!
//! [`Upstream`] is a non-bare git repository in a temporary directory. Its
//! path doubles as a clone URL, so tests can exercise clone, fetch, and
//! reset without a network.

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

/// A local repository that plays the remote in tests.
pub struct Upstream {
    dir: TempDir,
    repo: Repository,
}

impl Upstream {
    /// Initialize an empty repository whose default branch is `master`.
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("create upstream dir");
        let mut options = RepositoryInitOptions::new();
        options.initial_head("master");
        let repo = Repository::init_opts(dir.path(), &options).expect("init upstream");
        Self { dir, repo }
    }

    /// Clone URL of this repository.
    pub fn url(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `files` and commit everything on the current branch.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> Oid {
        for (path, content) in files {
            let full = self.dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("create parent dirs");
            }
            fs::write(full, content).expect("write file");
        }
        self.commit_all(message)
    }

    /// Delete `paths` and commit.
    pub fn remove(&self, paths: &[&str], message: &str) -> Oid {
        for path in paths {
            fs::remove_file(self.dir.path().join(path)).expect("remove file");
        }
        self.commit_all(message)
    }

    /// Create or move a branch to `target`.
    pub fn branch(&self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).expect("find commit");
        self.repo.branch(name, &commit, true).expect("create branch");
    }

    /// Create a lightweight tag.
    pub fn tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).expect("find object");
        self.repo
            .tag_lightweight(name, &object, true)
            .expect("create tag");
    }

    /// Create an annotated tag.
    pub fn annotated_tag(&self, name: &str, target: Oid) -> Oid {
        let object = self.repo.find_object(target, None).expect("find object");
        self.repo
            .tag(name, &object, &signature(), name, true)
            .expect("create annotated tag")
    }

    fn commit_all(&self, message: &str) -> Oid {
        let mut index = self.repo.index().expect("open index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("stage files");
        index.update_all(["*"].iter(), None).expect("stage removals");
        index.write().expect("write index");

        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();

        let sig = signature();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit")
    }
}

fn signature() -> Signature<'static> {
    Signature::now("test-user", "test@example.com").expect("signature")
}
