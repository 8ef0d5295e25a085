//! Version derivation from source-control state.
//!
//! The version is computed from the nearest tag reachable from `HEAD`:
//!
//! - `HEAD` is tagged and the worktree is clean: the tag's version (`2.8.0`)
//! - commits after the tag: `2.8.1.dev3+gabc1234`
//! - no usable tag: `0.1.dev12+gabc1234`
//!
//! A dirty worktree appends `.dirty` to the local segment.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use git2::{Oid, Repository, Sort, StatusOptions};
use semver::Version;

/// Length of the abbreviated commit hash in local version segments.
const SHORT_HASH_LEN: usize = 7;

/// A version derived from repository state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmVersion {
    /// Version of the nearest tag, if any
    pub tag: Option<Version>,

    /// Commits between `HEAD` and the tag (or the root when untagged)
    pub distance: usize,

    /// Abbreviated `HEAD` commit hash
    pub short_hash: String,

    /// Whether tracked files have uncommitted changes
    pub dirty: bool,
}

impl ScmVersion {
    /// Whether this is an exact, clean release.
    pub fn is_release(&self) -> bool {
        self.tag.is_some() && self.distance == 0 && !self.dirty
    }
}

impl fmt::Display for ScmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) if self.is_release() => write!(f, "{}", tag)?,
            Some(tag) => write!(
                f,
                "{}.{}.{}.dev{}+g{}",
                tag.major,
                tag.minor,
                tag.patch + 1,
                self.distance,
                self.short_hash
            )?,
            None => write!(f, "0.1.dev{}+g{}", self.distance, self.short_hash)?,
        }
        if !self.is_release() && self.dirty {
            write!(f, ".dirty")?;
        }
        Ok(())
    }
}

/// Parse a tag name like `v2.8.0`, `2.8.0` or `v2.8` into a version.
pub fn parse_tag_version(tag: &str) -> Option<Version> {
    let trimmed = tag.strip_prefix('v').unwrap_or(tag);
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }
    // Two-component tags are common in Autotools projects.
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() == 2 {
        let major = parts[0].parse().ok()?;
        let minor = parts[1].parse().ok()?;
        return Some(Version::new(major, minor, 0));
    }
    None
}

/// Derive the version of the repository containing `root`.
pub fn scm_version(root: &Path) -> Result<ScmVersion> {
    let repo = Repository::discover(root)
        .with_context(|| format!("no git repository found at {}", root.display()))?;

    let head = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .context("repository has no commits")?;

    let tags = tagged_commits(&repo)?;

    let mut walk = repo.revwalk()?;
    walk.push(head.id())?;
    walk.set_sorting(Sort::TOPOLOGICAL)?;

    let mut tag = None;
    let mut distance = 0;
    for oid in walk {
        let oid = oid?;
        if let Some(version) = tags.get(&oid) {
            tag = Some(version.clone());
            break;
        }
        distance += 1;
    }

    let full_hash = head.id().to_string();
    let short_hash = full_hash[..SHORT_HASH_LEN.min(full_hash.len())].to_string();

    Ok(ScmVersion {
        tag,
        distance,
        short_hash,
        dirty: is_dirty(&repo),
    })
}

/// Map each tagged commit to the highest version tagged on it.
fn tagged_commits(repo: &Repository) -> Result<HashMap<Oid, Version>> {
    let mut tags: HashMap<Oid, Version> = HashMap::new();

    for name in repo.tag_names(None)?.iter().flatten() {
        let Some(version) = parse_tag_version(name) else {
            tracing::debug!("ignoring non-version tag `{}`", name);
            continue;
        };
        let commit = repo
            .revparse_single(&format!("refs/tags/{}", name))
            .and_then(|obj| obj.peel_to_commit());
        let Ok(commit) = commit else {
            continue;
        };

        let entry = tags.entry(commit.id()).or_insert_with(|| version.clone());
        if version > *entry {
            *entry = version;
        }
    }

    Ok(tags)
}

fn is_dirty(repo: &Repository) -> bool {
    let mut opts = StatusOptions::new();
    opts.include_untracked(false).include_ignored(false);

    match repo.statuses(Some(&mut opts)) {
        Ok(statuses) => !statuses.is_empty(),
        // Bare repositories have no worktree to be dirty.
        Err(_) => false,
    }
}
