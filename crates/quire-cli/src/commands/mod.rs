//! Subcommand implementations.

pub(crate) mod check;
pub(crate) mod config;
pub(crate) mod matrix;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use quire_authz::MemoryRepository;
use quire_core::Requester;

/// Build the requester named on the command line.
pub(crate) fn requester(user: Option<&str>, groups: &[String]) -> anyhow::Result<Requester> {
    match user {
        Some(user) => Ok(Requester::user(user).with_groups(groups.iter().cloned())),
        None if groups.is_empty() => Ok(Requester::anonymous()),
        None => bail!("--group requires --user; anonymous requesters have no groups"),
    }
}

/// Load a repository snapshot.
pub(crate) fn load_repository(path: &Path) -> anyhow::Result<Arc<MemoryRepository>> {
    let repo = MemoryRepository::load_snapshot(path)
        .with_context(|| format!("failed to load repository snapshot {}", path.display()))?;
    Ok(Arc::new(repo))
}
