//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each repository command:
//! 1. Validates its arguments (before the repository is touched)
//! 2. Opens and locks the repository via [`with_metadata`]
//! 3. Works on the metadata namespace
//! 4. Formats and displays output
//!
//! The lock is released when `with_metadata` returns, on success and on
//! every error path.

mod completion;
mod fix_address;
mod fix_counter;
mod get_address;
mod next_counter;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use fix_address::fix_address;
pub use fix_counter::fix_counter;
pub use get_address::get_address;
pub use next_counter::next_counter;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::cli::Context;
use crate::core::datastore::FsDatastore;
use crate::core::metadata::METADATA_NAMESPACE;
use crate::core::ops::lock::LockKind;
use crate::core::repo::Repo;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::FixCounter { set } => fix_counter::fix_counter(ctx, set),
        Command::NextCounter => next_counter::next_counter(ctx),
        Command::FixAddress { miner, address } => {
            fix_address::fix_address(ctx, &miner, address.as_deref())
        }
        Command::GetAddress => get_address::get_address(ctx),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Run `f` against the metadata namespace of the configured repository.
///
/// Opens the repository, takes the storage-miner lock, opens `/metadata`
/// and releases the lock afterwards, whether or not `f` succeeded.
pub(crate) fn with_metadata<T>(
    ctx: &Context,
    f: impl FnOnce(&FsDatastore) -> Result<T>,
) -> Result<T> {
    let repo = Repo::open(ctx.settings.repo_path.as_path()).context("Failed to open repository")?;
    let mut locked = repo
        .lock(LockKind::StorageMiner)
        .context("Failed to lock repository")?;

    let result = locked
        .datastore(METADATA_NAMESPACE)
        .context("Failed to open metadata namespace")
        .and_then(|mds| f(&mds));

    let released = locked.release();
    let value = result?;
    released.context("Failed to release repository lock")?;
    Ok(value)
}
