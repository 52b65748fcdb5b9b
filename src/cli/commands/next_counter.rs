//! next-counter command - Allocate one sector number

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::with_metadata;
use crate::cli::Context;
use crate::core::metadata::{storage_counter_key, StoredCounter};
use crate::ui::output;

#[derive(Debug, Serialize)]
struct Allocation {
    key: String,
    sector_number: u64,
}

/// Allocate the next sector number and print it.
pub fn next_counter(ctx: &Context) -> Result<()> {
    let allocation = with_metadata(ctx, |mds| {
        let counter = StoredCounter::new(mds, storage_counter_key());
        let sector = counter
            .next_sector()
            .context("Failed to allocate sector number")?;
        Ok(Allocation {
            key: counter.key().to_string(),
            sector_number: sector.0,
        })
    })?;

    output::report(ctx.verbosity, allocation.sector_number, &allocation)
}
