//! get-address command - Print the stored miner address

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::with_metadata;
use crate::cli::Context;
use crate::core::metadata::{miner_address_key, MinerAddressRecord};
use crate::ui::output;

#[derive(Debug, Serialize)]
struct AddressReport {
    key: String,
    address: String,
    protocol: String,
    bytes: String,
}

/// Read, decode and print the miner address.
pub fn get_address(ctx: &Context) -> Result<()> {
    let report = with_metadata(ctx, |mds| {
        let record = MinerAddressRecord::new(mds, miner_address_key());
        let address = record.get().context("Failed to read miner address")?;
        Ok(AddressReport {
            key: record.key().to_string(),
            address: address.to_string_with(ctx.settings.network),
            protocol: address.protocol().to_string(),
            bytes: hex::encode(address.to_bytes()),
        })
    })?;

    output::report(ctx.verbosity, &report.address, &report)
}
