//! fix-address command - Replace the stored miner address

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use super::with_metadata;
use crate::cli::Context;
use crate::core::address::{Address, Protocol};
use crate::core::config::ENV_OWNER_ADDRESS;
use crate::core::metadata::{miner_address_key, parse_address, MinerAddressRecord, MinerRecordError};
use crate::ui::output;

#[derive(Debug, Serialize)]
struct AddressFix {
    key: String,
    miner: String,
    previous: Option<String>,
    address: String,
}

/// Validate `miner` and `address`, then store `address` as the miner address.
///
/// The record normally holds `miner` itself; `address` may name a key or
/// actor address instead, and falls back to the configured owner address
/// (parsed here, not at config load). Nothing is written unless both
/// inputs are valid.
pub fn fix_address(ctx: &Context, miner: &str, address: Option<&str>) -> Result<()> {
    let network = ctx.settings.network;
    let miner_id = parse_input(ctx, miner)?;
    if miner_id.protocol() != Protocol::Id {
        bail!(
            "Miner id must be an id address like {}, got '{}'",
            Address::Id(1000).to_string_with(network),
            miner
        );
    }

    let address = match address.or(ctx.settings.owner_address.as_deref()) {
        Some(raw) => parse_input(ctx, raw)?,
        None => bail!(
            "No address given and no owner address configured (set {} or owner_address)",
            ENV_OWNER_ADDRESS
        ),
    };
    if address.protocol() == Protocol::Id && address != miner_id {
        bail!(
            "Address {} is an id address but does not match miner {}",
            address.to_string_with(network),
            miner_id.to_string_with(network)
        );
    }

    let fix = with_metadata(ctx, |mds| {
        let record = MinerAddressRecord::new(mds, miner_address_key());
        let previous = match record.get() {
            Ok(addr) => Some(addr.to_string_with(network)),
            Err(MinerRecordError::NotFound(_)) => None,
            Err(MinerRecordError::Decode(e)) => {
                tracing::warn!(error = %e, "replacing corrupt miner address");
                let bytes = record.raw().context("Failed to read miner address")?;
                Some(format!("<corrupt: {}>", hex::encode(bytes.unwrap_or_default())))
            }
            Err(e) => return Err(e).context("Failed to read miner address"),
        };

        record
            .set(&address)
            .context("Failed to write miner address")?;

        Ok(AddressFix {
            key: record.key().to_string(),
            miner: miner_id.to_string_with(network),
            previous,
            address: address.to_string_with(network),
        })
    })?;

    let text = format!(
        "miner address ({}) for {}: {} -> {}",
        fix.key,
        fix.miner,
        fix.previous.as_deref().unwrap_or("unset"),
        fix.address
    );
    output::report(ctx.verbosity, text, &fix)
}

/// Parse a command-line address, warning when it names another network.
fn parse_input(ctx: &Context, raw: &str) -> Result<Address> {
    let (network, address) = parse_address(raw)?;
    if network != ctx.settings.network {
        output::warn(
            format!(
                "'{}' is a {} address; this invocation renders {} addresses",
                raw, network, ctx.settings.network
            ),
            ctx.verbosity,
        );
    }
    Ok(address)
}
