//! fix-counter command - Inspect or repair the sector-number counter

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::with_metadata;
use crate::cli::Context;
use crate::core::metadata::{storage_counter_key, CounterError, StoredCounter};
use crate::ui::output;

/// Counter state as reported to the user.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
enum CounterState {
    Unset,
    Value { value: u64 },
    Corrupt { len: usize },
}

impl std::fmt::Display for CounterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CounterState::Unset => f.write_str("unset"),
            CounterState::Value { value } => write!(f, "{}", value),
            CounterState::Corrupt { len } => write!(f, "<corrupt: {} bytes>", len),
        }
    }
}

#[derive(Debug, Serialize)]
struct CounterReport {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<CounterState>,
    current: CounterState,
}

/// Print the counter, or overwrite it when `set` is given.
///
/// Without `set` nothing is written and a corrupt counter is an error.
/// With `set` a corrupt previous value is reported and replaced.
pub fn fix_counter(ctx: &Context, set: Option<u64>) -> Result<()> {
    let report = with_metadata(ctx, |mds| {
        let counter = StoredCounter::new(mds, storage_counter_key());
        let key = counter.key().to_string();

        match set {
            None => {
                let current = counter
                    .peek()
                    .context("Failed to read sector counter; repair it with 'fix-counter --set <N>'")?;
                Ok(CounterReport {
                    key,
                    previous: None,
                    current: current.map_or(CounterState::Unset, |value| CounterState::Value { value }),
                })
            }
            Some(value) => {
                let previous = match counter.peek() {
                    Ok(Some(v)) => CounterState::Value { value: v },
                    Ok(None) => CounterState::Unset,
                    Err(CounterError::Decode { len, .. }) => CounterState::Corrupt { len },
                    Err(e) => return Err(e).context("Failed to read sector counter"),
                };
                counter
                    .overwrite(value)
                    .context("Failed to overwrite sector counter")?;
                Ok(CounterReport {
                    key,
                    previous: Some(previous),
                    current: CounterState::Value { value },
                })
            }
        }
    })?;

    let text = match &report.previous {
        Some(previous) => format!(
            "sector counter ({}): {} -> {}",
            report.key, previous, report.current
        ),
        None => format!("sector counter ({}): {}", report.key, report.current),
    };
    output::report(ctx.verbosity, text, &report)
}
