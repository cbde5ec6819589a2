//! Clock offset resolution from shared sync pulses.
//!
//! Both devices receive the same sync pulse train. On the amplifier the pulses
//! show up as small trigger steps; the eye tracker logs them as sync port records
//! with direction "out". The offset of each stream is the timestamp of the
//! reference pulse on that stream's clock.

use contracts::{
    ClockOffsets, ContractError, EdgePolarity, EventRecord, OffsetOverrides, SecondaryConfig,
    StreamOffset, SyncConfig,
};
use tracing::{debug, info};

pub const PRIMARY_STREAM: &str = "primary";
pub const SECONDARY_STREAM: &str = "secondary";

/// Locates the reference sync pulse on both clocks
#[derive(Debug, Clone)]
pub struct OffsetResolver {
    sync: SyncConfig,
    /// Tracker lag in its native unit
    secondary_lag: f64,
}

impl OffsetResolver {
    pub fn new(sync: &SyncConfig, secondary: &SecondaryConfig) -> Self {
        Self {
            secondary_lag: secondary.lag_in_native_unit(sync),
            sync: sync.clone(),
        }
    }

    /// Indices `i` of sync-class transitions between `trigger[i]` and `trigger[i + 1]`
    pub fn sync_edges(&self, trigger: &[f64]) -> Vec<usize> {
        trigger
            .windows(2)
            .enumerate()
            .filter_map(|(i, w)| self.is_sync_step(w[1] - w[0]).then_some(i))
            .collect()
    }

    fn is_sync_step(&self, step: f64) -> bool {
        let magnitude = match self.sync.polarity {
            EdgePolarity::Rising => step,
            EdgePolarity::Any => step.abs(),
        };
        magnitude > self.sync.min_step && magnitude < self.sync.max_step
    }

    /// Offset of the primary stream: time of the reference sync edge
    pub fn resolve_primary(&self, time: &[f64], trigger: &[f64]) -> Result<StreamOffset, ContractError> {
        let edges = self.sync_edges(trigger);
        let wanted = self.sync.reference_pulse_index;
        let index = edges.get(wanted).copied().ok_or_else(|| {
            ContractError::sync_not_found(
                PRIMARY_STREAM,
                format!(
                    "need sync edge #{} (steps in ({}, {})), found {} edge(s)",
                    wanted + 1,
                    self.sync.min_step,
                    self.sync.max_step,
                    edges.len()
                ),
            )
        })?;

        let value = time.get(index).copied().ok_or_else(|| {
            ContractError::invalid_input(
                PRIMARY_STREAM,
                format!("sync edge at sample {index} lies outside the time axis"),
            )
        })?;

        debug!(edges = edges.len(), sample = index, offset = value, "primary sync edge located");
        Ok(StreamOffset::resolved(value))
    }

    /// Offset of the secondary stream: first outgoing sync record plus the lag
    pub fn resolve_secondary(&self, records: &[EventRecord]) -> Result<StreamOffset, ContractError> {
        let first = records
            .iter()
            .find(|r| r.is_outgoing_sync())
            .ok_or_else(|| {
                ContractError::sync_not_found(
                    SECONDARY_STREAM,
                    format!("no outgoing sync record among {} record(s)", records.len()),
                )
            })?;

        Ok(StreamOffset::resolved(first.ts + self.secondary_lag))
    }

    /// Offsets of both streams, manual overrides taking precedence
    ///
    /// Streams with an override are never searched, so a missing sync pulse on
    /// an overridden stream is not an error.
    pub fn resolve(
        &self,
        time: &[f64],
        trigger: &[f64],
        secondary: Option<&[EventRecord]>,
        overrides: &OffsetOverrides,
    ) -> Result<ClockOffsets, ContractError> {
        let primary = match overrides.primary {
            Some(value) => StreamOffset::manual(value),
            None => self.resolve_primary(time, trigger)?,
        };

        let secondary = match (overrides.secondary, secondary) {
            (Some(value), _) => StreamOffset::manual(value),
            (None, Some(records)) => self.resolve_secondary(records)?,
            (None, None) => StreamOffset::unused(),
        };

        info!(
            primary = primary.value,
            primary_source = ?primary.source,
            secondary = secondary.value,
            secondary_source = ?secondary.source,
            "clock offsets resolved"
        );
        Ok(ClockOffsets { primary, secondary })
    }
}
