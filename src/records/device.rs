use std::path::Path;

use serde_json::Value;

use crate::{
    core::reading::{EnergyReading, ReadingTime},
    prelude::*,
    records::{reading::RawReading, switch::Switch},
};

/// Reply the firmware writes to the `Answer` key when it is alive.
const PRESENCE_REPLY: &str = "Am Here";

/// Device subtree of the realtime store.
#[must_use]
#[derive(Clone, Debug)]
pub struct DeviceSnapshot {
    pub switches: Vec<Switch>,

    /// Whether the store already holds switches, the defaults are shown otherwise.
    pub is_provisioned: bool,

    pub live: Option<EnergyReading>,
    pub is_online: bool,
}

impl DeviceSnapshot {
    /// Normalize the subtree, stamping the live reading with the receive time.
    pub fn from_value(node: &Value, received_at: ReadingTime) -> Self {
        let (switches, is_provisioned) = node
            .get("switches")
            .and_then(Switch::normalize_all)
            .map_or_else(|| (Switch::defaults(), false), |switches| (switches, true));
        let live = node
            .get("live")
            .filter(|live| live.is_object())
            .and_then(|live| serde_json::from_value::<RawReading>(live.clone()).ok())
            .map(|raw| raw.stamped(received_at));
        let is_online = node.get("Answer").and_then(Value::as_str) == Some(PRESENCE_REPLY);
        Self { switches, is_provisioned, live, is_online }
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path, received_at: ReadingTime) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let node: Value = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        let this = Self::from_value(&node, received_at);
        info!(
            n_switches = this.switches.len(),
            is_provisioned = this.is_provisioned,
            is_online = this.is_online,
            "loaded the device snapshot",
        );
        Ok(this)
    }
}
