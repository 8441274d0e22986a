use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    core::{
        cycle::BillingPeriod,
        tariff::{SlabCapacity, Tariff, TariffSlab},
    },
    prelude::*,
};

/// Tariff and billing settings.
#[must_use]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub billing_months: BillingPeriod,

    #[serde(default)]
    pub capacity: SlabCapacity,

    #[serde(default)]
    pub slabs: Vec<TariffSlab>,
}

impl Config {
    /// Read the settings, falling back to the defaults when the file does not exist.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            warn!("configuration file not found, using the defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let this: Self =
            toml::from_str(&text).with_context(|| format!("failed to parse `{}`", path.display()))?;
        info!(billing_months = %this.billing_months, n_slabs = this.slabs.len(), "loaded the configuration");
        Ok(this)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn write_to(&self, path: &Path) -> Result {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write `{}`", path.display()))?;
        info!(n_slabs = self.slabs.len(), "saved the configuration");
        Ok(())
    }

    pub fn with_overrides(
        mut self,
        billing_months: Option<BillingPeriod>,
        capacity: Option<SlabCapacity>,
    ) -> Self {
        if let Some(billing_months) = billing_months {
            self.billing_months = billing_months;
        }
        if let Some(capacity) = capacity {
            self.capacity = capacity;
        }
        self
    }

    pub fn tariff(&self) -> Tariff {
        Tariff::new(self.slabs.iter().cloned(), self.capacity)
    }

    /// Append the placeholder slab after the last one.
    pub fn append_slab(&mut self) -> &TariffSlab {
        let order = self.tariff().next_order();
        self.slabs.push(TariffSlab::placeholder(order));
        &self.slabs[self.slabs.len() - 1]
    }

    /// Remove the first slab with the given order, `None` when there is no such slab.
    pub fn remove_slab(&mut self, order: i64) -> Option<TariffSlab> {
        let index = self.slabs.iter().position(|slab| slab.order == order)?;
        Some(self.slabs.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::quantity::energy::KilowattHours;

    // language=TOML
    const CONFIG: &str = r#"
        billing_months = 2
        capacity = "span"

        [[slabs]]
        min_units = 101
        rate_per_unit = 7.0
        slab_order = 2

        [[slabs]]
        id = "first"
        min_units = 0
        max_units = 100
        rate_per_unit = 5.0
        slab_order = 1
    "#;

    #[test]
    fn test_parse() -> Result {
        let config: Config = toml::from_str(CONFIG)?;
        assert_eq!(config.billing_months.months(), 2);
        assert_eq!(config.capacity, SlabCapacity::Span);
        let tariff = config.tariff();
        assert_eq!(tariff.slabs()[0].id.as_deref(), Some("first"));
        assert_abs_diff_eq!(tariff.cost(KilowattHours(150.0)).0, 850.0);
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result {
        let config: Config = toml::from_str("")?;
        assert_eq!(config.billing_months, BillingPeriod::MONTHLY);
        assert_eq!(config.capacity, SlabCapacity::Inclusive);
        assert!(config.slabs.is_empty());
        Ok(())
    }

    #[test]
    fn test_billing_months_out_of_range() {
        assert!(toml::from_str::<Config>("billing_months = 0").is_err());
        assert!(toml::from_str::<Config>("billing_months = 13").is_err());
        assert!(toml::from_str::<Config>("billing_months = 12").is_ok());
    }

    #[test]
    fn test_overrides() -> Result {
        let config = toml::from_str::<Config>(CONFIG)?
            .with_overrides(Some(BillingPeriod::try_from(6_u32)?), None);
        assert_eq!(config.billing_months.months(), 6);
        assert_eq!(config.capacity, SlabCapacity::Span);
        Ok(())
    }

    #[test]
    fn test_append_slab_round_trip() -> Result {
        let mut config: Config = toml::from_str(CONFIG)?;
        let slab = config.append_slab();
        assert_eq!(slab.order, 3);
        assert_eq!(slab.max_units, Some(KilowattHours(100.0)));

        let reparsed: Config = toml::from_str(&toml::to_string_pretty(&config)?)?;
        assert_eq!(reparsed.slabs, config.slabs);
        Ok(())
    }

    #[test]
    fn test_remove_slab() -> Result {
        let mut config: Config = toml::from_str(CONFIG)?;
        let removed = config.remove_slab(1).unwrap();
        assert_eq!(removed.id.as_deref(), Some("first"));
        assert_eq!(config.slabs.len(), 1);
        assert_eq!(config.remove_slab(1), None);
        assert_eq!(config.tariff().next_order(), 3);
        Ok(())
    }
}
