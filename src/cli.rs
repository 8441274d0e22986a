use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use powerbill::{
    config::Config,
    core::{cycle::BillingPeriod, tariff::SlabCapacity},
    prelude::*,
    quantity::energy::KilowattHours,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Price the given amount of energy.
    Bill(BillArgs),

    /// Show the billing cycle containing a date.
    Cycle(CycleArgs),

    /// Summarize one day of readings.
    Day(DayArgs),

    /// Estimate consumption and the bill for a billing cycle.
    Estimate(EstimateArgs),

    /// Show the switches and the live reading of a device.
    Device(DeviceArgs),

    /// Inspect or extend the tariff slabs.
    Tariff(TariffArgs),
}

#[derive(Parser)]
pub struct ConfigArgs {
    #[clap(long = "config", env = "POWERBILL_CONFIG", default_value = "powerbill.toml")]
    pub config_path: PathBuf,

    /// Override the billing cycle length in months.
    #[clap(long = "billing-months", env = "BILLING_MONTHS")]
    pub billing_months: Option<BillingPeriod>,

    /// Override how a bounded slab's capacity is derived.
    #[clap(long = "capacity", env = "SLAB_CAPACITY")]
    pub capacity: Option<SlabCapacity>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<Config> {
        Ok(Config::read_from(&self.config_path)?.with_overrides(self.billing_months, self.capacity))
    }
}

#[derive(Parser)]
pub struct DateArgs {
    /// Selected day, defaults to today.
    #[clap(long)]
    pub date: Option<NaiveDate>,

    /// Pretend that today is the given date.
    #[clap(long, env = "TODAY")]
    pub today: Option<NaiveDate>,
}

impl DateArgs {
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    #[must_use]
    pub fn selected(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| self.today())
    }
}

#[derive(Parser)]
pub struct BillArgs {
    /// Consumed energy in kilowatt-hours.
    #[clap(long, allow_negative_numbers = true)]
    pub units: KilowattHours,

    #[clap(flatten)]
    pub config: ConfigArgs,
}

#[derive(Parser)]
pub struct CycleArgs {
    #[clap(flatten)]
    pub dates: DateArgs,

    /// Number of cycles to move, negative values go back in time.
    #[clap(long, default_value = "0", allow_negative_numbers = true)]
    pub offset: i32,

    #[clap(flatten)]
    pub config: ConfigArgs,
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Exported readings: a JSON object keyed by `YYYY-MM-DD`.
    #[clap(long = "history", env = "HISTORY_PATH", default_value = "history.json")]
    pub history_path: PathBuf,
}

#[derive(Parser)]
pub struct DayArgs {
    #[clap(flatten)]
    pub dates: DateArgs,

    #[clap(flatten)]
    pub history: HistoryArgs,
}

#[derive(Parser)]
pub struct EstimateArgs {
    #[clap(flatten)]
    pub dates: DateArgs,

    /// Number of cycles to move from the one containing the selected day.
    #[clap(long, default_value = "0", allow_negative_numbers = true)]
    pub offset: i32,

    /// Walk every sample of the cycle instead of trusting the two boundary readings.
    #[clap(long)]
    pub walk: bool,

    #[clap(flatten)]
    pub history: HistoryArgs,

    #[clap(flatten)]
    pub config: ConfigArgs,
}

#[derive(Parser)]
pub struct DeviceArgs {
    /// Exported `devices/<name>` subtree of the realtime store.
    #[clap(long = "snapshot", env = "DEVICE_SNAPSHOT_PATH", default_value = "device.json")]
    pub snapshot_path: PathBuf,
}

#[derive(Parser)]
pub struct TariffArgs {
    #[command(subcommand)]
    pub command: TariffCommand,

    #[clap(flatten)]
    pub config: ConfigArgs,
}

#[derive(Subcommand)]
pub enum TariffCommand {
    /// Print the slabs in billing order.
    Show,

    /// Report gaps, overlaps, and other tiling problems.
    Lint,

    /// Append a placeholder slab and save the configuration.
    Add,

    /// Remove a slab and save the configuration.
    Remove {
        /// Order of the slab to remove.
        #[clap(long, allow_negative_numbers = true)]
        order: i64,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_estimate() {
        let args = Args::try_parse_from([
            "powerbill",
            "estimate",
            "--date",
            "2024-07-15",
            "--offset",
            "-1",
            "--walk",
            "--billing-months",
            "2",
            "--capacity",
            "span",
        ])
        .unwrap();
        let Command::Estimate(args) = args.command else { panic!("expected `estimate`") };
        assert_eq!(args.dates.selected(), NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        assert_eq!(args.offset, -1);
        assert!(args.walk);
        assert_eq!(args.config.billing_months.map(BillingPeriod::months), Some(2));
        assert_eq!(args.config.capacity, Some(SlabCapacity::Span));
    }

    #[test]
    fn test_parse_tariff_remove() {
        let args = Args::try_parse_from(["powerbill", "tariff", "remove", "--order", "2"]).unwrap();
        let Command::Tariff(args) = args.command else { panic!("expected `tariff`") };
        assert!(matches!(args.command, TariffCommand::Remove { order: 2 }));
    }

    #[test]
    fn test_billing_months_out_of_range() {
        assert!(Args::try_parse_from(["powerbill", "cycle", "--billing-months", "13"]).is_err());
    }
}
