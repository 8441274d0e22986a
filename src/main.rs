mod cli;
mod tables;

use chrono::Local;
use clap::{Parser, crate_version};

use powerbill::{
    config::Config,
    core::{
        consumption::Consumption,
        cycle::BillingCycle,
        reading::ReadingTime,
        summary::DailySummary,
        tariff::Tariff,
    },
    prelude::*,
    records::{device::DeviceSnapshot, history::History},
};

use crate::{
    cli::{
        Args,
        BillArgs,
        Command,
        CycleArgs,
        DayArgs,
        DeviceArgs,
        EstimateArgs,
        TariffArgs,
        TariffCommand,
    },
    tables::{
        build_breakdown_table,
        build_cycle_table,
        build_live_table,
        build_summary_table,
        build_switches_table,
        build_tariff_table,
    },
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Bill(args) => bill(&args)?,
        Command::Cycle(args) => cycle(&args)?,
        Command::Day(args) => day(&args)?,
        Command::Estimate(args) => estimate(&args)?,
        Command::Device(args) => device(&args)?,
        Command::Tariff(args) => tariff(&args)?,
    }

    info!("done!");
    Ok(())
}

/// Build the tariff and complain about the configuration smells, if any.
fn checked_tariff(config: &Config) -> Tariff {
    let tariff = config.tariff();
    if tariff.slabs().is_empty() {
        warn!("no tariff slabs configured, every bill is zero");
    }
    for issue in tariff.lint() {
        warn!(%issue, "suspicious tariff");
    }
    tariff
}

#[instrument(skip_all, fields(units = %args.units))]
fn bill(args: &BillArgs) -> Result {
    let tariff = checked_tariff(&args.config.load()?);
    let breakdown = tariff.breakdown(args.units);
    println!("{}", build_breakdown_table(&breakdown));
    info!(cost = ?tariff.cost(args.units), "priced");
    Ok(())
}

#[instrument(skip_all)]
fn cycle(args: &CycleArgs) -> Result {
    let config = args.config.load()?;
    let today = args.dates.today();
    let cycle = BillingCycle::containing(args.dates.selected(), config.billing_months)
        .shift_by(args.offset)
        .context("the offset leaves the supported calendar range")?;
    println!("{cycle}");
    info!(
        ?cycle,
        n_days = cycle.n_days(),
        is_current = cycle.is_current(today),
        selected = %cycle.clamp(args.dates.selected(), today),
        "resolved",
    );
    Ok(())
}

#[instrument(skip_all)]
fn day(args: &DayArgs) -> Result {
    let history = History::read_from(&args.history.history_path)?;
    let date = args.dates.selected();
    let summary = DailySummary::from_readings(history.day(date));
    if summary.n_samples == 0 {
        warn!(%date, "no readings for the day");
    }
    println!("{}", build_summary_table(&summary));
    Ok(())
}

#[instrument(skip_all)]
fn estimate(args: &EstimateArgs) -> Result {
    let config = args.config.load()?;
    let tariff = checked_tariff(&config);
    let history = History::read_from(&args.history.history_path)?;

    let today = args.dates.today();
    let cycle = BillingCycle::containing(args.dates.selected(), config.billing_months)
        .shift_by(args.offset)
        .context("the offset leaves the supported calendar range")?;
    let selected = cycle.clamp(args.dates.selected(), today);
    info!(?cycle, %selected, %today, "resolved the cycle");

    let selected_summary = DailySummary::from_readings(history.day(selected));
    let energy = if args.walk {
        history.walk(cycle.start, cycle.effective_end(today))
    } else {
        history.cycle_boundaries(&cycle, today).consumption()
    };
    let consumption = Consumption::priced(energy, &tariff);

    println!(
        "{}",
        build_cycle_table(&cycle, cycle.is_current(today), &selected_summary, &consumption)
    );
    println!("{}", build_breakdown_table(&tariff.breakdown(energy)));
    Ok(())
}

#[instrument(skip_all)]
fn device(args: &DeviceArgs) -> Result {
    let received_at = ReadingTime::Clock(Local::now().format("%H:%M:%S").to_string());
    let snapshot = DeviceSnapshot::read_from(&args.snapshot_path, received_at)?;
    if !snapshot.is_provisioned {
        warn!("the device has no switches yet, showing the defaults");
    }
    println!("{}", build_live_table(&snapshot));
    println!("{}", build_switches_table(&snapshot.switches));
    Ok(())
}

#[instrument(skip_all)]
fn tariff(args: &TariffArgs) -> Result {
    let mut config = args.config.load()?;
    match args.command {
        TariffCommand::Show => {
            println!("{}", build_tariff_table(&config.tariff()));
        }
        TariffCommand::Lint => {
            let issues = config.tariff().lint();
            for issue in &issues {
                warn!(%issue, "suspicious tariff");
            }
            ensure!(issues.is_empty(), "{} tariff issue(s) found", issues.len());
            info!("the slabs tile the unit axis");
        }
        TariffCommand::Add => {
            let slab = config.append_slab();
            info!(order = slab.order, "appended a slab");
            config.write_to(&args.config.config_path)?;
            println!("{}", build_tariff_table(&config.tariff()));
        }
        TariffCommand::Remove { order } => {
            let slab = config.remove_slab(order).with_context(|| format!("no slab #{order}"))?;
            info!(order = slab.order, rate_per_unit = %slab.rate_per_unit, "removed a slab");
            config.write_to(&args.config.config_path)?;
            println!("{}", build_tariff_table(&config.tariff()));
        }
    }
    Ok(())
}
