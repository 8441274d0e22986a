use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use powerbill::{
    core::{
        consumption::Consumption,
        cycle::BillingCycle,
        summary::DailySummary,
        tariff::{SlabCharge, Tariff},
    },
    quantity::cost::Cost,
    records::{device::DeviceSnapshot, switch::Switch},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

#[must_use]
pub fn build_tariff_table(tariff: &Tariff) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Order", "From", "To", "Rate", "Capacity"]);
    for slab in tariff.slabs() {
        table.add_row(vec![
            Cell::new(slab.order).add_attribute(Attribute::Dim),
            Cell::new(format!("{:.3}", slab.min_units)).set_alignment(CellAlignment::Right),
            slab.max_units.map_or_else(
                || Cell::new("∞").set_alignment(CellAlignment::Right),
                |max_units| Cell::new(format!("{max_units:.3}")).set_alignment(CellAlignment::Right),
            ),
            Cell::new(format!("{:.2}", slab.rate_per_unit)).set_alignment(CellAlignment::Right),
            slab.capacity(tariff.capacity_rule()).map_or_else(
                || Cell::new("unbounded").fg(Color::DarkYellow),
                |capacity| Cell::new(format!("{capacity:.3}")).set_alignment(CellAlignment::Right),
            ),
        ]);
    }
    table
}

#[must_use]
pub fn build_breakdown_table(charges: &[SlabCharge]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Slab", "Units", "Rate", "Cost"]);
    for charge in charges {
        table.add_row(vec![
            Cell::new(charge.order).add_attribute(Attribute::Dim),
            Cell::new(format!("{:.3}", charge.units)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", charge.rate)).set_alignment(CellAlignment::Right),
            Cell::new(charge.cost).set_alignment(CellAlignment::Right),
        ]);
    }
    let total = charges.iter().map(|charge| charge.cost).sum::<Cost>();
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(total).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
    ]);
    table
}

#[must_use]
pub fn build_summary_table(summary: &DailySummary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Samples", "First", "Last", "Consumption", "Mean power", "Peak power"]);
    table.add_row(vec![
        Cell::new(summary.n_samples),
        Cell::new(summary.first_at.as_ref().map_or_else(String::new, ToString::to_string)),
        Cell::new(summary.last_at.as_ref().map_or_else(String::new, ToString::to_string)),
        Cell::new(format!("{:.3}", summary.consumption)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.1}", summary.average_power)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.1}", summary.peak_power)).set_alignment(CellAlignment::Right),
    ]);
    table
}

/// Cycle overview: the range, the selected day, and what both consumed.
#[must_use]
pub fn build_cycle_table(
    cycle: &BillingCycle,
    is_current: bool,
    selected: &DailySummary,
    consumption: &Consumption,
) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Cycle", "Months", "Days", "Selected day", "Cycle usage", "Bill"]);
    table.add_row(vec![
        Cell::new(cycle).fg(if is_current { Color::Green } else { Color::Reset }),
        Cell::new(cycle.length),
        Cell::new(cycle.n_days()),
        Cell::new(format!("{:.3}", selected.consumption)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.3}", consumption.energy)).set_alignment(CellAlignment::Right),
        Cell::new(consumption.cost).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
    ]);
    table
}

#[must_use]
pub fn build_switches_table(switches: &[Switch]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "#", "Name", "Type", "State", "Updated"]);
    for switch in switches {
        table.add_row(vec![
            Cell::new(&switch.id).add_attribute(Attribute::Dim),
            Cell::new(switch.switch_number.map_or_else(String::new, |number| number.to_string())),
            Cell::new(&switch.name),
            Cell::new(&switch.device_type),
            if switch.is_on { Cell::new("on").fg(Color::Green) } else { Cell::new("off").fg(Color::Red) },
            Cell::new(switch.updated_at.map_or_else(String::new, |at| at.to_rfc3339())),
        ]);
    }
    table
}

#[must_use]
pub fn build_live_table(snapshot: &DeviceSnapshot) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Status", "Received", "Voltage", "Current", "Power", "Energy"]);
    let status = if snapshot.is_online {
        Cell::new("online").fg(Color::Green)
    } else {
        Cell::new("offline").fg(Color::Red)
    };
    match &snapshot.live {
        Some(live) => table.add_row(vec![
            status,
            Cell::new(&live.time),
            Cell::new(format!("{:.1}", live.voltage)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", live.current)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}", live.power)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", live.energy)).set_alignment(CellAlignment::Right),
        ]),
        None => table.add_row(vec![status, Cell::new("no live reading").add_attribute(Attribute::Dim)]),
    };
    table
}
