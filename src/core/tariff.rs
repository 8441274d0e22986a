use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate};

/// One slab of a progressive tariff.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bon::Builder)]
pub struct TariffSlab {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Inclusive.
    #[builder(into)]
    pub min_units: KilowattHours,

    /// Inclusive, `None` is unbounded.
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_units: Option<KilowattHours>,

    #[builder(into)]
    pub rate_per_unit: KilowattHourRate,

    #[serde(rename = "slab_order", alias = "order")]
    pub order: i64,
}

impl TariffSlab {
    /// Default slab appended by the settings page.
    pub const fn placeholder(order: i64) -> Self {
        Self {
            id: None,
            min_units: KilowattHours(0.0),
            max_units: Some(KilowattHours(100.0)),
            rate_per_unit: KilowattHourRate(0.0),
            order,
        }
    }

    /// Number of units the slab can hold, `None` for an unbounded slab.
    #[must_use]
    pub fn capacity(&self, rule: SlabCapacity) -> Option<KilowattHours> {
        let max_units = self.max_units?;
        Some(match rule {
            SlabCapacity::Inclusive => max_units - self.min_units + KilowattHours(1.0),
            SlabCapacity::Span => max_units - self.min_units,
        })
    }
}

/// How a bounded slab's capacity is derived from its bounds.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SlabCapacity {
    /// `max - min + 1`: both bounds count as whole units.
    #[default]
    Inclusive,

    /// `max - min`: the bounds delimit a continuous range.
    Span,
}

/// Units billed within a single slab.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlabCharge {
    pub order: i64,
    pub units: KilowattHours,
    pub rate: KilowattHourRate,
    pub cost: Cost,
}

/// Configuration smell found by [`Tariff::lint`].
#[derive(Clone, Debug, PartialEq)]
pub enum SlabIssue {
    FirstSlabNotAtZero { order: i64, min_units: KilowattHours },
    InvertedBounds { order: i64 },
    Gap { after: i64, before: i64, missing: KilowattHours },
    Overlap { after: i64, before: i64, overlapping: KilowattHours },
    UnboundedNotLast { order: i64 },
}

impl Display for SlabIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstSlabNotAtZero { order, min_units } => {
                write!(f, "slab #{order} is the first one but starts at {min_units}")
            }
            Self::InvertedBounds { order } => {
                write!(f, "slab #{order} has its upper bound below the lower one")
            }
            Self::Gap { after, before, missing } => {
                write!(f, "{missing} are not covered between slabs #{after} and #{before}")
            }
            Self::Overlap { after, before, overlapping } => {
                write!(f, "slabs #{after} and #{before} overlap by {overlapping}")
            }
            Self::UnboundedNotLast { order } => {
                write!(f, "slab #{order} is unbounded but followed by other slabs")
            }
        }
    }
}

/// Progressive tariff: each slab's rate applies only to the units falling inside the slab.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct Tariff {
    slabs: Vec<TariffSlab>,
    capacity: SlabCapacity,
}

impl Tariff {
    /// Build the tariff, sorting the slabs by their order.
    ///
    /// The sort is stable, slabs with equal orders keep their relative position.
    pub fn new(slabs: impl IntoIterator<Item = TariffSlab>, capacity: SlabCapacity) -> Self {
        let slabs = slabs.into_iter().sorted_by_key(|slab| slab.order).collect();
        Self { slabs, capacity }
    }

    #[must_use]
    pub fn slabs(&self) -> &[TariffSlab] {
        &self.slabs
    }

    #[must_use]
    pub const fn capacity_rule(&self) -> SlabCapacity {
        self.capacity
    }

    /// Walk the slabs in order and bill each one its share of `total_units`.
    ///
    /// Units beyond the last bounded slab are dropped when there is no unbounded slab.
    /// Non-positive totals produce an empty breakdown.
    pub fn breakdown(&self, total_units: KilowattHours) -> Vec<SlabCharge> {
        let mut remaining = total_units;
        let mut charges = Vec::new();
        for slab in &self.slabs {
            if remaining <= KilowattHours::ZERO {
                break;
            }
            let units = slab.capacity(self.capacity).map_or(remaining, |capacity| remaining.min(capacity));
            charges.push(SlabCharge {
                order: slab.order,
                units,
                rate: slab.rate_per_unit,
                cost: units * slab.rate_per_unit,
            });
            remaining -= units;
        }
        charges
    }

    pub fn cost(&self, total_units: KilowattHours) -> Cost {
        self.breakdown(total_units).into_iter().map(|charge| charge.cost).sum()
    }

    /// Order to assign to a newly appended slab.
    #[must_use]
    pub fn next_order(&self) -> i64 {
        self.slabs.iter().map(|slab| slab.order).fold(0, i64::max) + 1
    }

    /// Report tiling problems without correcting anything.
    #[must_use]
    pub fn lint(&self) -> Vec<SlabIssue> {
        let mut issues = Vec::new();

        if let Some(first) = self.slabs.first()
            && first.min_units != KilowattHours::ZERO
        {
            issues.push(SlabIssue::FirstSlabNotAtZero {
                order: first.order,
                min_units: first.min_units,
            });
        }

        for slab in &self.slabs {
            if let Some(max_units) = slab.max_units
                && max_units < slab.min_units
            {
                issues.push(SlabIssue::InvertedBounds { order: slab.order });
            }
        }

        for (left, right) in self.slabs.iter().tuple_windows() {
            let Some(left_max) = left.max_units else {
                issues.push(SlabIssue::UnboundedNotLast { order: left.order });
                continue;
            };
            let expected_min = match self.capacity {
                SlabCapacity::Inclusive => left_max + KilowattHours(1.0),
                SlabCapacity::Span => left_max,
            };
            if right.min_units > expected_min {
                issues.push(SlabIssue::Gap {
                    after: left.order,
                    before: right.order,
                    missing: right.min_units - expected_min,
                });
            } else if right.min_units < expected_min {
                issues.push(SlabIssue::Overlap {
                    after: left.order,
                    before: right.order,
                    overlapping: expected_min - right.min_units,
                });
            }
        }

        issues
    }
}

/// Cost of `total_units` under `slabs`, with the literal inclusive slab capacity.
pub fn compute_cost(total_units: KilowattHours, slabs: &[TariffSlab]) -> Cost {
    Tariff::new(slabs.iter().cloned(), SlabCapacity::Inclusive).cost(total_units)
}
