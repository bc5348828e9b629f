//! Financial roll-ups over a farm's zone locks.
//!
//! Everything here is a pure function of the current lock list. Nothing is cached
//! or persisted; the summary is recomputed on every read.

use crate::core::{locks::ZoneLock, zones::round_half_up};
use serde::Serialize;
use std::collections::BTreeMap;

/// ROI as a percentage with one decimal place. Zero when there is no cost.
#[must_use]
pub fn roi_percent(net_profit: f64, total_cost: f64) -> f64 {
    if total_cost == 0.0 {
        return 0.0;
    }
    round_half_up(net_profit / total_cost * 1000.0) / 10.0
}

/// Area, cost and revenue summed over a group of locks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    /// Locked area in acres
    pub area: f64,
    /// Total estimated cost
    pub cost: f64,
    /// Total expected revenue
    pub revenue: f64,
    /// Revenue minus cost
    pub net_profit: f64,
    /// Return on investment in percent, one decimal place
    pub roi_percent: f64,
    /// Number of locks in the group
    pub zones: usize,
}

impl Totals {
    fn add(&mut self, lock: &ZoneLock) {
        self.area += lock.area;
        self.cost += lock.area * lock.estimated_cost_per_acre;
        self.revenue += lock.area * lock.expected_revenue_per_acre;
        self.zones += 1;
    }

    fn finish(mut self) -> Self {
        self.net_profit = self.revenue - self.cost;
        self.roi_percent = roi_percent(self.net_profit, self.cost);
        self
    }
}

/// Economics of a single locked zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneFinancials {
    /// Zone id
    pub zone_id: String,
    /// Crop planned for the zone
    pub crop: String,
    /// Zone area in acres
    pub area: f64,
    /// Estimated cost for the whole zone
    pub cost: f64,
    /// Expected revenue for the whole zone
    pub revenue: f64,
    /// Revenue minus cost
    pub profit: f64,
    /// Return on investment in percent, one decimal place
    pub roi_percent: f64,
}

impl From<&ZoneLock> for ZoneFinancials {
    fn from(lock: &ZoneLock) -> Self {
        let cost = lock.area * lock.estimated_cost_per_acre;
        let revenue = lock.area * lock.expected_revenue_per_acre;
        let profit = revenue - cost;
        Self {
            zone_id: lock.zone_id.clone(),
            crop: lock.crop.clone(),
            area: lock.area,
            cost,
            revenue,
            profit,
            roi_percent: roi_percent(profit, cost),
        }
    }
}

/// Summary, per-crop and per-zone views of a lock list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    /// Totals over every lock
    pub totals: Totals,
    /// Totals grouped by crop name
    pub by_crop: BTreeMap<String, Totals>,
    /// One entry per lock, in lock order
    pub by_zone: Vec<ZoneFinancials>,
}

/// Aggregates a lock list. An empty list yields all-zero totals.
#[must_use]
pub fn summarize(locks: &[ZoneLock]) -> FinancialSummary {
    let mut totals = Totals::default();
    let mut by_crop: BTreeMap<String, Totals> = BTreeMap::new();

    for lock in locks {
        totals.add(lock);
        by_crop.entry(lock.crop.clone()).or_default().add(lock);
    }

    FinancialSummary {
        totals: totals.finish(),
        by_crop: by_crop
            .into_iter()
            .map(|(crop, group)| (crop, group.finish()))
            .collect(),
        by_zone: locks.iter().map(ZoneFinancials::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn lock(zone_id: &str, crop: &str, area: f64, cost: f64, revenue: f64) -> ZoneLock {
        ZoneLock {
            zone_id: zone_id.to_string(),
            crop: crop.to_string(),
            area,
            estimated_cost_per_acre: cost,
            expected_revenue_per_acre: revenue,
        }
    }

    #[test]
    fn test_totals_over_two_locks() {
        let locks = vec![
            lock("zone_1", "Wheat", 2.0, 100.0, 300.0),
            lock("zone_2", "Rice", 3.0, 100.0, 200.0),
        ];
        let summary = summarize(&locks);

        assert_eq!(summary.totals.area, 5.0);
        assert_eq!(summary.totals.cost, 500.0);
        assert_eq!(summary.totals.revenue, 1200.0);
        assert_eq!(summary.totals.net_profit, 700.0);
        assert_eq!(summary.totals.roi_percent, 140.0);
        assert_eq!(summary.totals.zones, 2);
    }

    #[test]
    fn test_empty_lock_list_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.totals, Totals::default());
        assert!(summary.by_crop.is_empty());
        assert!(summary.by_zone.is_empty());
    }

    #[test]
    fn test_zero_cost_gives_zero_roi() {
        let summary = summarize(&[lock("zone_1", "Wheat", 2.0, 0.0, 300.0)]);
        assert_eq!(summary.totals.cost, 0.0);
        assert_eq!(summary.totals.roi_percent, 0.0);
        assert_eq!(summary.by_zone[0].roi_percent, 0.0);
        assert_eq!(roi_percent(123.0, 0.0), 0.0);
    }

    #[test]
    fn test_roi_has_one_decimal() {
        // 100 / 300 = 33.333...%
        assert_eq!(roi_percent(100.0, 300.0), 33.3);
        // 200 / 300 = 66.666...%
        assert_eq!(roi_percent(200.0, 300.0), 66.7);
        assert_eq!(roi_percent(-150.0, 300.0), -50.0);
    }

    #[test]
    fn test_grouping_by_crop() {
        let locks = vec![
            lock("zone_1", "Wheat", 2.0, 100.0, 300.0),
            lock("zone_2", "Rice", 3.0, 100.0, 200.0),
            lock("zone_3", "Wheat", 1.0, 50.0, 50.0),
        ];
        let summary = summarize(&locks);

        assert_eq!(summary.by_crop.len(), 2);
        let wheat = &summary.by_crop["Wheat"];
        assert_eq!(wheat.area, 3.0);
        assert_eq!(wheat.cost, 250.0);
        assert_eq!(wheat.revenue, 650.0);
        assert_eq!(wheat.net_profit, 400.0);
        assert_eq!(wheat.roi_percent, 160.0);
        assert_eq!(wheat.zones, 2);

        let rice = &summary.by_crop["Rice"];
        assert_eq!(rice.net_profit, 300.0);
        assert_eq!(rice.roi_percent, 100.0);

        let crops: Vec<&String> = summary.by_crop.keys().collect();
        assert_eq!(crops, vec!["Rice", "Wheat"]);
    }

    #[test]
    fn test_per_zone_view() {
        let locks = vec![
            lock("zone_1", "Wheat", 2.0, 100.0, 300.0),
            lock("zone_2", "Rice", 3.0, 100.0, 50.0),
        ];
        let summary = summarize(&locks);

        assert_eq!(summary.by_zone.len(), 2);
        let first = &summary.by_zone[0];
        assert_eq!(first.zone_id, "zone_1");
        assert_eq!(first.cost, 200.0);
        assert_eq!(first.revenue, 600.0);
        assert_eq!(first.profit, 400.0);
        assert_eq!(first.roi_percent, 200.0);

        let second = &summary.by_zone[1];
        assert_eq!(second.profit, -150.0);
        assert_eq!(second.roi_percent, -50.0);
    }
}
