use crate::entity::{MachineStatus, OptimizationStatus};
use crate::state::Snapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Headline figures for the dashboard cards
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub latest_production_rate: Option<f64>,
    pub latest_energy_usage: Option<f64>,
    /// Mean machine efficiency, 0 with no machines
    pub average_efficiency: f64,
    /// Machines in warning or critical status
    pub machines_needing_attention: usize,
    pub unread_notifications: usize,
    pub pending_optimizations: usize,
    /// Approved or implemented
    pub approved_optimizations: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaintenanceSummary {
    pub total: usize,
    pub operational: usize,
    pub needing_attention: usize,
    pub in_maintenance: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SustainabilitySummary {
    /// kg
    pub total_co2_reduction: f64,
    /// kWh
    pub total_energy_saved: f64,
    /// Percent, 0 with no samples
    pub average_efficiency_gain: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FactorySummary {
    pub revision: u64,
    pub dashboard: DashboardSummary,
    pub maintenance: MaintenanceSummary,
    pub sustainability: SustainabilitySummary,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

impl Snapshot {
    pub fn dashboard_summary(&self) -> DashboardSummary {
        let latest = self.latest_production();
        DashboardSummary {
            latest_production_rate: latest.map(|s| s.production_rate),
            latest_energy_usage: latest.map(|s| s.energy_usage),
            average_efficiency: mean(self.machines.iter().map(|m| m.efficiency)),
            machines_needing_attention: self
                .machines
                .iter()
                .filter(|m| m.status.needs_attention())
                .count(),
            unread_notifications: self.notifications.iter().filter(|n| !n.read).count(),
            pending_optimizations: self
                .optimizations
                .iter()
                .filter(|o| o.status == OptimizationStatus::Pending)
                .count(),
            approved_optimizations: self
                .optimizations
                .iter()
                .filter(|o| {
                    matches!(
                        o.status,
                        OptimizationStatus::Approved | OptimizationStatus::Implemented
                    )
                })
                .count(),
        }
    }

    pub fn maintenance_summary(&self) -> MaintenanceSummary {
        let count = |status: MachineStatus| self.machines.iter().filter(|m| m.status == status).count();
        MaintenanceSummary {
            total: self.machines.len(),
            operational: count(MachineStatus::Operational),
            needing_attention: self
                .machines
                .iter()
                .filter(|m| m.status.needs_attention())
                .count(),
            in_maintenance: count(MachineStatus::Maintenance),
        }
    }

    pub fn sustainability_summary(&self) -> SustainabilitySummary {
        SustainabilitySummary {
            total_co2_reduction: self.sustainability_metrics.iter().map(|m| m.co2_reduction).sum(),
            total_energy_saved: self.sustainability_metrics.iter().map(|m| m.energy_saved).sum(),
            average_efficiency_gain: mean(
                self.sustainability_metrics.iter().map(|m| m.efficiency_gain),
            ),
        }
    }

    pub fn summary(&self) -> FactorySummary {
        FactorySummary {
            revision: self.revision,
            dashboard: self.dashboard_summary(),
            maintenance: self.maintenance_summary(),
            sustainability: self.sustainability_summary(),
        }
    }

    /// Plain-text sustainability report offered for download
    pub fn sustainability_report(&self, generated_at: DateTime<Utc>) -> String {
        SustainabilityReport {
            snapshot: self,
            generated_at,
        }
        .to_string()
    }
}

struct SustainabilityReport<'a> {
    snapshot: &'a Snapshot,
    generated_at: DateTime<Utc>,
}

impl fmt::Display for SustainabilityReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.snapshot.sustainability_summary();

        writeln!(f, "SmartOrchestrator Sustainability Report")?;
        writeln!(f, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f)?;
        writeln!(f, "Summary:")?;
        writeln!(f, "- Total CO2 Reduction: {:.1} kg", summary.total_co2_reduction)?;
        writeln!(f, "- Total Energy Saved: {:.1} kWh", summary.total_energy_saved)?;
        writeln!(f, "- Average Efficiency Gain: {:.2}%", summary.average_efficiency_gain)?;
        writeln!(f)?;
        writeln!(f, "Alignment with UN SDG 9: Industry, Innovation, and Infrastructure")?;
        writeln!(
            f,
            "Our AI-powered factory optimization contributes to sustainable industrialization by:"
        )?;
        writeln!(f, "1. Reducing carbon emissions through smart energy management")?;
        writeln!(f, "2. Improving resource efficiency with predictive maintenance")?;
        writeln!(f, "3. Enhancing productivity while minimizing environmental impact")?;
        writeln!(f)?;
        writeln!(f, "Detailed Metrics:")?;

        for (i, metric) in self.snapshot.sustainability_metrics.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Day {} ({}):", i + 1, metric.timestamp.format("%Y-%m-%d"))?;
            writeln!(f, "  - CO2 Reduction: {:.1} kg", metric.co2_reduction)?;
            writeln!(f, "  - Energy Saved: {:.1} kWh", metric.energy_saved)?;
            writeln!(f, "  - Efficiency Gain: {:.2}%", metric.efficiency_gain)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::SustainabilityMetricSample;
    use crate::state::EntityStore;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snapshot() -> crate::state::Snapshot {
        EntityStore::seeded(&mut StdRng::seed_from_u64(21), Utc::now(), 12).snapshot()
    }

    #[test]
    fn test_dashboard_summary_on_seed() {
        let snapshot = snapshot();
        let summary = snapshot.dashboard_summary();

        let expected = (95.5 + 78.3 + 92.1 + 45.2) / 4.0;
        assert!((summary.average_efficiency - expected).abs() < 1e-9);
        assert_eq!(summary.machines_needing_attention, 2);
        assert_eq!(summary.unread_notifications, 1);
        assert_eq!(summary.pending_optimizations, 2);
        assert_eq!(summary.approved_optimizations, 0);
        assert_eq!(
            summary.latest_production_rate,
            Some(snapshot.production_metrics.last().unwrap().production_rate)
        );
    }

    #[test]
    fn test_maintenance_summary_on_seed() {
        let summary = snapshot().maintenance_summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.operational, 2);
        assert_eq!(summary.needing_attention, 2);
        assert_eq!(summary.in_maintenance, 0);
    }

    #[test]
    fn test_empty_snapshot_summary() {
        let summary = EntityStore::new().snapshot().summary();
        assert_eq!(summary.dashboard.average_efficiency, 0.0);
        assert_eq!(summary.dashboard.latest_production_rate, None);
        assert_eq!(summary.sustainability.average_efficiency_gain, 0.0);
        assert_eq!(summary.sustainability.total_co2_reduction, 0.0);
    }

    #[test]
    fn test_sustainability_report() {
        let mut snapshot = EntityStore::new().snapshot();
        let day = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        snapshot.sustainability_metrics = vec![
            SustainabilityMetricSample {
                id: "s1".to_string(),
                timestamp: day,
                co2_reduction: 120.0,
                energy_saved: 300.0,
                efficiency_gain: 2.0,
            },
            SustainabilityMetricSample {
                id: "s2".to_string(),
                timestamp: day + chrono::Duration::days(1),
                co2_reduction: 130.5,
                energy_saved: 325.0,
                efficiency_gain: 2.5,
            },
        ];

        let summary = snapshot.sustainability_summary();
        assert_eq!(summary.total_co2_reduction, 250.5);
        assert_eq!(summary.total_energy_saved, 625.0);
        assert_eq!(summary.average_efficiency_gain, 2.25);

        let report = snapshot.sustainability_report(day);
        assert!(report.starts_with("SmartOrchestrator Sustainability Report\n"));
        assert!(report.contains("Generated: 2026-03-01 00:00:00 UTC"));
        assert!(report.contains("- Total CO2 Reduction: 250.5 kg"));
        assert!(report.contains("- Total Energy Saved: 625.0 kWh"));
        assert!(report.contains("- Average Efficiency Gain: 2.25%"));
        assert!(report.contains("Day 1 (2026-03-01):"));
        assert!(report.contains("Day 2 (2026-03-02):"));
        assert!(report.contains("  - CO2 Reduction: 130.5 kg"));
    }
}
