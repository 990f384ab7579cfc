// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::io::{MeasurementRecord, MeasurementReport};
use crate::pipeline::RepairOutcome;
use crate::topology::{HoleBoundary, TopologyReport};
use colored::*;
use std::time::Duration;

/// Confidence at or above which a measurement is shown as trustworthy
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Confidence below which a measurement is flagged
pub const LOW_CONFIDENCE: f64 = 0.5;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a single measured file
    pub fn report_measurement(record: &MeasurementRecord) {
        let measurement = &record.measurement;

        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "File:".bold(), record.file.cyan());
        println!("{}", "━".repeat(80).bright_black());

        match measurement.outcome {
            RepairOutcome::NotNeeded => println!(
                "{} {}",
                "✅".green(),
                "Mesh is watertight".green().bold()
            ),
            RepairOutcome::Repaired => println!(
                "{} {}",
                "🔧".green(),
                "Mesh repaired to a closed voxel surface".green().bold()
            ),
            RepairOutcome::Degraded => println!(
                "{} {}",
                "⚠️ ".yellow(),
                "Repaired mesh is still open; volume is approximate".yellow().bold()
            ),
            RepairOutcome::Failed(error) => println!(
                "{} {}",
                "❌".red(),
                format!("Repair failed ({}); captured mesh integrated", error)
                    .red()
                    .bold()
            ),
        }

        println!("\n{}", "Volume:".bold());
        println!(
            "  {} {}",
            "Volume:".bright_black(),
            format!("{:.2} cm³", measurement.volume_cm3).cyan()
        );
        if let Some(mass) = record.mass_grams {
            println!(
                "  {} {}",
                "Mass:".bright_black(),
                format!("{:.2} g", mass).cyan()
            );
        }
        println!(
            "  {} {}",
            "Confidence:".bright_black(),
            Self::format_confidence(measurement.confidence)
        );

        println!("\n{}", "Captured topology:".bold());
        Self::print_topology(&record.initial_topology);

        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(Duration::from_millis(record.time_ms as u64)).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report topology and hole boundaries without measuring
    pub fn report_topology(file: &str, report: &TopologyReport, holes: &[HoleBoundary]) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Analyzed:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());
        Self::print_topology(report);

        if !holes.is_empty() {
            println!("\n{}", "Holes:".bold());
            for (i, hole) in holes.iter().enumerate() {
                println!(
                    "  {} {} edges around ({:.4}, {:.4}, {:.4})",
                    format!("#{}", i + 1).bright_black(),
                    hole.edge_count.to_string().yellow(),
                    hole.center.x,
                    hole.center.y,
                    hole.center.z
                );
            }
        }
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report batch totals
    pub fn report_summary(report: &MeasurementReport) {
        println!("\n{}", "Summary:".bold());
        println!(
            "  {} {}  {} {}  {} {}  {} {}",
            "Watertight:".bright_black(),
            report.watertight.to_string().green(),
            "Repaired:".bright_black(),
            report.repaired.to_string().cyan(),
            "Degraded:".bright_black(),
            report.degraded.to_string().yellow(),
            "Errors:".bright_black(),
            report.errors.to_string().red()
        );
        println!(
            "  {} {}  {} {}",
            "Total volume:".bright_black(),
            format!("{:.2} cm³", report.total_volume_cm3).cyan(),
            "Mean confidence:".bright_black(),
            Self::format_confidence(report.mean_confidence)
        );
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_topology(report: &TopologyReport) {
        let watertight = if report.is_watertight {
            "yes".green()
        } else {
            "no".red()
        };
        println!("  {} {}", "Watertight:".bright_black(), watertight);
        println!(
            "  {} {}",
            "Boundary edges:".bright_black(),
            Self::color_count(report.boundary_edge_count)
        );
        println!(
            "  {} {}",
            "Non-manifold edges:".bright_black(),
            Self::color_count(report.non_manifold_edge_count)
        );
        println!(
            "  {} {}",
            "Holes:".bright_black(),
            Self::color_count(report.estimated_hole_count)
        );
        println!(
            "  {} {}  {} {}",
            "Euler:".bright_black(),
            report.euler_characteristic,
            "Components:".bright_black(),
            report.component_count
        );
        println!(
            "  {} V={} E={} F={}",
            "Size:".bright_black(),
            report.vertex_count,
            report.edge_count,
            report.triangle_count
        );
        println!(
            "  {} {}",
            "Quality:".bright_black(),
            Self::format_confidence(report.quality_score)
        );
    }

    fn color_count(count: usize) -> ColoredString {
        if count == 0 {
            count.to_string().green()
        } else {
            count.to_string().yellow()
        }
    }

    fn format_confidence(value: f64) -> ColoredString {
        let text = format!("{:.1}%", value * 100.0);
        if value >= HIGH_CONFIDENCE {
            text.green()
        } else if value >= LOW_CONFIDENCE {
            text.yellow()
        } else {
            text.red()
        }
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(Reporter::format_duration(Duration::from_micros(500)), "500µs");
        assert_eq!(Reporter::format_duration(Duration::from_millis(5)), "5.00ms");
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }

    #[test]
    fn test_confidence_text() {
        colored::control::set_override(false);
        assert_eq!(Reporter::format_confidence(0.943).to_string(), "94.3%");
        assert_eq!(Reporter::format_confidence(0.0).to_string(), "0.0%");
    }
}
