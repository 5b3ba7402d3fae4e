//! Text (terminal) reporter with colors and formatting

use crate::models::{Grade, QualityReport};
use anyhow::Result;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::A => "\x1b[32m", // Green
        Grade::B => "\x1b[92m", // Light green
        Grade::C => "\x1b[33m", // Yellow
        Grade::D => "\x1b[91m", // Light red
        Grade::F => "\x1b[31m", // Red
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const BAR_WIDTH: usize = 20;

/// Render report as formatted terminal output
pub fn render(report: &QualityReport) -> Result<String> {
    let mut out = String::new();

    // Header
    let grade_c = grade_color(report.grade);
    out.push_str(&format!("\n{BOLD}Dungeon Quality Assessment{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{:.3}{RESET}  Grade: {grade_c}{BOLD}{}{RESET}",
        report.overall_score, report.grade
    ));
    if report.spatial_inference_used {
        out.push_str(&format!("  {DIM}(spatial inference on){RESET}"));
    }
    out.push_str("\n\n");

    // Per-rule scores
    out.push_str(&format!("{BOLD}SCORES{RESET}\n"));
    let width = report.scores.keys().map(|k| k.len()).max().unwrap_or(0);
    for (name, score) in &report.scores {
        out.push_str(&format!(
            "  {name:<width$}  {}  {:.3}",
            score_bar(*score),
            score
        ));
        if let Some(note) = report
            .details
            .get(name)
            .and_then(|d| d.get("reason").or_else(|| d.get("error")))
            .and_then(|v| v.as_str())
        {
            out.push_str(&format!("  {DIM}({note}){RESET}"));
        }
        out.push('\n');
    }
    out.push('\n');

    // Recommendations
    out.push_str(&format!("{BOLD}RECOMMENDATIONS{RESET}\n"));
    for rec in &report.recommendations {
        out.push_str(&format!("  - {rec}\n"));
    }

    Ok(out)
}

fn score_bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{DIM}{}{RESET}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}
