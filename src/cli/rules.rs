//! Rules command - list registered rules and their weights

use anyhow::Result;
use console::style;
use dungeon_assess::config::AssessConfig;
use dungeon_assess::rules::default_rules;

pub fn run(config: &AssessConfig) -> Result<()> {
    let rules = default_rules(config);
    let width = rules.iter().map(|r| r.name().len()).max().unwrap_or(0);
    let total: f64 = rules.iter().map(|r| config.weight(r.name())).sum();

    println!("\n{}\n", style("Registered rules").bold());
    for rule in &rules {
        let weight = config.weight(rule.name());
        let weight_str = format!("{:.2}", weight);
        println!(
            "  {:<width$}  {}  {:<10}  {}",
            rule.name(),
            if weight > 0.0 {
                style(weight_str).cyan()
            } else {
                style(weight_str).dim()
            },
            rule.category().to_string(),
            style(rule.description()).dim(),
        );
    }
    println!("\n  Total weight: {:.2}", total);
    Ok(())
}
