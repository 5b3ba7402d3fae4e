//! Human-readable advice for low-scoring rules

/// Rules scoring below this get a recommendation
pub const RECOMMENDATION_THRESHOLD: f64 = 0.6;

pub const NO_ISSUES: &str = "No major issues found: the layout scores well on every metric.";

/// Actionable advice for a rule, by rule name
pub fn advice_for(rule: &str) -> String {
    let text = match rule {
        "accessibility" => {
            "Improve accessibility: connect isolated rooms and shorten the longest routes from the entrance."
        }
        "path_diversity" => {
            "Add alternative routes: more cross-connections give players meaningful path choices."
        }
        "key_path_length" => {
            "Rebalance the key path: make sure the exit is reachable and not buried at the far end of every branch."
        }
        "loop_ratio" => {
            "Adjust looping: add a few cycles to a tree-like layout, or remove some from an over-connected one."
        }
        "degree_variance" => {
            "Vary room connectivity: mix hubs with quieter rooms instead of giving every room the same exits."
        }
        "door_distribution" => "Rebalance doors: aim for one to three doors per room.",
        "dead_end_ratio" => {
            "Reduce dead ends: link dead-end rooms back into the layout or reward players for visiting them."
        }
        "treasure_distribution" => {
            "Spread treasure out: place it across the map at a density of roughly one item per one to five rooms."
        }
        "monster_distribution" => {
            "Spread monsters out: avoid clustering and keep encounter density between about one per three rooms and three per two rooms."
        }
        "aesthetic_balance" => {
            "Improve visual balance: use similar room sizes, align connected rooms and centre the layout on the map."
        }
        other => {
            return format!(
                "Review the {} metric: it scored below {}.",
                other, RECOMMENDATION_THRESHOLD
            )
        }
    };
    text.to_string()
}
