//! Output formatting for CLI

use crate::{
    learning::TrainingMetadata,
    pipeline::{EvaluationResult, TrainingSummary},
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a count together with its share of `total`
pub fn format_share(count: usize, total: usize) -> String {
    let percent = if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    };
    format!("{} ({percent:.1}%)", format_number(count))
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

pub fn print_training_summary(summary: &TrainingSummary) {
    print_section("Training Results");
    print_kv("Episodes", &format_number(summary.episodes));
    print_kv("X wins", &format_share(summary.x_wins, summary.episodes));
    print_kv("O wins", &format_share(summary.o_wins, summary.episodes));
    print_kv("Draws", &format_share(summary.draws, summary.episodes));
    print_kv("Table entries", &format_number(summary.table_size));
    print_kv("Elapsed", &format!("{:.2?}", summary.elapsed));
    if summary.stopped {
        print_kv("Status", "stopped early");
    }
}

pub fn print_metadata(metadata: &TrainingMetadata) {
    if let Some(episodes) = metadata.episodes {
        print_kv("Episodes trained", &format_number(episodes));
    }
    if let Some(opponent) = &metadata.opponent {
        print_kv("Trained against", opponent);
    }
    if let Some(rate) = metadata.learning_rate {
        print_kv("Learning rate", &rate.to_string());
    }
    if let Some(exploration) = &metadata.exploration {
        print_kv("Exploration", exploration);
    }
    if let Some(seed) = metadata.seed {
        print_kv("Seed", &seed.to_string());
    }
    if let Some(saved_at) = &metadata.saved_at {
        print_kv("Saved at", saved_at);
    }
}

pub fn print_evaluation(result: &EvaluationResult) {
    print_section("Evaluation Results");
    print_kv("Agent", &result.agent);
    print_kv("Opponent", &result.opponent);
    print_kv("Seats", &result.seats.to_string());
    print_kv("Games", &format_number(result.games));
    print_kv("Wins", &format_share(result.wins, result.games));
    print_kv("Draws", &format_share(result.draws, result.games));
    print_kv("Losses", &format_share(result.losses, result.games));
    for (seat, record) in [("As X", &result.as_x), ("As O", &result.as_o)] {
        if record.games() > 0 {
            print_kv(
                seat,
                &format!("W {} / D {} / L {}", record.wins, record.draws, record.losses),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(1, 4), "1 (25.0%)");
        assert_eq!(format_share(0, 0), "0 (0.0%)");
    }
}
