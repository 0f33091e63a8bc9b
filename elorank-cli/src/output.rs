/// Output formatting: terminal table and JSON.
use elorank_core::RankChange;
use serde::Serialize;

use crate::storage::SnapshotItem;

#[derive(Serialize)]
struct JsonOutput<'a> {
    items: &'a [&'a SnapshotItem],
    total_comparisons: usize,
}

/// `=` for no movement, otherwise a signed number of places.
pub fn format_rank_change(change: RankChange) -> String {
    match change {
        RankChange::Unchanged => "=".to_string(),
        RankChange::Moved(d) => format!("{d:+}"),
    }
}

/// Print standings as a formatted terminal table. `items` must already be in rank order.
pub fn print_table(items: &[&SnapshotItem], total_comparisons: usize) {
    // Find the widest item name for padding
    let name_width = items
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4); // at least "Item"

    // Header
    println!("  # | {:<name_width$} |  Rating | Move |   Change | Comparisons", "Item");
    println!("----|-{}-|---------|------|----------|------------", "-".repeat(name_width));

    // Rows
    for s in items {
        println!(
            "{:>3} | {:<name_width$} | {:>7.2} | {:>4} | {:>+8.2} | {:>11}",
            s.rank,
            s.name,
            s.rating,
            format_rank_change(s.rank_change),
            s.elo_change,
            s.comparisons,
        );
    }

    println!("\n{} items, {} comparisons in total", items.len(), total_comparisons);
}

/// Print standings as JSON.
pub fn print_json(items: &[&SnapshotItem], total_comparisons: usize) -> anyhow::Result<()> {
    let output = JsonOutput {
        items,
        total_comparisons,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rank_change() {
        assert_eq!(format_rank_change(RankChange::Unchanged), "=");
        assert_eq!(format_rank_change(RankChange::Moved(2)), "+2");
        assert_eq!(format_rank_change(RankChange::Moved(-3)), "-3");
    }
}
