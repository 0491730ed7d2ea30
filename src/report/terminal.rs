use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{Classification, Inventory, LicenseCount, UNKNOWN_LICENSE};

/// Print the license summary for a finished run.
pub fn render(inventory: &Inventory, report_path: Option<&Path>, verbose: bool, quiet: bool) {
    if quiet {
        println!(
            "Total: {}  Direct: {}  Transitive: {}  Dev: {}  Unknown: {}",
            inventory.licenses.len(),
            inventory.direct_count(),
            inventory.transitive_count(),
            inventory.dev_count(),
            unknown_count(&inventory.license_count).to_string().red(),
        );
        return;
    }

    if let Some(path) = report_path {
        println!(
            "{} License report generated at {}\n",
            "→".cyan(),
            path.display().to_string().bold()
        );
    }

    println!(
        " {} packages ({} direct, {} transitive, {} dev)\n",
        inventory.licenses.len().to_string().bold(),
        inventory.direct_count(),
        inventory.transitive_count(),
        inventory.dev_count()
    );

    println!("{}", "License Summary:".bold());
    for (license, line) in summary_lines(&inventory.license_count) {
        if license == UNKNOWN_LICENSE {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }

    if verbose && !inventory.licenses.is_empty() {
        println!();
        render_table(inventory);
    }
}

/// Aligned `license : count` lines, `UNKNOWN` moved to the end.
///
/// Names are padded with `—` to the longest license; counts are right-aligned to 3.
pub fn summary_lines(counts: &LicenseCount) -> Vec<(&str, String)> {
    let width = counts.keys().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut ordered: Vec<(&str, usize)> = counts
        .iter()
        .filter(|(l, _)| l.as_str() != UNKNOWN_LICENSE)
        .map(|(l, c)| (l.as_str(), *c))
        .collect();
    if let Some(count) = counts.get(UNKNOWN_LICENSE) {
        ordered.push((UNKNOWN_LICENSE, *count));
    }

    ordered
        .into_iter()
        .map(|(license, count)| {
            let pad = "—".repeat(width - license.chars().count());
            (license, format!("{}{} : {:>3}", license, pad, count))
        })
        .collect()
}

fn unknown_count(counts: &LicenseCount) -> usize {
    counts.get(UNKNOWN_LICENSE).copied().unwrap_or(0)
}

fn render_table(inventory: &Inventory) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Path").add_attribute(Attribute::Bold),
        ]);

    for entry in &inventory.licenses {
        let license_cell = if entry.license == UNKNOWN_LICENSE {
            Cell::new(&entry.license).fg(Color::Red)
        } else {
            Cell::new(&entry.license)
        };

        let type_color = match entry.classification {
            Classification::Direct => Color::Green,
            Classification::Transitive => Color::Blue,
        };
        let kind = if entry.is_dev {
            format!("{} (dev)", entry.classification)
        } else {
            entry.classification.to_string()
        };

        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(&entry.version),
            license_cell,
            Cell::new(kind).fg(type_color),
            Cell::new(entry.tree_path.join(" > ")),
        ]);
    }

    println!("{}", table);
}
