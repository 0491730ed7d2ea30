use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::ReportError;
use crate::license::spdx::{is_linkable, tokenize, Token};
use crate::models::{FlattenedEntry, Inventory, UNKNOWN_LICENSE};

const TEMPLATE: &str = include_str!("assets/report.html");
const SCRIPT: &str = include_str!("assets/site.js");

const SPDX_BASE: &str = "https://spdx.org/licenses/";
const NPM_BASE: &str = "https://www.npmjs.com/package/";

/// Render the report and write it to `output_path`.
///
/// The parent directory must already exist; it is never created on the user's behalf.
pub fn write(inventory: &Inventory, output_path: &Path) -> Result<()> {
    if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.is_dir() {
            return Err(ReportError::OutputDirMissing {
                dir: dir.to_path_buf(),
            }
            .into());
        }
    }

    tracing::info!("Generating HTML report...");
    let html = render(inventory);
    std::fs::write(output_path, html)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
    Ok(())
}

/// Render the complete, self-contained HTML page.
pub fn render(inventory: &Inventory) -> String {
    fill_template(TEMPLATE, |key| match key {
        "summary" => Some(escape(&format!(
            "{} packages, {} licenses",
            inventory.licenses.len(),
            inventory.license_count.len()
        ))),
        "license_filters" => Some(license_filters(inventory)),
        "type_filters" => Some(type_filters(inventory)),
        "rows" => Some(rows(&inventory.licenses)),
        "script" => Some(SCRIPT.to_string()),
        _ => None,
    })
}

/// Single-pass `{{key}}` substitution, so inserted text is never re-scanned for
/// placeholders.
fn fill_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let key = &rest[start + 2..start + 2 + len];
        out.push_str(&rest[..start]);
        match lookup(key) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 4 + len]),
        }
        rest = &rest[start + 4 + len..];
    }
    out.push_str(rest);
    out
}

fn license_filters(inventory: &Inventory) -> String {
    let mut html = String::new();
    for (license, count) in &inventory.license_count {
        let class = if license == UNKNOWN_LICENSE {
            " class=\"unknown-license\""
        } else {
            ""
        };
        let _ = writeln!(
            html,
            "          <label{}><input type=\"checkbox\" value=\"{}\" checked> {} ({})</label>",
            class,
            escape(license),
            escape(license),
            count
        );
    }
    html
}

fn type_filters(inventory: &Inventory) -> String {
    let filters = [
        ("filterDirect", "direct", "Direct", inventory.direct_count()),
        ("filterTransitive", "transitive", "Transitive", inventory.transitive_count()),
        ("filterDev", "dev", "Dev", inventory.dev_count()),
    ];
    let mut html = String::new();
    for (id, value, label, count) in filters {
        let _ = writeln!(
            html,
            "        <label><input id=\"{}\" type=\"checkbox\" value=\"{}\" checked> {} ({})</label>",
            id, value, label, count
        );
    }
    html
}

fn rows(entries: &[FlattenedEntry]) -> String {
    let mut html = String::new();
    for entry in entries {
        let tree: String = entry
            .tree_path
            .iter()
            .enumerate()
            .map(|(depth, node)| {
                format!(
                    "<code style=\"padding-left: {}px;\">{}</code>",
                    depth * 20,
                    escape(node)
                )
            })
            .collect();
        let npm_url = format!("{}{}", NPM_BASE, entry.name);
        let dev_pill = if entry.is_dev {
            "<span class=\"pill dev\">dev</span>"
        } else {
            ""
        };

        let _ = writeln!(
            html,
            "        <tr data-license=\"{license}\" data-type=\"{kind}\" data-dev=\"{dev}\">\n\
             \x20         <td><details><summary>{name}</summary><span>{tree}</span></details></td>\n\
             \x20         <td><a class=\"registry-link\" target=\"_blank\" href=\"{url}\">{url}</a></td>\n\
             \x20         <td>{version}</td>\n\
             \x20         <td>{linked}</td>\n\
             \x20         <td class=\"type-cell\"><span class=\"pill {kind}\">{kind}</span>{dev_pill}</td>\n\
             \x20       </tr>",
            license = escape(&entry.license),
            kind = entry.classification,
            dev = entry.is_dev,
            name = escape(&entry.name),
            tree = tree,
            url = escape(&npm_url),
            version = escape(&entry.version),
            linked = linkify_license(&entry.license),
            dev_pill = dev_pill,
        );
    }
    html
}

/// Link each SPDX identifier in a license expression to its spdx.org page.
pub fn linkify_license(license: &str) -> String {
    if !is_linkable(license) {
        return escape(license);
    }

    let mut html = String::new();
    for token in tokenize(license) {
        match token {
            Token::Id(id) => {
                let _ = write!(
                    html,
                    "<a target=\"_blank\" href=\"{}{}.html\">{}</a>",
                    SPDX_BASE,
                    escape(&id),
                    escape(&id)
                );
            }
            Token::And => html.push_str(" AND "),
            Token::Or => html.push_str(" OR "),
            Token::With => html.push_str(" WITH "),
            Token::LParen => html.push('('),
            Token::RParen => html.push(')'),
            Token::Comma => html.push_str(", "),
        }
    }
    html
}

/// Escape text for use in HTML element content and double-quoted attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
