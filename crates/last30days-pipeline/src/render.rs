//! Text representations of a [`Report`]
//!
//! Every renderer is a pure function of the report. Empty or uncovered
//! sources always render a placeholder so the output keeps one shape
//! whatever the result counts are.

use crate::config::ContextLimits;
use last30days_types::{Report, ScoredItem, Source, WebSearchDirective};
use std::fmt::Write;
use tracing::warn;

/// Items listed per source in the compact view
const COMPACT_TOP: usize = 10;
const SNIPPET_TITLE_CHARS: usize = 100;
const TRUNCATED_MARKER: &str = "…truncated";

/// Engagement keys in display order, with their labels
fn engagement_labels(source: Source) -> &'static [(&'static str, &'static str)] {
    match source {
        Source::Reddit => &[("upvotes", "upvotes"), ("comments", "comments")],
        Source::X => &[
            ("likes", "likes"),
            ("reposts", "reposts"),
            ("replies", "replies"),
            ("quotes", "quotes"),
        ],
    }
}

fn engagement_summary(item: &ScoredItem) -> Option<String> {
    let parts: Vec<String> = engagement_labels(item.item.source)
        .iter()
        .filter_map(|(key, label)| {
            item.item
                .engagement
                .get(*key)
                .map(|v| format!("{v:.0} {label}"))
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn date_label(item: &ScoredItem) -> String {
    item.item
        .timestamp
        .map_or_else(|| "unknown date".to_string(), |ts| ts.format("%Y-%m-%d").to_string())
}

/// Where an item was posted: `r/<sub>` or `@<handle>`
fn venue(item: &ScoredItem) -> Option<String> {
    match item.item.source {
        Source::Reddit => item.item.community.as_ref().map(|c| format!("r/{c}")),
        Source::X => item.item.author_or_handle.as_ref().map(|h| format!("@{h}")),
    }
}

/// Single-line, link-safe title
fn one_line(title: &str, max_chars: usize) -> String {
    let flat: String = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('[', "(")
        .replace(']', ")");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut.trim_end())
    }
}

// ============================================================================
// Compact
// ============================================================================

/// Terminal summary: per-source counts, top items and error lines
pub fn render_compact(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "last30days: {}", report.topic);
    let _ = writeln!(
        out,
        "Window: {} → {} | mode: {} | depth: {}",
        report.from, report.to, report.mode, report.depth
    );

    for source in Source::ALL {
        if !report.covers(source) {
            continue;
        }
        let items = report.items(source);
        out.push('\n');
        let model = report
            .models_used
            .get(source)
            .map(|m| format!(" [{m}]"))
            .unwrap_or_default();
        let _ = writeln!(out, "{}: {} items{}", source.label(), items.len(), model);
        if let Some(error) = report.error(source) {
            let _ = writeln!(out, "  error: {error}");
        }
        if items.is_empty() {
            let _ = writeln!(out, "  (no data)");
            continue;
        }
        for item in items.iter().take(COMPACT_TOP) {
            let mut meta = vec![date_label(item)];
            meta.extend(venue(item));
            meta.extend(engagement_summary(item));
            let _ = writeln!(
                out,
                "  {:>2}. [{:.1}] {} ({})",
                item.rank,
                item.score,
                one_line(&item.item.title, SNIPPET_TITLE_CHARS),
                meta.join(" · ")
            );
            let _ = writeln!(out, "      {}", item.item.url);
        }
        if items.len() > COMPACT_TOP {
            let _ = writeln!(out, "  … {} more", items.len() - COMPACT_TOP);
        }
    }

    if !report.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for warning in &report.warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }

    if let Some(directive) = &report.web_search {
        out.push('\n');
        write_directive(&mut out, directive, "WebSearch needed:", "  ");
    }
    out
}

fn write_directive(out: &mut String, directive: &WebSearchDirective, heading: &str, indent: &str) {
    let _ = writeln!(out, "{heading}");
    let _ = writeln!(out, "{indent}topic: {}", directive.topic);
    let _ = writeln!(out, "{indent}window: {} → {}", directive.from, directive.to);
    let _ = writeln!(out, "{indent}exclude: {}", directive.exclude_domains.join(", "));
    let _ = writeln!(
        out,
        "{indent}rank web results below Reddit and X items (no engagement metrics)"
    );
}

// ============================================================================
// JSON
// ============================================================================

/// Lossless pretty JSON, including upstream payloads and enrichment data
pub fn render_json(report: &Report) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| {
        warn!("Report serialization failed: {}", e);
        "{}".to_string()
    })
}

// ============================================================================
// Markdown
// ============================================================================

/// Full Markdown report with every ranked item
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# last30days: {}", report.topic);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "_{} → {} · mode `{}` · depth `{}`_",
        report.from, report.to, report.mode, report.depth
    );

    for source in Source::ALL {
        if !report.covers(source) {
            continue;
        }
        let items = report.items(source);
        let _ = writeln!(out);
        let _ = writeln!(out, "## {} ({})", source.label(), items.len());
        let _ = writeln!(out);
        if let Some(model) = report.models_used.get(source) {
            let _ = writeln!(out, "_model: `{model}`_");
            let _ = writeln!(out);
        }
        if let Some(error) = report.error(source) {
            let _ = writeln!(out, "> **Error:** {error}");
            let _ = writeln!(out);
        }
        if items.is_empty() {
            let _ = writeln!(out, "_No data._");
            continue;
        }
        for item in items {
            write_markdown_item(&mut out, item);
        }
    }

    if !report.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Warnings");
        let _ = writeln!(out);
        for warning in &report.warnings {
            let _ = writeln!(out, "- {warning}");
        }
    }

    if let Some(directive) = &report.web_search {
        let _ = writeln!(out);
        write_directive(&mut out, directive, "## WebSearch needed\n", "- ");
    }
    out
}

fn write_markdown_item(out: &mut String, item: &ScoredItem) {
    let mut meta = Vec::new();
    meta.extend(venue(item));
    meta.push(date_label(item));
    meta.push(format!("score {:.1}", item.score));
    meta.extend(engagement_summary(item));
    let _ = writeln!(
        out,
        "{}. **[{}]({})** · {}",
        item.rank,
        one_line(&item.item.title, 200),
        item.item.url,
        meta.join(" · ")
    );
    if let Some(why) = &item.item.why_relevant {
        let _ = writeln!(out, "   - _{}_", one_line(why, 300));
    }
    if let last30days_types::RawItem::Reddit(raw) = &item.item.raw_ref {
        let insights = raw.enrichment.iter().flat_map(|d| d.insights.iter()).take(3);
        for insight in insights {
            let _ = writeln!(out, "   - > {}", one_line(insight, 200));
        }
    }
}

// ============================================================================
// Context snippet
// ============================================================================

/// Context snippet with the default bounds
pub fn render_context_snippet(report: &Report) -> String {
    render_context_snippet_with(report, &ContextLimits::default())
}

/// Bounded Markdown block for embedding into another process's context.
///
/// Both source sections are always present. When the block would exceed
/// `limits.max_chars`, item lines are dropped from the end of the longest
/// section first and a truncation marker is appended.
pub fn render_context_snippet_with(report: &Report, limits: &ContextLimits) -> String {
    let header = format!(
        "## last30days: {} ({} → {})\n",
        one_line(&report.topic, SNIPPET_TITLE_CHARS),
        report.from,
        report.to
    );

    let mut sections: Vec<(String, Vec<String>)> = Source::ALL
        .into_iter()
        .map(|source| {
            let mut head = format!("\n### {}\n", source.label());
            if let Some(error) = report.error(source) {
                let _ = writeln!(head, "_error: {}_", one_line(error, 200));
            }
            let lines = report
                .items(source)
                .iter()
                .take(limits.top_n)
                .map(|item| {
                    format!(
                        "- [{}]({}) ({}, score {:.1})\n",
                        one_line(&item.item.title, SNIPPET_TITLE_CHARS),
                        item.item.url,
                        date_label(item),
                        item.score
                    )
                })
                .collect();
            (head, lines)
        })
        .collect();

    let web = report.web_search.as_ref().map(|d| {
        format!(
            "\n### Web\n_web search needed: {} ({} → {}), excluding {}_\n",
            d.topic,
            d.from,
            d.to,
            d.exclude_domains.join(", ")
        )
    });

    let length = |sections: &[(String, Vec<String>)]| -> usize {
        header.chars().count()
            + web.as_ref().map_or(0, |w| w.chars().count())
            + sections
                .iter()
                .map(|(head, lines)| {
                    head.chars().count()
                        + lines
                            .iter()
                            .map(|l| l.chars().count())
                            .sum::<usize>()
                            .max(NO_DATA.len())
                })
                .sum::<usize>()
    };

    let marker_len = TRUNCATED_MARKER.chars().count() + 2;
    let mut truncated = false;
    loop {
        let reserved = if truncated { marker_len } else { 0 };
        if length(&sections) + reserved <= limits.max_chars {
            break;
        }
        let Some((_, lines)) = sections
            .iter_mut()
            .filter(|(_, lines)| !lines.is_empty())
            .max_by_key(|(_, lines)| lines.len())
        else {
            break;
        };
        lines.pop();
        truncated = true;
    }

    let mut out = header;
    for (head, lines) in &sections {
        out.push_str(head);
        if lines.is_empty() {
            out.push_str(NO_DATA);
        } else {
            lines.iter().for_each(|l| out.push_str(l));
        }
    }
    if let Some(web) = web {
        out.push_str(&web);
    }
    if truncated {
        let _ = writeln!(out, "\n{TRUNCATED_MARKER}");
    }

    if out.chars().count() > limits.max_chars {
        // Header and placeholders alone overflow; cut hard on a char boundary
        out = out.chars().take(limits.max_chars).collect();
    }
    out
}

const NO_DATA: &str = "_no data_\n";
