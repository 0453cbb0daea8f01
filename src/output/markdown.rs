//! Markdown report generation
//!
//! This module renders a sitemap as a human-readable markdown document,
//! with run information, a classification breakdown and one section per page.

use crate::output::sitemap::Location;
use crate::output::stats::CrawlStatistics;
use crate::state::CrawlGraph;

/// Formats a crawl and its sitemap as markdown
///
/// # Arguments
///
/// * `graph` - The finished crawl (for run information)
/// * `locations` - The assembled sitemap
///
/// # Returns
///
/// A formatted markdown string
pub fn to_markdown(graph: &CrawlGraph, locations: &[Location]) -> String {
    let stats = CrawlStatistics::from_graph(graph);
    let mut md = String::new();

    md.push_str(&format!("# Sitemap of {}\n\n", stats.seed));

    md.push_str("## Crawl Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", graph.started_at().to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", graph.finished_at().to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.duration_ms as f64 / 1000.0
    ));
    md.push_str(&format!("- **Total Items**: {}\n", stats.total_items));
    md.push_str(&format!("- **Total Links**: {}\n", stats.total_links));
    md.push_str(&format!("- **Broken Rate**: {:.2}%\n\n", stats.broken_rate()));

    md.push_str("## Classification Breakdown\n\n");
    md.push_str("| Classification | Count |\n");
    md.push_str("|----------------|-------|\n");
    for (classification, count) in stats.breakdown() {
        md.push_str(&format!("| {} | {} |\n", classification, count));
    }
    md.push('\n');

    md.push_str(&format!("## Pages ({})\n\n", locations.len()));
    for location in locations {
        format_location(&mut md, location);
    }

    md
}

fn format_location(md: &mut String, location: &Location) {
    if location.title.is_empty() {
        md.push_str(&format!("### <{}>\n\n", location.url));
    } else {
        md.push_str(&format!("### {}\n\n<{}>\n\n", location.title, location.url));
    }

    for (heading, urls) in [
        ("Links", &location.links),
        ("Assets", &location.assets),
        ("Broken", &location.broken),
        ("Remote", &location.remote),
    ] {
        if urls.is_empty() {
            continue;
        }
        md.push_str(&format!("**{}** ({})\n\n", heading, urls.len()));
        for url in urls {
            md.push_str(&format!("- {}\n", url));
        }
        md.push('\n');
    }
}
