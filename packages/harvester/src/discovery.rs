//! Link discovery across occupational family listing pages.
//!
//! Each family listing is parsed with an ordered list of pure selector
//! strategies: the first strategy that yields any matches wins, and the
//! rest are not consulted. The result is an insertion-ordered catalog
//! keyed by occupation title; a duplicate title from a later family
//! replaces the earlier entry's data while keeping its position, which
//! fixes the iteration order the rest of the pipeline sees.

use indexmap::IndexMap;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{HarvestConfig, OCCUPATION_FAMILIES};
use crate::error::Result;
use crate::fetch::{fetch_with_retry, PageFetcher};
use crate::types::CatalogEntry;

/// A pure link-extraction strategy over a parsed listing page.
pub type LinkStrategy = fn(&Html, &Url) -> Vec<(String, Url)>;

/// Strategies in fallback order, with the selector each one applies.
pub const LINK_STRATEGIES: &[(&str, LinkStrategy)] = &[
    (r#"a[href*="/link/summary/"]"#, summary_anchor_links),
    (
        r#"td.report2 > a[href*="/link/summary/"]"#,
        report_cell_links,
    ),
    (r#"a[href*="/summary/"]"#, any_summary_links),
];

fn summary_anchor_links(document: &Html, base: &Url) -> Vec<(String, Url)> {
    collect_links(document, base, r#"a[href*="/link/summary/"]"#)
}

fn report_cell_links(document: &Html, base: &Url) -> Vec<(String, Url)> {
    collect_links(document, base, r#"td.report2 > a[href*="/link/summary/"]"#)
}

fn any_summary_links(document: &Html, base: &Url) -> Vec<(String, Url)> {
    collect_links(document, base, r#"a[href*="/summary/"]"#)
}

fn collect_links(document: &Html, base: &Url, selector: &str) -> Vec<(String, Url)> {
    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let title = el.text().collect::<String>().trim().to_string();
            let href = el.value().attr("href")?;
            if title.is_empty() || !href.contains("summary") {
                return None;
            }
            let url = base.join(href).ok()?;
            Some((title, url))
        })
        .collect()
}

/// Extract `(title, url)` pairs from one listing page, trying each
/// strategy in order until one is non-empty.
pub fn extract_listing_links(document: &Html, base: &Url) -> Vec<(String, Url)> {
    for (selector, strategy) in LINK_STRATEGIES {
        let links = strategy(document, base);
        if !links.is_empty() {
            debug!(selector = selector, count = links.len(), "strategy matched");
            return links;
        }
    }
    Vec::new()
}

/// Parse the SOC occupation code out of a summary URL,
/// e.g. `/link/summary/15-2011.00` → `15-2011.00`.
pub fn occupation_code(url: &Url) -> Option<String> {
    let pattern = Regex::new(r"/link/summary/(\d+-\d+\.\d+)").unwrap();
    pattern
        .captures(url.path())
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Recover the occupational family from a code's leading major group,
/// e.g. `15-2011.00` → `(15, "Computer and Mathematical Occupations")`.
pub fn family_for_code(code: &str) -> Option<(u16, &'static str)> {
    let major: u16 = code.split('-').next()?.parse().ok()?;
    OCCUPATION_FAMILIES
        .iter()
        .find(|(id, _)| *id == major)
        .copied()
}

/// Fetch every configured family listing and build the discovery
/// catalog. A family whose listing cannot be fetched after retries is
/// logged and skipped; the remaining families still contribute.
pub async fn discover_catalog<F>(
    fetcher: &F,
    config: &HarvestConfig,
) -> Result<IndexMap<String, CatalogEntry>>
where
    F: PageFetcher + ?Sized,
{
    info!(families = config.families.len(), "starting link discovery");

    let base = Url::parse(&config.base_url)?;
    let mut catalog: IndexMap<String, CatalogEntry> = IndexMap::new();

    for (family_id, family_name) in &config.families {
        let listing_url = format!("{}/find/family?f={}&g=Go", config.base_url, family_id);
        debug!(family = %family_name, url = %listing_url, "fetching family listing");

        let Some(body) = fetch_with_retry(fetcher, &listing_url, config).await else {
            warn!(family = %family_name, "listing unavailable, skipping family");
            continue;
        };

        // Html is not Send; parse and consume before the next await.
        let links = {
            let document = Html::parse_document(&body);
            extract_listing_links(&document, &base)
        };

        let found = links.len();
        for (title, url) in links {
            catalog.insert(
                title.clone(),
                CatalogEntry {
                    title,
                    url,
                    family_name: family_name.clone(),
                    family_id: *family_id,
                },
            );
        }

        info!(family = %family_name, occupations = found, "family discovered");
        tokio::time::sleep(config.category_delay()).await;
    }

    info!(total = catalog.len(), "link discovery complete");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    fn listing_with_summary_links(titles: &[&str]) -> String {
        let rows: String = titles
            .iter()
            .enumerate()
            .map(|(i, t)| {
                format!(
                    r#"<tr><td class="report2"><a href="/link/summary/15-20{i:02}.00">{t}</a></td></tr>"#
                )
            })
            .collect();
        format!("<html><body><table>{rows}</table></body></html>")
    }

    fn listing_with_bare_summary_links(titles: &[&str]) -> String {
        let anchors: String = titles
            .iter()
            .enumerate()
            .map(|(i, t)| format!(r#"<a href="/summary/13-11{i:02}.00">{t}</a>"#))
            .collect();
        format!("<html><body>{anchors}</body></html>")
    }

    #[test]
    fn test_first_strategy_wins() {
        let base = Url::parse("https://www.onetonline.org").unwrap();
        let html = listing_with_summary_links(&["Data Scientists", "Statisticians"]);
        let document = Html::parse_document(&html);

        let links = extract_listing_links(&document, &base);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].0, "Data Scientists");
        assert_eq!(
            links[0].1.as_str(),
            "https://www.onetonline.org/link/summary/15-2000.00"
        );
    }

    #[test]
    fn test_fallback_to_later_strategy() {
        let base = Url::parse("https://www.onetonline.org").unwrap();
        let html = listing_with_bare_summary_links(&["Accountants"]);
        let document = Html::parse_document(&html);

        let links = extract_listing_links(&document, &base);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, "Accountants");
    }

    #[test]
    fn test_anchors_without_titles_are_dropped() {
        let base = Url::parse("https://www.onetonline.org").unwrap();
        let html = r#"<a href="/link/summary/15-2011.00">   </a>"#;
        let document = Html::parse_document(html);

        assert!(extract_listing_links(&document, &base).is_empty());
    }

    #[test]
    fn test_occupation_code_from_url() {
        let url = Url::parse("https://www.onetonline.org/link/summary/15-2011.00").unwrap();
        assert_eq!(occupation_code(&url).as_deref(), Some("15-2011.00"));

        let other = Url::parse("https://www.onetonline.org/find/family?f=15").unwrap();
        assert_eq!(occupation_code(&other), None);
    }

    #[test]
    fn test_family_for_code() {
        assert_eq!(
            family_for_code("15-2011.00"),
            Some((15, "Computer and Mathematical Occupations"))
        );
        assert_eq!(family_for_code("99-0000.00"), None);
        assert_eq!(family_for_code("garbage"), None);
    }

    #[tokio::test]
    async fn test_discovery_combines_families_and_strategies() {
        // Family A's page only matches the bare-summary fallback (3 links);
        // family B's page matches the primary strategy (5 links).
        let config = HarvestConfig::default()
            .with_base_url("https://site.test")
            .with_families(vec![(15, "A".to_string()), (13, "B".to_string())])
            .with_fast_timing(1);

        let fetcher = MockFetcher::new()
            .with_page(
                "https://site.test/find/family?f=15&g=Go",
                listing_with_bare_summary_links(&["A1", "A2", "A3"]),
            )
            .with_page(
                "https://site.test/find/family?f=13&g=Go",
                listing_with_summary_links(&["B1", "B2", "B3", "B4", "B5"]),
            );

        let catalog = discover_catalog(&fetcher, &config).await.unwrap();

        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog["A1"].family_id, 15);
        assert_eq!(catalog["B5"].family_id, 13);
        // Each listing fetched exactly once.
        assert_eq!(fetcher.calls_for("https://site.test/find/family?f=15&g=Go"), 1);
        assert_eq!(fetcher.calls_for("https://site.test/find/family?f=13&g=Go"), 1);
    }

    #[tokio::test]
    async fn test_failed_family_is_skipped() {
        let config = HarvestConfig::default()
            .with_base_url("https://site.test")
            .with_families(vec![(15, "A".to_string()), (13, "B".to_string())])
            .with_fast_timing(1);

        let fetcher = MockFetcher::new()
            .with_failure("https://site.test/find/family?f=15&g=Go", 500)
            .with_page(
                "https://site.test/find/family?f=13&g=Go",
                listing_with_summary_links(&["B1", "B2"]),
            );

        let catalog = discover_catalog(&fetcher, &config).await.unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains_key("B1"));
    }

    #[tokio::test]
    async fn test_duplicate_title_keeps_position_takes_latest_family() {
        let config = HarvestConfig::default()
            .with_base_url("https://site.test")
            .with_families(vec![(15, "A".to_string()), (13, "B".to_string())])
            .with_fast_timing(1);

        let fetcher = MockFetcher::new()
            .with_page(
                "https://site.test/find/family?f=15&g=Go",
                listing_with_summary_links(&["Shared Title", "Only A"]),
            )
            .with_page(
                "https://site.test/find/family?f=13&g=Go",
                listing_with_summary_links(&["Shared Title"]),
            );

        let catalog = discover_catalog(&fetcher, &config).await.unwrap();

        assert_eq!(catalog.len(), 2);
        // Position from the first insertion, data from the last.
        assert_eq!(catalog.get_index(0).unwrap().0, "Shared Title");
        assert_eq!(catalog["Shared Title"].family_id, 13);
    }
}
