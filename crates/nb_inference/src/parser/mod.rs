//! Parser for batch summarization responses.
//!
//! The summarization service answers in loosely structured text:
//!
//! ```text
//! Article 1:
//! - first point
//! - second point
//!
//! Article 2:
//! - ...
//!
//! All Articles Summary:
//! - cross-article point
//! ```
//!
//! Bullets are tied back to the request batch only by the order of the
//! `Article N:` markers. Parsing never fails: text that does not follow the
//! convention just yields fewer bullets and a synthesized overview.

pub mod correlate;
pub mod themes;

use nb_core::{Article, BulletMap, ParsedSummary};

pub use correlate::{ArticleCorrelator, PositionalCorrelator};
pub use themes::{
    overview_sentence, KeywordClassifier, Theme, ThemeCategory, ThemeClassifier, ThemeRule,
    GENERIC_OVERVIEW,
};

pub const ALL_ARTICLES_MARKER: &str = "All Articles Summary:";
pub const OVERALL_MARKER: &str = "Overall Summary:";
pub const KEY_THEMES_SENTENCE: &str = "Summary of key themes and insights across all articles.";

const BULLET_PREFIX: &str = "- ";

/// Which flavour of response is being read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Topic briefings: only `All Articles Summary:` closes the article
    /// blocks, and summary bullets without a narrative line are replaced by a
    /// fixed sentence.
    #[default]
    Briefing,
    /// Single-topic searches: `Overall Summary:` is accepted too, and summary
    /// bullets become the narrative, one per line.
    Search,
}

impl Layout {
    fn is_summary_marker(self, line: &str) -> bool {
        line.contains(ALL_ARTICLES_MARKER) || (self == Layout::Search && line.contains(OVERALL_MARKER))
    }
}

/// `Article` + space + one or more ASCII digits + `:` at the start of a line.
fn is_article_marker(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("Article ") else {
        return false;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && rest[digits..].starts_with(':')
}

#[derive(Debug, Default)]
struct Scan {
    article_bullets: BulletMap,
    overall_bullets: Vec<String>,
    narrative: Option<String>,
}

fn commit<C: ArticleCorrelator>(
    bullets: &mut BulletMap,
    correlator: &C,
    markers_seen: usize,
    buffer: &mut Vec<String>,
) {
    let article = markers_seen
        .checked_sub(1)
        .and_then(|position| correlator.correlate(position));
    match article {
        Some(article) if !article.url.is_empty() => {
            bullets.insert(article.url.clone(), std::mem::take(buffer));
        }
        _ => buffer.clear(),
    }
}

fn scan_lines<C: ArticleCorrelator>(raw: &str, layout: Layout, correlator: &C) -> Scan {
    // splitting on '\n' and trimming also drops the '\r' of CRLF endings
    let lines: Vec<&str> = raw.split('\n').map(str::trim).collect();

    let mut scan = Scan::default();
    let mut markers_seen = 0usize;
    let mut collecting = false;
    let mut buffer: Vec<String> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if is_article_marker(line) {
            if collecting {
                commit(&mut scan.article_bullets, correlator, markers_seen, &mut buffer);
            }
            collecting = true;
            buffer.clear();
            markers_seen += 1;
        } else if let Some(bullet) = line.strip_prefix(BULLET_PREFIX) {
            buffer.push(bullet.to_string());
        } else if layout.is_summary_marker(line) {
            if collecting {
                commit(&mut scan.article_bullets, correlator, markers_seen, &mut buffer);
            }
            read_overall(&lines[idx + 1..], layout, &mut scan);
            break;
        }
    }

    scan
}

fn read_overall(lines: &[&str], layout: Layout, scan: &mut Scan) {
    for line in lines {
        if let Some(bullet) = line.strip_prefix(BULLET_PREFIX) {
            scan.overall_bullets.push(bullet.to_string());
        } else if !line.is_empty() && !line.starts_with('-') && !line.contains("Article") {
            if scan.overall_bullets.is_empty() {
                scan.narrative = Some(line.to_string());
            }
            break;
        }
    }

    if scan.narrative.is_none() && !scan.overall_bullets.is_empty() {
        scan.narrative = Some(match layout {
            Layout::Briefing => KEY_THEMES_SENTENCE.to_string(),
            Layout::Search => scan.overall_bullets.join("\n"),
        });
    }
}

/// First bullet of every article, grouped under the article's topic.
/// Every topic in the batch gets a slot, even when none of its articles
/// produced bullets.
fn topic_leads(articles: &[Article], article_bullets: &BulletMap) -> BulletMap {
    let mut topics = BulletMap::new();
    for article in articles {
        let Some(topic) = article.topic.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        let slot = topics.entry(topic);
        if let Some(first) = article_bullets.get(&article.url).and_then(|b| b.first()) {
            slot.push(first.clone());
        }
    }
    topics
}

#[derive(Debug, Clone, Default)]
pub struct SummaryParser<T = KeywordClassifier> {
    layout: Layout,
    classifier: T,
}

impl SummaryParser {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            classifier: KeywordClassifier::default(),
        }
    }
}

impl<T: ThemeClassifier> SummaryParser<T> {
    pub fn with_classifier(layout: Layout, classifier: T) -> Self {
        Self { layout, classifier }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Parses `raw` against the exact batch (same order) that produced it.
    pub fn parse(&self, raw: &str, articles: &[Article]) -> ParsedSummary {
        self.parse_with(raw, articles, &PositionalCorrelator::new(articles))
    }

    pub fn parse_with<C: ArticleCorrelator>(
        &self,
        raw: &str,
        articles: &[Article],
        correlator: &C,
    ) -> ParsedSummary {
        let scan = scan_lines(raw, self.layout, correlator);
        let topic_summaries = topic_leads(articles, &scan.article_bullets);
        let overall_summary = match scan.narrative {
            Some(narrative) if !narrative.trim().is_empty() => narrative,
            _ => self.overview(&topic_summaries),
        };

        ParsedSummary {
            article_bullets: scan.article_bullets,
            overall_summary,
            overall_bullets: scan.overall_bullets,
            topic_summaries,
        }
    }

    /// Summary text carried by the response itself, without the synthesized
    /// overview `parse` falls back to.
    pub fn narrative(&self, raw: &str) -> Option<String> {
        scan_lines(raw, self.layout, &PositionalCorrelator::new(&[]))
            .narrative
            .filter(|narrative| !narrative.trim().is_empty())
    }

    /// Deterministic one-line overview built from each topic's lead bullet.
    pub fn overview(&self, topic_summaries: &BulletMap) -> String {
        let themes: Vec<String> = topic_summaries
            .iter()
            .map(|(topic, bullets)| {
                let lead = bullets.first().map(String::as_str);
                self.classifier.classify(topic, lead).to_string()
            })
            .collect();
        overview_sentence(&themes)
    }
}

/// Parses a topic-briefing response with the default theme rules.
pub fn parse_summary(raw: &str, articles: &[Article]) -> ParsedSummary {
    SummaryParser::new(Layout::Briefing).parse(raw, articles)
}
