use std::fmt;

/// Sentence used when a batch has no topic-tagged articles at all.
pub const GENERIC_OVERVIEW: &str =
    "Your personalized briefing is ready with the latest news across your selected topics.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeCategory {
    Partnerships,
    BusinessProcesses,
    Politics,
    Technology,
}

impl ThemeCategory {
    pub fn label(self) -> &'static str {
        match self {
            ThemeCategory::Partnerships => "partnerships and collaborations",
            ThemeCategory::BusinessProcesses => "business processes and applications",
            ThemeCategory::Politics => "political developments and international relations",
            ThemeCategory::Technology => "technological innovation and development",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Theme {
    Category(ThemeCategory),
    /// No rule matched; the lowercase topic name stands in.
    Topic(String),
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Category(category) => f.write_str(category.label()),
            Theme::Topic(topic) => f.write_str(topic),
        }
    }
}

pub trait ThemeClassifier: Send + Sync {
    /// Classify a topic by its leading bullet, if it has one.
    fn classify(&self, topic: &str, lead_bullet: Option<&str>) -> Theme;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRule {
    pub category: ThemeCategory,
    pub keywords: Vec<String>,
}

impl ThemeRule {
    pub fn new(category: ThemeCategory, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword.as_str()))
    }
}

/// Case-insensitive substring rules, checked in order; first match wins.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<ThemeRule>,
}

impl KeywordClassifier {
    pub fn new(rules: Vec<ThemeRule>) -> Self {
        Self { rules }
    }

    pub fn with_rule(mut self, category: ThemeCategory, keywords: &[&str]) -> Self {
        self.rules.push(ThemeRule::new(category, keywords));
        self
    }

    pub fn rules(&self) -> &[ThemeRule] {
        &self.rules
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(vec![
            ThemeRule::new(ThemeCategory::Partnerships, &["collaboration", "partnership"]),
            ThemeRule::new(ThemeCategory::BusinessProcesses, &["application", "process"]),
            ThemeRule::new(ThemeCategory::Politics, &["trump", "hamas", "political"]),
            ThemeRule::new(ThemeCategory::Technology, &["technology", "innovation"]),
        ])
    }
}

impl ThemeClassifier for KeywordClassifier {
    fn classify(&self, topic: &str, lead_bullet: Option<&str>) -> Theme {
        if let Some(bullet) = lead_bullet {
            let lowered = bullet.to_lowercase();
            if let Some(rule) = self.rules.iter().find(|rule| rule.matches(&lowered)) {
                return Theme::Category(rule.category);
            }
        }
        Theme::Topic(topic.to_lowercase())
    }
}

/// Joins theme labels into the one-sentence briefing overview.
pub fn overview_sentence<S: AsRef<str>>(themes: &[S]) -> String {
    match themes {
        [] => GENERIC_OVERVIEW.to_string(),
        [only] => format!("Today's briefing focuses on {}.", only.as_ref()),
        [first, second] => format!(
            "Today's briefing covers {} and {}.",
            first.as_ref(),
            second.as_ref()
        ),
        [init @ .., last] => {
            let head = init.iter().map(|theme| theme.as_ref()).collect::<Vec<&str>>().join(", ");
            format!("Today's briefing spans {}, and {}.", head, last.as_ref())
        }
    }
}
