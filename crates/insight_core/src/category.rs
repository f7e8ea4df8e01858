use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The fixed set of analysis kinds the backend knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Competitors,
    Lowes,
    Strategy,
    Campaigns,
    /// Runs every analysis in one backend task. Has no step labels.
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown analysis category `{0}` (expected one of competitors, lowes, strategy, campaigns, full)")]
pub struct UnknownCategory(pub String);

const COMPETITOR_STEPS: &[&str] = &[
    "Initializing web search crawlers...",
    "Searching Home Depot Instagram posts...",
    "Analyzing Menards Facebook content...",
    "Crawling Wayfair social media...",
    "Extracting Ace Hardware engagement data...",
    "Processing competitor posting patterns...",
    "Analyzing engagement metrics...",
    "Identifying content gaps...",
    "Generating competitive insights...",
];

const LOWES_STEPS: &[&str] = &[
    "Searching Lowe's Instagram posts...",
    "Analyzing Lowe's Facebook content...",
    "Crawling Lowe's Twitter/X posts...",
    "Extracting engagement metrics...",
    "Identifying high-performing content...",
    "Analyzing low-performing posts...",
    "Processing posting patterns...",
    "Generating performance insights...",
];

const STRATEGY_STEPS: &[&str] = &[
    "Analyzing current market trends...",
    "Processing competitor data...",
    "Evaluating Lowe's performance patterns...",
    "Identifying content opportunities...",
    "Generating strategic recommendations...",
    "Creating content ideas...",
    "Optimizing posting strategies...",
];

const CAMPAIGN_STEPS: &[&str] = &[
    "Connecting to Google Ads API...",
    "Fetching Google Ads campaign data...",
    "Connecting to Meta Ads API...",
    "Retrieving Facebook/Instagram ad performance...",
    "Analyzing campaign ROI and ROAS...",
    "Identifying high-performing ad content...",
    "Processing cross-platform performance...",
    "Generating optimization recommendations...",
];

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Competitors,
        Category::Lowes,
        Category::Strategy,
        Category::Campaigns,
        Category::Full,
    ];

    /// Path segment used by the backend for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Competitors => "competitors",
            Category::Lowes => "lowes",
            Category::Strategy => "strategy",
            Category::Campaigns => "campaigns",
            Category::Full => "full",
        }
    }

    /// Display-only labels for the cosmetic progress animation.
    pub fn progress_steps(self) -> &'static [&'static str] {
        match self {
            Category::Competitors => COMPETITOR_STEPS,
            Category::Lowes => LOWES_STEPS,
            Category::Strategy => STRATEGY_STEPS,
            Category::Campaigns => CAMPAIGN_STEPS,
            Category::Full => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
