//! Data models for the analyzer.
//!
//! This module contains the core data structures used throughout the
//! application for representing extracted items, leaderboard entries, and
//! analysis requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller access level, controlling how many items one analysis returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Free tier - capped at a small fixed number of items
    Free,
    /// Pro tier - expanded result cap
    Pro,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Pro => write!(f, "pro"),
        }
    }
}

/// What kind of insight the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    /// Winning-product detection
    #[serde(alias = "products")]
    Product,
    /// Ad-creative breakdown
    #[serde(alias = "ads")]
    Ad,
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisType::Product => write!(f, "product"),
            AnalysisType::Ad => write!(f, "ad"),
        }
    }
}

/// Closed product category set. Anything the model invents that is not
/// recognized maps to [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Tech,
    Health,
    Beauty,
    Fitness,
    Home,
    Kitchen,
    Fashion,
    Pets,
    Kids,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Tech => write!(f, "Tech"),
            Category::Health => write!(f, "Health"),
            Category::Beauty => write!(f, "Beauty"),
            Category::Fitness => write!(f, "Fitness"),
            Category::Home => write!(f, "Home"),
            Category::Kitchen => write!(f, "Kitchen"),
            Category::Fashion => write!(f, "Fashion"),
            Category::Pets => write!(f, "Pets"),
            Category::Kids => write!(f, "Kids"),
            Category::Other => write!(f, "Other"),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "tech" | "technology" | "electronics" | "gadgets" => Category::Tech,
            "health" | "health products" | "wellness" | "supplements" => Category::Health,
            "beauty" | "beauty & skincare" | "skincare" | "cosmetics" => Category::Beauty,
            "fitness" | "sports" | "sports & fitness" | "outdoors" => Category::Fitness,
            "home" | "home & garden" | "household" | "garden" => Category::Home,
            "kitchen" | "kitchen & dining" | "cooking" => Category::Kitchen,
            "fashion" | "clothing" | "apparel" | "accessories" | "jewelry" => Category::Fashion,
            "pets" | "pet supplies" | "pet" => Category::Pets,
            "kids" | "baby" | "toys" | "kids & toys" => Category::Kids,
            _ => Category::Other,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::from(s.as_str())
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.to_string()
    }
}

/// One detected product or ad mention, post-normalization.
///
/// Invariant: `name` is non-empty and `confidence` is within 0-100. Records
/// that cannot satisfy this are dropped by the normalizer, never surfaced.
/// Optional text fields are empty strings rather than nulls so consumers
/// need no null-checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    /// Product or ad name (short and clear).
    pub name: String,
    /// Landing page or product URL, if the model surfaced one.
    pub url: String,
    /// Product image URL.
    pub image: String,
    /// Category mapped onto the closed set.
    pub category: Category,
    /// Confidence score, 0-100.
    pub confidence: u8,
    /// Platform the ad was seen on (TikTok, Facebook, ...).
    pub ad_platform: String,
    /// Angle the creative takes (problem-solving, curiosity, ...).
    pub ad_angle: String,
    /// Audience the creative targets.
    pub target_audience: String,
    /// Reconstructed ad script or hook.
    pub ad_script: String,
    /// One-paragraph assessment.
    pub summary: String,
    /// Run / skip / rework call.
    pub verdict: String,
    /// Actionable next step for the caller.
    pub advice: String,
    /// Demand signal read from the page (reviews, sold counts, ...).
    pub demand_signal: String,
    /// Creative quality read.
    pub ad_quality: String,
    /// Trend timing read (early, peaking, saturated).
    pub trend_timing: String,
    /// Engagement read (comments, shares).
    pub engagement: String,
    /// Whether the scanned page carried video creatives. Derived from the
    /// request context, not from the model.
    pub has_video: bool,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            image: String::new(),
            category: Category::Other,
            confidence: 50,
            ad_platform: String::new(),
            ad_angle: String::new(),
            target_audience: String::new(),
            ad_script: String::new(),
            summary: String::new(),
            verdict: String::new(),
            advice: String::new(),
            demand_signal: String::new(),
            ad_quality: String::new(),
            trend_timing: String::new(),
            engagement: String::new(),
            has_video: false,
        }
    }
}

/// Aggregate popularity record for one identity key.
///
/// The display name keeps its first-seen casing; the category tracks the
/// most-recently-seen value. `count` only ever increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Display name, first-seen casing.
    pub name: String,
    /// How often this identity key has appeared across all analyses.
    pub count: u64,
    /// Most-recently-seen category.
    pub category: Category,
    /// When this key first appeared.
    pub first_seen: DateTime<Utc>,
    /// When this key last appeared.
    pub last_seen: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Creates a fresh entry at count zero.
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            count: 0,
            category,
            first_seen: now,
            last_seen: now,
        }
    }
}

/// Caller input for one analysis call. Constructed per HTTP request, never
/// persisted.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Free-text page content to scan.
    pub content: String,
    /// Access level of the caller.
    pub tier: Tier,
    /// Product or ad analysis.
    pub analysis_type: AnalysisType,
    /// Whether the scanned page carried video creatives.
    pub has_video_hint: bool,
}
