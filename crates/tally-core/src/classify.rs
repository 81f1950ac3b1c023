//! Description classification
//!
//! Three independent views of the same description text: a spending
//! category, a recurring-charge flag, and a cleaned merchant label. The
//! category rules are an ordered table, first match wins, so precedence is
//! data rather than branch order.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Category;

/// One keyword group mapped to a category. Groups are evaluated in table
/// order; the first group with any matching keyword decides.
pub struct CategoryRule {
    pub category: Category,
    pub keywords: &'static [&'static str],
}

/// Ordered categorization rules.
///
/// The streaming/subscription group is deliberately first: a description
/// containing both "netflix" and "gym" is a Subscription, not Fitness.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Subscription,
        keywords: &[
            "netflix",
            "spotify",
            "disney",
            "prime",
            "youtube premium",
            "apple music",
            "hbo",
            "subscription",
        ],
    },
    CategoryRule {
        category: Category::Rent,
        keywords: &["rent", "mortgage"],
    },
    CategoryRule {
        category: Category::Groceries,
        keywords: &["grocery", "tesco", "sainsbury", "asda"],
    },
    CategoryRule {
        category: Category::Fitness,
        keywords: &["gym", "fitness"],
    },
    CategoryRule {
        category: Category::Dining,
        keywords: &["restaurant", "cafe", "takeaway"],
    },
    CategoryRule {
        category: Category::Transport,
        keywords: &["transport", "uber", "train"],
    },
];

/// Keywords that flag a charge as recurring. Broader than the Subscription
/// category group: generic billing words ("monthly", "membership") count
/// here, so a gym membership is recurring even though it categorizes as
/// Fitness.
pub const SUBSCRIPTION_KEYWORDS: &[&str] = &[
    "netflix",
    "spotify",
    "amazon prime",
    "disney",
    "apple music",
    "youtube premium",
    "hbo",
    "gym",
    "fitness",
    "subscription",
    "monthly",
    "annual",
    "membership",
];

/// Assign a spending category by keyword precedence.
pub fn categorize(description: &str) -> Category {
    let lower = description.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
        .map(|rule| rule.category)
        .unwrap_or(Category::Other)
}

/// True if the description matches any recurring-charge keyword.
///
/// Independent of [`categorize`] by design; see [`SUBSCRIPTION_KEYWORDS`].
pub fn is_recurring(description: &str) -> bool {
    let lower = description.to_lowercase();
    SUBSCRIPTION_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn date_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}/\d{2}/\d{2,4}").expect("valid pattern"))
}

fn code_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]{2,3}\s\d+").expect("valid pattern"))
}

/// Clean a description down to a merchant label.
///
/// Strips embedded `DD/MM/YY(YY)` date tokens and short uppercase
/// transaction codes ("REF 12345" style), trims, and truncates to 50
/// characters. The result doubles as the subscription-grouping key, so two
/// raw descriptions that clean to the same label are the same subscription.
pub fn extract_merchant(description: &str) -> String {
    let cleaned = date_token_re().replace_all(description, "");
    let cleaned = code_token_re().replace_all(&cleaned, "");
    cleaned.trim().chars().take(50).collect()
}
