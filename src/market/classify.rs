//! Category classification
//!
//! A market belongs to a category when one of the category's tag slugs
//! appears among its parent event's tags (primary match), or when one of the
//! fallback keywords appears in its question text or category label
//! (secondary heuristic). The table is data; the matching function is the
//! only code path.

use super::{Category, Market};

/// Tag and keyword sets for one category
#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    /// Event tag labels/slugs accepted as a primary match
    pub tags: &'static [&'static str],
    /// Keywords scanned over question text and category label as a fallback
    pub keywords: &'static [&'static str],
}

/// Classification table for the filtered categories. `Trending` and `All`
/// have no entry; they do not narrow the result set.
pub fn category_spec(category: Category) -> Option<&'static CategorySpec> {
    match category {
        Category::Politics => Some(&CategorySpec {
            tags: &["politics", "election", "elections", "government"],
            keywords: &["politic", "election", "government", "senate", "congress"],
        }),
        Category::Crypto => Some(&CategorySpec {
            tags: &["crypto", "bitcoin", "ethereum", "solana"],
            keywords: &["crypto", "bitcoin", "ethereum", "solana", "btc", "eth"],
        }),
        Category::Finance | Category::Economy => Some(&CategorySpec {
            tags: &["business", "finance", "economy", "fed"],
            keywords: &["finance", "economy", "inflation", "rate", "usd", "fed"],
        }),
        Category::Tech => Some(&CategorySpec {
            tags: &["tech", "ai", "big-tech", "science"],
            // "ai" stays tag-only; as a substring it matches far too much
            keywords: &["tech", "nvidia", "google", "openai", "apple"],
        }),
        Category::Trump => Some(&CategorySpec {
            tags: &["trump"],
            keywords: &["trump"],
        }),
        Category::World => Some(&CategorySpec {
            tags: &["world", "world-affairs", "geopolitics"],
            keywords: &["world", "war", "ukraine", "china", "affairs"],
        }),
        Category::Trending | Category::All => None,
    }
}

/// Whether a market belongs to a category
///
/// Unfiltered categories match everything.
pub fn matches_category(market: &Market, category: Category) -> bool {
    let Some(spec) = category_spec(category) else {
        return true;
    };

    // Primary: event tag labels
    if market
        .tags
        .iter()
        .any(|tag| spec.tags.iter().any(|wanted| tag == wanted))
    {
        return true;
    }

    // Secondary: keyword scan over question text and category label
    let haystack = format!(
        "{} {} {}",
        market.question, market.event_title, market.category
    )
    .to_lowercase();
    spec.keywords.iter().any(|kw| haystack.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::testutil::test_market;

    #[test]
    fn test_primary_tag_match() {
        let mut market = test_market("1");
        market.tags = vec!["politics".to_string(), "2028".to_string()];
        assert!(matches_category(&market, Category::Politics));
        assert!(!matches_category(&market, Category::Crypto));
    }

    #[test]
    fn test_keyword_fallback_on_empty_tags() {
        let mut market = test_market("2");
        market.question = "Will Bitcoin close above $100k this month?".to_string();
        assert!(market.tags.is_empty());
        assert!(matches_category(&market, Category::Crypto));
    }

    #[test]
    fn test_keyword_fallback_btc_abbreviation() {
        let mut market = test_market("3");
        market.question = "BTC above 95k by Friday?".to_string();
        assert!(matches_category(&market, Category::Crypto));
    }

    #[test]
    fn test_finance_matches_rate_keyword() {
        let mut market = test_market("4");
        market.question = "Fed rate cut in September?".to_string();
        assert!(matches_category(&market, Category::Finance));
        assert!(matches_category(&market, Category::Economy));
    }

    #[test]
    fn test_tech_matches_vendor_names() {
        let mut market = test_market("5");
        market.question = "Will Nvidia beat earnings estimates?".to_string();
        assert!(matches_category(&market, Category::Tech));
    }

    #[test]
    fn test_category_label_fallback() {
        let mut market = test_market("6");
        market.question = "Ceasefire by year end?".to_string();
        market.category = "World Affairs".to_string();
        assert!(matches_category(&market, Category::World));
    }

    #[test]
    fn test_unfiltered_categories_match_everything() {
        let market = test_market("7");
        assert!(matches_category(&market, Category::Trending));
        assert!(matches_category(&market, Category::All));
    }

    #[test]
    fn test_no_match() {
        let mut market = test_market("8");
        market.question = "Next James Bond actor announced in 2026?".to_string();
        assert!(!matches_category(&market, Category::Trump));
        assert!(!matches_category(&market, Category::Crypto));
    }
}
