use crate::types::Category;

/// One keyword rule; the first rule with any keyword present wins.
struct Rule {
    keywords: &'static [&'static str],
    category: Category,
}

/// Ordered priority list evaluated over the lowercased title + summary.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["bitcoin", "btc"],
        category: Category::Bitcoin,
    },
    Rule {
        keywords: &["defi", "decentralized finance"],
        category: Category::Defi,
    },
    Rule {
        keywords: &["ethereum", "eth", "altcoin"],
        category: Category::Altcoins,
    },
    Rule {
        keywords: &["fed", "interest rate", "inflation"],
        category: Category::Macro,
    },
];

/// Source names containing these land in altcoins when no rule matched.
const SOURCE_HINTS: &[&str] = &["coin", "crypto"];

/// Assign a topic label from text heuristics. Pure and deterministic:
/// identical inputs always yield the same category, and only categories the
/// rules name are ever produced (never the legacy `stocks`).
pub fn categorize(title: &str, summary: &str, source: &str) -> Category {
    let text = format!("{} {}", title, summary).to_lowercase();

    for rule in RULES {
        if rule.keywords.iter().any(|kw| text.contains(kw)) {
            return rule.category;
        }
    }

    let source = source.to_lowercase();
    if SOURCE_HINTS.iter().any(|hint| source.contains(hint)) {
        return Category::Altcoins;
    }

    // General finance stories fall under macro; there is no catch-all bucket.
    Category::Macro
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitcoin_keywords() {
        assert_eq!(
            categorize("Bitcoin breaks $100k", "", "Reuters"),
            Category::Bitcoin
        );
        assert_eq!(
            categorize("BTC rally continues", "", "Reuters"),
            Category::Bitcoin
        );
    }

    #[test]
    fn test_summary_is_searched_too() {
        assert_eq!(
            categorize("Market roundup", "Bitcoin leads the recovery", "Reuters"),
            Category::Bitcoin
        );
    }

    #[test]
    fn test_defi_keywords() {
        assert_eq!(
            categorize("DeFi protocol hacked", "", "Reuters"),
            Category::Defi
        );
        assert_eq!(
            categorize("The rise of decentralized finance", "", "Reuters"),
            Category::Defi
        );
    }

    #[test]
    fn test_altcoin_keywords() {
        assert_eq!(
            categorize("Ethereum upgrade ships", "", "Reuters"),
            Category::Altcoins
        );
        assert_eq!(
            categorize("Altcoin season approaches", "", "Reuters"),
            Category::Altcoins
        );
    }

    #[test]
    fn test_macro_keywords() {
        assert_eq!(
            categorize("Fed holds rates steady", "", "Reuters"),
            Category::Macro
        );
        assert_eq!(
            categorize("Inflation cools in July", "", "Reuters"),
            Category::Macro
        );
    }

    #[test]
    fn test_first_match_wins() {
        // Mentions both bitcoin and ethereum; the bitcoin rule is earlier.
        assert_eq!(
            categorize("Bitcoin and Ethereum diverge", "", "Reuters"),
            Category::Bitcoin
        );
        // Mentions defi and inflation; defi rule is earlier.
        assert_eq!(
            categorize("DeFi yields beat inflation", "", "Reuters"),
            Category::Defi
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            categorize("BITCOIN SURGES", "", "Reuters"),
            Category::Bitcoin
        );
        assert_eq!(categorize("DeFi Update", "", "Reuters"), Category::Defi);
    }

    #[test]
    fn test_source_hint_fallback() {
        assert_eq!(
            categorize("Weekly market wrap", "", "CoinDesk"),
            Category::Altcoins
        );
        assert_eq!(
            categorize("Weekly market wrap", "", "CryptoSlate"),
            Category::Altcoins
        );
    }

    #[test]
    fn test_default_is_macro() {
        assert_eq!(
            categorize("Stocks close higher", "", "Bloomberg"),
            Category::Macro
        );
    }

    #[test]
    fn test_idempotent() {
        let first = categorize("Some headline", "some summary", "Decrypt");
        let second = categorize("Some headline", "some summary", "Decrypt");
        assert_eq!(first, second);
    }

    #[test]
    fn test_never_assigns_stocks() {
        let samples = [
            ("Bitcoin rally", "", "CoinDesk"),
            ("Stock market news", "equities up", "Bloomberg"),
            ("DeFi summer", "", "Blockworks"),
            ("", "", ""),
        ];
        for (title, summary, source) in samples {
            assert_ne!(categorize(title, summary, source), Category::Stocks);
        }
    }
}
