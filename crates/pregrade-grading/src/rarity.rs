// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rarity lookup: how much a recognised card name raises the value estimate.

use pregrade_core::config::RarityKeyword;

/// Maps extracted card text to a market-value multiplier (1.0 = no premium).
pub trait RarityLookup: Send + Sync {
    fn multiplier(&self, card_text: &str) -> f64;
}

/// Case-insensitive substring match against a keyword table. When several
/// keywords match, the largest multiplier wins.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRarity {
    keywords: Vec<RarityKeyword>,
}

impl KeywordRarity {
    pub fn new(keywords: Vec<RarityKeyword>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|k| RarityKeyword {
                keyword: k.keyword.to_lowercase(),
                multiplier: k.multiplier,
            })
            .collect();
        Self { keywords }
    }
}

impl Default for KeywordRarity {
    fn default() -> Self {
        Self::new(pregrade_core::AnalysisConfig::default().rarity_keywords)
    }
}

impl RarityLookup for KeywordRarity {
    fn multiplier(&self, card_text: &str) -> f64 {
        let text = card_text.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| !k.keyword.is_empty() && text.contains(&k.keyword))
            .map(|k| k.multiplier)
            .fold(1.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_recognises_charizard() {
        let rarity = KeywordRarity::default();
        assert_eq!(rarity.multiplier("CHARIZARD  HP 120"), 5.0);
        assert_eq!(rarity.multiplier("Pidgey"), 1.0);
        assert_eq!(rarity.multiplier(""), 1.0);
    }

    #[test]
    fn largest_matching_multiplier_wins() {
        let rarity = KeywordRarity::new(vec![
            RarityKeyword {
                keyword: "Holo".into(),
                multiplier: 1.5,
            },
            RarityKeyword {
                keyword: "first edition".into(),
                multiplier: 3.0,
            },
        ]);
        assert_eq!(rarity.multiplier("First Edition holo"), 3.0);
        assert_eq!(rarity.multiplier("holo"), 1.5);
    }

    #[test]
    fn discounts_never_drop_below_one() {
        let rarity = KeywordRarity::new(vec![RarityKeyword {
            keyword: "proxy".into(),
            multiplier: 0.5,
        }]);
        assert_eq!(rarity.multiplier("proxy card"), 1.0);
    }
}
