// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Market-value estimate: a per-grade base value scaled by rarity and by the
// overall condition score.

use pregrade_core::GradeLabel;

use crate::rarity::RarityLookup;

/// Base value (in whole currency units) for a card of average rarity.
pub fn base_value(grade: GradeLabel) -> u32 {
    match grade {
        GradeLabel::GemMint => 1000,
        GradeLabel::Mint => 500,
        GradeLabel::NearMintMint => 250,
        GradeLabel::NearMint => 150,
        GradeLabel::ExcellentMint => 100,
        GradeLabel::Excellent => 75,
        GradeLabel::VeryGoodExcellent => 50,
        GradeLabel::VeryGood => 30,
        GradeLabel::GoodVeryGood => 20,
        GradeLabel::Good => 10,
        GradeLabel::Poor => 5,
        GradeLabel::Unknown => 25,
    }
}

/// `round(base(grade) * rarity * overall / 10)`.
pub fn estimate_value(
    grade: GradeLabel,
    overall_score: f64,
    card_text: &str,
    rarity: &dyn RarityLookup,
) -> u64 {
    let value = f64::from(base_value(grade)) * rarity.multiplier(card_text) * overall_score / 10.0;
    value.max(0.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rarity::KeywordRarity;

    #[test]
    fn gem_mint_charizard() {
        let rarity = KeywordRarity::default();
        assert_eq!(estimate_value(GradeLabel::GemMint, 10.0, "Charizard", &rarity), 5000);
        assert_eq!(estimate_value(GradeLabel::GemMint, 9.5, "", &rarity), 950);
    }

    #[test]
    fn unknown_grade_uses_fallback_base() {
        let rarity = KeywordRarity::default();
        assert_eq!(estimate_value(GradeLabel::Unknown, 5.0, "", &rarity), 13);
    }

    #[test]
    fn base_values_fall_with_grade() {
        let values: Vec<u32> = GradeLabel::ALL.iter().map(|g| base_value(*g)).collect();
        assert!(values.windows(2).all(|w| w[0] > w[1]), "{values:?}");
    }

    #[test]
    fn value_is_monotonic_within_a_grade() {
        let rarity = KeywordRarity::default();
        let mut last = 0;
        for step in 0..=10 {
            let score = 8.0 + f64::from(step) * 0.09;
            let value = estimate_value(GradeLabel::NearMintMint, score, "pikachu", &rarity);
            assert!(value >= last, "score {score}: {value} < {last}");
            last = value;
        }
    }
}
