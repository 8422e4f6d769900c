//! Lexicon-based sentiment scoring for news summaries.
//!
//! Each known word carries a polarity in [-1, 1] and a subjectivity in
//! [0, 1]. A text scores the mean over the words it contains. A negator
//! flips and damps the next scored word within a short window; an intensifier
//! scales it.

use std::collections::HashMap;
use std::sync::LazyLock;

/// (word, polarity, subjectivity)
const LEXICON: &[(&str, f64, f64)] = &[
    // General tone
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("amazing", 0.6, 0.9),
    ("impressive", 1.0, 1.0),
    ("positive", 0.23, 0.55),
    ("happy", 0.8, 1.0),
    ("optimistic", 0.6, 0.8),
    ("confident", 0.5, 0.8),
    ("successful", 0.75, 0.95),
    ("strong", 0.43, 0.73),
    ("solid", 0.3, 0.4),
    ("robust", 0.4, 0.5),
    ("healthy", 0.5, 0.5),
    ("favorable", 0.5, 0.6),
    ("attractive", 0.5, 0.75),
    ("bad", -0.7, 0.67),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("negative", -0.3, 0.4),
    ("weak", -0.38, 0.63),
    ("sad", -0.5, 1.0),
    ("pessimistic", -0.6, 0.8),
    ("disappointing", -0.6, 0.7),
    ("worried", -0.4, 0.8),
    ("uncertain", -0.3, 0.7),
    ("volatile", -0.3, 0.6),
    ("risky", -0.5, 0.7),
    ("difficult", -0.5, 1.0),
    ("unexpected", 0.1, 1.0),
    ("new", 0.14, 0.45),
    ("high", 0.16, 0.54),
    ("higher", 0.25, 0.5),
    ("low", 0.0, 0.3),
    ("lower", 0.0, 0.3),
    ("large", 0.21, 0.43),
    ("small", -0.25, 0.4),
    // Market language
    ("bullish", 0.6, 0.7),
    ("bearish", -0.6, 0.7),
    ("rally", 0.5, 0.6),
    ("rallies", 0.5, 0.6),
    ("surge", 0.5, 0.6),
    ("surges", 0.5, 0.6),
    ("soar", 0.6, 0.6),
    ("soars", 0.6, 0.6),
    ("gain", 0.4, 0.4),
    ("gains", 0.4, 0.4),
    ("growth", 0.4, 0.4),
    ("profit", 0.4, 0.4),
    ("profitable", 0.5, 0.5),
    ("record", 0.3, 0.4),
    ("beat", 0.4, 0.5),
    ("beats", 0.4, 0.5),
    ("upgrade", 0.5, 0.5),
    ("upgraded", 0.5, 0.5),
    ("outperform", 0.5, 0.6),
    ("rebound", 0.4, 0.5),
    ("recovery", 0.35, 0.45),
    ("plunge", -0.6, 0.7),
    ("plunges", -0.6, 0.7),
    ("slump", -0.5, 0.6),
    ("slumps", -0.5, 0.6),
    ("crash", -0.8, 0.8),
    ("tumble", -0.5, 0.6),
    ("tumbles", -0.5, 0.6),
    ("loss", -0.5, 0.5),
    ("losses", -0.5, 0.5),
    ("decline", -0.4, 0.4),
    ("declines", -0.4, 0.4),
    ("miss", -0.4, 0.5),
    ("misses", -0.4, 0.5),
    ("downgrade", -0.5, 0.5),
    ("downgraded", -0.5, 0.5),
    ("underperform", -0.5, 0.6),
    ("lawsuit", -0.4, 0.5),
    ("layoffs", -0.5, 0.5),
    ("bankruptcy", -0.8, 0.6),
    ("fear", -0.5, 0.8),
    ("fears", -0.5, 0.8),
    ("risk", -0.3, 0.5),
    ("concern", -0.3, 0.6),
    ("concerns", -0.3, 0.6),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't", "wasn't",
    "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly", "without",
];

/// (word, multiplier)
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("highly", 1.4),
    ("incredibly", 1.5),
    ("remarkably", 1.3),
    ("somewhat", 0.7),
    ("slightly", 0.5),
    ("barely", 0.4),
];

/// Tokens a negator stays active for
const NEGATION_WINDOW: usize = 3;

/// Polarity damping applied to negated words
const NEGATION_FACTOR: f64 = -0.5;

static LEXICON_MAP: LazyLock<HashMap<&'static str, (f64, f64)>> = LazyLock::new(|| {
    LEXICON
        .iter()
        .map(|&(word, polarity, subjectivity)| (word, (polarity, subjectivity)))
        .collect()
});

/// Sentiment of a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SentimentScore {
    /// Negative to positive tone, in [-1, 1]
    pub polarity: f64,
    /// Factual to opinionated, in [0, 1]
    pub subjectivity: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Scores `text`; text without any known word scores (0, 0).
    pub fn analyze(&self, text: &str) -> SentimentScore {
        let lowered = text.to_lowercase();
        let tokens = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty());

        let mut scored = Vec::new();
        let mut negation_left = 0usize;
        let mut intensity = 1.0;

        for token in tokens {
            if NEGATORS.contains(&token) {
                negation_left = NEGATION_WINDOW;
                continue;
            }
            if let Some(&(_, factor)) = INTENSIFIERS.iter().find(|(word, _)| *word == token) {
                intensity *= factor;
                continue;
            }

            match LEXICON_MAP.get(token) {
                Some(&(polarity, subjectivity)) => {
                    let mut polarity = polarity * intensity;
                    if negation_left > 0 {
                        polarity *= NEGATION_FACTOR;
                    }
                    let subjectivity = (subjectivity * intensity).min(1.0);
                    scored.push((polarity.clamp(-1.0, 1.0), subjectivity));
                    negation_left = 0;
                    intensity = 1.0;
                }
                None => {
                    negation_left = negation_left.saturating_sub(1);
                    intensity = 1.0;
                }
            }
        }

        if scored.is_empty() {
            return SentimentScore::default();
        }

        let count = scored.len() as f64;
        let polarity = scored.iter().map(|(p, _)| p).sum::<f64>() / count;
        let subjectivity = scored.iter().map(|(_, s)| s).sum::<f64>() / count;
        SentimentScore {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> SentimentScore {
        SentimentAnalyzer::new().analyze(text)
    }

    #[test]
    fn test_neutral_text_scores_zero() {
        assert_eq!(analyze("The company filed its quarterly report on Tuesday."), SentimentScore::default());
        assert_eq!(analyze(""), SentimentScore::default());
    }

    #[test]
    fn test_positive_and_negative_tone() {
        let positive = analyze("Shares rally after a great quarter with record profit.");
        assert!(positive.polarity > 0.3, "{positive:?}");
        assert!(positive.subjectivity > 0.0);

        let negative = analyze("Stock plunges as weak guidance raises fears of losses.");
        assert!(negative.polarity < -0.3, "{negative:?}");
    }

    #[test]
    fn test_single_word_uses_lexicon_values() {
        let score = analyze("Good.");
        assert!((score.polarity - 0.7).abs() < 1e-9);
        assert!((score.subjectivity - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_negation_flips_and_damps() {
        let plain = analyze("good");
        let negated = analyze("not good");
        assert!((negated.polarity - plain.polarity * NEGATION_FACTOR).abs() < 1e-9);
        assert!(negated.polarity < 0.0);
    }

    #[test]
    fn test_negation_window_expires() {
        let score = analyze("not that the market was really in any way good");
        assert!(score.polarity > 0.0, "{score:?}");
    }

    #[test]
    fn test_intensifier_scales_and_clamps() {
        let plain = analyze("strong");
        let intensified = analyze("very strong");
        assert!(intensified.polarity > plain.polarity);
        assert!(intensified.subjectivity <= 1.0);

        let capped = analyze("extremely excellent");
        assert_eq!(capped.polarity, 1.0);
        assert_eq!(capped.subjectivity, 1.0);
    }

    #[test]
    fn test_case_and_punctuation_are_ignored() {
        assert_eq!(analyze("BULLISH!!!"), analyze("bullish"));
    }
}
