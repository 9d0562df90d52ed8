//! Heuristic request complexity classification
//!
//! Scores a prompt and its token budget; the router uses the result to bias
//! simple requests toward free providers and complex ones toward providers
//! with large context windows.

use serde::Serialize;

/// Keywords that mark a request as demanding (+2 each)
pub const COMPLEX_KEYWORDS: &[&str] = &[
    "analyse",
    "analyze",
    "détaillé",
    "detailed",
    "nutrition",
    "compare",
    "optimise",
    "optimize",
    "stratégie",
    "planifie",
    "budget",
    "explique pourquoi",
    "étape par étape",
    "step by step",
    "évalue",
    "recommandation",
];

/// Keywords that mark a request as routine (−1 each)
pub const SIMPLE_KEYWORDS: &[&str] = &[
    "liste",
    "courses",
    "rappel",
    "ajoute",
    "supprime",
    "traduis",
    "résume",
    "combien",
    "quelle heure",
    "bonjour",
    "merci",
];

/// Detected request complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }

    fn from_score(score: i32) -> Self {
        if score >= 4 {
            Self::Complex
        } else if score >= 1 {
            Self::Medium
        } else {
            Self::Simple
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless keyword and size based classifier
#[derive(Debug, Clone)]
pub struct ComplexityClassifier {
    complex_keywords: Vec<String>,
    simple_keywords: Vec<String>,
}

impl ComplexityClassifier {
    /// Classifier with the built-in keyword lists
    pub fn new() -> Self {
        Self::with_keywords(COMPLEX_KEYWORDS, SIMPLE_KEYWORDS)
    }

    /// Classifier with custom keyword lists (matched case-insensitively)
    pub fn with_keywords<C, S>(complex: C, simple: S) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            complex_keywords: complex.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
            simple_keywords: simple.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
        }
    }

    /// Raw score; every keyword found adds or subtracts without a cap
    pub fn score(&self, prompt: &str, max_tokens: u32) -> i32 {
        let mut score = 0;

        let length = prompt.chars().count();
        if length > 500 {
            score += 2;
        } else if length > 200 {
            score += 1;
        }

        if max_tokens > 2000 {
            score += 2;
        } else if max_tokens > 1000 {
            score += 1;
        }

        let lowered = prompt.to_lowercase();
        for keyword in &self.complex_keywords {
            if lowered.contains(keyword.as_str()) {
                score += 2;
            }
        }
        for keyword in &self.simple_keywords {
            if lowered.contains(keyword.as_str()) {
                score -= 1;
            }
        }

        score
    }

    pub fn classify(&self, prompt: &str, max_tokens: u32) -> Complexity {
        Complexity::from_score(self.score(prompt, max_tokens))
    }
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopping_list_is_simple() {
        let classifier = ComplexityClassifier::new();
        assert_eq!(classifier.classify("liste des courses", 100), Complexity::Simple);
    }

    #[test]
    fn test_detailed_nutrition_analysis_is_complex() {
        let classifier = ComplexityClassifier::new();
        assert_eq!(
            classifier.classify("analyse nutritionnelle détaillée", 3000),
            Complexity::Complex
        );
    }

    #[test]
    fn test_length_thresholds() {
        let classifier = ComplexityClassifier::with_keywords(Vec::<&str>::new(), Vec::<&str>::new());
        assert_eq!(classifier.score(&"a".repeat(200), 0), 0);
        assert_eq!(classifier.score(&"a".repeat(201), 0), 1);
        assert_eq!(classifier.score(&"a".repeat(500), 0), 1);
        assert_eq!(classifier.score(&"a".repeat(501), 0), 2);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let classifier = ComplexityClassifier::with_keywords(Vec::<&str>::new(), Vec::<&str>::new());
        // 150 two-byte characters: 300 bytes but only 150 characters.
        assert_eq!(classifier.score(&"é".repeat(150), 0), 0);
    }

    #[test]
    fn test_token_thresholds() {
        let classifier = ComplexityClassifier::with_keywords(Vec::<&str>::new(), Vec::<&str>::new());
        assert_eq!(classifier.score("", 1000), 0);
        assert_eq!(classifier.score("", 1001), 1);
        assert_eq!(classifier.score("", 2000), 1);
        assert_eq!(classifier.score("", 2001), 2);
    }

    #[test]
    fn test_keyword_scores_are_cumulative_and_uncapped() {
        let classifier = ComplexityClassifier::new();
        // analyse, compare, budget, stratégie: 4 x 2
        let prompt = "Analyse et compare notre budget, propose une stratégie";
        assert_eq!(classifier.score(prompt, 0), 8);
        assert_eq!(classifier.classify(prompt, 0), Complexity::Complex);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let classifier = ComplexityClassifier::new();
        assert_eq!(classifier.score("ANALYSE", 0), 2);
        assert_eq!(classifier.score("Bonjour, AJOUTE du lait", 0), -2);
    }

    #[test]
    fn test_medium_band() {
        let classifier = ComplexityClassifier::new();
        assert_eq!(classifier.classify("quel temps fera-t-il demain", 1500), Complexity::Medium);
    }

    #[test]
    fn test_custom_keywords() {
        let classifier = ComplexityClassifier::with_keywords(["Recette"], ["Oui"]);
        assert_eq!(classifier.score("une recette", 0), 2);
        assert_eq!(classifier.score("oui", 0), -1);
        assert_eq!(classifier.score("analyse", 0), 0);
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let a = ComplexityClassifier::new();
        let b = ComplexityClassifier::new();
        let prompt = "Planifie les repas de la semaine";
        assert_eq!(a.score(prompt, 1200), b.score(prompt, 1200));
        assert_eq!(Complexity::Complex.to_string(), "complex");
    }
}
