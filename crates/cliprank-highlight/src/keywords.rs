//! Hook keyword tables and interrogative patterns.
//!
//! Keyword lists cover Indonesian and English; matching is lowercase
//! substring, the same way the scorer consumes them.

use once_cell::sync::Lazy;
use regex::Regex;

/// A keyword category with its scoring weight.
pub struct KeywordCategory {
    pub name: &'static str,
    pub weight: f64,
    pub keywords: &'static [&'static str],
}

/// Hook keyword categories ordered by weight.
pub static HOOK_CATEGORIES: &[KeywordCategory] = &[
    KeywordCategory {
        name: "importance",
        weight: 10.0,
        keywords: &[
            "ini penting",
            "yang penting",
            "kuncinya",
            "serius",
            "harus tahu",
            "important",
            "must know",
            "critical",
            "essential",
            "crucial",
        ],
    },
    KeywordCategory {
        name: "revelation",
        weight: 9.0,
        keywords: &[
            "gila",
            "ternyata",
            "rahasia",
            "trik",
            "tips",
            "cara terbaik",
            "secret",
            "amazing",
            "incredible",
            "shocking",
            "revelation",
            "turns out",
        ],
    },
    KeywordCategory {
        name: "summary",
        weight: 8.0,
        keywords: &[
            "jadi intinya",
            "kesimpulannya",
            "yang paling",
            "pokoknya",
            "in conclusion",
            "to summarize",
            "the point is",
            "basically",
        ],
    },
    KeywordCategory {
        name: "teaching",
        weight: 7.0,
        keywords: &[
            "cara",
            "bagaimana",
            "tutorial",
            "langkah",
            "pro tip",
            "how to",
            "step by step",
            "game changer",
            "breakthrough",
        ],
    },
];

/// Patterns that flag engaging, question-driven content.
pub static QUESTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b(apa|kenapa|mengapa|bagaimana|kapan|dimana|siapa)\b").unwrap(),
        Regex::new(r"\b(what|why|how|when|where|who)\b").unwrap(),
        Regex::new(r"\?").unwrap(),
    ]
});

/// Count matched keywords per category in lowercased `text`.
///
/// Returns `(category_name, match_count, weight)` for categories with at
/// least one hit, in table (weight) order.
pub fn detect_keyword_categories(text_lower: &str) -> Vec<(&'static str, usize, f64)> {
    HOOK_CATEGORIES
        .iter()
        .filter_map(|cat| {
            let matches = cat
                .keywords
                .iter()
                .filter(|kw| text_lower.contains(*kw))
                .count();
            (matches > 0).then_some((cat.name, matches, cat.weight))
        })
        .collect()
}

/// Whether any interrogative pattern appears in lowercased `text`.
pub fn contains_question(text_lower: &str) -> bool {
    QUESTION_PATTERNS.iter().any(|re| re.is_match(text_lower))
}
