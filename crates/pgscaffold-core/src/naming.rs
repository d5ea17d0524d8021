//! Table-name normalization.
//!
//! Class, file and variable names are derived from a table identifier by
//! splitting it into words, inflecting the final word and re-joining in the
//! target case. Inflection goes through the [`Inflector`] trait so callers can
//! swap the English rules for a deterministic stub.

use heck::{ToSnakeCase, ToUpperCamelCase};

/// Singular/plural morphology for a single lowercase word.
pub trait Inflector {
    fn singularize(&self, word: &str) -> String;
    fn pluralize(&self, word: &str) -> String;
}

/// Rule-based English inflector.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "feedback",
    "fish",
    "information",
    "media",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
    "staff",
];

/// (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("analysis", "analyses"),
    ("cache", "caches"),
    ("calf", "calves"),
    ("child", "children"),
    ("cookie", "cookies"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("diagnosis", "diagnoses"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("half", "halves"),
    ("hero", "heroes"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("loaf", "loaves"),
    ("man", "men"),
    ("mouse", "mice"),
    ("movie", "movies"),
    ("ox", "oxen"),
    ("person", "people"),
    ("potato", "potatoes"),
    ("quiz", "quizzes"),
    ("self", "selves"),
    ("shelf", "shelves"),
    ("synopsis", "synopses"),
    ("thesis", "theses"),
    ("thief", "thieves"),
    ("tomato", "tomatoes"),
    ("tooth", "teeth"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("woman", "women"),
];

/// Singular words that end in `s` and must not lose it.
const SINGULAR_ENDING_IN_S: &[&str] = &[
    "alias", "atlas", "bias", "bonus", "bus", "campus", "canvas", "census", "corpus", "focus",
    "gas", "lens", "status", "virus",
];

impl Inflector for EnglishInflector {
    fn singularize(&self, word: &str) -> String {
        if word.is_empty() || UNCOUNTABLE.contains(&word) {
            return word.to_string();
        }
        if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == word) {
            return singular.to_string();
        }
        if IRREGULAR.iter().any(|(singular, _)| *singular == word)
            || SINGULAR_ENDING_IN_S.contains(&word)
        {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("es") {
            if SINGULAR_ENDING_IN_S.contains(&stem) {
                return stem.to_string();
            }
        }
        if let Some(stem) = word.strip_suffix("ies") {
            if word.len() > 4 {
                return format!("{stem}y");
            }
        }
        if word.ends_with("sses")
            || word.ends_with("xes")
            || word.ends_with("ches")
            || word.ends_with("shes")
            || word.ends_with("zzes")
        {
            return word[..word.len() - 2].to_string();
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }
        match word.strip_suffix('s') {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => word.to_string(),
        }
    }

    fn pluralize(&self, word: &str) -> String {
        if word.is_empty() || UNCOUNTABLE.contains(&word) {
            return word.to_string();
        }
        if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
            return plural.to_string();
        }
        if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix('y') {
            let before = stem.chars().last();
            if matches!(before, Some(ch) if !is_vowel(ch)) {
                return format!("{stem}ies");
            }
            return format!("{word}s");
        }
        if let Some(stem) = word.strip_suffix("is") {
            if !stem.is_empty() {
                return format!("{stem}es");
            }
        }
        if word.ends_with('s')
            || word.ends_with('x')
            || word.ends_with("zz")
            || word.ends_with("ch")
            || word.ends_with("sh")
        {
            return format!("{word}es");
        }
        format!("{word}s")
    }
}

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Name derivation for tables, parameterized by an inflector.
#[derive(Clone, Copy)]
pub struct Naming<'a> {
    inflector: &'a dyn Inflector,
}

impl std::fmt::Debug for Naming<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Naming").finish_non_exhaustive()
    }
}

impl<'a> Naming<'a> {
    pub fn new(inflector: &'a dyn Inflector) -> Self {
        Self { inflector }
    }

    /// PascalCase name with a singular final word (`order_items` -> `OrderItem`).
    pub fn class_name(&self, table: &str) -> String {
        self.inflected_words(table, true)
            .join("_")
            .to_upper_camel_case()
    }

    /// snake_case name with a singular final word (`order_items` -> `order_item`).
    pub fn file_name(&self, table: &str) -> String {
        self.inflected_words(table, true).join("_")
    }

    /// snake_case attribute name whose final word is singular or plural.
    pub fn variable_name(&self, table: &str, singular: bool) -> String {
        self.inflected_words(table, singular).join("_")
    }

    fn inflected_words(&self, table: &str, singular: bool) -> Vec<String> {
        let mut words = split_words(table);
        if let Some(last) = words.last_mut() {
            let base = self.inflector.singularize(last);
            *last = if singular {
                base
            } else {
                self.inflector.pluralize(&base)
            };
        }
        words
    }
}

/// Split an identifier into lowercase words. Accepts snake_case, kebab-case
/// and CamelCase input.
pub fn split_words(input: &str) -> Vec<String> {
    input
        .trim()
        .to_snake_case()
        .split('_')
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}
