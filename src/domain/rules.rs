//! Keyword override table for intent classification.
//!
//! Rules are evaluated in list order and the first key found as a substring
//! of the lowercased input wins. Multi-word keys sit above the single words
//! they contain ("mood swings" before "mood").

use crate::domain::Intent;

/// Default rules, most specific first.
const DEFAULT_RULES: &[(&str, &str)] = &[
    ("mood swings", "mood_swings"),
    ("mood swing", "mood_swings"),
    ("cramp", "pain_relief"),
    ("pain", "pain_relief"),
    ("headache", "pain_relief"),
    ("ache", "pain_relief"),
    ("craving", "cravings"),
    ("crave", "cravings"),
    ("chips", "cravings"),
    ("chocolate", "cravings"),
    ("salty", "cravings"),
    ("sweets", "cravings"),
    ("bloat", "bloating"),
    ("tired", "fatigue"),
    ("exhausted", "fatigue"),
    ("fatigue", "fatigue"),
    ("sad", "sadness"),
    ("cry", "sadness"),
    ("lonely", "sadness"),
    ("anxious", "anxiety"),
    ("anxiety", "anxiety"),
    ("mood", "emotional_support"),
    ("irritable", "emotional_support"),
    ("period is late", "late_period"),
    ("period late", "late_period"),
    ("late period", "late_period"),
    ("period is running late", "late_period"),
    ("missed my period", "late_period"),
    ("missed period", "late_period"),
    ("heavy flow", "heavy_flow"),
    ("heavy bleeding", "heavy_flow"),
    ("food", "nutrition"),
    ("diet", "nutrition"),
    ("hungry", "nutrition"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRule {
    pub pattern: String,
    pub intent: Intent,
}

/// Ordered (pattern, intent) list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<IntentRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<IntentRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| IntentRule {
                pattern: r.pattern.to_lowercase(),
                intent: r.intent,
            })
            .collect();
        Self { rules }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(pattern, intent)| IntentRule {
                    pattern: pattern.to_string(),
                    intent: Intent::new(intent),
                })
                .collect(),
        )
    }

    /// First rule whose pattern occurs in `normalized` (already lowercased).
    pub fn lookup(&self, normalized: &str) -> Option<&Intent> {
        self.rules
            .iter()
            .find(|r| normalized.contains(r.pattern.as_str()))
            .map(|r| &r.intent)
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Distinct intents in first-appearance order.
    pub fn intents(&self) -> Vec<&Intent> {
        let mut out: Vec<&Intent> = Vec::new();
        for r in &self.rules {
            if !out.contains(&&r.intent) {
                out.push(&r.intent);
            }
        }
        out
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_RULES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cramps_map_to_pain_relief() {
        let table = RuleTable::default();
        assert_eq!(
            table.lookup("i have cramps").map(Intent::as_str),
            Some("pain_relief")
        );
    }

    #[test]
    fn specific_key_beats_its_substring() {
        let table = RuleTable::default();
        assert_eq!(
            table.lookup("how to improve mood swings?").map(Intent::as_str),
            Some("mood_swings")
        );
        assert_eq!(
            table.lookup("my mood is off").map(Intent::as_str),
            Some("emotional_support")
        );
    }

    #[test]
    fn list_order_decides_between_two_matches() {
        let table = RuleTable::from_pairs([("sad", "sadness"), ("tired", "fatigue")]);
        assert_eq!(
            table.lookup("sad and tired").map(Intent::as_str),
            Some("sadness")
        );
        let flipped = RuleTable::from_pairs([("tired", "fatigue"), ("sad", "sadness")]);
        assert_eq!(
            flipped.lookup("sad and tired").map(Intent::as_str),
            Some("fatigue")
        );
    }

    #[test]
    fn patterns_are_lowercased() {
        let table = RuleTable::from_pairs([("PMS", "pms")]);
        assert!(table.lookup("is this pms?").is_some());
    }

    #[test]
    fn late_period_needs_period_context() {
        let table = RuleTable::default();
        assert_eq!(
            table.lookup("my period is late this month").map(Intent::as_str),
            Some("late_period")
        );
        assert_eq!(
            table.lookup("is a late period normal?").map(Intent::as_str),
            Some("late_period")
        );
        assert!(table.lookup("talk to you later").is_none());
        assert!(table.lookup("what's the latest research on pcos").is_none());
        assert!(table.lookup("i ate a plate of pasta").is_none());
    }

    #[test]
    fn no_match() {
        assert!(RuleTable::default().lookup("hello there").is_none());
    }

    #[test]
    fn intents_deduplicated_in_order() {
        let table = RuleTable::from_pairs([("a", "x"), ("b", "y"), ("c", "x")]);
        let names: Vec<&str> = table.intents().into_iter().map(Intent::as_str).collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
