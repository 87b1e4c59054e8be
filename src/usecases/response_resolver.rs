//! Response selection: template lookup, repeat avoidance, cravings narrowing,
//! random pick.

use crate::domain::{FALLBACK_RESPONSE, Intent, ResponseCatalog};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Input cues that point a cravings question at salty food.
pub const SALTY_CUES: &[&str] = &[
    "salty", "salt", "chips", "crisps", "fries", "pretzel", "popcorn",
];
/// Input cues that point a cravings question at sweet food.
pub const SWEET_CUES: &[&str] = &[
    "sweet",
    "chocolate",
    "candy",
    "sugar",
    "dessert",
    "cake",
    "cookie",
    "ice cream",
];

/// Template keywords marking a salty-food suggestion.
const SALTY_KEYWORDS: &[&str] = &["salt", "chips", "popcorn", "nuts", "edamame", "pretzel"];
/// Template keywords marking a sweet-food suggestion.
const SWEET_KEYWORDS: &[&str] = &["sweet", "chocolate", "fruit", "dates", "honey"];

/// Per-conversation state: the last emitted response and the RNG used for picks.
pub struct ConversationContext {
    last_response: Option<String>,
    rng: StdRng,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self {
            last_response: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible picks.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            last_response: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Session end: forget the last response.
    pub fn reset(&mut self) {
        self.last_response = None;
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Keep only templates containing one of `keywords`, unless none do.
fn narrow<'a>(candidates: Vec<&'a str>, keywords: &[&str]) -> Vec<&'a str> {
    let narrowed: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|t| contains_any(&t.to_lowercase(), keywords))
        .collect();
    if narrowed.is_empty() {
        candidates
    } else {
        narrowed
    }
}

/// Final candidate set before the random pick. Never empty.
pub fn candidate_set<'a>(
    catalog: &'a ResponseCatalog,
    intent: &Intent,
    input: &str,
    last_response: Option<&str>,
) -> Vec<&'a str> {
    let all: Vec<&str> = match catalog.templates_for(intent) {
        Some(templates) => templates.iter().map(String::as_str).collect(),
        None => vec![FALLBACK_RESPONSE],
    };

    let mut candidates: Vec<&str> = all
        .iter()
        .copied()
        .filter(|t| Some(*t) != last_response)
        .collect();
    if candidates.is_empty() {
        candidates = all;
    }

    if intent.as_str() == Intent::CRAVINGS {
        let lower = input.to_lowercase();
        if contains_any(&lower, SALTY_CUES) {
            candidates = narrow(candidates, SALTY_KEYWORDS);
        } else if contains_any(&lower, SWEET_CUES) {
            candidates = narrow(candidates, SWEET_KEYWORDS);
        }
    }
    candidates
}

/// Pick a response for `intent` and record it as the conversation's last response.
pub fn resolve_response(
    catalog: &ResponseCatalog,
    intent: &Intent,
    input: &str,
    ctx: &mut ConversationContext,
) -> String {
    let candidates = candidate_set(catalog, intent, input, ctx.last_response());
    let chosen = candidates
        .choose(&mut ctx.rng)
        .copied()
        .unwrap_or(FALLBACK_RESPONSE)
        .to_string();
    ctx.last_response = Some(chosen.clone());
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn catalog(entries: &[(&str, &[&str])]) -> ResponseCatalog {
        let map: HashMap<String, Vec<String>> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect();
        ResponseCatalog::new(map)
    }

    #[test]
    fn never_repeats_last_when_alternatives_exist() {
        let catalog = catalog(&[("x", &["one", "two"])]);
        let intent = Intent::new("x");
        let mut ctx = ConversationContext::with_seed(1);
        let mut prev = resolve_response(&catalog, &intent, "", &mut ctx);
        for _ in 0..50 {
            let next = resolve_response(&catalog, &intent, "", &mut ctx);
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn single_template_repeats() {
        let catalog = catalog(&[("x", &["only"])]);
        let intent = Intent::new("x");
        let mut ctx = ConversationContext::with_seed(1);
        assert_eq!(resolve_response(&catalog, &intent, "", &mut ctx), "only");
        assert_eq!(resolve_response(&catalog, &intent, "", &mut ctx), "only");
    }

    #[test]
    fn unknown_intent_uses_general_then_fallback() {
        let with_general = catalog(&[("general", &["g"])]);
        let mut ctx = ConversationContext::with_seed(1);
        assert_eq!(
            resolve_response(&with_general, &Intent::new("nope"), "", &mut ctx),
            "g"
        );

        let empty = ResponseCatalog::default();
        assert_eq!(
            resolve_response(&empty, &Intent::new("nope"), "", &mut ctx),
            FALLBACK_RESPONSE
        );
    }

    #[test]
    fn salty_cue_narrows_cravings() {
        let catalog = ResponseCatalog::builtin();
        let intent = Intent::new(Intent::CRAVINGS);
        let set = candidate_set(&catalog, &intent, "I want chips so bad", None);
        assert!(!set.is_empty());
        for t in &set {
            assert!(contains_any(&t.to_lowercase(), SALTY_KEYWORDS), "{}", t);
        }
    }

    #[test]
    fn sweet_cue_narrows_cravings() {
        let catalog = ResponseCatalog::builtin();
        let intent = Intent::new(Intent::CRAVINGS);
        let set = candidate_set(&catalog, &intent, "need chocolate", None);
        assert!(!set.is_empty());
        for t in &set {
            assert!(contains_any(&t.to_lowercase(), SWEET_KEYWORDS), "{}", t);
        }
    }

    #[test]
    fn salty_wins_when_both_cues_present() {
        let catalog = ResponseCatalog::builtin();
        let intent = Intent::new(Intent::CRAVINGS);
        let set = candidate_set(&catalog, &intent, "chips or chocolate?", None);
        assert!(set.iter().all(|t| contains_any(&t.to_lowercase(), SALTY_KEYWORDS)));
    }

    #[test]
    fn narrowing_never_empties_the_set() {
        let catalog = catalog(&[("cravings", &["Eat regular meals.", "Drink water."])]);
        let intent = Intent::new(Intent::CRAVINGS);
        let set = candidate_set(&catalog, &intent, "chips", None);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn narrowing_applies_after_dedup() {
        let catalog = catalog(&[("cravings", &["salted nuts", "popcorn", "fruit"])]);
        let intent = Intent::new(Intent::CRAVINGS);
        let set = candidate_set(&catalog, &intent, "chips", Some("salted nuts"));
        assert_eq!(set, vec!["popcorn"]);
    }

    #[test]
    fn no_cue_leaves_cravings_untouched() {
        let catalog = ResponseCatalog::builtin();
        let intent = Intent::new(Intent::CRAVINGS);
        let set = candidate_set(&catalog, &intent, "cravings are wild", None);
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn other_intents_ignore_food_cues() {
        let catalog = ResponseCatalog::builtin();
        let intent = Intent::new("nutrition");
        let set = candidate_set(&catalog, &intent, "chips", None);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn reset_forgets_last_response() {
        let catalog = catalog(&[("x", &["a"])]);
        let mut ctx = ConversationContext::with_seed(3);
        resolve_response(&catalog, &Intent::new("x"), "", &mut ctx);
        assert_eq!(ctx.last_response(), Some("a"));
        ctx.reset();
        assert!(ctx.last_response().is_none());
    }
}
