//! Canned response templates keyed by intent.

use crate::domain::Intent;
use std::collections::HashMap;

/// Used when neither the intent nor `general` has templates.
pub const FALLBACK_RESPONSE: &str = "I'm here to listen. Tell me more about how you're feeling.";

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "general",
        &[
            "I'm here to listen. Tell me more about how you're feeling.",
            "Could you describe your symptoms in more detail?",
            "I'm Luna, your cycle assistant. Ask me about symptoms, moods or your next period.",
        ],
    ),
    (
        "pain_relief",
        &[
            "I'm sorry you're hurting. Try a warm compress and gentle stretches.",
            "Magnesium-rich foods or a magnesium supplement might help with the cramps.",
            "Rest is important. Have you tried drinking chamomile or ginger tea?",
        ],
    ),
    (
        "emotional_support",
        &[
            "It's completely normal to feel this way. Be kind to yourself.",
            "Your hormones are shifting right now. Take it easy today.",
            "Sending you a virtual hug! Maybe watch your favorite comfort movie?",
        ],
    ),
    (
        "mood_swings",
        &[
            "Mood swings are common before a period as estrogen and progesterone drop.",
            "A short walk, steady meals and good sleep can soften mood swings.",
            "Tracking your moods alongside your cycle can show when swings tend to hit.",
        ],
    ),
    (
        "sadness",
        &[
            "Feeling low around your period is real and valid. You don't have to push through alone.",
            "Be gentle with yourself today. Is there someone you can reach out to?",
            "Sometimes a good cry helps. Let it out, then do something small that comforts you.",
        ],
    ),
    (
        "anxiety",
        &[
            "Try a slow breath: in for four counts, hold for four, out for six.",
            "Hormonal shifts can make anxiety louder. Naming what you feel can help.",
            "Cutting back on caffeine for a few days may ease the jittery feeling.",
        ],
    ),
    (
        "fatigue",
        &[
            "Low energy is common during your period. Iron-rich foods can help.",
            "Try to get a little extra sleep tonight and keep your water intake up.",
            "Light movement like stretching or a short walk can lift your energy.",
        ],
    ),
    (
        "cravings",
        &[
            "Craving salt? Try lightly salted popcorn or a handful of roasted nuts.",
            "For a salty fix, baked chips or salted edamame are gentler options.",
            "Craving something sweet? A square of dark chocolate is a great choice.",
            "Fresh fruit or dates can satisfy a sweet tooth with a bit of fiber.",
            "Cravings are normal right now. Eating regular meals can keep them in check.",
        ],
    ),
    (
        "bloating",
        &[
            "Bloating often eases with water and less salty food.",
            "Peppermint or fennel tea can help calm bloating.",
            "Gentle movement and smaller meals can reduce that puffy feeling.",
        ],
    ),
    (
        "nutrition",
        &[
            "Focus on iron-rich foods like spinach and lean proteins.",
            "Stay hydrated! Water helps with bloating and headaches.",
            "Avoid too much caffeine and salt today if you can.",
        ],
    ),
    (
        "late_period",
        &[
            "Stress, travel, illness and sleep changes can all delay a period.",
            "A cycle that is a few days late now and then is usually normal.",
            "If your period is very late or you might be pregnant, consider a test or a doctor's visit.",
        ],
    ),
    (
        "heavy_flow",
        &[
            "Heavy flow can be tiring. Keep an eye on dizziness and eat iron-rich foods.",
            "If you're soaking through a pad or tampon every hour, please contact a doctor.",
            "Logging your flow each day helps spot patterns worth sharing with a doctor.",
        ],
    ),
];

/// Ordered template lists per intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseCatalog {
    templates: HashMap<String, Vec<String>>,
}

impl ResponseCatalog {
    pub fn new(templates: HashMap<String, Vec<String>>) -> Self {
        Self { templates }
    }

    /// Catalog covering every default rule intent plus `general`.
    pub fn builtin() -> Self {
        let templates = BUILTIN
            .iter()
            .map(|(intent, lines)| {
                (
                    intent.to_string(),
                    lines.iter().map(|l| l.to_string()).collect(),
                )
            })
            .collect();
        Self { templates }
    }

    /// `self` with every non-empty list from `other` taking precedence per intent.
    pub fn overlaid_with(mut self, other: &HashMap<String, Vec<String>>) -> Self {
        for (intent, lines) in other {
            if !lines.is_empty() {
                self.templates.insert(intent.clone(), lines.clone());
            }
        }
        self
    }

    /// Templates for `intent`, else `general`, else `None`.
    pub fn templates_for(&self, intent: &Intent) -> Option<&[String]> {
        self.non_empty(intent.as_str())
            .or_else(|| self.non_empty(Intent::GENERAL))
    }

    fn non_empty(&self, key: &str) -> Option<&[String]> {
        self.templates
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| v.as_slice())
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.non_empty(intent).is_some()
    }
}
