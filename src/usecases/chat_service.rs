//! Chat use case: classify a message, resolve a response, apply the empathy overlay.
//!
//! Each conversation serializes its own sends so the repeat-avoidance memo
//! is never read by two replies at once.

use crate::domain::{Intent, ResponseCatalog};
use crate::usecases::empathy::{add_empathy, is_emotional};
use crate::usecases::intent_classifier::{IntentClassifier, MatchOrigin, classify_with};
use crate::usecases::response_resolver::{ConversationContext, resolve_response};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// One chat session.
pub struct Conversation {
    ctx: Mutex<ConversationContext>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            ctx: Mutex::new(ConversationContext::new()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            ctx: Mutex::new(ConversationContext::with_seed(seed)),
        }
    }

    pub async fn last_response(&self) -> Option<String> {
        self.ctx.lock().await.last_response().map(str::to_string)
    }

    pub async fn reset(&self) {
        self.ctx.lock().await.reset();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub intent: Intent,
    pub origin: MatchOrigin,
    pub empathetic: bool,
}

pub struct ChatService {
    classifier: Arc<IntentClassifier>,
    builtin: ResponseCatalog,
}

impl ChatService {
    pub fn new(classifier: Arc<IntentClassifier>) -> Self {
        Self {
            classifier,
            builtin: ResponseCatalog::builtin(),
        }
    }

    /// Opening line for a new conversation.
    pub fn greeting(name: &str) -> String {
        format!(
            "Hi {}! I'm Luna. How are you feeling today? I can help with symptom relief or answer questions about your cycle.",
            name
        )
    }

    pub async fn reply(&self, conversation: &Conversation, text: &str) -> ChatReply {
        // Rule hits never wait on a model load; they use the artifact catalog only if it is already in.
        let model = if self.classifier.rule_decides(text) {
            self.classifier.loaded_model()
        } else {
            self.classifier.model().await
        };
        let classification = classify_with(self.classifier.rules(), model.as_deref(), text);
        let catalog = model.as_deref().map(|m| &m.catalog).unwrap_or(&self.builtin);

        let mut ctx = conversation.ctx.lock().await;
        let base = resolve_response(catalog, &classification.intent, text, &mut ctx);
        let empathetic = is_emotional(text);
        let reply = if empathetic {
            add_empathy(&base, ctx.rng())
        } else {
            base
        };

        debug!(
            intent = %classification.intent,
            origin = ?classification.origin,
            empathetic,
            "chat reply"
        );
        ChatReply {
            text: reply,
            intent: classification.intent,
            origin: classification.origin,
            empathetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IntentMetadata, RuleTable};
    use crate::ports::{ArtifactSource, ClassificationModel, IntentModel};
    use crate::usecases::GateStatus;
    use crate::usecases::empathy::{EMPATHETIC_OPENERS, GENTLE_FOLLOWUPS};
    use std::collections::HashMap;

    fn rules_only() -> ChatService {
        ChatService::new(Arc::new(IntentClassifier::new(RuleTable::default(), None)))
    }

    #[tokio::test]
    async fn cramps_get_pain_relief_reply() {
        let chat = rules_only();
        let conv = Conversation::with_seed(1);
        let reply = chat.reply(&conv, "I have cramps").await;
        assert_eq!(reply.intent.as_str(), "pain_relief");
        assert_eq!(reply.origin, MatchOrigin::Rule);
        assert!(!reply.empathetic);
        let templates = ResponseCatalog::builtin();
        let templates = templates.templates_for(&reply.intent).unwrap();
        assert!(templates.contains(&reply.text));
    }

    #[tokio::test]
    async fn emotional_message_is_wrapped() {
        let chat = rules_only();
        let conv = Conversation::with_seed(2);
        let reply = chat.reply(&conv, "I feel so anxious and tired").await;
        assert!(reply.empathetic);

        let parts: Vec<&str> = reply.text.split("\n\n").collect();
        assert_eq!(parts.len(), 3);
        assert!(EMPATHETIC_OPENERS.contains(&parts[0]));
        assert!(GENTLE_FOLLOWUPS.contains(&parts[2]));
        // memo holds the unwrapped base response
        assert_eq!(conv.last_response().await.as_deref(), Some(parts[1]));
        assert!(!parts[1].contains('\n'));
    }

    #[tokio::test]
    async fn consecutive_replies_do_not_repeat() {
        let chat = rules_only();
        let conv = Conversation::with_seed(3);
        let mut prev = chat.reply(&conv, "cramps").await.text;
        for _ in 0..20 {
            let next = chat.reply(&conv, "cramps").await.text;
            assert_ne!(next, prev);
            prev = next;
        }
    }

    const FIRST: &str = "Try a heating pad.";
    const SECOND: &str = "Gentle stretches can help.";

    /// Chat whose pain_relief intent has exactly two templates.
    fn two_template_chat() -> ChatService {
        let mut responses = HashMap::new();
        responses.insert(
            "pain_relief".to_string(),
            vec![FIRST.to_string(), SECOND.to_string()],
        );
        let model = IntentModel::new(
            Arc::new(Certain(0, 1)),
            IntentMetadata {
                vocab: vec!["cramps".into()],
                tags: vec!["pain_relief".into()],
                responses,
            },
        );
        ChatService::new(Arc::new(IntentClassifier::with_model(
            RuleTable::default(),
            model,
        )))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sends_on_one_conversation_are_serialized() {
        let chat = Arc::new(two_template_chat());
        let conv = Arc::new(Conversation::with_seed(4));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let chat = Arc::clone(&chat);
            let conv = Arc::clone(&conv);
            handles.push(tokio::spawn(async move { chat.reply(&conv, "cramps").await }));
        }
        let mut replies = Vec::new();
        for h in handles {
            replies.push(h.await.unwrap().text);
        }
        // Two templates with repeat avoidance strictly alternate, whatever the send order.
        let first = replies.iter().filter(|r| r.as_str() == FIRST).count();
        let second = replies.iter().filter(|r| r.as_str() == SECOND).count();
        assert_eq!((first, second), (5, 5));
    }

    #[tokio::test]
    async fn sequential_sends_alternate_between_two_templates() {
        let chat = two_template_chat();
        let conv = Conversation::with_seed(6);
        let mut prev = chat.reply(&conv, "cramps").await.text;
        for _ in 0..9 {
            let next = chat.reply(&conv, "cramps").await.text;
            assert_ne!(next, prev);
            prev = next;
        }
    }

    /// Artifact source that never answers.
    struct Stalled;

    #[async_trait::async_trait]
    impl ArtifactSource for Stalled {
        async fn fetch(&self, _name: &str) -> Result<Vec<u8>, crate::domain::DomainError> {
            std::future::pending().await
        }

        fn describe(&self) -> String {
            "stalled".to_string()
        }
    }

    #[tokio::test]
    async fn rule_reply_does_not_wait_for_model_load() {
        let classifier = Arc::new(IntentClassifier::new(
            RuleTable::default(),
            Some(Arc::new(Stalled)),
        ));
        let chat = ChatService::new(Arc::clone(&classifier));
        let conv = Conversation::with_seed(7);

        let reply = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            chat.reply(&conv, "I have cramps"),
        )
        .await
        .expect("rule-matched reply blocked on model load");
        assert_eq!(reply.intent.as_str(), "pain_relief");
        assert_eq!(reply.origin, MatchOrigin::Rule);
        assert_eq!(classifier.model_status(), GateStatus::Uninitialized);
    }

    struct Certain(usize, usize);

    impl ClassificationModel for Certain {
        fn predict_proba(
            &self,
            _input: &[f64],
        ) -> Result<Vec<f64>, crate::domain::DomainError> {
            let mut p = vec![0.0; self.1];
            p[self.0] = 1.0;
            Ok(p)
        }
    }

    #[tokio::test]
    async fn artifact_responses_take_precedence() {
        let mut responses = HashMap::new();
        responses.insert(
            "pcos_info".to_string(),
            vec!["PCOS is a common hormonal condition.".to_string()],
        );
        let model = IntentModel::new(
            Arc::new(Certain(0, 1)),
            IntentMetadata {
                vocab: vec!["pcos".into()],
                tags: vec!["pcos_info".into()],
                responses,
            },
        );
        let chat = ChatService::new(Arc::new(IntentClassifier::with_model(
            RuleTable::default(),
            model,
        )));
        let conv = Conversation::with_seed(5);
        let reply = chat.reply(&conv, "what is pcos").await;
        assert_eq!(reply.origin, MatchOrigin::Model);
        assert_eq!(reply.text, "PCOS is a common hormonal condition.");

        // rule intents still fall back to built-in templates
        let reply = chat.reply(&conv, "cramps").await;
        assert_eq!(reply.intent.as_str(), "pain_relief");
    }

    #[test]
    fn greeting_mentions_name() {
        assert!(ChatService::greeting("Ana").starts_with("Hi Ana!"));
    }
}
