//! Prompt Builder.
//!
//! Turns a source text and a target language code into the request payload.
//! Pure and total: every code yields a payload, and identical inputs
//! (including the session uid) yield identical payloads.

use config::SessionConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::frame::{
    ChatMessage, ChatParameter, MessageBody, RequestBody, RequestHeader, RequestParameter,
    RequestPayload,
};
use crate::languages::{self, Language};

/// What the service is asked to do with the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTask {
    /// Four-part reading guide: key terms, translation, interpretation,
    /// historical context
    Guide,
    /// Plain literary translation
    Translate
}

/// Fresh 32-character hex identifier for one request.
pub fn new_session_uid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Language selection after code resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLanguage {
    pub code: String,
    pub display_name: String,
    pub system_instruction: String,
    pub response_rule: String,
    mapped: bool
}

impl ResolvedLanguage {
    fn mapped(language: &Language) -> Self {
        Self {
            code: language.code.to_string(),
            display_name: language.name.to_string(),
            system_instruction: language.system_instruction(),
            response_rule: language.response_rule.to_string(),
            mapped: true
        }
    }

    fn generic(code: String) -> Self {
        Self {
            system_instruction: format!(
                "You are an expert in classical Chinese texts. Please respond only in {code}."
            ),
            response_rule: format!("Please respond only in {code}"),
            display_name: code.clone(),
            code,
            mapped: false
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptBuilder {
    app_id: String,
    domain: String,
    temperature: f32,
    max_tokens: u32,
    default_language: String
}

impl PromptBuilder {
    pub fn new(app_id: impl Into<String>, session: &SessionConfig) -> Self {
        Self {
            app_id: app_id.into(),
            domain: session.domain.clone(),
            temperature: session.temperature,
            max_tokens: session.max_tokens,
            default_language: session.default_language.clone()
        }
    }

    /// Resolves a caller code. Blank codes use the configured default.
    pub fn resolve_language(&self, language_code: &str) -> ResolvedLanguage {
        let code = match languages::normalize_code(language_code) {
            code if code.is_empty() => languages::normalize_code(&self.default_language),
            code => code
        };

        match languages::lookup(&code) {
            Some(language) => ResolvedLanguage::mapped(language),
            None => ResolvedLanguage::generic(code)
        }
    }

    pub fn user_content(&self, task: PromptTask, source_text: &str, language: &ResolvedLanguage) -> String {
        match task {
            PromptTask::Guide => format!(
                "{rule}\n\n{template}\n\n\"{source_text}\"\n\n\
                 Requirements:\n\
                 1. The answer must be written entirely in {name}\n\
                 2. Do not use any other language\n\
                 3. Explain every section in detail\n\
                 4. Keep a professional and scholarly tone\n\
                 5. Make sure the answer is complete and accurate",
                rule = language.response_rule,
                template = languages::guide_template(&language.code),
                name = language.display_name
            ),
            PromptTask::Translate => format!(
                "Translate the following classical Chinese text into {name}, \
                 preserving its literary quality and imagery:\n\n{source_text}\n\n\
                 Requirements:\n\
                 1. Convey the meaning of the original accurately\n\
                 2. Preserve the literary quality and imagery of the original\n\
                 3. Use natural expressions of the target language\n\
                 4. Do not add any explanation or commentary",
                name = language.display_name
            )
        }
    }

    /// Builds the request payload for one session.
    ///
    /// The message list is the language-enforcing system instruction
    /// followed by the task's user turn.
    pub fn build_payload(
        &self,
        task: PromptTask,
        source_text: &str,
        language_code: &str,
        session_uid: &str
    ) -> RequestPayload {
        let language = self.resolve_language(language_code);

        RequestPayload {
            header: RequestHeader {
                app_id: self.app_id.clone(),
                uid: session_uid.to_string()
            },
            parameter: RequestParameter {
                chat: ChatParameter {
                    domain: self.domain.clone(),
                    temperature: self.temperature,
                    max_tokens: self.max_tokens
                }
            },
            payload: RequestBody {
                message: MessageBody {
                    text: vec![
                        ChatMessage::system(language.system_instruction.clone()),
                        ChatMessage::user(self.user_content(task, source_text, &language)),
                    ]
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const UID: &str = "00112233445566778899aabbccddeeff";

    fn builder() -> PromptBuilder {
        PromptBuilder::new("app-1", &SessionConfig::default())
    }

    #[test]
    fn test_mapped_code_uses_exact_instruction() {
        for language in languages::LANGUAGES {
            let payload = builder().build_payload(PromptTask::Guide, "学而时习之", language.code, UID);
            assert_eq!(payload.messages()[0].role, "system");
            assert_eq!(
                payload.messages()[0].content,
                format!("{} {}", language.expertise, language.response_rule)
            );
        }
    }

    #[test]
    fn test_unmapped_code_gets_generic_instruction() {
        let payload = builder().build_payload(PromptTask::Guide, "text", "eo", UID);
        let system = &payload.messages()[0].content;
        assert_eq!(
            system,
            "You are an expert in classical Chinese texts. Please respond only in eo."
        );
        assert!(payload.messages()[1].content.starts_with("Please respond only in eo"));
        assert!(payload.messages()[1].content.contains("# Word Analysis"));
    }

    #[test]
    fn test_blank_code_uses_default_language() {
        let resolved = builder().resolve_language("   ");
        assert_eq!(resolved.code, "zh");
        assert!(resolved.is_mapped());
    }

    #[test]
    fn test_code_matching_ignores_case() {
        let resolved = builder().resolve_language(" FR ");
        assert_eq!(resolved.display_name, "French");
    }

    #[test]
    fn test_guide_user_turn_layout() {
        let payload = builder().build_payload(PromptTask::Guide, "学而时习之", "ja", UID);
        let user = &payload.messages()[1];
        assert_eq!(user.role, "user");
        assert!(user.content.starts_with("日本語で回答してください\n\n# 単語と語句の解説"));
        assert!(user.content.contains("\n\n\"学而时习之\"\n\n"));
        assert!(user.content.contains("entirely in Japanese"));
    }

    #[test]
    fn test_translate_user_turn() {
        let payload = builder().build_payload(PromptTask::Translate, "道可道", "de", UID);
        let user = &payload.messages()[1].content;
        assert!(user.starts_with("Translate the following classical Chinese text into German"));
        assert!(user.contains("\n\n道可道\n\n"));
        assert!(user.contains("Do not add any explanation or commentary"));
    }

    #[test]
    fn test_payload_carries_session_parameters() {
        let mut session = SessionConfig::default();
        session.temperature = 0.3;
        session.max_tokens = 2048;
        session.domain = "generalv2".to_string();
        let payload = PromptBuilder::new("app-2", &session).build_payload(PromptTask::Guide, "t", "en", UID);

        assert_eq!(payload.header.app_id, "app-2");
        assert_eq!(payload.session_uid(), UID);
        assert_eq!(payload.parameter.chat.domain, "generalv2");
        assert_eq!(payload.parameter.chat.temperature, 0.3);
        assert_eq!(payload.parameter.chat.max_tokens, 2048);
    }

    #[test]
    fn test_session_uid_shape() {
        let first = new_session_uid();
        let second = new_session_uid();
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    proptest! {
        #[test]
        fn prop_build_payload_is_pure(text in "\\PC{0,40}", code in "[a-zA-Z]{0,4}") {
            let first = builder().build_payload(PromptTask::Guide, &text, &code, UID);
            let second = builder().build_payload(PromptTask::Guide, &text, &code, UID);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_unmapped_codes_name_the_code(code in "[q-z]{3}") {
            let payload = builder().build_payload(PromptTask::Translate, "x", &code, UID);
            prop_assert!(payload.messages()[0].content.contains(&code));
            prop_assert!(payload.messages()[0].content.contains("respond only in"));
        }
    }
}
