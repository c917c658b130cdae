//! Integration with the external AI classification service.
//!
//! This module provides a thin wrapper around an OpenAI client for turning a
//! customer message into a category/priority decision. The reply is treated
//! as untrusted: each field is validated against the closed enumerations and
//! anything else keeps its default, so garbage can never reach storage.
//!
//! The module implements the `GenericClassifierClient` trait defined in the
//! parent module; the fallback-on-failure contract lives here.

use std::sync::{Arc, OnceLock};

use crate::base::{
    config::Config,
    types::{Classification, Res, TicketCategory, TicketPriority},
};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        Content, CreateResponseArgs, Input, InputItem, InputMessageArgs, OutputContent, Response, ResponseFormatJsonSchema, Role, TextConfig, TextResponseFormat,
    },
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::{ClassifierClient, GenericClassifierClient};

// Extra methods on `ClassifierClient` applied by the openai implementation.

impl ClassifierClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiClassifierClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// Raw reply shape from the model, before validation.
///
/// The fields stay as loose JSON values so that a wrong-typed category does
/// not prevent a valid priority from being applied, and vice versa.
#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(default)]
    category: Option<serde_json::Value>,
    #[serde(default)]
    priority: Option<serde_json::Value>,
}

/// OpenAI classifier client implementation.
#[derive(Clone)]
pub struct OpenAiClassifierClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiClassifierClient {
    /// Create a new OpenAI classifier client.
    #[instrument(name = "OpenAiClassifierClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the classifier input from the customer message.
    fn build_classifier_input(&self, message: &str) -> Res<Input> {
        Ok(Input::Items(vec![
            InputItem::Message(
                InputMessageArgs::default()
                    .role(Role::User)
                    .content(format!("# Customer Message\n\n{message}\n\n"))
                    .build()?,
            ),
        ]))
    }

    /// The fallible half of `classify`: one round-trip, no retries.
    ///
    /// A slow dependency holds the request open for the transport's default
    /// timeout; there is deliberately no retry or backoff here.
    async fn request_classification(&self, message: &str) -> Res<Classification> {
        let input = self.build_classifier_input(message)?;

        // Text config forcing a strict JSON reply.
        let text_config = get_openai_text_config();

        // Create the request.
        let mut request = CreateResponseArgs::default();
        request
            .instructions(self.config.classifier_system_directive.clone())
            .max_output_tokens(self.config.openai_max_tokens)
            .model(&self.config.openai_model)
            .text(text_config.clone())
            .input(input);

        // Add the temperature for the non-reasoning models.
        if self.config.openai_model.starts_with("gpt") {
            request.temperature(self.config.openai_temperature);
        }

        // Execute the classification request.
        let response = self.client.responses().create(request.build()?).await?;

        // Parse and validate the reply.
        let raw = parse_classifier_reply(&response)?;
        info!("Raw classifier reply: {raw:?}");

        Ok(validate_classifier_reply(raw))
    }
}

#[async_trait]
impl GenericClassifierClient for OpenAiClassifierClient {
    #[instrument(name = "OpenAiClassifierClient::classify", skip_all)]
    async fn classify(&self, message: &str) -> Classification {
        match self.request_classification(message).await {
            Ok(decision) => {
                info!("Validated and applied classifier decision: {decision:?}");
                decision
            }
            Err(err) => {
                error!("Classification failed: {err}. Using fallback decision.");
                Classification::default()
            }
        }
    }
}

/// Extract the raw classification from the first text output of the reply.
fn parse_classifier_reply(response: &Response) -> Res<RawClassification> {
    for output in &response.output {
        match output {
            OutputContent::Message(message) => {
                for message_content in &message.content {
                    match message_content {
                        Content::OutputText(text) => {
                            return Ok(serde_json::from_str::<RawClassification>(&text.text)?);
                        }
                        Content::Refusal(reason) => {
                            return Err(anyhow::anyhow!("Request refused: {reason:#?}"));
                        }
                    }
                }
            }
            _ => {
                warn!("Unknown output: {output:#?}");
            }
        }
    }

    Err(anyhow::anyhow!("Model reply contained no classification."))
}

/// Validate the raw reply field-by-field against the closed enumerations.
///
/// Each field is independent: an invalid category does not invalidate a valid
/// priority in the same reply. Unrecognized values keep the field's default.
fn validate_classifier_reply(raw: RawClassification) -> Classification {
    let mut decision = Classification::default();

    match raw.category.as_ref().and_then(|v| v.as_str()).map(TicketCategory::from_wire) {
        Some(Some(category)) => decision.category = category,
        Some(None) => warn!("Rejected category outside the allowed set: {:?}", raw.category),
        None => warn!("Classifier reply is missing a string category: {:?}", raw.category),
    }

    match raw.priority.as_ref().and_then(|v| v.as_str()).map(TicketPriority::from_wire) {
        Some(Some(priority)) => decision.priority = priority,
        Some(None) => warn!("Rejected priority outside the allowed set: {:?}", raw.priority),
        None => warn!("Classifier reply is missing a string priority: {:?}", raw.priority),
    }

    decision
}

// Statics.

static OPENAI_TEXT_CONFIG: OnceLock<TextConfig> = OnceLock::new();

fn get_openai_text_config() -> &'static TextConfig {
    OPENAI_TEXT_CONFIG.get_or_init(|| TextConfig {
        format: TextResponseFormat::JsonSchema(ResponseFormatJsonSchema {
            name: "TriageDecision".to_string(),
            description: Some("Category and priority decision for a customer message.".to_string()),
            schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "enum": ["BUG", "FEATURE", "BILLING", "UNCATEGORIZED"]
                    },
                    "priority": {
                        "type": "string",
                        "enum": ["HIGH", "NORMAL", "LOW"]
                    }
                },
                "required": ["category", "priority"],
                "additionalProperties": false
            })),
            strict: Some(true),
        }),
    })
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(category: Option<&str>, priority: Option<&str>) -> RawClassification {
        RawClassification {
            category: category.map(|c| serde_json::Value::String(c.to_string())),
            priority: priority.map(|p| serde_json::Value::String(p.to_string())),
        }
    }

    #[test]
    fn test_valid_reply_is_applied() {
        let decision = validate_classifier_reply(raw(Some("BILLING"), Some("HIGH")));

        assert_eq!(decision.category, TicketCategory::Billing);
        assert_eq!(decision.priority, TicketPriority::High);
    }

    #[test]
    fn test_unknown_values_keep_defaults() {
        let decision = validate_classifier_reply(raw(Some("SPAM"), Some("SEV0")));

        assert_eq!(decision, Classification::default());
    }

    #[test]
    fn test_fields_validate_independently() {
        // Invalid category must not invalidate a valid priority.
        let decision = validate_classifier_reply(raw(Some("SPAM"), Some("LOW")));

        assert_eq!(decision.category, TicketCategory::Uncategorized);
        assert_eq!(decision.priority, TicketPriority::Low);

        let decision = validate_classifier_reply(raw(Some("BUG"), None));

        assert_eq!(decision.category, TicketCategory::Bug);
        assert_eq!(decision.priority, TicketPriority::Normal);
    }

    #[test]
    fn test_missing_fields_keep_defaults() {
        let decision = validate_classifier_reply(raw(None, None));

        assert_eq!(decision, Classification::default());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let parsed: RawClassification = serde_json::from_str(r#"{"category": "BUG", "priority": "HIGH", "confidence": 0.9}"#).unwrap();
        let decision = validate_classifier_reply(parsed);

        assert_eq!(decision.category, TicketCategory::Bug);
        assert_eq!(decision.priority, TicketPriority::High);
    }

    #[test]
    fn test_wrong_typed_field_does_not_poison_the_other() {
        let parsed: RawClassification = serde_json::from_str(r#"{"category": 3, "priority": "HIGH"}"#).unwrap();
        let decision = validate_classifier_reply(parsed);

        assert_eq!(decision.category, TicketCategory::Uncategorized);
        assert_eq!(decision.priority, TicketPriority::High);
    }

    #[test]
    fn test_non_object_reply_is_an_error() {
        assert!(serde_json::from_str::<RawClassification>("Sure! Here is the classification: BUG").is_err());
        assert!(serde_json::from_str::<RawClassification>(r#"["BUG", "HIGH"]"#).is_err());
    }
}
