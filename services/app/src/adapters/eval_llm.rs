//! services/app/src/adapters/eval_llm.rs
//!
//! This module contains the adapter for the submission-evaluating LLM.
//! It implements the `SubmissionEvaluationService` port from the `core`
//! crate. Every failure path collapses to a fixed optimistic fallback so an
//! unavailable evaluator can never block challenge completion.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs, ImageUrlArgs,
        ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use briefcraft_core::domain::{Brief, Feedback};
use briefcraft_core::ports::{PortError, PortResult, SubmissionEvaluationService};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SubmissionEvaluationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiEvalAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEvalAdapter {
    /// Creates a new `OpenAiEvalAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn grading_prompt(brief: &Brief) -> String {
    format!(
        "Act as a Senior Design Mentor. Evaluate this submission based on the brief:\n\
         - Project: {}\n\
         - Goal: {}\n\
         - Context: {}\n\
         \n\
         Analyze the image. Be constructive, strict but encouraging.",
        brief.project_name, brief.project_goal, brief.content_summary,
    )
}

fn feedback_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "score": { "type": "integer", "description": "Score 1-10" },
            "strengths": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Strengths"
            },
            "weaknesses": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Weaknesses"
            },
            "advice": { "type": "string", "description": "Advice" },
            "isSuccess": { "type": "boolean", "description": "Pass/Fail" }
        },
        "required": ["score", "strengths", "weaknesses", "advice", "isSuccess"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackPayload {
    score: u8,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    advice: String,
    is_success: bool,
}

/// The canned result substituted when evaluation is unavailable.
fn fallback_feedback() -> Feedback {
    Feedback {
        score: 8,
        strengths: vec!["Good effort".to_string(), "Nice colors".to_string()],
        weaknesses: vec!["AI analysis unavailable right now".to_string()],
        advice: "Keep practicing!".to_string(),
        is_success: true,
    }
}

impl OpenAiEvalAdapter {
    async fn try_evaluate(&self, brief: &Brief, image_base64: &str) -> PortResult<Feedback> {
        let content = ChatCompletionRequestUserMessageContent::Array(vec![
            ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(
                    ImageUrlArgs::default()
                        .url(format!("data:image/jpeg;base64,{}", image_base64))
                        .build()
                        .map_err(|e| PortError::Generation(e.to_string()))?,
                )
                .build()
                .map_err(|e| PortError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(grading_prompt(brief))
                .build()
                .map_err(|e| PortError::Generation(e.to_string()))?
                .into(),
        ]);

        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| PortError::Generation(e.to_string()))?
            .into()];

        let body = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: "design_feedback".to_string(),
                    description: None,
                    schema: Some(feedback_schema()),
                    strict: Some(true),
                },
            })
            .build()
            .map_err(|e| PortError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(body)
            .await
            .map_err(|e: OpenAIError| PortError::Generation(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::Generation("evaluator returned no content".to_string()))?;

        let payload: FeedbackPayload = serde_json::from_str(&content)
            .map_err(|e| PortError::Generation(format!("malformed feedback payload: {}", e)))?;

        Ok(Feedback {
            score: payload.score,
            strengths: payload.strengths,
            weaknesses: payload.weaknesses,
            advice: payload.advice,
            is_success: payload.is_success,
        })
    }
}

//=========================================================================================
// `SubmissionEvaluationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SubmissionEvaluationService for OpenAiEvalAdapter {
    async fn evaluate_submission(&self, brief: &Brief, image_base64: &str) -> Feedback {
        match self.try_evaluate(brief, image_base64).await {
            Ok(feedback) => feedback,
            Err(e) => {
                warn!(error = %e, "evaluation unavailable, substituting fallback");
                fallback_feedback()
            }
        }
    }
}
