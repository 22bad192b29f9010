//! services/app/src/adapters/brief_llm.rs
//!
//! This module contains the adapter for the brief-generating LLM.
//! It implements the `BriefGenerationService` port from the `core` crate:
//! builds the market/category/mode-specific prompt, requests a
//! schema-constrained JSON payload, and stamps the client-side fields on the
//! parsed result.

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
use briefcraft_core::domain::{Brief, ClientMarket, DesignCategory};
use briefcraft_core::ports::{BriefGenerationService, BriefRequest, PortError, PortResult};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// Near-maximum creativity: repeated calls with identical inputs are meant
/// to yield different briefs.
const GENERATION_TEMPERATURE: f32 = 0.95;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `BriefGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiBriefAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBriefAdapter {
    /// Creates a new `OpenAiBriefAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// Prompt Construction
//=========================================================================================

fn language_instruction(market: ClientMarket) -> &'static str {
    match market {
        ClientMarket::Foreign => {
            "CRITICAL: OUTPUT EVERYTHING IN ENGLISH. The client is International (US/UK/Europe). \
             Use Western design trends, English copy, and English formatting."
        }
        ClientMarket::Local => {
            "CRITICAL: OUTPUT EVERYTHING IN ARABIC (except hex codes and providedAssetDescription). \
             The client is Arab. Use culturally relevant terms."
        }
    }
}

/// Extra style direction carried by a couple of categories; the rest add none.
fn category_style_hint(category: DesignCategory) -> Option<&'static str> {
    match category {
        DesignCategory::Football => Some(
            "Focus on Football/Soccer aesthetics, high energy, dynamic player poses, grit, \
             textures, and bold typography.",
        ),
        DesignCategory::Collage => Some(
            "Focus on Collage Art aesthetics. Mixed media, torn paper edges, vintage elements \
             mixed with modern, surrealism, visual metaphors.",
        ),
        _ => None,
    }
}

fn build_standard_prompt(request: &BriefRequest) -> String {
    let market_name = match request.client_market {
        ClientMarket::Foreign => "International (Global)",
        ClientMarket::Local => "Middle East (Arab)",
    };
    let industry = request.industry.as_deref().unwrap_or("Random Creative Niche");
    let style_hint = category_style_hint(request.category).unwrap_or("");

    format!(
        "Act as a Senior Art Director. Create a highly detailed design brief.\n\
         \n\
         Parameters:\n\
         - Category: {category}\n\
         - Difficulty: {difficulty}\n\
         - Client Market: {market}\n\
         - Specific Industry/Niche: {industry}\n\
         \n\
         {language}\n\
         {style_hint}\n\
         \n\
         Requirements for fields:\n\
         1. 'contentSummary': Create a specific scenario or story. If YouTube, describe the \
         video plot. If Football, describe the match stakes.\n\
         2. 'providedAssetDescription': MUST be in English.\n\
         \x20  - If Category is YouTube, Education, or Product: End with \"isolated on white \
         background, studio lighting, 8k resolution\".\n\
         \x20  - If Football: \"Dynamic football player action shot, stadium lights, \
         professional sports photography\".\n\
         \x20  - If Collage: \"Vintage paper texture, old statues, flowers, halftone pattern\".\n\
         3. 'copywriting': Provide actual text to be placed on the design.\n\
         \n\
         Make it professional and inspiring.",
        category = request.category.label(),
        difficulty = request.difficulty.label(),
        market = market_name,
        industry = industry,
        language = language_instruction(request.client_market),
        style_hint = style_hint,
    )
}

fn build_remix_prompt(request: &BriefRequest) -> String {
    let market_name = match request.client_market {
        ClientMarket::Foreign => "International",
        ClientMarket::Local => "Arab",
    };

    format!(
        "Act as a Senior Art Director.\n\
         TASK: Analyze the visual style, composition, typography, and vibe of the attached image.\n\
         THEN: Create a design brief for a COMPLETELY DIFFERENT product/industry but using this \
         EXACT style (Style Remix).\n\
         \n\
         Example: If image is a neon cyberpunk burger ad, create a brief for a Sneaker Brand \
         using that same neon cyberpunk style.\n\
         \n\
         Parameters:\n\
         - Difficulty: {difficulty}\n\
         - Client Market: {market}\n\
         \n\
         {language}\n\
         \n\
         Requirements:\n\
         1. 'stylePreferences': Describe the style of the uploaded image in detail so the \
         designer can replicate it.\n\
         2. 'projectGoal': Create a campaign that matches this visual identity.\n\
         3. 'copywriting': Write catchy headlines that fit this visual mood.",
        difficulty = request.difficulty.label(),
        market = market_name,
        language = language_instruction(request.client_market),
    )
}

fn build_prompt(request: &BriefRequest) -> String {
    if request.category == DesignCategory::Remix && request.reference_image.is_some() {
        build_remix_prompt(request)
    } else {
        build_standard_prompt(request)
    }
}

//=========================================================================================
// Output Schema & Payload
//=========================================================================================

/// The JSON schema the generator's output is constrained to: every brief
/// field except the client-stamped id, market, and reference image.
fn brief_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "projectName": { "type": "string", "description": "Project Name" },
            "companyName": { "type": "string", "description": "Company/Channel Name" },
            "industry": { "type": "string", "description": "Specific Industry" },
            "aboutCompany": { "type": "string", "description": "About the company" },
            "targetAudience": { "type": "string", "description": "Target Audience description" },
            "projectGoal": { "type": "string", "description": "Main goal of the design" },
            "contentSummary": {
                "type": "string",
                "description": "Detailed story/scenario of the content."
            },
            "requiredDeliverables": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of deliverables"
            },
            "stylePreferences": {
                "type": "string",
                "description": "Visual style description based on analysis"
            },
            "suggestedColors": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Color palette hex codes"
            },
            "deadlineHours": { "type": "integer", "description": "Deadline in hours" },
            "copywriting": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Headlines or copy text to be included"
            },
            "contactDetails": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Mock contact info"
            },
            "visualReferences": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Keywords for visual research"
            },
            "providedAssetDescription": {
                "type": "string",
                "description": "Detailed English description for a high-quality stock photo \
                 to be used. If YouTube/Education/Product, specify 'isolated on white background'."
            }
        },
        "required": [
            "projectName",
            "companyName",
            "industry",
            "aboutCompany",
            "targetAudience",
            "projectGoal",
            "contentSummary",
            "requiredDeliverables",
            "stylePreferences",
            "suggestedColors",
            "deadlineHours",
            "copywriting",
            "contactDetails",
            "visualReferences",
            "providedAssetDescription"
        ]
    })
}

/// The generator's payload, strictly deserialized: any missing required
/// field fails the parse and surfaces as a generation error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BriefPayload {
    project_name: String,
    company_name: String,
    industry: String,
    about_company: String,
    target_audience: String,
    project_goal: String,
    content_summary: String,
    required_deliverables: Vec<String>,
    style_preferences: String,
    suggested_colors: Vec<String>,
    deadline_hours: u32,
    copywriting: Vec<String>,
    contact_details: Vec<String>,
    visual_references: Vec<String>,
    provided_asset_description: String,
}

impl BriefPayload {
    /// Stamps the fields the generator is never asked for: a fresh id, the
    /// requested market, and the reference image when one was supplied.
    fn into_brief(self, request: &BriefRequest) -> Brief {
        Brief {
            id: Uuid::new_v4(),
            project_name: self.project_name,
            company_name: self.company_name,
            industry: self.industry,
            about_company: self.about_company,
            target_audience: self.target_audience,
            project_goal: self.project_goal,
            content_summary: self.content_summary,
            required_deliverables: self.required_deliverables,
            style_preferences: self.style_preferences,
            suggested_colors: self.suggested_colors,
            deadline_hours: self.deadline_hours,
            copywriting: self.copywriting,
            contact_details: self.contact_details,
            visual_references: self.visual_references,
            provided_asset_description: self.provided_asset_description,
            client_type: request.client_market,
            reference_image: request.reference_image.clone(),
        }
    }
}

//=========================================================================================
// `BriefGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BriefGenerationService for OpenAiBriefAdapter {
    async fn generate_brief(&self, request: &BriefRequest) -> PortResult<Brief> {
        let prompt = build_prompt(request);

        // The reference image, when present, is attached ahead of the text
        // prompt as an inline data URL.
        let content = match &request.reference_image {
            Some(image) => ChatCompletionRequestUserMessageContent::Array(vec![
                ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(
                        ImageUrlArgs::default()
                            .url(format!("data:image/jpeg;base64,{}", image))
                            .build()
                            .map_err(|e| PortError::Generation(e.to_string()))?,
                    )
                    .build()
                    .map_err(|e| PortError::Generation(e.to_string()))?
                    .into(),
                ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(prompt)
                    .build()
                    .map_err(|e| PortError::Generation(e.to_string()))?
                    .into(),
            ]),
            None => ChatCompletionRequestUserMessageContent::Text(prompt),
        };

        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| PortError::Generation(e.to_string()))?
            .into()];

        let body = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(GENERATION_TEMPERATURE)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: "design_brief".to_string(),
                    description: None,
                    schema: Some(brief_schema()),
                    strict: Some(true),
                },
            })
            .build()
            .map_err(|e| PortError::Generation(e.to_string()))?;

        info!(
            category = request.category.label(),
            market = request.client_market.label(),
            "requesting design brief"
        );

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
            .ok_or_else(|| {
                PortError::Generation("brief generator returned no content".to_string())
            })?;

        let payload: BriefPayload = serde_json::from_str(&content)
            .map_err(|e| PortError::Generation(format!("malformed brief payload: {}", e)))?;

        Ok(payload.into_brief(request))
    }
}
