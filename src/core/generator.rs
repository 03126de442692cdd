use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;
use std::time::Duration;

use crate::config::toml_config::GeminiSettings;
use crate::core::prompts::{build_item_prompt, build_quick_item_prompt};
use crate::domain::loot::{LootParameters, MagicItem, QuickLootParameters};
use crate::domain::ports::ItemGenerator;
use crate::utils::error::{DmError, Result};

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("fence regex"));

static BRACED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("brace regex"));

/// Pulls a JSON object out of a chatty model answer.
///
/// Tries, in order: the first fenced code block, the whole text, and the
/// widest `{...}` span. Only a non-empty object counts.
pub fn extract_json_from_response(text: &str) -> Option<Map<String, Value>> {
    // 空物件視同解析失敗
    let as_object = |candidate: &str| match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    };

    if let Some(caps) = FENCED_BLOCK.captures(text) {
        if let Some(map) = as_object(caps[1].trim()) {
            return Some(map);
        }
    }

    if let Some(map) = as_object(text.trim()) {
        return Some(map);
    }

    BRACED_SPAN
        .find(text)
        .and_then(|m| as_object(m.as_str()))
}

/// Fallbacks used when the model leaves a field out.
struct ItemDefaults<'a> {
    item_type: &'a str,
    subtype: &'a str,
    rarity: &'a str,
    requires_attunement: bool,
}

fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn build_item(map: &Map<String, Value>, defaults: ItemDefaults<'_>) -> MagicItem {
    let properties = map
        .get("properties")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default();

    MagicItem {
        name: str_field(map, "name").unwrap_or_else(|| "Unknown Item".to_string()),
        item_type: str_field(map, "item_type").unwrap_or_else(|| defaults.item_type.to_string()),
        subtype: str_field(map, "subtype").unwrap_or_else(|| defaults.subtype.to_string()),
        rarity: str_field(map, "rarity").unwrap_or_else(|| defaults.rarity.to_string()),
        requires_attunement: map
            .get("requires_attunement")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.requires_attunement),
        attunement_requirement: str_field(map, "attunement_requirement"),
        description: str_field(map, "description")
            .unwrap_or_else(|| "No description provided.".to_string()),
        properties,
        curse: str_field(map, "curse"),
        lore: str_field(map, "lore"),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini `generateContent` client.
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiGenerator {
    /// `user_api_key` wins over the configured key when both are present.
    pub fn new(settings: &GeminiSettings, user_api_key: Option<&str>) -> Result<Self> {
        let api_key = user_api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| settings.resolved_api_key())
            .ok_or(DmError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!("Making Gemini request to: {} ({} chars)", self.endpoint(), prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Gemini response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DmError::ApiStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }

    async fn complete_json(&self, prompt: &str) -> Result<Map<String, Value>> {
        let text = self.complete(prompt).await?;
        extract_json_from_response(&text).ok_or(DmError::ResponseParseError { raw: text })
    }
}

#[async_trait]
impl ItemGenerator for GeminiGenerator {
    async fn generate_item(&self, params: &LootParameters) -> Result<MagicItem> {
        let prompt = build_item_prompt(params);
        let map = self.complete_json(&prompt).await?;

        let item = build_item(
            &map,
            ItemDefaults {
                item_type: params.item_type.as_str(),
                subtype: params.item_subtype.as_str(),
                rarity: params.rarity.as_str(),
                requires_attunement: params.requires_attunement,
            },
        );
        tracing::info!("✨ Generated '{}' ({})", item.name, item.rarity);
        Ok(item)
    }

    async fn generate_quick_item(&self, params: &QuickLootParameters) -> Result<MagicItem> {
        let prompt = build_quick_item_prompt(params);
        let map = self.complete_json(&prompt).await?;

        let item = build_item(
            &map,
            ItemDefaults {
                item_type: "Wondrous Item",
                subtype: "Unknown",
                rarity: params.rarity.as_str(),
                requires_attunement: false,
            },
        );
        tracing::info!("✨ Generated '{}' ({})", item.name, item.rarity);
        Ok(item)
    }
}
