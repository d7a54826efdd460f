//! AI enrichment adapter: provider abstraction, batch prompt and response parsing.
//!
//! One request per run classifies, summarizes and scores a batch of hits.
//! Every failure (no credential, transport error, bad status, empty or non-JSON
//! body) ends as `None` so the caller falls back to the keyword path.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyze::builder::{
    canonical_brand, clean_source, clean_summary, clean_title, detect_manufacturer,
};
use crate::analyze::classifier::classify;
use crate::config::ai::AiConfig;
use crate::config::MonitorConfig;
use crate::ingest::types::RawHit;
use crate::news::{clamp_importance, NewsItem};
use crate::taxonomy::Category;

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: sends one prompt, returns the raw model text.
/// Separated from parsing so tests can feed canned responses.
pub trait Provider: Send + Sync + 'static {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

pub type DynProvider = Arc<dyn Provider>;

fn http_client(timeout_secs: u64) -> Option<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("edm-news-monitor/0.1")
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| warn!(target: "classify", error = ?e, "AI http client build failed"))
        .ok()
}

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash";

    pub fn new(cfg: &AiConfig) -> Option<Self> {
        Some(Self {
            http: http_client(cfg.timeout_secs)?,
            api_key: cfg.api_key.clone(),
            model: cfg
                .model
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
        })
    }
}

impl Provider for GeminiProvider {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Part<'a> {
                text: &'a str,
            }
            #[derive(Serialize)]
            struct Content<'a> {
                parts: Vec<Part<'a>>,
            }
            #[derive(Serialize)]
            #[serde(rename_all = "camelCase")]
            struct GenCfg {
                temperature: f32,
                response_mime_type: &'static str,
            }
            #[derive(Serialize)]
            #[serde(rename_all = "camelCase")]
            struct Req<'a> {
                contents: Vec<Content<'a>>,
                generation_config: GenCfg,
            }
            #[derive(Deserialize)]
            struct Resp {
                #[serde(default)]
                candidates: Vec<Candidate>,
            }
            #[derive(Deserialize)]
            struct Candidate {
                content: RespContent,
            }
            #[derive(Deserialize)]
            struct RespContent {
                #[serde(default)]
                parts: Vec<RespPart>,
            }
            #[derive(Deserialize)]
            struct RespPart {
                #[serde(default)]
                text: String,
            }

            let req = Req {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
                generation_config: GenCfg {
                    temperature: 0.2,
                    response_mime_type: "application/json",
                },
            };
            let url = format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.model
            );

            let resp = match self
                .http
                .post(url)
                .header("x-goog-api-key", &self.api_key)
                .json(&req)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    warn!(target: "classify", error = ?e, provider = "gemini", "AI transport error");
                    return None;
                }
            };
            if !resp.status().is_success() {
                warn!(target: "classify", status = %resp.status(), provider = "gemini", "AI non-success status");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let text: String = body
                .candidates
                .first()
                .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
                .unwrap_or_default();
            Some(text).filter(|t| !t.trim().is_empty())
        })
    }
    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// OpenAI provider (Chat Completions API).
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn new(cfg: &AiConfig) -> Option<Self> {
        Some(Self {
            http: http_client(cfg.timeout_secs)?,
            api_key: cfg.api_key.clone(),
            model: cfg
                .model
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
        })
    }
}

impl Provider for OpenAiProvider {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let sys = "You classify EDM industry news. Answer with valid JSON only, no prose.";
            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: sys,
                    },
                    Msg {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: 0.2,
                max_tokens: 4096,
            };

            let resp = match self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    warn!(target: "classify", error = ?e, provider = "openai", "AI transport error");
                    return None;
                }
            };
            if !resp.status().is_success() {
                warn!(target: "classify", status = %resp.status(), provider = "openai", "AI non-success status");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            body.choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .filter(|t| !t.trim().is_empty())
        })
    }
    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Canned provider for tests/local runs: returns `fixed` verbatim.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: Option<String>,
}

impl Provider for MockProvider {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { out })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Factory: a provider only when enrichment is enabled and a credential exists.
///
/// `AI_TEST_MODE=mock` with `AI_MOCK_RESPONSE` set yields a canned provider.
pub fn build_provider(cfg: &AiConfig) -> Option<DynProvider> {
    if std::env::var("AI_TEST_MODE").is_ok_and(|v| v == "mock") {
        let fixed = std::env::var("AI_MOCK_RESPONSE").ok();
        return Some(Arc::new(MockProvider { fixed }));
    }

    if !cfg.is_available() {
        return None;
    }

    match cfg.provider.as_str() {
        "gemini" => GeminiProvider::new(cfg).map(|p| Arc::new(p) as DynProvider),
        "openai" => OpenAiProvider::new(cfg).map(|p| Arc::new(p) as DynProvider),
        other => {
            warn!(target: "classify", provider = other, "unsupported AI provider; enrichment disabled");
            None
        }
    }
}

// ------------------------------------------------------------
// Batch enrichment
// ------------------------------------------------------------

pub struct AiClassifier {
    provider: DynProvider,
    max_items: usize,
}

impl AiClassifier {
    pub fn new(provider: DynProvider, max_items: usize) -> Self {
        Self {
            provider,
            max_items: max_items.max(1),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Classify the first `max_items` hits in one call. `None` means
    /// "unavailable": the caller must use the keyword path.
    pub async fn enrich(
        &self,
        hits: &[RawHit],
        cfg: &MonitorConfig,
        today: NaiveDate,
    ) -> Option<Vec<NewsItem>> {
        if hits.is_empty() {
            return None;
        }
        let batch = &hits[..hits.len().min(self.max_items)];
        let prompt = build_prompt(batch);

        let Some(raw) = self.provider.complete(&prompt).await else {
            warn!(target: "classify", provider = self.provider.name(), "AI returned no response");
            return None;
        };

        let items = parse_response(&raw, cfg, today)?;
        info!(
            target: "classify",
            provider = self.provider.name(),
            sent = batch.len(),
            received = items.len(),
            "AI enrichment ok"
        );
        Some(items)
    }
}

#[derive(Serialize)]
struct PromptHit<'a> {
    title: &'a str,
    snippet: &'a str,
    source: &'a str,
    url: &'a str,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
}

/// Single prompt embedding the hits, the taxonomy and the JSON contract.
pub fn build_prompt(hits: &[RawHit]) -> String {
    let payload: Vec<PromptHit<'_>> = hits
        .iter()
        .map(|h| PromptHit {
            title: &h.title,
            snippet: &h.snippet,
            source: &h.source,
            url: &h.url,
            date: h.date.format("%Y-%m-%d").to_string(),
            group: h.group.as_deref(),
        })
        .collect();
    let results = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Analyze these search results about EDM (electrical discharge machining) machines.

Results: {results}

Tasks:
1. Keep only news relevant to EDM machines, technology or the EDM market.
2. Categorize each one into exactly one of: {categories}
3. Write a short summary (2-3 lines) for each item.
4. Assign an importance score from 1 to 10.
5. Name the machine manufacturer when one is mentioned.

Reply ONLY with valid JSON in this format:
{{
  "items": [
    {{
      "title": "...",
      "category": "...",
      "summary": "...",
      "importance": 8,
      "source": "...",
      "date": "YYYY-MM-DD",
      "url": "...",
      "manufacturer": "..."
    }}
  ]
}}

Do NOT include any text outside the JSON."#,
        categories = Category::labels_joined(", ")
    )
}

/// Enrichment item as returned by the model; every field is optional.
#[derive(Debug, Deserialize)]
struct AiItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    importance: Option<serde_json::Value>,
    #[serde(default)]
    source: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AiAny {
    Wrapped {
        #[serde(alias = "news")]
        items: Vec<AiItem>,
    },
    Bare(Vec<AiItem>),
}

/// Remove markdown code fences around a JSON answer.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json").or_else(|| s.strip_prefix("```")) {
        s = rest;
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

fn parse_importance(v: Option<&serde_json::Value>) -> u8 {
    let raw = match v {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    };
    clamp_importance(raw.unwrap_or(crate::analyze::scoring::BASE_SCORE))
}

/// Parse and validate a model answer into items sharing the keyword path's schema.
/// `None` for non-JSON bodies and for answers with no usable item.
pub fn parse_response(raw: &str, cfg: &MonitorConfig, today: NaiveDate) -> Option<Vec<NewsItem>> {
    let body = strip_code_fences(raw);
    let parsed: AiAny = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!(target: "classify", error = %e, "AI response is not valid JSON");
            return None;
        }
    };
    let raw_items = match parsed {
        AiAny::Wrapped { items } => items,
        AiAny::Bare(items) => items,
    };

    let items: Vec<NewsItem> = raw_items
        .into_iter()
        .filter_map(|it| item_from_ai(it, cfg, today))
        .collect();

    if items.is_empty() {
        warn!(target: "classify", "AI response had no usable items");
        return None;
    }
    Some(items)
}

fn item_from_ai(it: AiItem, cfg: &MonitorConfig, today: NaiveDate) -> Option<NewsItem> {
    let title = clean_title(&it.title, cfg.title_max_chars);
    if title.is_empty() {
        return None;
    }
    let text = format!("{} {}", it.title, it.summary);

    let category = Category::from_label(&it.category).unwrap_or_else(|| classify(&text, None, cfg));
    let summary_src = if it.summary.trim().is_empty() {
        &it.title
    } else {
        &it.summary
    };
    let manufacturer = it
        .manufacturer
        .as_deref()
        .and_then(|m| canonical_brand(m, cfg))
        .or_else(|| detect_manufacturer(&text, cfg));
    let date = match it.date.trim() {
        "" => today.format("%Y-%m-%d").to_string(),
        d => d.to_string(),
    };

    Some(NewsItem {
        title,
        category,
        summary: clean_summary(summary_src, cfg.summary_max_chars),
        importance: parse_importance(it.importance.as_ref()),
        source: clean_source(&it.source),
        date,
        url: it
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty()),
        manufacturer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> MonitorConfig {
        MonitorConfig::default()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[]\n```  "), "[]");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn parses_wrapped_and_validates_fields() {
        let raw = r#"```json
{"items":[
  {"title":"Sodick AL400G launch","category":"new models","summary":"New wire EDM.","importance":14,"source":"» EDM Today","date":"2025-03-01","manufacturer":"SODICK"},
  {"title":"Shop buys wire EDM","category":"Gossip","summary":"The shop expects market growth and demand.","importance":"3","source":""},
  {"title":"","category":"New Models","summary":"dropped","importance":5}
]}
```"#;
        let items = parse_response(raw, &cfg(), today()).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].category, Category::NewModels);
        assert_eq!(items[0].importance, 10);
        assert_eq!(items[0].source, "EDM Today");
        assert_eq!(items[0].manufacturer.as_deref(), Some("Sodick"));
        assert_eq!(items[0].date, "2025-03-01");

        // unknown label re-derived from the text
        assert_eq!(items[1].category, Category::MarketApplications);
        assert_eq!(items[1].importance, 3);
        assert_eq!(items[1].source, "Unknown");
        assert_eq!(items[1].date, "2025-03-04");
        assert!(items[1].url.is_none());
    }

    #[test]
    fn accepts_bare_array_and_news_alias() {
        let bare = r#"[{"title":"EDM news","category":"Events & Trade Shows","importance":6.6}]"#;
        let items = parse_response(bare, &cfg(), today()).unwrap();
        assert_eq!(items[0].importance, 7);
        assert_eq!(items[0].summary, "EDM news");

        let alias = r#"{"news":[{"title":"EDM news"}]}"#;
        let items = parse_response(alias, &cfg(), today()).unwrap();
        assert_eq!(items[0].importance, 5);
    }

    #[test]
    fn invalid_or_empty_answers_are_unavailable() {
        assert!(parse_response("Sorry, I cannot help with that.", &cfg(), today()).is_none());
        assert!(parse_response(r#"{"items":[]}"#, &cfg(), today()).is_none());
        assert!(parse_response("", &cfg(), today()).is_none());
    }

    #[test]
    fn unknown_brand_falls_back_to_detection() {
        let raw = r#"{"items":[{"title":"Makino wire EDM","manufacturer":"Acme Corp"}]}"#;
        let items = parse_response(raw, &cfg(), today()).unwrap();
        assert_eq!(items[0].manufacturer.as_deref(), Some("Makino"));
    }

    #[test]
    fn prompt_lists_taxonomy_and_hits() {
        let hits = vec![RawHit::new("Sodick news", "MMS", today()).with_group("news")];
        let p = build_prompt(&hits);
        assert!(p.contains("Problems & Solutions"));
        assert!(p.contains("Market & Applications"));
        assert!(p.contains("Sodick news"));
        assert!(p.contains("2025-03-04"));
        assert!(p.contains("JSON"));
    }

    /// Keeps the last prompt it was sent.
    struct RecordingProvider {
        seen: Arc<std::sync::Mutex<Option<String>>>,
        answer: String,
    }

    impl Provider for RecordingProvider {
        fn complete<'a>(
            &'a self,
            prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
            *self.seen.lock().unwrap() = Some(prompt.to_string());
            let out = self.answer.clone();
            Box::pin(async move { Some(out) })
        }
        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn only_first_max_items_reach_the_prompt() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let ai = AiClassifier::new(
            Arc::new(RecordingProvider {
                seen: Arc::clone(&seen),
                answer: r#"{"items":[{"title":"EDM hit 1"}]}"#.into(),
            }),
            crate::config::ai::MAX_PROMPT_ITEMS,
        );
        let hits: Vec<RawHit> = (1..=30)
            .map(|n| RawHit::new(format!("EDM hit {n}"), "s", today()))
            .collect();

        assert!(ai.enrich(&hits, &cfg(), today()).await.is_some());
        let prompt = seen.lock().unwrap().clone().expect("prompt sent");
        assert!(prompt.contains("\"EDM hit 1\""));
        assert!(prompt.contains("\"EDM hit 25\""));
        assert!(!prompt.contains("\"EDM hit 26\""));
        assert!(!prompt.contains("\"EDM hit 30\""));
    }

    #[tokio::test]
    async fn enrich_handles_empty_batches_and_silent_providers() {
        let ok = AiClassifier::new(
            Arc::new(MockProvider {
                fixed: Some(r#"{"items":[{"title":"EDM item","category":"New Models"}]}"#.into()),
            }),
            25,
        );
        let hits = vec![RawHit::new("EDM item", "s", today())];
        assert_eq!(ok.enrich(&hits, &cfg(), today()).await.map(|v| v.len()), Some(1));
        assert!(ok.enrich(&[], &cfg(), today()).await.is_none());

        let silent = AiClassifier::new(Arc::new(MockProvider { fixed: None }), 25);
        assert!(silent.enrich(&hits, &cfg(), today()).await.is_none());
    }
}
