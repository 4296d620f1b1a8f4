use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Model, Response, error::TransportError};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// ref: https://ai.google.dev/gemini-api/docs/models
enum GeminiModel {
	FlashLite20,
	Flash20Exp,
	Pro25,
}
impl GeminiModel {
	fn to_str(self) -> &'static str {
		match self {
			GeminiModel::FlashLite20 => "gemini-2.0-flash-lite",
			GeminiModel::Flash20Exp => "gemini-2.0-flash-exp",
			GeminiModel::Pro25 => "gemini-2.5-pro",
		}
	}

	///NB: list prices at the time of writing, the experimental model is billed as regular flash
	fn cost(self) -> Cost {
		match self {
			Self::FlashLite20 => Cost {
				million_input_tokens: 0.075,
				million_output_tokens: 0.30,
			},
			Self::Flash20Exp => Cost {
				million_input_tokens: 0.10,
				million_output_tokens: 0.40,
			},
			Self::Pro25 => Cost {
				million_input_tokens: 1.25,
				million_output_tokens: 10.0,
			},
		}
	}

	fn max_tokens(self) -> usize {
		match self {
			Self::FlashLite20 => 8_192,
			Self::Flash20Exp => 8_192,
			Self::Pro25 => 65_536,
		}
	}
}

impl From<Model> for GeminiModel {
	fn from(model: Model) -> Self {
		match model {
			Model::Fast => Self::FlashLite20,
			Model::Medium => Self::Flash20Exp,
			Model::Slow => Self::Pro25,
		}
	}
}
struct Cost {
	million_input_tokens: f32,
	million_output_tokens: f32,
}

/// Per-request knobs, filled in by [Client](crate::Client).
pub(crate) struct Request<'a> {
	pub prompt: &'a str,
	pub model: Model,
	pub api_key: &'a str,
	pub base_url: &'a str,
	pub max_tokens: Option<usize>,
	pub force_json: bool,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
	text: &'a str,
}
#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
	role: &'static str,
	parts: Vec<GeminiPart<'a>>,
}

///docs: https://ai.google.dev/api/generate-content#method:-models.generatecontent
pub(crate) async fn ask_gemini(request: Request<'_>) -> Result<Response, TransportError> {
	let gemini_model = GeminiModel::from(request.model);
	let url = format!("{}/v1beta/models/{}:generateContent", request.base_url.trim_end_matches('/'), gemini_model.to_str());

	// Header {{{
	let mut headers = HeaderMap::new();
	headers.insert("x-goog-api-key", HeaderValue::from_str(request.api_key)?);
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	//,}}}

	let max_tokens = match request.max_tokens {
		Some(max_tokens) => max_tokens.min(gemini_model.max_tokens()),
		_ => gemini_model.max_tokens(),
	};

	// Payload {{{
	let contents = vec![GeminiContent {
		role: "user",
		parts: vec![GeminiPart { text: request.prompt }],
	}];
	let mut generation_config = json!({
		"temperature": 0.0,
		"maxOutputTokens": max_tokens,
	});
	if request.force_json {
		generation_config["responseMimeType"] = json!("application/json");
	}
	let payload = json!({
		"contents": contents,
		"generationConfig": generation_config,
	});
	//,}}}

	tracing::info!(model = gemini_model.to_str(), "asking gemini");
	tracing::debug!(?payload);

	let reply = reqwest::Client::new().post(&url).headers(headers).json(&payload).send().await?;
	let status = reply.status();
	let body = reply.text().await?;
	tracing::debug!(%status, body);

	if !status.is_success() {
		return Err(TransportError::Api {
			status: status.as_u16(),
			message: api_error_message(&body),
		});
	}

	serde_json::from_str::<GeminiResponse>(&body)?.into_response(gemini_model)
}

/// Pulls `error.message` out of Gemini's error envelope, falling back to the raw body.
fn api_error_message(body: &str) -> String {
	#[derive(Deserialize)]
	struct Envelope {
		error: ApiError,
	}
	#[derive(Deserialize)]
	struct ApiError {
		message: String,
		#[serde(default)]
		status: Option<String>,
	}

	match serde_json::from_str::<Envelope>(body) {
		Ok(Envelope { error }) => match error.status {
			Some(status) => format!("{} ({status})", error.message),
			None => error.message,
		},
		Err(_) => body.trim().to_owned(),
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
	#[serde(default)]
	prompt_feedback: Option<PromptFeedback>,
	#[serde(default)]
	usage_metadata: Option<UsageMetadata>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
	#[serde(default)]
	content: Option<CandidateContent>,
	#[serde(default)]
	finish_reason: Option<String>,
}
#[derive(Debug, Deserialize)]
struct CandidateContent {
	#[serde(default)]
	parts: Vec<CandidatePart>,
}
#[derive(Debug, Deserialize)]
struct CandidatePart {
	#[serde(default)]
	text: Option<String>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
	#[serde(default)]
	block_reason: Option<String>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
	#[serde(default)]
	prompt_token_count: u32,
	#[serde(default)]
	candidates_token_count: u32,
}

impl GeminiResponse {
	fn text(&self) -> String {
		self.candidates
			.first()
			.and_then(|c| c.content.as_ref())
			.map(|content| content.parts.iter().filter_map(|p| p.text.as_deref()).collect::<Vec<&str>>().join(""))
			.unwrap_or_default()
	}

	fn cost_cents(&self, model: GeminiModel) -> f32 {
		let cost = model.cost();
		let usage = self.usage_metadata.as_ref();
		let input = usage.map(|u| u.prompt_token_count).unwrap_or_default() as f32;
		let output = usage.map(|u| u.candidates_token_count).unwrap_or_default() as f32;
		(input * cost.million_input_tokens + output * cost.million_output_tokens) / 10_000.0
	}

	fn into_response(self, model: GeminiModel) -> Result<Response, TransportError> {
		if let Some(reason) = self.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
			return Err(TransportError::Blocked { reason });
		}

		let text = self.text();
		if text.trim().is_empty() {
			let finish_reason = self.candidates.first().and_then(|c| c.finish_reason.clone());
			return Err(TransportError::EmptyCompletion { finish_reason });
		}

		Ok(Response::new(text, self.cost_cents(model)))
	}
}
