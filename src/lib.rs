pub mod config;
pub mod error;
mod gemini;
pub mod item;
pub mod price;
pub mod runner;
pub mod prompt;
pub mod report;
pub mod validate;

pub use error::TransportError;
pub use item::{ItemRecord, LinkKind};
pub use price::{PriceParseError, PriceRange};
pub use runner::{Completer, RunReport, TestCase};
pub use validate::{ValidationError, Verdict, validate};

/// Env var consulted last when looking for a key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Clone, Copy, Debug, Default, derive_more::FromStr)]
pub enum Model {
	Fast,
	#[default]
	Medium,
	Slow,
}

#[derive(Clone, Debug, Default)]
pub struct Client {
	model: Model,
	max_tokens: Option<usize>,
	force_json: bool,
	api_key: Option<String>,
	base_url: Option<String>,
}
impl Client {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn model(mut self, model: Model) -> Self {
		self.model = model;
		self
	}

	/// Capped at whatever the model allows.
	pub fn max_tokens(mut self, max_tokens: usize) -> Self {
		self.max_tokens = Some(max_tokens);
		self
	}

	/// Ask Gemini for `application/json` output instead of free text.
	pub fn force_json(mut self) -> Self {
		self.force_json = true;
		self
	}

	pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
		self.api_key = Some(api_key.into());
		self
	}

	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());
		self
	}

	pub async fn ask(&self, message: impl Into<String>) -> Result<Response, TransportError> {
		let message = message.into();
		let api_key = self.resolve_api_key()?;
		let base_url = self
			.base_url
			.clone()
			.or_else(|| config::get().gemini_base_url)
			.unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_owned());

		gemini::ask_gemini(gemini::Request {
			prompt: &message,
			model: self.model,
			api_key: &api_key,
			base_url: &base_url,
			max_tokens: self.max_tokens,
			force_json: self.force_json,
		})
		.await
	}

	fn resolve_api_key(&self) -> Result<String, TransportError> {
		let from_env = || std::env::var(API_KEY_ENV).ok();
		pick_api_key(self.api_key.clone(), || config::get().gemini_api_key, from_env)
	}
}

/// First non-blank key wins: explicit, then config, then environment.
fn pick_api_key(
	explicit: Option<String>,
	from_config: impl FnOnce() -> Option<String>,
	from_env: impl FnOnce() -> Option<String>,
) -> Result<String, TransportError> {
	let non_blank = |key: Option<String>| key.filter(|k| !k.trim().is_empty());
	non_blank(explicit)
		.or_else(|| non_blank(from_config()))
		.or_else(|| non_blank(from_env()))
		.ok_or(TransportError::MissingCredential)
}

#[derive(Debug, derive_new::new)]
pub struct Response {
	pub text: String,
	pub cost_cents: f32,
}
impl std::fmt::Display for Response {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Response: {}\nCost (cents): {}", self.text, self.cost_cents)
	}
}
impl Response {
	/// First `max_chars` characters, with an ellipsis if anything was cut.
	pub fn preview(&self, max_chars: usize) -> String {
		match self.text.char_indices().nth(max_chars) {
			Some((cut, _)) => format!("{}...", &self.text[..cut]),
			None => self.text.clone(),
		}
	}
}
