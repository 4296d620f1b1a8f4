use thiserror::Error;

/// Everything that can go wrong between sending a prompt and getting text back.
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("no Gemini API key: pass --gemini-api-key, set it in the config file, or export GEMINI_API_KEY")]
	MissingCredential,
	#[error("API key contains characters that can't go into a header")]
	InvalidCredential(#[from] reqwest::header::InvalidHeaderValue),
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error("Gemini returned {status}: {message}")]
	Api { status: u16, message: String },
	#[error("Gemini blocked the prompt: {reason}")]
	Blocked { reason: String },
	#[error("Gemini returned no text (finish reason: {})", finish_reason.as_deref().unwrap_or("unknown"))]
	EmptyCompletion { finish_reason: Option<String> },
	#[error("couldn't make sense of Gemini's reply: {0}")]
	Decode(#[from] serde_json::Error),
}
