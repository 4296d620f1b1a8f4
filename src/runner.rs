use std::str::FromStr;

use thiserror::Error;

use crate::{
	Client, Response, TransportError,
	price::{PriceRange, RangeError},
	prompt,
	validate::{self, ValidationError, Verdict},
};

/// How many products each recommendation prompt asks for.
pub const DEFAULT_ITEM_COUNT: usize = 5;

/// Anything that turns a prompt into a completion.
#[allow(async_fn_in_trait)]
pub trait Completer {
	async fn complete(&self, prompt: &str) -> Result<Response, TransportError>;
}
impl Completer for Client {
	async fn complete(&self, prompt: &str) -> Result<Response, TransportError> {
		self.ask(prompt).await
	}
}

/// One recommendation request: a product category and the range its prices must land in.
#[derive(Clone, Debug, PartialEq)]
pub struct TestCase {
	pub product: String,
	pub range: PriceRange,
	pub count: usize,
}
impl TestCase {
	pub fn new(product: impl Into<String>, range: PriceRange) -> Self {
		Self {
			product: product.into(),
			range,
			count: DEFAULT_ITEM_COUNT,
		}
	}

	pub fn prompt(&self) -> String {
		prompt::recommendation(&self.product, self.range, self.count)
	}
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TestCaseParseError {
	#[error("expected <product>=<price range>, e.g. \"wireless earbuds=$50 - $100\", got {0:?}")]
	Shape(String),
	#[error(transparent)]
	Range(#[from] RangeError),
}

/// `"<product>=<price range>"`
impl FromStr for TestCase {
	type Err = TestCaseParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (product, range) = s.split_once('=').ok_or_else(|| TestCaseParseError::Shape(s.to_owned()))?;
		let product = product.trim();
		if product.is_empty() {
			return Err(TestCaseParseError::Shape(s.to_owned()));
		}
		Ok(Self::new(product, range.parse()?))
	}
}

pub fn default_cases() -> Vec<TestCase> {
	[("wireless earbuds", 50.0, 100.0), ("smartphones", 200.0, 500.0), ("laptops", 500.0, 1000.0)]
		.into_iter()
		.map(|(product, min, max)| TestCase::new(product, PriceRange::new(min, max).expect("hardcoded ranges are valid")))
		.collect()
}

#[derive(Debug, Error)]
pub enum CaseError {
	#[error(transparent)]
	Transport(#[from] TransportError),
	#[error(transparent)]
	Validation(#[from] ValidationError),
}

#[derive(Debug)]
pub struct CaseReport {
	pub case: TestCase,
	/// Raw completion, when one came back.
	pub response: Option<Response>,
	pub outcome: Result<Verdict, CaseError>,
}
impl CaseReport {
	pub fn passed(&self) -> bool {
		matches!(&self.outcome, Ok(verdict) if verdict.all_in_range())
	}

	/// Set when the model returned a different number of products than were asked for.
	pub fn count_mismatch(&self) -> Option<(usize, usize)> {
		match &self.outcome {
			Ok(verdict) if verdict.items.len() != self.case.count => Some((self.case.count, verdict.items.len())),
			_ => None,
		}
	}
}

#[derive(Debug)]
pub struct RunReport {
	/// The model's reply to [CONNECTIVITY_PROMPT](prompt::CONNECTIVITY_PROMPT).
	pub connectivity: Result<Response, TransportError>,
	/// Empty when connectivity failed.
	pub cases: Vec<CaseReport>,
}
impl RunReport {
	pub fn connectivity_passed(&self) -> bool {
		self.connectivity.is_ok()
	}

	pub fn recommendations_passed(&self) -> bool {
		self.connectivity_passed() && self.cases.iter().all(CaseReport::passed)
	}

	pub fn passed(&self) -> bool {
		self.recommendations_passed()
	}

	pub fn total_cost_cents(&self) -> f32 {
		let connectivity = self.connectivity.as_ref().map(|r| r.cost_cents).unwrap_or_default();
		connectivity + self.cases.iter().filter_map(|c| c.response.as_ref()).map(|r| r.cost_cents).sum::<f32>()
	}
}

/// Runs one recommendation case. Failures land in the report instead of propagating.
pub async fn run_case<C: Completer>(completer: &C, case: &TestCase) -> CaseReport {
	tracing::info!(product = %case.product, range = %case.range, "testing recommendations");
	let response = match completer.complete(&case.prompt()).await {
		Ok(response) => response,
		Err(e) => {
			tracing::warn!(product = %case.product, error = %e, "recommendation request failed");
			return CaseReport {
				case: case.clone(),
				response: None,
				outcome: Err(e.into()),
			};
		}
	};

	let outcome = validate::validate(&response.text, case.range).map_err(CaseError::from);
	match &outcome {
		Ok(verdict) => tracing::info!(product = %case.product, in_range = verdict.in_range_count(), total = verdict.items.len(), "validated"),
		Err(e) => tracing::warn!(product = %case.product, error = %e, "couldn't validate recommendations"),
	}
	CaseReport {
		case: case.clone(),
		response: Some(response),
		outcome,
	}
}

/// Connectivity check first; if that fails nothing else is sent. Cases run one after another.
pub async fn run<C: Completer>(completer: &C, cases: &[TestCase]) -> RunReport {
	tracing::info!("testing basic connectivity");
	let connectivity = completer.complete(prompt::CONNECTIVITY_PROMPT).await;
	if let Err(e) = &connectivity {
		tracing::warn!(error = %e, "connectivity check failed, skipping recommendation cases");
		return RunReport { connectivity, cases: Vec::new() };
	}

	let mut reports = Vec::with_capacity(cases.len());
	for case in cases {
		reports.push(run_case(completer, case).await);
	}
	RunReport { connectivity, cases: reports }
}
