use std::fmt;

use crate::{
	PriceRange,
	item::LinkKind,
	runner::{CaseError, CaseReport, RunReport},
	validate::{self, ValidationError, Verdict},
};

/// How much of each raw completion to echo back.
pub const PREVIEW_CHARS: usize = 200;

const RULE: &str = "==================================================";

fn mark(ok: bool) -> &'static str {
	match ok {
		true => "✅ PASS",
		false => "❌ FAIL",
	}
}

fn write_validation_error(f: &mut fmt::Formatter<'_>, e: &ValidationError, raw: &str) -> fmt::Result {
	match e {
		ValidationError::Extraction => writeln!(f, "❌ No JSON found in response\nFull response: {raw}"),
		ValidationError::MalformedData { fragment, source } => writeln!(f, "❌ JSON Parsing Failed: {source}\nRaw JSON: {fragment}"),
	}
}

/// Per-item breakdown, then the range verdict.
impl fmt::Display for Verdict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, v) in self.items.iter().enumerate() {
			let item = &v.item;
			let status = match (&v.price_error, v.in_range) {
				(Some(e), _) => format!("❌ OUT OF RANGE ({e})"),
				(None, true) => "✅".to_owned(),
				(None, false) => "❌ OUT OF RANGE".to_owned(),
			};
			let link_note = match item.link_kind() {
				LinkKind::ProductPage { asin } => format!(" (ASIN {asin})"),
				LinkKind::Search => " (search page, not a product)".to_owned(),
				LinkKind::Other | LinkKind::Missing => String::new(),
			};
			writeln!(f, "\n{}. {}", i + 1, item.name_or_placeholder())?;
			writeln!(f, "   Price: {} {status}", item.price_or_placeholder())?;
			writeln!(f, "   Link: {}{link_note}", item.link_or_placeholder())?;
			writeln!(f, "   Image: {}", item.image_link_or_placeholder())?;
		}

		let summary = match (self.items.is_empty(), self.all_in_range()) {
			(true, _) => "❌ NO PRODUCTS PARSED".to_owned(),
			(false, true) => "✅ ALL PRICES IN RANGE".to_owned(),
			(false, false) => format!("❌ SOME PRICES OUT OF RANGE ({}/{} in range)", self.in_range_count(), self.items.len()),
		};
		writeln!(f, "\n💰 Price Range Validation [{}]: {summary}", self.range)
	}
}

impl fmt::Display for CaseReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "\n🔍 Testing: {} in {} range", self.case.product, self.case.range)?;
		if let Some(response) = &self.response {
			writeln!(f, "📝 Raw Response Preview: {}", response.preview(PREVIEW_CHARS))?;
		}
		match &self.outcome {
			Ok(verdict) => {
				writeln!(f, "✅ JSON Parsing: Successfully parsed {} products", verdict.items.len())?;
				if let Some((asked, got)) = self.count_mismatch() {
					writeln!(f, "⚠️ Asked for {asked} products, got {got}")?;
				}
				write!(f, "{verdict}")
			}
			Err(CaseError::Validation(e)) => {
				let raw = self.response.as_ref().map(|r| r.text.as_str()).unwrap_or_default();
				write_validation_error(f, e, raw)
			}
			Err(CaseError::Transport(e)) => writeln!(f, "❌ Request Failed: {e}"),
		}
	}
}

/// The whole run, ending with the summary block.
impl fmt::Display for RunReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "🧪 Gemini API Test Script\n{RULE}\n🔍 Testing basic Gemini API connectivity...")?;
		match &self.connectivity {
			Ok(response) => writeln!(f, "✅ Basic API Test: {}", response.text.trim())?,
			Err(e) => writeln!(f, "❌ Basic API Test Failed: {e}")?,
		}

		if self.connectivity_passed() {
			writeln!(f, "\n🛍️ Testing product recommendation with price range validation...")?;
			for case in &self.cases {
				write!(f, "{case}")?;
			}
		}

		writeln!(f, "\n{RULE}\n📊 Test Results Summary:")?;
		writeln!(f, "Basic API Test: {}", mark(self.connectivity_passed()))?;
		writeln!(f, "Product Recommendations: {}", mark(self.recommendations_passed()))?;
		writeln!(f, "Estimated cost: {:.4} cents", self.total_cost_cents())?;
		match self.passed() {
			true => writeln!(f, "\n🎉 All tests passed! Your Gemini API is working correctly."),
			false => writeln!(f, "\n⚠️ Some tests failed. Check the error messages above."),
		}
	}
}

/// Offline validation of a saved completion.
#[derive(Debug)]
pub struct Checked<'a> {
	pub raw: &'a str,
	pub outcome: Result<Verdict, ValidationError>,
}
impl<'a> Checked<'a> {
	pub fn new(raw: &'a str, range: PriceRange) -> Self {
		Self {
			raw,
			outcome: validate::validate(raw, range),
		}
	}

	pub fn passed(&self) -> bool {
		matches!(&self.outcome, Ok(verdict) if verdict.all_in_range())
	}
}
impl fmt::Display for Checked<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.outcome {
			Ok(verdict) => write!(f, "{verdict}"),
			Err(e) => write_validation_error(f, e, self.raw),
		}
	}
}
