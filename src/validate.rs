//! Pulls the product array out of a free-text completion and checks every price against the requested range.
//!
//! Extraction is a greedy `\[[\s\S]*\]` match, first `[` to last `]`. A completion that mentions brackets in prose
//! around the array, or contains two arrays, will come out as malformed rather than silently picking one.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::{
	item::ItemRecord,
	price::{PriceParseError, PriceRange, parse_price},
};

static ARRAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").unwrap());

#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("no structured array present in the completion")]
	Extraction,
	#[error("found an array but it isn't a list of products: {source}")]
	MalformedData {
		fragment: String,
		#[source]
		source: serde_json::Error,
	},
}

/// How one item fared.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemVerdict {
	pub item: ItemRecord,
	/// `0.0` whenever `price_error` is set.
	pub price: f64,
	pub price_error: Option<PriceParseError>,
	pub in_range: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Verdict {
	pub range: PriceRange,
	/// Same order as in the completion.
	pub items: Vec<ItemVerdict>,
}
impl Verdict {
	/// True iff there is at least one item and every item has a readable price inside the range.
	pub fn all_in_range(&self) -> bool {
		!self.items.is_empty() && self.items.iter().all(|v| v.in_range)
	}

	pub fn in_range_count(&self) -> usize {
		self.items.iter().filter(|v| v.in_range).count()
	}
}

/// Finds the bracketed array in `raw`.
pub fn extract_array(raw: &str) -> Result<&str, ValidationError> {
	ARRAY.find(raw).map(|m| m.as_str()).ok_or(ValidationError::Extraction)
}

pub fn parse_items(fragment: &str) -> Result<Vec<ItemRecord>, ValidationError> {
	serde_json::from_str(fragment).map_err(|source| ValidationError::MalformedData {
		fragment: fragment.to_owned(),
		source,
	})
}

pub fn check_item(item: ItemRecord, range: PriceRange) -> ItemVerdict {
	let parsed = match item.price.as_deref() {
		Some(raw) => parse_price(raw),
		None => Err(PriceParseError::Missing),
	};
	let (price, price_error, in_range) = match parsed {
		Ok(price) => (price, None, range.contains(price)),
		Err(e) => (0.0, Some(e), false),
	};
	ItemVerdict {
		item,
		price,
		price_error,
		in_range,
	}
}

pub fn check_items(items: Vec<ItemRecord>, range: PriceRange) -> Verdict {
	Verdict {
		range,
		items: items.into_iter().map(|item| check_item(item, range)).collect(),
	}
}

pub fn validate(raw: &str, range: PriceRange) -> Result<Verdict, ValidationError> {
	let fragment = extract_array(raw)?;
	let items = parse_items(fragment)?;
	tracing::debug!(n_items = items.len(), "parsed product array");
	Ok(check_items(items, range))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn range(min: f64, max: f64) -> PriceRange {
		PriceRange::new(min, max).unwrap()
	}

	fn priced(price: &str) -> ItemRecord {
		ItemRecord {
			name: Some(format!("thing at {price}")),
			price: Some(price.to_owned()),
			..Default::default()
		}
	}

	#[test]
	fn extracts_array_out_of_prose() {
		let array = r#"[{"name": "A", "price": "$1"}, {"name": "B", "price": "$2"}]"#;
		let raw = format!("Sure! Here are the products you asked for:\n```json\n{array}\n```\nLet me know if you need more.");
		assert_eq!(extract_array(&raw).unwrap(), array);
	}

	#[test]
	fn extraction_is_greedy() {
		assert_eq!(extract_array("see [1] and [2]").unwrap(), "[1] and [2]");
		assert!(matches!(extract_array("] backwards ["), Err(ValidationError::Extraction)));
	}

	#[test]
	fn serialized_records_come_back_equal() {
		let records = vec![
			ItemRecord {
				name: Some("Anker Soundcore P40i".into()),
				description: Some("Adaptive ANC, 60h playtime".into()),
				price: Some("$59.99".into()),
				link: Some("https://www.amazon.com/dp/B0CHYHG9ZH".into()),
				image_link: Some("https://m.media-amazon.com/images/I/51.jpg".into()),
			},
			ItemRecord {
				name: Some("No-frills pick".into()),
				..Default::default()
			},
		];
		let raw = format!("Results: {} -- end", serde_json::to_string_pretty(&records).unwrap());
		assert_eq!(parse_items(extract_array(&raw).unwrap()).unwrap(), records);
	}

	#[test]
	fn single_item_in_range() {
		let verdict = validate("Here you go: [{\"name\":\"X\",\"price\":\"$75.00\"}] enjoy", range(50.0, 100.0)).unwrap();
		assert!(verdict.all_in_range());
		assert_eq!(verdict.items.len(), 1);
		assert!(verdict.items[0].in_range);
		assert_eq!(verdict.items[0].price, 75.0);
		assert_eq!(verdict.items[0].item.name_or_placeholder(), "X");
	}

	#[test]
	fn no_brackets() {
		let err = validate("I'm sorry, I can't browse Amazon right now.", range(50.0, 100.0)).unwrap_err();
		assert!(matches!(err, ValidationError::Extraction));
	}

	#[test]
	fn malformed_array_keeps_fragment() {
		let err = validate("Here: [{\"name\": \"X\", \"price\": \"$75\",}] thanks", range(50.0, 100.0)).unwrap_err();
		match err {
			ValidationError::MalformedData { fragment, .. } => assert_eq!(fragment, "[{\"name\": \"X\", \"price\": \"$75\",}]"),
			other => panic!("expected malformed data, got {other:?}"),
		}
		assert!(matches!(validate("[1, 2, 3]", range(0.0, 10.0)), Err(ValidationError::MalformedData { .. })));
	}

	#[test]
	fn out_of_range_item() {
		let verdict = check_items(vec![priced("$250.00"), priced("$999.99")], range(200.0, 500.0));
		assert!(!verdict.all_in_range());
		assert!(verdict.items[0].in_range);
		assert!(!verdict.items[1].in_range);
		assert_eq!(verdict.items[1].price, 999.99);
		assert_eq!(verdict.in_range_count(), 1);
	}

	#[test]
	fn unreadable_prices_are_zero_and_out_of_range() {
		for raw in ["free", "", "$--"] {
			let v = check_item(priced(raw), range(50.0, 100.0));
			assert_eq!(v.price, 0.0);
			assert!(!v.in_range);
			assert_eq!(v.price_error, Some(PriceParseError::Unparseable(raw.to_owned())));
		}
		// even when zero itself would have been acceptable
		assert!(!check_item(priced("free"), range(0.0, 50.0)).in_range);
	}

	#[test]
	fn rupee_price_cannot_pass_a_dollar_range() {
		let verdict = validate(r#"[{"name": "x", "price": "₹79"}]"#, range(50.0, 100.0)).unwrap();
		assert!(!verdict.all_in_range());
		assert_eq!(verdict.items[0].price, 0.0);
		assert_eq!(verdict.items[0].price_error, Some(PriceParseError::ForeignCurrency("₹79".into())));
	}

	#[test]
	fn missing_price() {
		let v = check_item(ItemRecord::default(), range(0.0, 50.0));
		assert_eq!(v.price_error, Some(PriceParseError::Missing));
		assert!(!v.in_range);
	}

	#[test]
	fn empty_array_fails() {
		let verdict = validate("nothing matched: []", range(0.0, 100.0)).unwrap();
		assert!(verdict.items.is_empty());
		assert!(!verdict.all_in_range());
	}

	#[test]
	fn order_is_preserved() {
		let verdict = check_items(vec![priced("$3"), priced("$1"), priced("$2")], range(0.0, 10.0));
		let prices: Vec<f64> = verdict.items.iter().map(|v| v.price).collect();
		assert_eq!(prices, vec![3.0, 1.0, 2.0]);
	}
}
