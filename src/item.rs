use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

pub const UNKNOWN_NAME: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

/// One recommended product, as the model wrote it. Every field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, deserialize_with = "price_text", skip_serializing_if = "Option::is_none")]
	pub price: Option<String>,
	#[serde(default, alias = "buyingLink", skip_serializing_if = "Option::is_none")]
	pub link: Option<String>,
	#[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
	pub image_link: Option<String>,
}
impl ItemRecord {
	pub fn name_or_placeholder(&self) -> &str {
		self.name.as_deref().unwrap_or(UNKNOWN_NAME)
	}

	pub fn description_or_placeholder(&self) -> &str {
		self.description.as_deref().unwrap_or(NOT_AVAILABLE)
	}

	pub fn price_or_placeholder(&self) -> &str {
		self.price.as_deref().unwrap_or(NOT_AVAILABLE)
	}

	pub fn link_or_placeholder(&self) -> &str {
		self.link.as_deref().unwrap_or(NOT_AVAILABLE)
	}

	pub fn image_link_or_placeholder(&self) -> &str {
		self.image_link.as_deref().unwrap_or(NOT_AVAILABLE)
	}

	pub fn link_kind(&self) -> LinkKind {
		LinkKind::classify(self.link.as_deref())
	}
}

/// Models sometimes write `"price": 79.99`; keep it as text so it goes through the same parser.
fn price_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Number(serde_json::Number),
	}

	Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
		Raw::Text(text) => text,
		Raw::Number(number) => number.to_string(),
	}))
}

static PRODUCT_PAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/dp/([A-Z0-9]{10})(?:[/?#]|$)").unwrap());

/// What a buying link points at. Purely diagnostic, doesn't affect the verdict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkKind {
	/// An Amazon product page with a well-formed ASIN.
	ProductPage { asin: String },
	/// An Amazon search results page, i.e. the model didn't commit to a product.
	Search,
	Other,
	Missing,
}
impl LinkKind {
	pub fn classify(link: Option<&str>) -> Self {
		let link = match link.map(str::trim) {
			Some(link) if !link.is_empty() => link,
			_ => return Self::Missing,
		};
		if !link.contains("amazon.") {
			return Self::Other;
		}
		if let Some(caps) = PRODUCT_PAGE.captures(link) {
			return Self::ProductPage { asin: caps[1].to_owned() };
		}
		match link.contains("/s?") {
			true => Self::Search,
			false => Self::Other,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_prompt_field_names() {
		let item: ItemRecord = serde_json::from_str(
			r#"{"name": "Sony WF-C700N", "price": "$98.00", "buyingLink": "https://www.amazon.com/dp/B0BYPLWW2L", "imageUrl": "https://m.media-amazon.com/images/I/x.jpg"}"#,
		)
		.unwrap();
		assert_eq!(item.link.as_deref(), Some("https://www.amazon.com/dp/B0BYPLWW2L"));
		assert_eq!(item.image_link.as_deref(), Some("https://m.media-amazon.com/images/I/x.jpg"));
		assert_eq!(item.description, None);
	}

	#[test]
	fn numeric_and_null_prices() {
		let item: ItemRecord = serde_json::from_str(r#"{"price": 79.99}"#).unwrap();
		assert_eq!(item.price.as_deref(), Some("79.99"));
		let item: ItemRecord = serde_json::from_str(r#"{"price": null}"#).unwrap();
		assert_eq!(item.price, None);
		assert!(serde_json::from_str::<ItemRecord>(r#"{"price": [1]}"#).is_err());
	}

	#[test]
	fn placeholders() {
		let item = ItemRecord::default();
		assert_eq!(item.name_or_placeholder(), UNKNOWN_NAME);
		assert_eq!(item.price_or_placeholder(), NOT_AVAILABLE);
		assert_eq!(item.link_or_placeholder(), NOT_AVAILABLE);
		assert_eq!(item.image_link_or_placeholder(), NOT_AVAILABLE);
		assert_eq!(item.description_or_placeholder(), NOT_AVAILABLE);
	}

	#[test]
	fn classifies_links() {
		assert_eq!(
			LinkKind::classify(Some("https://www.amazon.in/Xiaomi-Pad-Smartchoice-Snapdragon-Anti-Reflective/dp/B0DW4GMZ9W")),
			LinkKind::ProductPage { asin: "B0DW4GMZ9W".into() }
		);
		assert_eq!(
			LinkKind::classify(Some("https://www.amazon.com/dp/B0BYPLWW2L?th=1")),
			LinkKind::ProductPage { asin: "B0BYPLWW2L".into() }
		);
		assert_eq!(LinkKind::classify(Some("https://www.amazon.com/dp/[ACTUAL_PRODUCT_ID]")), LinkKind::Other);
		assert_eq!(LinkKind::classify(Some("https://www.amazon.in/s?k=earbuds&ref=nb_sb_noss")), LinkKind::Search);
		assert_eq!(LinkKind::classify(Some("https://example.com/dp/B0BYPLWW2L")), LinkKind::Other);
		assert_eq!(LinkKind::classify(Some("  ")), LinkKind::Missing);
		assert_eq!(LinkKind::classify(None), LinkKind::Missing);
	}
}
