use std::{fmt, str::FromStr};

use thiserror::Error;

/// Ceiling used for open-ended labels like "above $2000".
pub const OPEN_ENDED_CEILING: f64 = 5_000.0;

/// Why a single item's price couldn't be read. Never fatal: the item just counts as out of range.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PriceParseError {
	#[error("no price given")]
	Missing,
	#[error("can't read {0:?} as a price")]
	Unparseable(String),
	#[error("{0:?} isn't in dollars")]
	ForeignCurrency(String),
}

/// Reads a dollar price like `"$1,299.99"`. Ranges are in dollars, so any other currency is refused rather than compared as-is.
pub fn parse_price(raw: &str) -> Result<f64, PriceParseError> {
	if raw.chars().any(|c| matches!(c, '₹' | '€' | '£' | '¥')) {
		return Err(PriceParseError::ForeignCurrency(raw.to_owned()));
	}
	let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | ',')).collect();
	match cleaned.trim().parse::<f64>() {
		Ok(price) if price.is_finite() => Ok(price),
		_ => Err(PriceParseError::Unparseable(raw.to_owned())),
	}
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RangeError {
	#[error("price bounds must be finite and non-negative, got [{min}, {max}]")]
	OutOfDomain { min: f64, max: f64 },
	#[error("lower bound {min} is above upper bound {max}")]
	Inverted { min: f64, max: f64 },
	#[error("can't read {0:?} as a price range, expected something like \"$50 - $100\", \"under $50\" or \"above $2000\"")]
	Unrecognized(String),
}

/// Closed interval `[min, max]`, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceRange {
	min: f64,
	max: f64,
}
impl PriceRange {
	pub fn new(min: f64, max: f64) -> Result<Self, RangeError> {
		if !(min.is_finite() && max.is_finite()) || min < 0.0 || max < 0.0 {
			return Err(RangeError::OutOfDomain { min, max });
		}
		if min > max {
			return Err(RangeError::Inverted { min, max });
		}
		Ok(Self { min, max })
	}

	pub fn min(&self) -> f64 {
		self.min
	}

	pub fn max(&self) -> f64 {
		self.max
	}

	pub fn contains(&self, price: f64) -> bool {
		self.min <= price && price <= self.max
	}
}

/// Accepts the labels the recommendation form used: `"$50 - $100"`, `"50-100"`, `"under $50"`, `"above $2000"`.
impl FromStr for PriceRange {
	type Err = RangeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let unrecognized = || RangeError::Unrecognized(s.to_owned());
		let bound = |part: &str| parse_price(part).map_err(|_| unrecognized());

		let label = s.trim().to_lowercase();
		if let Some(rest) = label.strip_prefix("under ").or_else(|| label.strip_prefix("below ")) {
			return Self::new(0.0, bound(rest)?);
		}
		if let Some(rest) = label.strip_prefix("above ").or_else(|| label.strip_prefix("over ")) {
			let min = bound(rest)?;
			return Self::new(min, OPEN_ENDED_CEILING.max(min));
		}

		let (lo, hi) = label.split_once(" to ").or_else(|| label.split_once('-')).ok_or_else(unrecognized)?;
		Self::new(bound(lo)?, bound(hi)?)
	}
}

impl fmt::Display for PriceRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "${} - ${}", self.min, self.max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn range(min: f64, max: f64) -> PriceRange {
		PriceRange::new(min, max).unwrap()
	}

	#[test]
	fn reads_currency_strings() {
		assert_eq!(parse_price("$123.45"), Ok(123.45));
		assert_eq!(parse_price("$1,299.99"), Ok(1299.99));
		assert_eq!(parse_price(" $100 "), Ok(100.0));
	}

	#[test]
	fn other_currencies_are_refused() {
		for raw in ["₹24,999", "€79", "£79.00", "¥8000"] {
			assert_eq!(parse_price(raw), Err(PriceParseError::ForeignCurrency(raw.to_owned())), "{raw:?}");
		}
		assert_eq!(parse_price("Rs. 999"), Err(PriceParseError::Unparseable("Rs. 999".into())));
	}

	#[test]
	fn junk_is_unparseable() {
		for raw in ["free", "", "$--", "$", "N/A", "$inf", "NaN"] {
			assert_eq!(parse_price(raw), Err(PriceParseError::Unparseable(raw.to_owned())), "{raw:?}");
		}
	}

	#[test]
	fn bounds_are_inclusive() {
		let r = range(50.0, 100.0);
		for raw in ["$50.00", "$99.99", "$100"] {
			assert!(r.contains(parse_price(raw).unwrap()), "{raw}");
		}
		for raw in ["$49.99", "$100.01"] {
			assert!(!r.contains(parse_price(raw).unwrap()), "{raw}");
		}
	}

	#[test]
	fn rejects_bad_bounds() {
		assert_eq!(PriceRange::new(100.0, 50.0), Err(RangeError::Inverted { min: 100.0, max: 50.0 }));
		assert!(matches!(PriceRange::new(-1.0, 50.0), Err(RangeError::OutOfDomain { .. })));
		assert!(matches!(PriceRange::new(0.0, f64::INFINITY), Err(RangeError::OutOfDomain { .. })));
		assert_eq!(range(0.0, 0.0).max(), 0.0);
	}

	#[test]
	fn labels() {
		assert_eq!("$50 - $100".parse::<PriceRange>().unwrap(), range(50.0, 100.0));
		assert_eq!("200-500".parse::<PriceRange>().unwrap(), range(200.0, 500.0));
		assert_eq!("$1,000 to $2,000".parse::<PriceRange>().unwrap(), range(1000.0, 2000.0));
		assert_eq!("Under $50".parse::<PriceRange>().unwrap(), range(0.0, 50.0));
		assert_eq!("above $2000".parse::<PriceRange>().unwrap(), range(2000.0, OPEN_ENDED_CEILING));
		assert_eq!("above $9000".parse::<PriceRange>().unwrap(), range(9000.0, 9000.0));
		assert!(matches!("cheap".parse::<PriceRange>(), Err(RangeError::Unrecognized(_))));
		assert!(matches!("$500 - $200".parse::<PriceRange>(), Err(RangeError::Inverted { .. })));
	}

	#[test]
	fn display_matches_label_format() {
		assert_eq!(range(50.0, 100.0).to_string(), "$50 - $100");
		assert_eq!(range(0.5, 9.99).to_string(), "$0.5 - $9.99");
	}
}
