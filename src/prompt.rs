use crate::price::PriceRange;

pub const CONNECTIVITY_PROMPT: &str = "Hello! Can you respond with 'API is working correctly'?";

pub fn recommendation(product: &str, range: PriceRange, count: usize) -> String {
	format!(
		r#"You are a Professional Product Recommender with web search capabilities.

Search the web for exactly {count} real {product} products in the {range} price range.

For each product, find:
1. Real product name and model
2. Direct Amazon product page URL (https://www.amazon.com/dp/[PRODUCT_ID])
3. Product image URL (https://m.media-amazon.com/images/I/[ID]._AC_UY327_FMwebp_QL65_.jpg)
4. Accurate current price
5. Product description

CRITICAL: Return ONLY a valid JSON array with NO additional text, explanations, or markdown formatting.

Use this exact format:
[
  {{
    "name": "Real Brand + Model (e.g. Apple iPhone 15 Pro)",
    "description": "Concise description of key features and benefits (40-60 words)",
    "price": "$XXX.XX",
    "link": "https://www.amazon.com/dp/[ACTUAL_PRODUCT_ID]",
    "imageLink": "https://m.media-amazon.com/images/I/[ACTUAL_IMAGE_ID]._AC_UY327_FMwebp_QL65_.jpg"
  }}
]

Requirements:
- Search for real products currently available on Amazon
- Use direct product page URLs (dp/[ID]), not search URLs
- Extract actual Amazon image URLs from product pages
- Prices must match current Amazon pricing within the {range} range"#
	)
}
