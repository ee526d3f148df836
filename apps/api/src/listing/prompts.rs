// All LLM prompt constants for the listing module.
// Reuses cross-cutting fragments from llm_client::prompts.

use serde_json::{json, Value};

use crate::listing::models::{Geography, PurchaseIntent};

/// Primary listing prompt template.
/// Replace: {persona}, {description}, {priority_instruction}, {audience_instruction},
///          {region_instruction}, {json_instruction}, {title_rules}, {banned_words},
///          {title_start_rule}
pub const LISTING_PROMPT_TEMPLATE: &str = r#"{persona} Your target audience is professional Etsy sellers in the US and European markets.
Using real-time search data from Google, find the best keywords that customers are currently using to search for a product like this: "{description}".
{priority_instruction}{audience_instruction}{region_instruction}
Generate a complete, SEO-optimized Etsy product listing based on your findings.

{json_instruction}
The JSON object must have the following structure: {
  "title": "string",
  "description": "string",
  "keywords": [{ "keyword": "string", "volume": "string (High, Medium, or Low)", "reason": "string" }],
  "category": "string",
  "materials": ["string"],
  "attributes": { "key1": "value1", "key2": "value2" },
  "colors": ["string"],
  "storeSections": ["string"],
  "pricingSuggestions": [{ "tier": "string (Budget, Standard, or Premium)", "price": "number", "currency": "USD", "reason": "string" }],
  "checklist": [{ "element": "string (e.g. Photos, Title)", "instruction": "string (actionable tip)" }]
}

Ensure all constraints are met:
- Title: Create a high-converting, keyword-rich Etsy title optimized for First Page ranking.
{title_rules}
  - {banned_words}
  - Critically, place the most important, highest-volume keywords at the very beginning of the title. {title_start_rule}
- Description: Create a compelling, professional Etsy description (approx 800-1000 characters).
  - STRUCTURE: Strict vertical layout using the "What, Why, How" framework. No long paragraphs.
  - VISUAL STYLE: Use Markdown. Use bullet points (•) or emoji bullets for every point, with line breaks between sections.
    - Section 1 Header: **✨ What It Is**
    - Section 2 Header: **💖 Why You'll Love It**
    - Section 3 Header: **🛠️ How It's Made / Details**
  - Naturally integrate the top search queries (keywords).
  - End with a clear Call to Action on its own line with an emoji (e.g., "🛒 Add to cart now!").
  - Tailor language, benefits and use cases to the target audience if one was provided.
- Keywords: Exactly 13 keyword objects.
  - Diversify them across three categories: Technical/Descriptive (materials, style), Occasion (events, holidays), Recipient (who it is for).
  - "keyword": A 2 or 3 word string, STRICTLY max 20 characters (Etsy limit).
  - "volume": The estimated search volume: "High", "Medium", or "Low".
  - "reason": A brief explanation (max 100 characters) for why this keyword is recommended.
  - Sort the list with the highest search volume keywords first.
- Category: The single most accurate Etsy category.
- Materials: Exactly 13 relevant materials.
- Attributes: Between 5 and 8 product attributes as a key-value JSON object with string values. Prefer Etsy attributes such as "File Type", "Craft Type", "Occasion", "Holiday", "Primary Color", "Secondary Color", "Style", "Theme".
- Colors: Between 5 and 7 popular, searchable color names (e.g., "Forest Green", "Rose Gold", "Matte Black").
- Store Sections: Between 5 and 7 SEO-friendly store section names (e.g., "Gifts for Her", "Wall Art Prints").
- Pricing Suggestions: Exactly 3 suggestions in USD, ordered Budget, Standard, Premium.
  - Analyze competitor pricing to balance profitability and competitiveness.
  - "tier": one of "Budget", "Standard", "Premium". "price": a number. "currency": MUST be "USD". "reason": max 100 characters.
- Checklist: Exactly 6 actionable optimization steps specific to this product, covering Title, Photos, Description, Pricing, Tags, Attributes.
  - "element": the part of the listing. "instruction": a specific, actionable instruction."#;

/// Alternative titles prompt template.
/// Replace: {persona}, {description}, {original_title}, {keywords}, {priority_instruction},
///          {title_rules}, {banned_words}
pub const ALT_TITLES_PROMPT_TEMPLATE: &str = r#"{persona}
Based on the following product details, generate 3 alternative, SEO-optimized titles.

Product Description: "{description}"
Original Title: "{original_title}"
Keywords: "{keywords}"
{priority_instruction}
Constraints for each new title:
- Must be unique and different from the original title.
- Must be highly relevant to the product, easy to read, and compelling for buyers.
{title_rules}
- {banned_words}

You MUST respond with a valid JSON array of exactly 3 title strings."#;

/// Alternative categories prompt template.
/// Replace: {persona}, {description}, {original_category}, {keywords}
pub const ALT_CATEGORIES_PROMPT_TEMPLATE: &str = r#"{persona}
Based on the product description and keywords, generate 3 alternative, relevant Etsy categories.

Product Description: "{description}"
Original Category: "{original_category}"
Keywords: "{keywords}"

Constraints for each new category:
- Must be a valid and specific Etsy category path (e.g., "Art & Collectibles > Painting > Oil").
- Must be unique and different from the original category.
- Must be highly relevant to the product.

You MUST respond with a valid JSON array of exactly 3 category strings."#;

/// Image alt-text prompt template. The image travels as an inline part.
/// Replace: {description}, {main_keywords}, {max_chars}
pub const ALT_TEXT_PROMPT_TEMPLATE: &str = r#"Based on the provided image and the following product information, generate a short, descriptive, and SEO-optimized alt-text.
Product Description: "{description}"
Main SEO Keywords: "{main_keywords}"

Follow these rules strictly:
1. The alt-text must be a maximum of {max_chars} characters.
2. It must include 1-2 of the main SEO keywords naturally.
3. It must focus on the product type, material, and main usage.
4. It must be attractive for both search engines and accessibility tools.
5. Do NOT use generic words like "image of" or "photo of".
6. Use buyer-friendly wording that highlights the product's uniqueness.
7. Respond with ONLY the alt-text string, and nothing else."#;

/// Keyword replacement prompt template.
/// Replace: {description}, {other_keywords}, {keyword_to_replace}
pub const REGENERATE_KEYWORD_PROMPT_TEMPLATE: &str = r#"You are an expert Etsy SEO specialist.
Based on the product description: "{description}".
And considering the existing SEO keywords: "{other_keywords}".

Generate a new, unique, and highly relevant SEO keyword object to replace "{keyword_to_replace}".

Constraints for the new keyword:
- Must be 2 or 3 words.
- Must be a maximum of 20 characters, including spaces (Etsy limit).
- Must be a high-volume search term on Etsy and Google, targeting US and European markets.
- Must NOT be in the list of existing keywords, and must not be "{keyword_to_replace}".

You MUST respond with a valid JSON object with the following structure:
{
  "keyword": "string (the new keyword)",
  "volume": "string (High, Medium, or Low)",
  "reason": "string (a brief explanation for the new keyword, max 100 chars)"
}"#;

/// Seasonal keyword prompt template.
/// Replace: {current_date}, {description}
pub const SEASONAL_KEYWORDS_PROMPT_TEMPLATE: &str = r#"You are an expert Etsy SEO specialist.
The current date is {current_date}.

Based on the product description: "{description}", suggest exactly 5 seasonal, high-search-volume keywords that are trending right now or will be trending very soon (within the next 1-2 months).

Constraints:
- Each keyword MUST be exactly 3 words long.
- Keywords must be highly relevant to the product AND the season/upcoming holidays.
- Keywords must be distinct from each other.

Return ONLY a valid JSON array of strings. Example: ["christmas gift idea", "winter wool scarf", "holiday home decor"]"#;

/// Target-audience paragraph for the primary prompt.
pub fn audience_instruction(intent: PurchaseIntent) -> &'static str {
    match intent {
        PurchaseIntent::Professionals => "Target Audience: Professionals and large business owners. Focus on scalability, high quality, efficiency, and commercial value. Tone: Professional, authoritative, and premium.",
        PurchaseIntent::Beginners => "Target Audience: Beginners and small business owners. Focus on ease of use, starter-friendly features, and growth potential. Tone: Encouraging, accessible, and clear.",
        PurchaseIntent::Handicrafts => "Target Audience: Small handicraft makers and DIY artisans. Focus on creativity, uniqueness, craft supplies, and handmade quality. Tone: Creative, inspiring, and supportive.",
        PurchaseIntent::Children => "Target Audience: Children's rooms and parents. Focus on safety, playfulness, education, and whimsical design. Tone: Fun, gentle, and family-oriented.",
        PurchaseIntent::HomeDecor => "Target Audience: Home decor enthusiasts and interior styling. Focus on aesthetics, trends, atmosphere, and style. Tone: Stylish, cozy, and aspirational.",
        PurchaseIntent::Commercial => "Target Audience: Shops, cafes, and physical retail spaces. Focus on durability, customer appeal, display value, and commercial utility. Tone: Business-oriented, practical, and inviting.",
    }
}

/// Regional targeting paragraph for the primary prompt.
pub fn region_instruction(geography: Geography) -> &'static str {
    match geography {
        Geography::Us => "Primary Market: United States. Use American English spelling (e.g., \"color\", \"personalized\") and US search trends, holidays, and sizing.",
        Geography::Europe => "Primary Market: Europe. Use British English spelling (e.g., \"colour\", \"personalised\") and European search trends, holidays, and metric sizing.",
        Geography::SouthAmerica => "Primary Market: South America. Favor keywords international buyers from South America search for in English, and reflect regional seasons (southern hemisphere) and holidays.",
        Geography::Asia => "Primary Market: Asia. Favor clear, simple English keywords used by Asian buyers, and reflect regional holidays such as Lunar New Year where relevant.",
        Geography::NorthAfrica => "Primary Market: North Africa. Favor clear English keywords used by North African buyers, and reflect regional holidays such as Ramadan and Eid where relevant.",
    }
}

/// Response schema for the list-of-strings calls.
pub fn string_list_schema(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "description": description,
        "items": { "type": "STRING" }
    })
}

/// Response schema for a single keyword object.
pub fn keyword_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "keyword": { "type": "STRING" },
            "volume": { "type": "STRING" },
            "reason": { "type": "STRING" }
        },
        "required": ["keyword", "volume", "reason"]
    })
}
