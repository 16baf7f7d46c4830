//! Catalog product records and their text rendering.
//!
//! Catalog hits are rendered into labeled-field blocks that the answer
//! synthesizer treats exactly like document chunks.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const MISSING: &str = "N/A";

/// One structured product record from the catalog backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub model_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dimensions: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub materials: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub colors: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub mount_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pricing: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source_pdf: Option<String>,
    #[serde(default, deserialize_with = "lenient_page")]
    pub source_page: u32,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image_path: Option<String>,
}

/// A product with its similarity score, in backend rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogHit {
    #[serde(default)]
    pub score: f32,
    pub product: CatalogProduct,
}

/// Catalog backend health.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStatus {
    pub ready: bool,
    pub products: Option<u64>,
}

/// Accepts a string, a scalar or a list of values.
///
/// Scalars are rendered as text. List items are trimmed, blanks dropped, duplicates removed (first
/// occurrence wins) and the rest joined with `", "`. Anything that ends up
/// empty becomes `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| normalize_value(&v)))
}

/// Accepts a page number, a numeric string or null. Anything else is page 0.
fn lenient_page<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let page = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    Ok(page.and_then(|p| u32::try_from(p).ok()).unwrap_or(0))
}

fn normalize_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => {
            let mut seen: Vec<String> = Vec::new();
            for item in items {
                let text = match item {
                    Value::Null => continue,
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                if !text.is_empty() && !seen.contains(&text) {
                    seen.push(text);
                }
            }
            seen.join(", ")
        }
        other => other.to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn field(value: &Option<String>) -> &str {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => MISSING,
    }
}

/// Render one hit as a labeled-field text block.
pub fn render_product(hit: &CatalogHit) -> String {
    let p = &hit.product;
    format!(
        "Product Name: {}\n\
         Model Number: {}\n\
         Dimensions: {}\n\
         Materials: {}\n\
         Colors: {}\n\
         Mount Type: {}\n\
         Pricing: {}\n\
         Notes: {}\n\
         Source: {} (page {})\n\
         Image: {}\n\
         Score: {}\n",
        field(&p.product_name),
        field(&p.model_number),
        field(&p.dimensions),
        field(&p.materials),
        field(&p.colors),
        field(&p.mount_type),
        field(&p.pricing),
        field(&p.notes),
        field(&p.source_pdf),
        p.source_page,
        field(&p.image_path),
        hit.score,
    )
}

/// Trimmed, non-blank image paths in rank order.
pub fn collect_media(hits: &[CatalogHit]) -> Vec<String> {
    hits.iter()
        .filter_map(|hit| hit.product.image_path.as_deref())
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}
