//! Product name normalization.

const STOP_WORDS: &[&str] = &["X", "DE", "EL", "LA", "EN", "CON", "PARA", "POR"];
const SIGNIFICANT_WORDS: usize = 2;

/// First two significant words of a product title, upper-cased.
///
/// Drops pure numbers and Spanish filler words so listings such as
/// "Lámpara LED x 2 para Cocina" and "LAMPARA LED 3 UNIDADES" collapse together.
pub fn extract_base_name(product_name: &str) -> String {
    product_name
        .trim()
        .to_uppercase()
        .split_whitespace()
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !STOP_WORDS.contains(w))
        .take(SIGNIFICANT_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}
