use crate::domain::model::PriceRange;

const MILLION: f64 = 1_000_000.0;

/// Formats a price range in millions, e.g. `3.0M - 4.5M EGP`.
pub fn price_label(price: &PriceRange) -> String {
    match price.max {
        Some(max) => format!("{:.1}M - {:.1}M EGP", price.min / MILLION, max / MILLION),
        None => format!("{:.1}M EGP", price.min / MILLION),
    }
}

pub fn project_count_label(count: usize) -> String {
    if count == 1 {
        "1 Project".to_string()
    } else {
        format!("{} Projects", count)
    }
}

/// First comma-separated segment of a geocoder display name.
pub fn short_place_name(display_name: &str) -> &str {
    display_name.split(',').next().unwrap_or(display_name).trim()
}
