//! crates/briefcraft_core/src/assets.rs
//!
//! Pure derivation of the external image-asset and stock-search URLs from a
//! brief. No network calls happen here; seeding the request with the brief
//! id keeps the mapping deterministic.

use crate::domain::{Brief, DesignCategory};

const ASSET_BASE: &str = "https://image.pollinations.ai/prompt/";
const STOCK_SEARCH_BASE: &str = "https://unsplash.com/s/photos/";
const ASSET_MODEL: &str = "flux";

pub const LANDSCAPE_WIDTH: u32 = 1280;
pub const LANDSCAPE_HEIGHT: u32 = 720;
pub const SQUARE_WIDTH: u32 = 1024;
pub const SQUARE_HEIGHT: u32 = 1024;

/// Video-flavored work gets a 16:9 frame; everything else renders square.
pub fn is_landscape(category: Option<DesignCategory>, industry: &str) -> bool {
    let by_category = matches!(
        category,
        Some(
            DesignCategory::YouTube
                | DesignCategory::Football
                | DesignCategory::Advertising
                | DesignCategory::Education
        )
    );
    let industry = industry.to_lowercase();
    by_category || industry.contains("youtube") || industry.contains("video")
}

pub fn frame_for(category: Option<DesignCategory>, industry: &str) -> (u32, u32) {
    if is_landscape(category, industry) {
        (LANDSCAPE_WIDTH, LANDSCAPE_HEIGHT)
    } else {
        (SQUARE_WIDTH, SQUARE_HEIGHT)
    }
}

/// Wraps the asset description in quality qualifiers for the image model.
/// No 4k/8k keywords: those push the generator into oversized files.
fn quality_prompt(description: &str) -> String {
    format!(
        "raw photo, {}, best quality, highly detailed, sharp focus, professional photography, uncompressed",
        description
    )
}

/// Builds the GET-able image-generation URL for a brief. Deterministic: the
/// same brief always maps to the same URL because the request is seeded with
/// the brief id.
pub fn asset_image_url(brief: &Brief, category: Option<DesignCategory>) -> String {
    let (width, height) = frame_for(category, &brief.industry);
    let prompt = quality_prompt(&brief.provided_asset_description);
    format!(
        "{}{}?model={}&width={}&height={}&nologo=true&seed={}",
        ASSET_BASE,
        urlencoding::encode(&prompt),
        ASSET_MODEL,
        width,
        height,
        brief.id
    )
}

/// Search URL for real stock photos: first visual-reference keyword, or the
/// industry string when the brief carries none.
pub fn stock_search_url(brief: &Brief) -> String {
    let term = brief
        .visual_references
        .first()
        .map(String::as_str)
        .unwrap_or(&brief.industry);
    format!("{}{}", STOCK_SEARCH_BASE, urlencoding::encode(term))
}

/// File name the downloaded asset is saved under.
pub fn asset_file_name(brief: &Brief) -> String {
    let id = brief.id.to_string();
    format!("Asset-{}.jpg", &id[..8])
}
