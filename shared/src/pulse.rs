//! Simulated social pulse search.
//!
//! There is no real platform integration: one placeholder post is written per
//! requested platform and the set is classified as a single batch. The whole
//! batch is attributed to the first platform in the request.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::analysis::Analyzer;
use crate::models::{ClassifiedRecord, SourceTag};
use crate::{Error, Result};

/// Colloquial markers sprinkled into synthesized posts.
pub const PULSE_MARKERS: [&str; 2] = ["ayoba", "eish"];

/// Write one placeholder post per platform mentioning `keyword`.
pub fn synthesize_posts<R: Rng + ?Sized>(
    keyword: &str,
    platforms: &[SourceTag],
    rng: &mut R,
) -> Vec<String> {
    platforms
        .iter()
        .map(|_| {
            let marker = PULSE_MARKERS.choose(&mut *rng).copied().unwrap_or(PULSE_MARKERS[0]);
            format!(
                "{} is trending in Mzansi. People are saying it's {}!",
                keyword, marker
            )
        })
        .collect()
}

/// Search `platforms` for `keyword` and classify what comes back.
pub async fn fetch_pulse(
    analyzer: &Analyzer,
    keyword: &str,
    platforms: &[SourceTag],
) -> Result<Vec<ClassifiedRecord>> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(Error::Validation("Keyword cannot be empty".to_string()));
    }
    let source = match platforms.first() {
        Some(first) => *first,
        None => return Err(Error::Validation("Select at least one platform".to_string())),
    };

    let posts = synthesize_posts(keyword, platforms, &mut rand::thread_rng());

    info!(
        "Pulse for '{}' across {} platform(s), attributed to {:?}",
        keyword,
        platforms.len(),
        source
    );

    analyzer.analyze(&posts, source).await
}
