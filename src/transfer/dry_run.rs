//! Dry-run estimation: scope a transfer without writing to the destination.
//!
//! A bounded sample of detected images is probed for accessibility and the
//! inaccessible share is extrapolated across the full image count.

use crate::classify::ImageRef;
use crate::common::Result;
use crate::remote::types::SourceRef;
use crate::remote::SourceClient;

/// Rough per-batch insert cost used for the time estimate.
const PER_BATCH_SECONDS: u64 = 2;
/// Rough per-image transfer cost used for the time estimate.
const PER_IMAGE_SECONDS: u64 = 1;

/// Result of probing an image sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeStats {
    pub sampled: usize,
    pub inaccessible: usize,
}

/// Probe up to `sample` images for remote accessibility.
///
/// Fatal errors propagate; any other probe failure counts the image as
/// inaccessible.
pub async fn probe_images<S: SourceClient>(
    client: &S,
    source: &SourceRef,
    images: &[ImageRef],
    sample: usize,
) -> Result<ProbeStats> {
    let mut stats = ProbeStats::default();
    for image in images.iter().take(sample) {
        stats.sampled += 1;
        match client.probe_image(source, image).await {
            Ok(true) => {}
            Ok(false) => stats.inaccessible += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => stats.inaccessible += 1,
        }
    }
    Ok(stats)
}

/// Extrapolate the sampled inaccessible share across the full image count,
/// rounding to the nearest whole image.
pub fn extrapolate_inaccessible(stats: ProbeStats, total_images: usize) -> usize {
    if stats.sampled == 0 {
        return 0;
    }
    let share = stats.inaccessible as f64 / stats.sampled as f64;
    (share * total_images as f64).round() as usize
}

/// Whole-seconds estimate for a live run of the same scope.
pub fn estimate_seconds(total_batches: usize, total_images: usize) -> u64 {
    total_batches as u64 * PER_BATCH_SECONDS + total_images as u64 * PER_IMAGE_SECONDS
}
