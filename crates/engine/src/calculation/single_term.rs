//! Single term sentences: concurrent pre-CJA standard sentences (or
//! concurrent DTOs) passed on different dates are served as one term
//! running from the earliest sentence date to the latest expiry.

use shared_types::{days_between, Duration, IdentificationTrack, Sentence, SentenceKind};

use super::duration_aggregator::DurationAggregator;

/// Whether the booking's sentences must be combined into a single term.
pub fn requires_single_term(sentences: &[Sentence]) -> bool {
    if sentences.len() < 2 {
        return false;
    }
    if sentences
        .iter()
        .any(|s| !s.consecutive_to.is_empty() || s.is_recall() || s.is_aggregate())
    {
        return false;
    }
    let first_date = sentences[0].sentenced_at;
    if sentences.iter().all(|s| s.sentenced_at == first_date) {
        return false;
    }
    let all_before = sentences.iter().all(|s| {
        matches!(s.kind, SentenceKind::StandardDeterminate { .. })
            && s.track() == Some(IdentificationTrack::SdsBeforeCjaLaspo)
    });
    all_before || sentences.iter().all(Sentence::is_dto)
}

/// Build the (unidentified) single term sentence, if one is required.
pub fn build_single_term(sentences: &[Sentence]) -> Option<Sentence> {
    if !requires_single_term(sentences) {
        return None;
    }
    let start = sentences.iter().map(|s| s.sentenced_at).min()?;
    let end = sentences
        .iter()
        .map(|s| DurationAggregator::aggregate(&s.total_durations()).end_date(s.sentenced_at))
        .max()?;
    let days = u32::try_from(days_between(start, end) + 1).ok()?;
    let earliest = sentences.iter().min_by_key(|s| s.offence.committed_at)?;

    tracing::debug!(%start, %end, members = sentences.len(), "single term built");
    Some(Sentence::new(
        start,
        earliest.offence.clone(),
        SentenceKind::SingleTerm {
            sentences: sentences.to_vec(),
            duration: Duration::days(days),
        },
    ))
}
