//! Extraction
//!
//! Merges the per-sentence outcomes of the sentences still being served
//! (those after the last release) into one set of booking dates.
//! A single sentence is copied across; several sentences must all overlap,
//! and the latest release and expiry points win.

use chrono::{Datelike, Months, NaiveDate};
use shared_types::{
    add_days, CalculatedSentence, CalculationError, CalculationResult, DateRange,
    EffectiveSentenceLength, ReleaseDateType, SentenceGroup,
};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use ReleaseDateType::*;

/// Dates taken from the sentence that determines release.
const DETERMINING_SENTENCE_DATES: [ReleaseDateType; 4] = [Hdced, Hdced4Plus, Ersed, Tused];

#[tracing::instrument(skip_all, fields(sentences = sentences.len(), groups = groups.len()))]
pub fn extract(
    sentences: &[CalculatedSentence],
    groups: &[SentenceGroup],
) -> Result<CalculationResult, CalculationError> {
    let candidates = extractable(sentences, groups);
    match candidates.as_slice() {
        [] => Err(CalculationError::NoSentences),
        [single] => Ok(extract_single(single)),
        _ => extract_multiple(&candidates),
    }
}

/// Sentences of the groups from the last release onwards.
fn extractable<'a>(
    sentences: &'a [CalculatedSentence],
    groups: &[SentenceGroup],
) -> Vec<&'a CalculatedSentence> {
    let first = groups.iter().rposition(|g| g.follows_release).unwrap_or(0);
    let ids: HashSet<Uuid> = groups[first.min(groups.len())..]
        .iter()
        .flat_map(|g| g.members.iter().copied())
        .collect();
    if ids.is_empty() {
        return sentences.iter().collect();
    }
    sentences.iter().filter(|s| ids.contains(&s.id())).collect()
}

fn extract_single(sentence: &CalculatedSentence) -> CalculationResult {
    let calculation = &sentence.calculation;
    let mut dates = calculation.dates.clone();
    let mut breakdown = calculation.breakdown.clone();

    // SED and LED falling together are reported as one SLED.
    if let (Some(sed), Some(led)) = (dates.get(&Sed).copied(), dates.get(&Led).copied()) {
        if sed == led {
            dates.remove(&Led);
            dates.remove(&Sed);
            dates.insert(Sled, sed);
            if let Some(b) = breakdown.remove(&Sed) {
                breakdown.insert(Sled, b);
            }
            breakdown.remove(&Led);
        }
    }

    CalculationResult {
        dates,
        breakdown_by_release_date_type: breakdown,
        effective_sentence_length: effective_sentence_length(
            sentence.sentenced_at(),
            calculation.unadjusted_expiry_date,
        ),
        sentences_impacting_final_release_date: sentence.sentence.source_ids(),
    }
}

/// Period a sentence keeps the prisoner in custody: a recall is served
/// to expiry, anything else to its adjusted release.
fn served_range(sentence: &CalculatedSentence) -> DateRange {
    if sentence.sentence.is_recall() {
        sentence.walk_range()
    } else {
        sentence.custodial_range()
    }
}

fn extract_multiple(candidates: &[&CalculatedSentence]) -> Result<CalculationResult, CalculationError> {
    let ids: Vec<Uuid> = candidates.iter().map(|s| s.id()).collect();
    let sources: HashSet<Uuid> = candidates
        .iter()
        .flat_map(|s| s.sentence.source_ids())
        .collect();
    let linked = candidates
        .iter()
        .any(|s| s.sentence.consecutive_to.iter().any(|id| sources.contains(id)));
    let all_overlap = candidates.iter().enumerate().all(|(i, a)| {
        candidates[i + 1..]
            .iter()
            .all(|b| served_range(a).overlaps(&served_range(b)))
    });
    if linked || !all_overlap {
        return Err(CalculationError::SentencesDoNotOverlap { sentence_ids: ids });
    }

    let determining = candidates
        .iter()
        .copied()
        .max_by_key(|s| (s.release_date(), s.calculation.expiry_date()))
        .ok_or(CalculationError::NoSentences)?;
    let release = determining.release_date();

    let mut dates = BTreeMap::new();
    let mut breakdown = BTreeMap::new();
    let mut take = |date_type: ReleaseDateType, source_type: ReleaseDateType, from: &CalculatedSentence| {
        if let Some(date) = from.calculation.date(source_type) {
            dates.insert(date_type, date);
            if let Some(b) = from.calculation.breakdown.get(&source_type) {
                breakdown.insert(date_type, b.clone());
            }
        }
    };

    // Expiry and licence
    let expiry_source = candidates
        .iter()
        .copied()
        .max_by_key(|s| s.calculation.expiry_date())
        .unwrap_or(determining);
    let expiry = expiry_source.calculation.expiry_date();
    let expiry_type = if expiry_source.calculation.date(Sled).is_some() { Sled } else { Sed };
    let licence_source = candidates
        .iter()
        .copied()
        .filter(|s| s.calculation.licence_expiry_date().is_some())
        .max_by_key(|s| s.calculation.licence_expiry_date());
    let licence_expiry = licence_source.and_then(|s| s.calculation.licence_expiry_date());

    match (licence_source, licence_expiry) {
        (Some(_), Some(led)) if led == expiry => take(Sled, expiry_type, expiry_source),
        (Some(source), Some(_)) => {
            take(Sed, expiry_type, expiry_source);
            let licence_type = if source.calculation.date(Led).is_some() { Led } else { Sled };
            take(Led, licence_type, source);
        }
        _ => take(Sed, expiry_type, expiry_source),
    }

    // Release
    let release_type = combined_release_type(candidates, determining, licence_expiry, expiry);
    take(release_type, determining.release_date_type(), determining);

    for date_type in DETERMINING_SENTENCE_DATES {
        take(date_type, date_type, determining);
    }
    for date_type in [Ped, Prrd] {
        let latest = candidates
            .iter()
            .copied()
            .filter(|s| s.calculation.date(date_type).is_some())
            .max_by_key(|s| s.calculation.date(date_type));
        if let Some(source) = latest {
            take(date_type, date_type, source);
        }
    }

    let earliest_start = candidates
        .iter()
        .map(|s| s.sentenced_at())
        .min()
        .unwrap_or(determining.sentenced_at());
    let latest_expiry = candidates
        .iter()
        .map(|s| s.calculation.unadjusted_expiry_date)
        .max()
        .unwrap_or(determining.calculation.unadjusted_expiry_date);

    let impacting = candidates
        .iter()
        .filter(|s| s.release_date() == release)
        .flat_map(|s| s.sentence.source_ids())
        .collect();

    tracing::debug!(%release, ?release_type, determining = %determining.id(), "multiple sentences extracted");
    Ok(CalculationResult {
        dates,
        breakdown_by_release_date_type: breakdown,
        effective_sentence_length: effective_sentence_length(earliest_start, latest_expiry),
        sentences_impacting_final_release_date: impacting,
    })
}

/// CRD unless every sentence is released automatically and no licence
/// runs to expiry. Non-parole and mid-term releases keep their own type.
fn combined_release_type(
    candidates: &[&CalculatedSentence],
    determining: &CalculatedSentence,
    licence_expiry: Option<NaiveDate>,
    expiry: NaiveDate,
) -> ReleaseDateType {
    if candidates.iter().all(|s| s.release_date_type() == Mtd) {
        return Mtd;
    }
    if determining.release_date_type() == Npd {
        return Npd;
    }
    let all_automatic = candidates.iter().all(|s| s.release_date_type() == Ard);
    if all_automatic && licence_expiry.map_or(true, |led| led != expiry) {
        Ard
    } else {
        Crd
    }
}

/// Calendar period covering `start` to `end` inclusive.
pub fn effective_sentence_length(start: NaiveDate, end: NaiveDate) -> EffectiveSentenceLength {
    let end_exclusive = add_days(end, 1);
    if end_exclusive <= start {
        return EffectiveSentenceLength::default();
    }
    let mut months = (end_exclusive.year() - start.year()) * 12 + end_exclusive.month() as i32
        - start.month() as i32;
    let anchor_after = |months: i32| start.checked_add_months(Months::new(months.max(0) as u32));
    while months > 0 && anchor_after(months).map_or(true, |anchor| anchor > end_exclusive) {
        months -= 1;
    }
    let anchor = anchor_after(months).unwrap_or(start);
    EffectiveSentenceLength {
        years: (months / 12) as u32,
        months: (months % 12) as u32,
        days: (end_exclusive - anchor).num_days().max(0) as u32,
    }
}

