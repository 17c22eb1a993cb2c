//! Sentence identification
//!
//! Classifies a sentence into its legislative track by comparing sentence
//! and offence dates against commencement dates, then assigns the set of
//! release-date types the track produces. Aggregates are identified on
//! their combined duration after their members have been identified.

use chrono::NaiveDate;
use shared_types::{
    add_days, CalculationError, CalculationOptions, Duration, Fraction, IdentificationTrack,
    Offence, Offender, ReleaseDateType, ReleasePointMultipliers, Sentence,
    SentenceIdentification, SentenceKind,
};
use std::collections::BTreeSet;

use super::duration_aggregator::custodial_days;
use ReleaseDateType::*;

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid commencement date"),
    }
}

/// Criminal Justice Act 2003 release provisions.
pub const CJA_COMMENCEMENT: NaiveDate = ymd(2005, 4, 4);
/// Legal Aid, Sentencing and Punishment of Offenders Act 2012.
pub const LASPO_COMMENCEMENT: NaiveDate = ymd(2012, 12, 3);
/// Offender Rehabilitation Act 2014 (top-up supervision).
pub const ORA_COMMENCEMENT: NaiveDate = ymd(2015, 2, 1);
/// Police, Crime, Sentencing and Courts Act 2022.
pub const PCSC_COMMENCEMENT: NaiveDate = ymd(2022, 6, 28);

const HDCED_MINIMUM_WEEKS: u32 = 12;
const HDCED_MAXIMUM_YEARS: u32 = 4;
const TUSED_MINIMUM_AGE: u32 = 18;
/// Pre-CJA sentences of this length or more are parole-eligible.
const PRE_CJA_LONG_TERM_YEARS: u32 = 4;

/// Classify a sentence. Aggregate members must already be identified.
#[tracing::instrument(skip_all, fields(sentence = %sentence.id))]
pub fn identify_sentence(
    sentence: &Sentence,
    offender: &Offender,
    options: &CalculationOptions,
    multipliers: &ReleasePointMultipliers,
) -> Result<SentenceIdentification, CalculationError> {
    let mut identification = match &sentence.kind {
        SentenceKind::StandardDeterminate { is_sds_plus, .. } => {
            let track = if is_before_cja_laspo(sentence) {
                IdentificationTrack::SdsBeforeCjaLaspo
            } else {
                sds_track(*is_sds_plus, &sentence.offence, options)
            };
            identify_sds(sentence, track, offender, options)
        }
        SentenceKind::ExtendedDeterminate {
            automatic_release, ..
        } => {
            let mut types = BTreeSet::from([Sled, Crd]);
            let track = if *automatic_release {
                IdentificationTrack::EdsAutomaticRelease
            } else {
                types.insert(Ped);
                IdentificationTrack::EdsDiscretionaryRelease
            };
            if options.calculate_ersed {
                types.insert(Ersed);
            }
            SentenceIdentification::new(track, types)
        }
        SentenceKind::Sopc { .. } => {
            let track = if sentence.sentenced_at < PCSC_COMMENCEMENT {
                IdentificationTrack::SopcPedAtHalfway
            } else {
                IdentificationTrack::SopcPedAtTwoThirds
            };
            let mut types = BTreeSet::from([Sled, Crd, Ped]);
            if options.calculate_ersed {
                types.insert(Ersed);
            }
            SentenceIdentification::new(track, types)
        }
        SentenceKind::AFine { .. } => {
            SentenceIdentification::new(IdentificationTrack::AfineArdAtHalfway, [Ard, Sed])
        }
        SentenceKind::DetentionAndTrainingOrder { .. } => dto_identification(),
        SentenceKind::Consecutive { sentences } => {
            identify_consecutive(sentence, sentences, offender, options, multipliers)?
        }
        SentenceKind::SingleTerm { sentences, .. } => {
            if sentences.iter().all(Sentence::is_dto) {
                dto_identification()
            } else {
                identify_sds(
                    sentence,
                    IdentificationTrack::SdsBeforeCjaLaspo,
                    offender,
                    options,
                )
            }
        }
    };

    if sentence.is_recall() {
        for t in [Hdced, Hdced4Plus, Ersed] {
            identification.release_date_types.remove(&t);
        }
        identification.release_date_types.insert(Prrd);
    }

    tracing::debug!(
        track = ?identification.track,
        types = ?identification.release_date_types,
        "sentence identified"
    );
    Ok(identification)
}

/// Offence committed before CJA commencement and sentenced before LASPO.
pub fn is_before_cja_laspo(sentence: &Sentence) -> bool {
    sentence.offence.committed_at < CJA_COMMENCEMENT && sentence.sentenced_at < LASPO_COMMENCEMENT
}

fn sds_track(is_sds_plus: bool, offence: &Offence, options: &CalculationOptions) -> IdentificationTrack {
    if is_sds_plus {
        IdentificationTrack::SdsPlusRelease
    } else if options.sds40_enabled && !offence.excluded_from_early_release {
        IdentificationTrack::SdsEarlyRelease
    } else {
        IdentificationTrack::SdsStandardRelease
    }
}

fn dto_identification() -> SentenceIdentification {
    SentenceIdentification::new(IdentificationTrack::Dto, [Sed, Mtd])
}

/// Length of `amount` calendar months measured from `start`, in days.
fn months_in_days(start: NaiveDate, amount: u32) -> i64 {
    Duration::months(amount).length_in_days(start)
}

/// Release types for a standard determinate term (base, consecutive
/// aggregate or single term) on the given track.
fn identify_sds(
    sentence: &Sentence,
    track: IdentificationTrack,
    offender: &Offender,
    options: &CalculationOptions,
) -> SentenceIdentification {
    let start = sentence.sentenced_at;
    let days = custodial_days(sentence);
    let under_twelve_months = days < months_in_days(start, 12);

    let mut types: BTreeSet<ReleaseDateType> = if track == IdentificationTrack::SdsBeforeCjaLaspo {
        if under_twelve_months {
            BTreeSet::from([Ard, Sed])
        } else if days < months_in_days(start, 12 * PRE_CJA_LONG_TERM_YEARS) {
            BTreeSet::from([Crd, Led, Sed])
        } else {
            BTreeSet::from([Ped, Npd, Led, Sed])
        }
    } else if days >= months_in_days(start, 24) {
        BTreeSet::from([Sled, Crd])
    } else if under_twelve_months && sentence.offence.committed_at < ORA_COMMENCEMENT {
        BTreeSet::from([Ard, Sed])
    } else {
        let mut types = BTreeSet::from([Sled, Crd]);
        if qualifies_for_top_up_supervision(sentence, days, offender) {
            types.insert(Tused);
        }
        types
    };

    let minimum_hdc_days = Duration::weeks(HDCED_MINIMUM_WEEKS).length_in_days(start);
    if days >= minimum_hdc_days && days < months_in_days(start, 12 * HDCED_MAXIMUM_YEARS) {
        types.insert(Hdced);
    }
    if options.calculate_hdced4plus && days >= minimum_hdc_days {
        types.insert(Hdced4Plus);
    }
    if options.calculate_ersed {
        types.insert(Ersed);
    }
    SentenceIdentification::new(track, types)
}

/// Offence on or after ORA, more than a day in custody, and an adult at
/// the halfway point of the sentence.
fn qualifies_for_top_up_supervision(sentence: &Sentence, days: i64, offender: &Offender) -> bool {
    if sentence.offence.committed_at < ORA_COMMENCEMENT || days <= 1 {
        return false;
    }
    let halfway = add_days(sentence.sentenced_at, Fraction::HALF.ceil_of(days));
    offender.age_on(halfway) >= TUSED_MINIMUM_AGE
}

fn identify_consecutive(
    aggregate: &Sentence,
    members: &[Sentence],
    offender: &Offender,
    options: &CalculationOptions,
    multipliers: &ReleasePointMultipliers,
) -> Result<SentenceIdentification, CalculationError> {
    let mut tracks = Vec::with_capacity(members.len());
    for member in members {
        let track = member.track().ok_or(CalculationError::NotIdentified {
            sentence_id: member.id,
        })?;
        tracks.push(track);
    }

    if aggregate.is_dto() {
        return Ok(dto_identification());
    }
    if aggregate.is_afine() {
        return Ok(SentenceIdentification::new(
            IdentificationTrack::AfineArdAtHalfway,
            [Ard, Sed],
        ));
    }

    let track = dominant_track(&tracks, multipliers).ok_or(CalculationError::NoSentences)?;

    if aggregate.has_extended_licence_component() {
        let mut types = BTreeSet::from([Sled, Crd]);
        if members.iter().any(|m| m.has_release_date_type(Ped)) {
            types.insert(Ped);
        }
        if options.calculate_ersed {
            types.insert(Ersed);
        }
        return Ok(SentenceIdentification::new(track, types));
    }

    let track = if tracks.iter().all(|t| *t == IdentificationTrack::SdsBeforeCjaLaspo) {
        IdentificationTrack::SdsBeforeCjaLaspo
    } else {
        // A before-track member alongside later-regime members is released
        // under the later regime.
        let later: Vec<IdentificationTrack> = tracks
            .iter()
            .copied()
            .filter(|t| *t != IdentificationTrack::SdsBeforeCjaLaspo)
            .collect();
        dominant_track(&later, multipliers).unwrap_or(track)
    };
    Ok(identify_sds(aggregate, track, offender, options))
}

/// The track with the greatest release fraction; the first wins ties.
pub fn dominant_track(
    tracks: &[IdentificationTrack],
    multipliers: &ReleasePointMultipliers,
) -> Option<IdentificationTrack> {
    tracks.iter().copied().reduce(|best, candidate| {
        let ordering = track_release_fraction(candidate, multipliers)
            .compare(&track_release_fraction(best, multipliers));
        if ordering == std::cmp::Ordering::Greater {
            candidate
        } else {
            best
        }
    })
}

/// Release point of the custodial term for a track. Discretionary tracks
/// are released at the end of the custodial term.
pub fn track_release_fraction(
    track: IdentificationTrack,
    multipliers: &ReleasePointMultipliers,
) -> Fraction {
    match track {
        IdentificationTrack::SdsBeforeCjaLaspo => multipliers.sds_before_cja_laspo,
        IdentificationTrack::SdsStandardRelease => multipliers.sds_standard_release,
        IdentificationTrack::SdsPlusRelease => multipliers.sds_plus_release,
        IdentificationTrack::SdsEarlyRelease => multipliers.sds_early_release,
        IdentificationTrack::EdsAutomaticRelease => multipliers.eds_automatic_release,
        IdentificationTrack::EdsDiscretionaryRelease
        | IdentificationTrack::SopcPedAtHalfway
        | IdentificationTrack::SopcPedAtTwoThirds => Fraction::WHOLE,
        IdentificationTrack::AfineArdAtHalfway => multipliers.afine,
        IdentificationTrack::Dto => multipliers.dto,
    }
}

/// Parole eligibility point for tracks that carry a PED.
pub fn track_parole_fraction(
    track: IdentificationTrack,
    multipliers: &ReleasePointMultipliers,
) -> Option<Fraction> {
    match track {
        IdentificationTrack::SdsBeforeCjaLaspo => Some(multipliers.sds_before_cja_laspo),
        IdentificationTrack::EdsDiscretionaryRelease => {
            Some(multipliers.eds_discretionary_parole_eligibility)
        }
        IdentificationTrack::SopcPedAtHalfway => Some(multipliers.sopc_parole_eligibility_before_pcsc),
        IdentificationTrack::SopcPedAtTwoThirds => Some(multipliers.sopc_parole_eligibility_after_pcsc),
        _ => None,
    }
}
