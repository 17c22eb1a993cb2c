//! Sentence identification: tracks and release date types

use crate::common::*;
use engine::calculation::identification::{dominant_track, identify_sentence};
use pretty_assertions::assert_eq;
use shared_types::{
    CalculationOptions, Duration, IdentificationTrack, Offence, Offender, RecallType,
    ReleaseDateType::{self, *},
    ReleasePointMultipliers, Sentence, SentenceKind,
};
use std::collections::BTreeSet;

fn types(sentence: &Sentence) -> BTreeSet<ReleaseDateType> {
    identify(sentence).identification.unwrap().release_date_types
}

fn pre_cja(duration: Duration) -> Sentence {
    sds_for_offence(date(2010, 1, 1), Offence::committed_on(date(2004, 1, 1)), duration)
}

#[test]
fn four_year_sds_after_ora_has_sled_and_crd_only() {
    let sentence = identify(&sds(date(2022, 1, 1), Duration::years(4)));
    let identification = sentence.identification.unwrap();
    assert_eq!(identification.track, IdentificationTrack::SdsStandardRelease);
    assert_eq!(identification.release_date_types, BTreeSet::from([Sled, Crd]));
}

#[test]
fn short_sds_for_adult_gets_top_up_supervision() {
    assert_eq!(
        types(&sds(date(2022, 1, 1), Duration::months(6))),
        BTreeSet::from([Sled, Crd, Hdced, Tused])
    );
}

#[test]
fn short_sds_for_offence_before_ora_is_automatic_release() {
    let sentence = sds_for_offence(
        date(2015, 3, 1),
        Offence::committed_on(date(2014, 6, 1)),
        Duration::months(6),
    );
    assert_eq!(types(&sentence), BTreeSet::from([Ard, Sed, Hdced]));
}

#[test]
fn no_top_up_supervision_when_under_eighteen_at_halfway() {
    let youth = Offender {
        date_of_birth: date(2004, 6, 1),
        ..offender()
    };
    let sentence = sds(date(2022, 1, 1), Duration::months(6));
    let identification = identify_sentence(
        &sentence,
        &youth,
        &CalculationOptions::default(),
        &ReleasePointMultipliers::default(),
    )
    .unwrap();
    assert!(!identification.has(Tused));
    assert!(identification.has(Crd));
}

#[test]
fn under_twelve_weeks_has_no_hdced() {
    assert!(!types(&sds(date(2022, 1, 1), Duration::weeks(11))).contains(&Hdced));
    assert!(types(&sds(date(2022, 1, 1), Duration::weeks(12))).contains(&Hdced));
}

#[test]
fn pre_cja_short_term_is_automatic_release() {
    assert_eq!(types(&pre_cja(Duration::months(6))), BTreeSet::from([Ard, Sed, Hdced]));
}

#[test]
fn pre_cja_medium_term_has_licence_expiry() {
    assert_eq!(types(&pre_cja(Duration::years(2))), BTreeSet::from([Crd, Led, Sed, Hdced]));
}

#[test]
fn pre_cja_long_term_is_parole_eligible() {
    let sentence = identify(&pre_cja(Duration::years(5)));
    let identification = sentence.identification.unwrap();
    assert_eq!(identification.track, IdentificationTrack::SdsBeforeCjaLaspo);
    assert_eq!(identification.release_date_types, BTreeSet::from([Ped, Npd, Led, Sed]));
}

#[test]
fn sds_plus_flag_selects_two_thirds_track() {
    let sentence = Sentence::new(
        date(2022, 1, 1),
        Offence::committed_on(date(2022, 1, 1)),
        SentenceKind::StandardDeterminate {
            duration: Duration::years(5),
            is_sds_plus: true,
        },
    );
    assert_eq!(identify(&sentence).track(), Some(IdentificationTrack::SdsPlusRelease));
}

#[test]
fn early_release_track_only_when_enabled_and_not_excluded() {
    let options = CalculationOptions::default().with_sds40();
    let sentence = sds(date(2024, 11, 1), Duration::years(2));
    assert_eq!(
        identify_with(&sentence, &options).track(),
        Some(IdentificationTrack::SdsEarlyRelease)
    );

    let excluded = sds_for_offence(
        date(2024, 11, 1),
        Offence {
            excluded_from_early_release: true,
            ..Offence::committed_on(date(2024, 11, 1))
        },
        Duration::years(2),
    );
    assert_eq!(
        identify_with(&excluded, &options).track(),
        Some(IdentificationTrack::SdsStandardRelease)
    );
    assert_eq!(identify(&sentence).track(), Some(IdentificationTrack::SdsStandardRelease));
}

#[test]
fn optional_dates_follow_options() {
    let options = CalculationOptions::default()
        .with_ersed()
        .with_hdced4plus();
    let identification = identify_with(&sds(date(2022, 1, 1), Duration::years(4)), &options)
        .identification
        .unwrap();
    assert_eq!(
        identification.release_date_types,
        BTreeSet::from([Sled, Crd, Hdced4Plus, Ersed])
    );
}

#[test]
fn extended_sentences() {
    let discretionary = eds(date(2022, 1, 1), Duration::years(6), Duration::years(4), false);
    assert_eq!(types(&discretionary), BTreeSet::from([Sled, Crd, Ped]));

    let automatic = eds(date(2022, 1, 1), Duration::years(6), Duration::years(4), true);
    assert_eq!(
        identify(&automatic).track(),
        Some(IdentificationTrack::EdsAutomaticRelease)
    );
    assert_eq!(types(&automatic), BTreeSet::from([Sled, Crd]));
}

#[test]
fn sopc_parole_point_depends_on_pcsc() {
    let sopc = |sentenced_at| {
        Sentence::new(
            sentenced_at,
            Offence::committed_on(sentenced_at),
            SentenceKind::Sopc {
                custodial_duration: Duration::years(5),
                extension_duration: Duration::years(1),
            },
        )
    };
    assert_eq!(
        identify(&sopc(date(2022, 1, 1))).track(),
        Some(IdentificationTrack::SopcPedAtHalfway)
    );
    assert_eq!(
        identify(&sopc(date(2022, 6, 28))).track(),
        Some(IdentificationTrack::SopcPedAtTwoThirds)
    );
}

#[test]
fn dto_has_mid_term_date() {
    let sentence = identify(&dto(date(2022, 1, 1), Duration::months(8)));
    assert_eq!(sentence.track(), Some(IdentificationTrack::Dto));
    assert_eq!(
        sentence.identification.unwrap().release_date_types,
        BTreeSet::from([Sed, Mtd])
    );
}

#[test]
fn recall_swaps_eligibility_dates_for_prrd() {
    let sentence = sds(date(2022, 1, 1), Duration::months(6)).recalled(RecallType::StandardRecall);
    assert_eq!(types(&sentence), BTreeSet::from([Sled, Crd, Tused, Prrd]));
}

#[test]
fn dominant_track_has_greatest_release_fraction() {
    let multipliers = ReleasePointMultipliers::default();
    assert_eq!(
        dominant_track(
            &[IdentificationTrack::SdsStandardRelease, IdentificationTrack::SdsPlusRelease],
            &multipliers
        ),
        Some(IdentificationTrack::SdsPlusRelease)
    );
    // Ties keep the first
    assert_eq!(
        dominant_track(
            &[IdentificationTrack::SdsStandardRelease, IdentificationTrack::AfineArdAtHalfway],
            &multipliers
        ),
        Some(IdentificationTrack::SdsStandardRelease)
    );
    assert_eq!(dominant_track(&[], &multipliers), None);
}
