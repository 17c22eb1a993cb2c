use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::duration::Duration;
use crate::release_date::ReleaseDateType;

// ── Offence / offender ──────────────────────────────────────────────

/// The offence a sentence was passed for. Classification flags are
/// resolved upstream (offence-classification service) before calculation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offence {
    pub committed_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offence_code: Option<String>,
    /// Listed in schedule 15 of the Criminal Justice Act 2003.
    #[serde(default)]
    pub is_schedule_15: bool,
    /// Excluded from the 40% early-release scheme.
    #[serde(default)]
    pub excluded_from_early_release: bool,
}

impl Offence {
    pub fn committed_on(committed_at: NaiveDate) -> Self {
        Self {
            committed_at,
            offence_code: None,
            is_schedule_15: false,
            excluded_from_early_release: false,
        }
    }
}

/// The prisoner the booking belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offender {
    pub reference: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub is_active_sex_offender: bool,
}

impl Offender {
    /// Age in whole years on `date` (0 if `date` precedes the birth date).
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        date.years_since(self.date_of_birth).unwrap_or(0)
    }
}

// ── Recall / identification ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallType {
    StandardRecall,
    FixedTermRecall,
}

/// Legislative track a sentence is classified into before any date
/// arithmetic. The track selects the release-point fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentificationTrack {
    SdsBeforeCjaLaspo,
    SdsStandardRelease,
    SdsPlusRelease,
    SdsEarlyRelease,
    EdsAutomaticRelease,
    EdsDiscretionaryRelease,
    SopcPedAtHalfway,
    SopcPedAtTwoThirds,
    AfineArdAtHalfway,
    Dto,
}

/// Result of sentence identification: the track plus the release-date
/// types the sentence must produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentenceIdentification {
    pub track: IdentificationTrack,
    pub release_date_types: BTreeSet<ReleaseDateType>,
}

impl SentenceIdentification {
    pub fn new(track: IdentificationTrack, types: impl IntoIterator<Item = ReleaseDateType>) -> Self {
        Self {
            track,
            release_date_types: types.into_iter().collect(),
        }
    }

    pub fn has(&self, release_date_type: ReleaseDateType) -> bool {
        self.release_date_types.contains(&release_date_type)
    }
}

// ── Sentence variants ───────────────────────────────────────────────

/// Closed set of sentence variants. Aggregates (`Consecutive`,
/// `SingleTerm`) are synthesised by the engine and own their members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SentenceKind {
    StandardDeterminate {
        duration: Duration,
        #[serde(default)]
        is_sds_plus: bool,
    },
    ExtendedDeterminate {
        custodial_duration: Duration,
        extension_duration: Duration,
        #[serde(default)]
        automatic_release: bool,
    },
    Sopc {
        custodial_duration: Duration,
        extension_duration: Duration,
    },
    AFine {
        duration: Duration,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fine_amount_pence: Option<u64>,
    },
    DetentionAndTrainingOrder {
        duration: Duration,
    },
    Consecutive {
        sentences: Vec<Sentence>,
    },
    SingleTerm {
        sentences: Vec<Sentence>,
        duration: Duration,
    },
}

/// Discriminant of [`SentenceKind`], used where only the runtime variant
/// matters (chain de-duplication, logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceKindTag {
    StandardDeterminate,
    ExtendedDeterminate,
    Sopc,
    AFine,
    DetentionAndTrainingOrder,
    Consecutive,
    SingleTerm,
}

impl SentenceKind {
    pub fn tag(&self) -> SentenceKindTag {
        match self {
            Self::StandardDeterminate { .. } => SentenceKindTag::StandardDeterminate,
            Self::ExtendedDeterminate { .. } => SentenceKindTag::ExtendedDeterminate,
            Self::Sopc { .. } => SentenceKindTag::Sopc,
            Self::AFine { .. } => SentenceKindTag::AFine,
            Self::DetentionAndTrainingOrder { .. } => SentenceKindTag::DetentionAndTrainingOrder,
            Self::Consecutive { .. } => SentenceKindTag::Consecutive,
            Self::SingleTerm { .. } => SentenceKindTag::SingleTerm,
        }
    }
}

// ── Sentence ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sentence {
    pub id: Uuid,
    pub sentenced_at: NaiveDate,
    pub offence: Offence,
    pub kind: SentenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall_type: Option<RecallType>,
    /// Sentences this one is served consecutively to.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub consecutive_to: BTreeSet<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<SentenceIdentification>,
}

impl Sentence {
    pub fn new(sentenced_at: NaiveDate, offence: Offence, kind: SentenceKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            sentenced_at,
            offence,
            kind,
            recall_type: None,
            consecutive_to: BTreeSet::new(),
            identification: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn consecutive_to(mut self, predecessor: Uuid) -> Self {
        self.consecutive_to.insert(predecessor);
        self
    }

    pub fn recalled(mut self, recall_type: RecallType) -> Self {
        self.recall_type = Some(recall_type);
        self
    }

    /// Copy of this sentence carrying the given identification.
    pub fn identified(&self, identification: SentenceIdentification) -> Sentence {
        Sentence {
            identification: Some(identification),
            ..self.clone()
        }
    }

    pub fn kind_tag(&self) -> SentenceKindTag {
        self.kind.tag()
    }

    pub fn track(&self) -> Option<IdentificationTrack> {
        self.identification.as_ref().map(|i| i.track)
    }

    pub fn has_release_date_type(&self, release_date_type: ReleaseDateType) -> bool {
        self.identification
            .as_ref()
            .is_some_and(|i| i.has(release_date_type))
    }

    pub fn is_recall(&self) -> bool {
        self.recall_type.is_some()
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self.kind,
            SentenceKind::Consecutive { .. } | SentenceKind::SingleTerm { .. }
        )
    }

    /// Members of an aggregate sentence; empty for base sentences.
    pub fn members(&self) -> &[Sentence] {
        match &self.kind {
            SentenceKind::Consecutive { sentences } | SentenceKind::SingleTerm { sentences, .. } => sentences,
            _ => &[],
        }
    }

    /// Ids of the source sentences this sentence stands for.
    pub fn source_ids(&self) -> Vec<Uuid> {
        if self.is_aggregate() {
            self.members().iter().flat_map(|m| m.source_ids()).collect()
        } else {
            vec![self.id]
        }
    }

    pub fn is_dto(&self) -> bool {
        match &self.kind {
            SentenceKind::DetentionAndTrainingOrder { .. } => true,
            SentenceKind::Consecutive { sentences } | SentenceKind::SingleTerm { sentences, .. } => {
                !sentences.is_empty() && sentences.iter().all(Sentence::is_dto)
            }
            _ => false,
        }
    }

    pub fn is_afine(&self) -> bool {
        match &self.kind {
            SentenceKind::AFine { .. } => true,
            SentenceKind::Consecutive { sentences } => {
                !sentences.is_empty() && sentences.iter().all(Sentence::is_afine)
            }
            _ => false,
        }
    }

    /// EDS or SOPC, or an aggregate containing one.
    pub fn has_extended_licence_component(&self) -> bool {
        match &self.kind {
            SentenceKind::ExtendedDeterminate { .. } | SentenceKind::Sopc { .. } => true,
            SentenceKind::Consecutive { sentences } | SentenceKind::SingleTerm { sentences, .. } => {
                sentences.iter().any(Sentence::has_extended_licence_component)
            }
            _ => false,
        }
    }

    pub fn has_sds_plus_component(&self) -> bool {
        match &self.kind {
            SentenceKind::StandardDeterminate { is_sds_plus, .. } => *is_sds_plus,
            SentenceKind::Consecutive { sentences } | SentenceKind::SingleTerm { sentences, .. } => {
                sentences.iter().any(Sentence::has_sds_plus_component)
            }
            _ => self.track() == Some(IdentificationTrack::SdsPlusRelease),
        }
    }

    /// Durations served in custody, in service order.
    pub fn custodial_durations(&self) -> Vec<Duration> {
        match &self.kind {
            SentenceKind::StandardDeterminate { duration, .. }
            | SentenceKind::AFine { duration, .. }
            | SentenceKind::DetentionAndTrainingOrder { duration }
            | SentenceKind::SingleTerm { duration, .. } => vec![duration.clone()],
            SentenceKind::ExtendedDeterminate {
                custodial_duration, ..
            }
            | SentenceKind::Sopc {
                custodial_duration, ..
            } => vec![custodial_duration.clone()],
            SentenceKind::Consecutive { sentences } => sentences
                .iter()
                .flat_map(Sentence::custodial_durations)
                .collect(),
        }
    }

    /// Licence extension periods served after the custodial term.
    pub fn extension_durations(&self) -> Vec<Duration> {
        match &self.kind {
            SentenceKind::ExtendedDeterminate {
                extension_duration, ..
            }
            | SentenceKind::Sopc {
                extension_duration, ..
            } => vec![extension_duration.clone()],
            SentenceKind::Consecutive { sentences } => sentences
                .iter()
                .flat_map(Sentence::extension_durations)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Custodial durations followed by licence extensions.
    pub fn total_durations(&self) -> Vec<Duration> {
        let mut all = self.custodial_durations();
        all.extend(self.extension_durations());
        all
    }
}
