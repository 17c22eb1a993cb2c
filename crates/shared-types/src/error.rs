use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::common::DateRange;

/// Categorization of calculation failures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CalculationErrorKind {
    /// Sentence shape, link or adjustment combination the engine does not model.
    UnsupportedInput,
    /// Source data is present but contradictory.
    InvalidData,
    /// Adjustments push release before the sentence started.
    ExtinguishedSentence,
    /// No single coherent set of booking dates can be chosen.
    ExtractionAmbiguity,
    /// Missing or malformed calculator configuration.
    Configuration,
}

impl fmt::Display for CalculationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationErrorKind::UnsupportedInput => write!(f, "UnsupportedInput"),
            CalculationErrorKind::InvalidData => write!(f, "InvalidData"),
            CalculationErrorKind::ExtinguishedSentence => write!(f, "ExtinguishedSentence"),
            CalculationErrorKind::ExtractionAmbiguity => write!(f, "ExtractionAmbiguity"),
            CalculationErrorKind::Configuration => write!(f, "Configuration"),
        }
    }
}

/// Typed failure raised by the engine. Each variant carries the ids and
/// ranges needed to render a precise message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("booking has no sentences to calculate")]
    NoSentences,

    #[error("sentence {sentence_id} is consecutive to unknown sentence {reference}")]
    UnknownConsecutiveReference { sentence_id: Uuid, reference: Uuid },

    #[error("consecutive links form a cycle through sentence {sentence_id}")]
    ConsecutiveCycle { sentence_id: Uuid },

    #[error("detention and training order {sentence_id} cannot be consecutive with non-DTO sentence {other_id}")]
    DtoConsecutiveToNonDto { sentence_id: Uuid, other_id: Uuid },

    #[error("fixed term recall sentence {sentence_id} has no return to custody date")]
    MissingReturnToCustodyDate { sentence_id: Uuid },

    #[error("sentence {sentence_id} is not supported: {reason}")]
    UnsupportedSentence { sentence_id: Uuid, reason: String },

    #[error("remand period {first} overlaps remand period {second}")]
    RemandOverlapsRemand { first: DateRange, second: DateRange },

    #[error("remand period {remand} overlaps sentence {sentence_id} ({sentence_range})")]
    RemandOverlapsSentence {
        remand: DateRange,
        sentence_id: Uuid,
        sentence_range: DateRange,
    },

    #[error("custodial period of sentence {sentence_id} extinguished: release {release_date} is before sentence date {sentenced_at}")]
    CustodialPeriodExtinguished {
        sentence_id: Uuid,
        sentenced_at: NaiveDate,
        release_date: NaiveDate,
    },

    #[error("sentences {sentence_ids:?} neither overlap nor run consecutively")]
    SentencesDoNotOverlap { sentence_ids: Vec<Uuid> },

    #[error("sentence {sentence_id} has not been identified")]
    NotIdentified { sentence_id: Uuid },

    #[error("invalid calculation configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl CalculationError {
    pub fn kind(&self) -> CalculationErrorKind {
        match self {
            CalculationError::NoSentences
            | CalculationError::UnknownConsecutiveReference { .. }
            | CalculationError::ConsecutiveCycle { .. }
            | CalculationError::DtoConsecutiveToNonDto { .. }
            | CalculationError::MissingReturnToCustodyDate { .. }
            | CalculationError::UnsupportedSentence { .. } => CalculationErrorKind::UnsupportedInput,
            CalculationError::RemandOverlapsRemand { .. }
            | CalculationError::RemandOverlapsSentence { .. } => CalculationErrorKind::InvalidData,
            CalculationError::CustodialPeriodExtinguished { .. } => {
                CalculationErrorKind::ExtinguishedSentence
            }
            CalculationError::SentencesDoNotOverlap { .. } => CalculationErrorKind::ExtractionAmbiguity,
            CalculationError::NotIdentified { .. }
            | CalculationError::InvalidConfiguration { .. } => CalculationErrorKind::Configuration,
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        CalculationError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn unsupported(sentence_id: Uuid, reason: impl Into<String>) -> Self {
        CalculationError::UnsupportedSentence {
            sentence_id,
            reason: reason.into(),
        }
    }
}
