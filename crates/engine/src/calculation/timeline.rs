//! Booking timeline walk
//!
//! Walks the extractable sentences in sentence-date order, folding them
//! into sentence groups that share one unbroken custodial range:
//!
//! 1. CONNECTED: the sentence's range overlaps or abuts the running range,
//!    so it joins the current group.
//! 2. RECALL BOUNDARY: a non-recall sentence connected to a recall starts a
//!    new group, even when the ranges touch.
//! 3. GAP: the ranges are disconnected. Additional days awarded in the
//!    current group and not yet spent on an earlier gap may bridge it
//!    (recorded as a synthetic ADA entry); otherwise the prisoner was
//!    released and a new group begins.
//!
//! When a group closes, every member is recalculated against the group's
//! shared adjustment window.

use chrono::NaiveDate;
use shared_types::{
    add_days, days_between, Adjustment, AdjustmentSource, AdjustmentType, AdjustmentWindow,
    Adjustments, CalculatedSentence, CalculationConfig, CalculationError, CalculationRule, DateRange,
    SentenceGroup,
};

use super::sentence_calculation::calculate_sentence;

/// Result of a walk: recalculated sentences, the groups they formed and the
/// adjustments (including any gap-fill entries) they were calculated with.
#[derive(Debug, Clone)]
pub struct TimelineOutcome {
    pub sentences: Vec<CalculatedSentence>,
    pub groups: Vec<SentenceGroup>,
    pub adjustments: Adjustments,
    pub release_occurred: bool,
}

/// Accumulator threaded through the walk.
struct TimelineTracker<'a> {
    config: &'a CalculationConfig,
    adjustments: Adjustments,
    range: Option<DateRange>,
    members: Vec<CalculatedSentence>,
    adjustments_after: Option<NaiveDate>,
    follows_release: bool,
    previous_was_recall: bool,
    groups: Vec<SentenceGroup>,
    finalized: Vec<CalculatedSentence>,
}

impl<'a> TimelineTracker<'a> {
    fn new(adjustments: Adjustments, config: &'a CalculationConfig) -> Self {
        Self {
            config,
            adjustments,
            range: None,
            members: Vec::new(),
            adjustments_after: None,
            follows_release: false,
            previous_was_recall: false,
            groups: Vec::new(),
            finalized: Vec::new(),
        }
    }

    fn step(mut self, candidate: CalculatedSentence) -> Result<Self, CalculationError> {
        let window = AdjustmentWindow::new(self.adjustments_after, candidate.sentenced_at());
        let calculation = calculate_sentence(&candidate.sentence, &self.adjustments, window, self.config)?;
        let current = CalculatedSentence::new(candidate.sentence, calculation);
        let range = current.walk_range();
        let is_recall = current.sentence.is_recall();

        let Some(running) = self.range else {
            self.start_group(current, range);
            self.previous_was_recall = is_recall;
            return Ok(self);
        };

        if self.previous_was_recall && !is_recall && running.is_connected(&range) {
            let boundary = add_days(range.start, -1);
            tracing::debug!(sentence = %current.id(), %boundary, "recall boundary closes group");
            self.finalize_group(boundary)?;
            self.follows_release = false;
            self.start_group(current, range);
        } else if running.is_connected(&range) {
            self.extend_group(current, range, running);
        } else if self.fill_gap(running, range) {
            self.extend_group(current, range, running);
        } else {
            let boundary = self.release_boundary(running);
            tracing::debug!(sentence = %current.id(), released = %boundary, "release between groups");
            self.finalize_group(boundary)?;
            self.follows_release = true;
            self.start_group(current, range);
        }
        self.previous_was_recall = is_recall;
        Ok(self)
    }

    fn start_group(&mut self, member: CalculatedSentence, range: DateRange) {
        self.range = Some(range);
        self.members = vec![member];
    }

    fn extend_group(&mut self, member: CalculatedSentence, range: DateRange, running: DateRange) {
        self.range = Some(running.span(&range));
        self.members.push(member);
    }

    /// Bridge a gap with additional days awarded in the current group and
    /// not already spent on an earlier gap. Succeeds only if the gap closes.
    fn fill_gap(&mut self, running: DateRange, next: DateRange) -> bool {
        let gap_days = days_between(running.end, next.start) - 1;
        let window = AdjustmentWindow::new(self.adjustments_after, running.end);
        let available =
            self.adjustments.awarded_days(&window) - self.adjustments.gap_filled_days(&window);
        let fill = gap_days.min(available);
        if fill <= 0 || fill < gap_days {
            return false;
        }
        let from = add_days(running.end, 1);
        let to = add_days(running.end, fill);
        self.adjustments.add(
            AdjustmentType::AdditionalDaysAwarded,
            Adjustment {
                source: AdjustmentSource::TimelineGapFill,
                ..Adjustment::for_period(from, to, running.end)
            },
        );
        tracing::debug!(%from, %to, available, "gap filled with additional days awarded");
        true
    }

    /// Latest actual release of the current group.
    fn release_boundary(&self, running: DateRange) -> NaiveDate {
        self.members
            .iter()
            .map(CalculatedSentence::release_date)
            .fold(running.end, NaiveDate::max)
    }

    /// Recalculate every member against the group window `(after, before]`
    /// and record the group. The next group's window starts at `before`.
    fn finalize_group(&mut self, before: NaiveDate) -> Result<(), CalculationError> {
        let Some(range) = self.range.take() else {
            return Ok(());
        };
        let window = AdjustmentWindow::new(self.adjustments_after, before);
        let members = std::mem::take(&mut self.members);
        let shared = members.len() > 1;
        let mut ids = Vec::with_capacity(members.len());
        for member in members {
            let mut calculation =
                calculate_sentence(&member.sentence, &self.adjustments, window, self.config)?;
            if shared {
                if let Some(breakdown) = calculation.breakdown.get_mut(&calculation.release_date_type) {
                    breakdown.rules.insert(CalculationRule::SharedSentenceGroupAdjustments);
                }
            }
            ids.push(member.id());
            self.finalized.push(CalculatedSentence::new(member.sentence, calculation));
        }
        tracing::debug!(%range, members = ids.len(), follows_release = self.follows_release, "group finalized");
        self.groups.push(SentenceGroup {
            range,
            members: ids,
            adjustments_after: self.adjustments_after,
            follows_release: self.follows_release,
        });
        self.adjustments_after = Some(before);
        Ok(())
    }

    fn finish(mut self) -> Result<TimelineOutcome, CalculationError> {
        self.finalize_group(NaiveDate::MAX)?;
        let release_occurred = self.groups.iter().any(|g| g.follows_release);
        Ok(TimelineOutcome {
            sentences: self.finalized,
            groups: self.groups,
            adjustments: self.adjustments,
            release_occurred,
        })
    }
}

/// Walk the sentences in sentence-date order (ties broken by the end of
/// their initial range) and allocate adjustments group by group.
#[tracing::instrument(skip_all, fields(sentences = sentences.len()))]
pub fn walk_timeline(
    mut sentences: Vec<CalculatedSentence>,
    adjustments: &Adjustments,
    config: &CalculationConfig,
) -> Result<TimelineOutcome, CalculationError> {
    sentences.sort_by_key(|s| (s.sentenced_at(), s.walk_range().end));
    sentences
        .into_iter()
        .try_fold(TimelineTracker::new(adjustments.clone(), config), |tracker, sentence| {
            tracker.step(sentence)
        })?
        .finish()
}
