//! Consecutive sentence chains
//!
//! Consecutive-to links form a predecessor → successors multimap. Every
//! simple path from a base sentence (one with no link of its own) is a
//! candidate chain; a predecessor with several successors forks the path.
//! Single-member paths are dropped, and chains that aggregate to an
//! equivalent sentence are collapsed to one.

use shared_types::{
    CalculationError, CalculationOptions, IdentificationTrack, Offence, Offender,
    ReleasePointMultipliers, Sentence, SentenceKind, SentenceKindTag,
};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use super::duration_aggregator::sentence_days;
use super::identification::identify_sentence;

/// Key under which two built chains are treated as the same sentence.
///
/// Equal sentence date, track, total length and variant is a heuristic:
/// chains with the same shape but different offences also collapse.
type ChainKey = (chrono::NaiveDate, Option<IdentificationTrack>, i64, SentenceKindTag);

/// Enumerate every chain of two or more sentences, in a deterministic
/// order (bases by sentence date, successors by sentence date).
pub fn build_chains(sentences: &[Sentence]) -> Vec<Vec<Sentence>> {
    let mut successors: BTreeMap<Uuid, Vec<&Sentence>> = BTreeMap::new();
    for sentence in sentences {
        for predecessor in &sentence.consecutive_to {
            successors.entry(*predecessor).or_default().push(sentence);
        }
    }
    for list in successors.values_mut() {
        list.sort_by_key(|s| (s.sentenced_at, s.id));
    }

    let mut bases: Vec<&Sentence> = sentences
        .iter()
        .filter(|s| s.consecutive_to.is_empty())
        .collect();
    bases.sort_by_key(|s| (s.sentenced_at, s.id));

    let mut chains = Vec::new();
    for base in bases {
        extend_chain(vec![base], &successors, &mut chains);
    }

    chains
        .into_iter()
        .filter(|chain| chain.len() > 1)
        .map(|chain| chain.into_iter().cloned().collect())
        .collect()
}

fn extend_chain<'a>(
    path: Vec<&'a Sentence>,
    successors: &BTreeMap<Uuid, Vec<&'a Sentence>>,
    chains: &mut Vec<Vec<&'a Sentence>>,
) {
    let next: Vec<&'a Sentence> = path
        .last()
        .and_then(|last| successors.get(&last.id))
        .map(|list| {
            list.iter()
                .copied()
                .filter(|s| !path.iter().any(|p| p.id == s.id))
                .collect()
        })
        .unwrap_or_default();

    if next.is_empty() {
        chains.push(path);
        return;
    }
    for successor in next {
        let mut forked = path.clone();
        forked.push(successor);
        extend_chain(forked, successors, chains);
    }
}

/// Synthesise the aggregate sentence for a chain. The chain's earliest
/// offence stands for the whole chain, with schedule 15 status carried
/// over from any member.
pub fn make_consecutive_sentence(chain: &[Sentence]) -> Option<Sentence> {
    let sentenced_at = chain.iter().map(|s| s.sentenced_at).min()?;
    let earliest = chain.iter().min_by_key(|s| s.offence.committed_at)?;
    let offence = Offence {
        is_schedule_15: chain.iter().any(|s| s.offence.is_schedule_15),
        ..earliest.offence.clone()
    };
    let mut aggregate = Sentence::new(
        sentenced_at,
        offence,
        SentenceKind::Consecutive {
            sentences: chain.to_vec(),
        },
    );
    aggregate.recall_type = chain.iter().find_map(|s| s.recall_type);
    Some(aggregate)
}

/// Build, identify and de-duplicate the consecutive sentences of a
/// booking. Members must already be identified.
#[tracing::instrument(skip_all, fields(sentences = sentences.len()))]
pub fn build_consecutive_sentences(
    sentences: &[Sentence],
    offender: &Offender,
    options: &CalculationOptions,
    multipliers: &ReleasePointMultipliers,
) -> Result<Vec<Sentence>, CalculationError> {
    let mut seen: HashSet<ChainKey> = HashSet::new();
    let mut built = Vec::new();

    for chain in build_chains(sentences) {
        let Some(aggregate) = make_consecutive_sentence(&chain) else {
            continue;
        };
        let identification = identify_sentence(&aggregate, offender, options, multipliers)?;
        let aggregate = aggregate.identified(identification);
        let key: ChainKey = (
            aggregate.sentenced_at,
            aggregate.track(),
            sentence_days(&aggregate),
            aggregate.kind_tag(),
        );
        if !seen.insert(key) {
            tracing::debug!(chain = ?aggregate.source_ids(), "duplicate consecutive chain collapsed");
            continue;
        }
        tracing::debug!(
            chain = ?aggregate.source_ids(),
            track = ?aggregate.track(),
            "consecutive sentence built"
        );
        built.push(aggregate);
    }
    Ok(built)
}
