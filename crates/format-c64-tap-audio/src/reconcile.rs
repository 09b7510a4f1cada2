//! Runs every (channel, polarity) pass and merges recovered blocks by
//! time overlap, preferring the more complete and healthier reading.

use crate::block::Block;
use crate::clock::Pulse;

/// Identifies one (channel, polarity) pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassId(pub usize);

/// Everything one pass of the pipeline produced.
#[derive(Debug, Clone)]
pub struct PassResult {
    pub id: PassId,
    pub blocks: Vec<Block>,
    pub pulses: Vec<Pulse>,
    pub tape_speed_estimate: f64,
}

/// A merged block plus the set of passes that contributed to it.
#[derive(Debug, Clone)]
pub struct MergedBlock {
    pub block: Block,
    pub provenance: Vec<PassId>,
}

#[derive(Debug, Clone)]
pub struct ReconcileOutput {
    pub blocks: Vec<MergedBlock>,
    pub best_pass_pulses: Vec<Pulse>,
    pub tape_play_speed_mean: f64,
}

const TIMING_MARGIN_SEC: f64 = 0.1;

/// Merge every pass's blocks by time overlap, keeping the pulse list of
/// the top-ranked pass for TAP emission.
#[must_use]
pub fn reconcile(mut passes: Vec<PassResult>) -> ReconcileOutput {
    let tape_play_speed_mean = if passes.is_empty() {
        1.0
    } else {
        passes.iter().map(|p| p.tape_speed_estimate).sum::<f64>() / passes.len() as f64
    };

    // Rank passes by total bytes across QC-passing blocks, descending.
    passes.sort_by(|a, b| {
        let bytes_a: usize = a.blocks.iter().map(|blk| blk.byte_count_without_error).sum();
        let bytes_b: usize = b.blocks.iter().map(|blk| blk.byte_count_without_error).sum();
        bytes_b.cmp(&bytes_a)
    });

    let best_pass_pulses = passes.first().map(|p| p.pulses.clone()).unwrap_or_default();

    let mut merged: Vec<MergedBlock> = Vec::new();
    for pass in &passes {
        for candidate in &pass.blocks {
            let existing_index = merged.iter().position(|existing| {
                candidate.end >= existing.block.start - TIMING_MARGIN_SEC
                    && candidate.start <= existing.block.end + TIMING_MARGIN_SEC
            });

            match existing_index {
                None => merged.push(MergedBlock {
                    block: candidate.clone(),
                    provenance: vec![pass.id],
                }),
                Some(index) => merge_into(&mut merged, index, candidate, pass.id),
            }
        }
    }

    merged.sort_by(|a, b| a.block.start.partial_cmp(&b.block.start).unwrap_or(std::cmp::Ordering::Equal));

    ReconcileOutput {
        blocks: merged,
        best_pass_pulses,
        tape_play_speed_mean,
    }
}

fn merge_into(merged: &mut [MergedBlock], index: usize, candidate: &Block, pass_id: PassId) {
    let existing = &merged[index];

    if existing.block.pass_qc && !candidate.pass_qc {
        return;
    }

    if candidate.pass_qc && !existing.block.pass_qc {
        merged[index] = MergedBlock {
            block: candidate.clone(),
            provenance: vec![pass_id],
        };
        return;
    }

    if candidate.byte_count_without_error >= existing.block.byte_count_without_error {
        let mut provenance = existing.provenance.clone();
        provenance.push(pass_id);
        merged[index] = MergedBlock {
            block: candidate.clone(),
            provenance,
        };
    } else {
        merged[index].provenance.push(pass_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;

    fn block(start: f64, end: f64, pass_qc: bool, error_count: u32, length: usize) -> Block {
        Block {
            copy: 0,
            payload: vec![0; length],
            start,
            end,
            error_count,
            recorded_checksum: 0,
            calculated_checksum: 0,
            pass_qc,
            length,
            content_hash: 0,
            byte_count_without_error: if pass_qc { length } else { 0 },
            kind: if pass_qc { BlockKind::Data } else { BlockKind::Corrupt },
        }
    }

    #[test]
    fn empty_passes_yield_speed_one_and_no_blocks() {
        let out = reconcile(vec![]);
        assert_eq!(out.tape_play_speed_mean, 1.0);
        assert!(out.blocks.is_empty());
        assert!(out.best_pass_pulses.is_empty());
    }

    #[test]
    fn tape_speed_is_mean_across_passes() {
        let passes = vec![
            PassResult { id: PassId(0), blocks: vec![], pulses: vec![], tape_speed_estimate: 1.0 },
            PassResult { id: PassId(1), blocks: vec![], pulses: vec![], tape_speed_estimate: 0.9 },
        ];
        let out = reconcile(passes);
        assert!((out.tape_play_speed_mean - 0.95).abs() < 1e-12);
    }

    #[test]
    fn overlapping_blocks_prefer_qc_pass() {
        let clean = block(0.0, 1.0, true, 0, 192);
        let dirty = block(0.0, 1.0, false, 3, 192);
        let passes = vec![
            PassResult { id: PassId(0), blocks: vec![dirty], pulses: vec![], tape_speed_estimate: 1.0 },
            PassResult { id: PassId(1), blocks: vec![clean], pulses: vec![], tape_speed_estimate: 1.0 },
        ];
        let out = reconcile(passes);
        assert_eq!(out.blocks.len(), 1);
        assert!(out.blocks[0].block.pass_qc);
        assert_eq!(out.blocks[0].provenance, vec![PassId(1)]);
    }

    #[test]
    fn duplicate_clean_blocks_accumulate_provenance() {
        let a = block(0.0, 1.0, true, 0, 192);
        let b = block(0.0, 1.0, true, 0, 192);
        let passes = vec![
            PassResult { id: PassId(0), blocks: vec![a], pulses: vec![], tape_speed_estimate: 1.0 },
            PassResult { id: PassId(1), blocks: vec![b], pulses: vec![], tape_speed_estimate: 1.0 },
        ];
        let out = reconcile(passes);
        assert_eq!(out.blocks.len(), 1);
        assert_eq!(out.blocks[0].provenance, vec![PassId(0), PassId(1)]);
    }

    #[test]
    fn non_overlapping_blocks_both_kept_and_sorted() {
        let first = block(5.0, 6.0, true, 0, 192);
        let second = block(0.0, 1.0, true, 0, 192);
        let passes = vec![PassResult {
            id: PassId(0),
            blocks: vec![first, second],
            pulses: vec![],
            tape_speed_estimate: 1.0,
        }];
        let out = reconcile(passes);
        assert_eq!(out.blocks.len(), 2);
        assert!(out.blocks[0].block.start < out.blocks[1].block.start);
    }

    #[test]
    fn best_pass_pulses_come_from_highest_byte_count() {
        let rich = block(0.0, 1.0, true, 0, 192);
        let poor = block(0.0, 1.0, false, 5, 192);
        let pulse = Pulse {
            start: 0.0,
            length_sec: 0.001,
            length_cycles: 60.0,
            header_break: false,
            class: crate::clock::PulseClass::Medium,
            sm_threshold: 55.0,
        };
        let passes = vec![
            PassResult { id: PassId(0), blocks: vec![poor], pulses: vec![], tape_speed_estimate: 1.0 },
            PassResult { id: PassId(1), blocks: vec![rich], pulses: vec![pulse], tape_speed_estimate: 1.0 },
        ];
        let out = reconcile(passes);
        assert_eq!(out.best_pass_pulses.len(), 1);
    }
}
