//! Writes recovered block payloads to files, applying the HEADER/SEQ/DATA
//! naming rules and skipping duplicate-copy and corrupt blocks.

use std::fs;
use std::path::{Path, PathBuf};

use format_c64_tap_audio::{display_code, BlockKind, MergedBlock};

use crate::error::TapeRecoverError;

const UNTITLED: &str = "<untitled>";

/// Walk the merged, time-sorted block list and write one file per
/// extracted payload into `output_dir`, returning the paths written in
/// export order.
///
/// # Errors
/// Returns [`TapeRecoverError::Io`] if `output_dir` can't be created or
/// a file can't be written.
pub fn export(output_dir: &Path, blocks: &[MergedBlock]) -> Result<Vec<PathBuf>, TapeRecoverError> {
    fs::create_dir_all(output_dir)?;

    let mut latest_filename = UNTITLED.to_string();
    let mut seq_buffer = String::new();
    let mut last_copy0_hash: Option<u32> = None;
    let mut next_index: u32 = 0;
    let mut written = Vec::new();

    for merged in blocks {
        let block = &merged.block;

        if block.copy == 1 && last_copy0_hash == Some(block.content_hash) {
            continue;
        }
        if block.copy == 0 {
            last_copy0_hash = Some(block.content_hash);
        }
        if block.kind == BlockKind::Corrupt {
            continue;
        }

        match block.kind {
            BlockKind::Header => {
                if !seq_buffer.is_empty() {
                    written.push(write_export(
                        output_dir,
                        &mut next_index,
                        &latest_filename,
                        seq_buffer.as_bytes(),
                    )?);
                    seq_buffer.clear();
                }
                latest_filename = sanitize(display_code::decode(&block.payload[5..]).trim());
            }
            BlockKind::Seq => {
                seq_buffer.push_str(display_code::decode(&block.payload[5..]).trim());
            }
            BlockKind::Data => {
                if !seq_buffer.is_empty() {
                    written.push(write_export(
                        output_dir,
                        &mut next_index,
                        &latest_filename,
                        seq_buffer.as_bytes(),
                    )?);
                    seq_buffer.clear();
                    latest_filename = UNTITLED.to_string();
                }
                written.push(write_export(output_dir, &mut next_index, &latest_filename, &block.payload)?);
                latest_filename.push('_');
            }
            BlockKind::Corrupt => unreachable!("corrupt blocks are filtered out above"),
        }
    }

    if !seq_buffer.is_empty() {
        written.push(write_export(output_dir, &mut next_index, &latest_filename, seq_buffer.as_bytes())?);
    }

    Ok(written)
}

fn write_export(output_dir: &Path, index: &mut u32, name: &str, data: &[u8]) -> Result<PathBuf, TapeRecoverError> {
    let path = output_dir.join(format!("{:02}_{name}", *index));
    *index += 1;
    fs::write(&path, data)?;
    Ok(path)
}

fn sanitize(name: &str) -> String {
    name.replace('/', "\\")
}
