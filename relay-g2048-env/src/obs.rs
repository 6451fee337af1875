//! Observation packing.
//!
//! Each board is expanded over all eight symmetric views into three
//! tensors: one-hot planes of the raw exponents, windowed comparison
//! planes for convolution stacks, and a mask of invalid moves. The batch
//! carries them as flat buffers with a recorded batch size; converting to
//! device tensors is the agent's concern.
use crate::board::{Board, BOARD_SIZE, MAX_NUMBER, NUM_SYMMETRIES};
use relay_core::{Dir4, DiscreteAction};

/// Cells per board.
pub const CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Window size of the comparison planes.
pub const CONV_KERNEL_SIZE: usize = 3;

/// One-hot planes per symmetry in the raw tensor: one per exponent plus one
/// for empty cells.
pub const RAW_PLANES: usize = MAX_NUMBER + 1;

/// Window positions per symmetry in the comparison tensor.
pub const CONV_LEVELS: usize = MAX_NUMBER - CONV_KERNEL_SIZE + 1;

/// Channels per window position: the in-window one-hots plus empty,
/// below-window and above-window indicators.
pub const CONV_CHANNELS: usize = CONV_KERNEL_SIZE + 3;

/// Floats appended to the raw tensor per observation.
pub const RAW_STRIDE: usize = NUM_SYMMETRIES * RAW_PLANES * CELLS;

/// Floats appended to the comparison tensor per observation.
pub const CONV_STRIDE: usize = NUM_SYMMETRIES * CONV_LEVELS * CONV_CHANNELS * CELLS;

/// A packed batch of board observations.
///
/// Reused across batches: packing clears the buffers but keeps their
/// capacity.
#[derive(Clone, Debug, Default)]
pub struct G2048ObsBatch {
    /// One-hot exponent planes, `batch_size x RAW_STRIDE`.
    pub raw: Vec<f32>,

    /// Windowed comparison planes, `batch_size x CONV_STRIDE`.
    pub conv: Vec<f32>,

    /// Invalid-move mask, `batch_size x 4`, `1` marking an invalid move.
    pub invalid_mask: Vec<u8>,

    /// The number of observations in the batch.
    pub batch_size: usize,
}

/// Packs a range of boards into `out`.
pub fn pack<'a, I>(obs: I, out: &mut G2048ObsBatch)
where
    I: Iterator<Item = &'a Board>,
{
    out.raw.clear();
    out.conv.clear();
    out.invalid_mask.clear();
    out.batch_size = 0;
    for board in obs {
        write_raw(board, &mut out.raw);
        write_conv(board, &mut out.conv);
        write_invalid_mask(board, &mut out.invalid_mask);
        out.batch_size += 1;
    }
}

fn view_numbers(board: &Board, dir: usize) -> [usize; CELLS] {
    let mut numbers = [0; CELLS];
    for y in 0..BOARD_SIZE {
        for x in 0..BOARD_SIZE {
            numbers[y * BOARD_SIZE + x] = board.sym(dir, x, y) as usize;
        }
    }
    numbers
}

fn write_raw(board: &Board, dest: &mut Vec<f32>) {
    for dir in 0..NUM_SYMMETRIES {
        let numbers = view_numbers(board, dir);
        for n in 0..RAW_PLANES {
            for &number in &numbers {
                dest.push(if number == n { 1.0 } else { 0.0 });
            }
        }
    }
}

fn write_conv(board: &Board, dest: &mut Vec<f32>) {
    for dir in 0..NUM_SYMMETRIES {
        let numbers = view_numbers(board, dir);
        for n in 0..CONV_LEVELS {
            for ch in 0..CONV_KERNEL_SIZE {
                for &number in &numbers {
                    dest.push(if number == n + 1 + ch { 1.0 } else { 0.0 });
                }
            }
            for &number in &numbers {
                dest.push(if number == 0 { 1.0 } else { 0.0 });
            }
            for &number in &numbers {
                dest.push(if number < n + 1 && number != 0 { 1.0 } else { 0.0 });
            }
            for &number in &numbers {
                dest.push(if number >= n + 1 + CONV_KERNEL_SIZE {
                    1.0
                } else {
                    0.0
                });
            }
        }
    }
}

fn write_invalid_mask(board: &Board, dest: &mut Vec<u8>) {
    for id in 0..Dir4::NUM_ACTIONS {
        let action = Dir4::from_id(id);
        dest.push(if board.changes_under(action) { 0 } else { 1 });
    }
}
