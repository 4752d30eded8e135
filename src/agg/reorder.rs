//! Kernel weight reordering for the matrix-multiply aggregator
//!
//! Raw weights arrive `[out_ch][kernel_h][kernel_w][in_ch]`, row-major. The
//! accumulation unit wants them blocked: output channels grouped one
//! accumulation period at a time, each channel's row padded to whole vector
//! loads, and the loads interleaved chunk-major with channels in reverse
//! order inside a block. `final_load_offsets` records, per output channel,
//! where its last vector load begins; that table is both the kernel's load
//! schedule and enough to invert the layout.

use crate::vpu::{ACC_PERIOD, EPV};

/// Kernel weights in the blocked accelerator layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conv2dReorderedWeights {
    /// Reordered weight bytes
    pub weights: Vec<i8>,
    /// Per-output-channel byte offset of the channel's final vector load
    pub final_load_offsets: Vec<usize>,
}

/// Vector loads needed to cover one channel's weight row.
#[inline]
pub(crate) fn chunks_per_channel(bytes_per_channel: usize) -> usize {
    bytes_per_channel.div_ceil(EPV)
}

/// Bytes of one reordered channel-group block.
#[inline]
pub(crate) fn block_bytes(bytes_per_channel: usize) -> usize {
    chunks_per_channel(bytes_per_channel) * ACC_PERIOD * EPV
}

/// Byte offset of weight byte `byte` of channel `ch` in the reordered blob.
#[inline]
pub(crate) fn weight_offset(bytes_per_channel: usize, ch: usize, byte: usize) -> usize {
    let group = ch / ACC_PERIOD;
    let pos = ACC_PERIOD - 1 - ch % ACC_PERIOD;
    let chunk = byte / EPV;
    group * block_bytes(bytes_per_channel) + (chunk * ACC_PERIOD + pos) * EPV + byte % EPV
}

impl Conv2dReorderedWeights {
    /// De-reorder one output channel's weight row through the load-offset
    /// table.
    pub fn channel_weights(&self, ch: usize, bytes_per_kernel_channel: usize) -> Vec<i8> {
        let n_chunks = chunks_per_channel(bytes_per_kernel_channel);
        let last = self.final_load_offsets[ch];
        let mut row = Vec::with_capacity(n_chunks * EPV);
        for chunk in 0..n_chunks {
            let start = last - (n_chunks - 1 - chunk) * ACC_PERIOD * EPV;
            row.extend_from_slice(&self.weights[start..start + EPV]);
        }
        row.truncate(bytes_per_kernel_channel);
        row
    }
}

/// Reorder a raw weight tensor into the blocked layout.
///
/// `shape` is `[out_ch, kernel_h, kernel_w, in_ch]`; `bits_per_element`
/// supports sub-byte weights (a channel's row is then
/// `kernel_h * kernel_w * in_ch * bits_per_element / 8` bytes). When the
/// declared output channel count exceeds the channels present in `raw`, the
/// missing rows are filled with `pad_value` - a documented edge case, not a
/// silent truncation. Padding bytes past a row's end also take `pad_value`.
pub fn reorder_kernel_weights(
    raw: &[i8],
    shape: [usize; 4],
    bits_per_element: usize,
    pad_value: i8,
) -> Conv2dReorderedWeights {
    let out_channels = shape[0];
    let bytes_per_channel = shape[1] * shape[2] * shape[3] * bits_per_element / 8;
    if bytes_per_channel == 0 {
        return Conv2dReorderedWeights {
            weights: Vec::new(),
            final_load_offsets: vec![0; out_channels],
        };
    }
    let raw_channels = raw.len() / bytes_per_channel;

    let groups = out_channels.div_ceil(ACC_PERIOD);
    let n_chunks = chunks_per_channel(bytes_per_channel);
    let mut weights = vec![pad_value; groups * block_bytes(bytes_per_channel)];

    for ch in 0..raw_channels.min(out_channels) {
        let row = &raw[ch * bytes_per_channel..(ch + 1) * bytes_per_channel];
        for (byte, &w) in row.iter().enumerate() {
            weights[weight_offset(bytes_per_channel, ch, byte)] = w;
        }
    }

    let final_load_offsets = (0..out_channels)
        .map(|ch| weight_offset(bytes_per_channel, ch, (n_chunks - 1) * EPV))
        .collect();

    Conv2dReorderedWeights {
        weights,
        final_load_offsets,
    }
}
