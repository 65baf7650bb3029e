//! Sample-rate conversion by bandlimited interpolation.
//!
//! Each output sample is the windowed-sinc reconstruction of the input
//! evaluated at output time `t`, which advances by `1 / Fsp` per sample. The
//! kernel is read from a precomputed
//! [`FilterTable`]: walking the table outward in steps of `L` visits
//! successive zero-crossings, and the difference table interpolates between
//! stored phases. Per-side tap count is bounded by the table length, so the
//! cost per output sample does not depend on the conversion ratio.

use std::num::NonZeroUsize;
use std::thread;

use crate::core::filter::FilterTable;
use crate::core::types::{try_alloc, ResampleParams, Sample};
use crate::error::ResampleError;

/// Smallest output span handed to a worker thread.
const MIN_FRAMES_PER_THREAD: usize = 16 * 1024;

/// Converts mono 16-bit signals between two sample rates.
#[derive(Debug, Clone)]
pub struct Resampler {
    params: ResampleParams,
    table: FilterTable,
}

impl Resampler {
    /// Creates a resampler with the standard 80 dB kernel.
    pub fn new(params: ResampleParams) -> Result<Self, ResampleError> {
        Ok(Self::with_table(params, FilterTable::new()?))
    }

    /// Creates a resampler around an already designed kernel.
    pub fn with_table(params: ResampleParams, table: FilterTable) -> Self {
        Self { params, table }
    }

    #[inline]
    pub fn params(&self) -> &ResampleParams {
        &self.params
    }

    #[inline]
    pub fn table(&self) -> &FilterTable {
        &self.table
    }

    /// Zero-padding frames on each side of the input.
    #[inline]
    pub fn padding(&self) -> usize {
        self.params.padding_for(self.table.zero_crossings())
    }

    /// Resamples a mono signal.
    pub fn process(&self, input: &[Sample]) -> Result<Vec<Sample>, ResampleError> {
        self.process_iter(input.len(), input.iter().copied())
    }

    /// Resamples `frames` samples drawn from `samples`.
    ///
    /// Lets callers feed one channel of an interleaved buffer without first
    /// copying it out. Missing samples read as silence; extra ones are
    /// ignored.
    pub fn process_iter<I>(&self, frames: usize, samples: I) -> Result<Vec<Sample>, ResampleError>
    where
        I: IntoIterator<Item = Sample>,
    {
        let out_len = self.params.output_len(frames);
        if out_len == 0 {
            return Ok(Vec::new());
        }
        let extra = self.padding();
        let padded = pad_input(frames, extra, samples)?;
        let mut output = try_alloc(out_len, 0 as Sample)?;

        let threads = self.worker_count(out_len);
        log::debug!(
            "resampling {} -> {} frames ({}), padding {}, {} worker(s)",
            frames,
            out_len,
            self.params,
            extra,
            threads
        );

        if threads <= 1 {
            self.render(&padded, extra, 0, &mut output);
        } else {
            let chunk_len = out_len.div_ceil(threads);
            let padded = padded.as_slice();
            thread::scope(|scope| {
                for (k, chunk) in output.chunks_mut(chunk_len).enumerate() {
                    scope.spawn(move || self.render(padded, extra, k * chunk_len, chunk));
                }
            });
        }

        Ok(output)
    }

    /// Seconds between consecutive output samples.
    #[inline]
    pub fn time_step(&self) -> f64 {
        1.0 / self.params.target_rate as f64
    }

    /// Output time of sample `j`.
    ///
    /// This is the running sum of `j` [`time_step`](Self::time_step)s, not
    /// `j / Fsp`: workers starting mid-signal replay the additions and land on
    /// the same rounded times as one sequential pass.
    pub fn time_at(&self, j: usize) -> f64 {
        let step = self.time_step();
        (0..j).fold(0.0, |t, _| t + step)
    }

    /// Fills `out` with output samples `first..first + out.len()`.
    fn render(&self, padded: &[Sample], extra: usize, first: usize, out: &mut [Sample]) {
        let overflow = self.params.overflow;
        let step = self.time_step();
        let mut t = self.time_at(first);
        for slot in out.iter_mut() {
            *slot = overflow.narrow(self.accumulate(padded, extra, t));
            t += step;
        }
    }

    /// Bandlimited interpolant of the padded input at output time `t`
    /// seconds, before narrowing.
    pub fn accumulate(&self, padded: &[Sample], extra: usize, t: f64) -> f64 {
        let Some(last) = padded.len().checked_sub(1) else {
            return 0.0;
        };
        let fs = self.params.source_rate as f64;
        let resolution = self.table.resolution();
        let table_len = self.table.len();

        let n = (t * fs) as usize;
        let xt = n as f64 / fs;
        let xtn = (n + 1) as f64 / fs;
        // eta may round a hair outside [0, 1]; the index casts saturate.
        let eta = 1.0 - (xtn - t) / (xtn - xt);
        let center = (n + extra).min(last);

        let mut acc = 0.0f64;

        // Causal side: x[n], x[n-1], ...
        let l = (eta * resolution as f64) as usize;
        let causal = padded[..=center].iter().rev();
        for (&x, idx) in causal.zip((l..table_len).step_by(resolution)) {
            acc += x as f64 * self.table.tap(idx, eta);
        }

        // Anticausal side: x[n+1], x[n+2], ...
        // Taps past the end of the buffer would only see padding zeros.
        let eta = 1.0 - eta;
        let l = (eta * resolution as f64) as usize;
        let anticausal = padded[center + 1..].iter();
        for (&x, idx) in anticausal.zip((l..table_len).step_by(resolution)) {
            acc += x as f64 * self.table.tap(idx, eta);
        }

        acc
    }

    fn worker_count(&self, out_len: usize) -> usize {
        let requested = match self.params.threads {
            0 => thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        };
        requested.min(out_len / MIN_FRAMES_PER_THREAD).max(1)
    }
}

/// Copies `frames` samples into a buffer with `extra` zeros on each side.
pub fn pad_input<I>(frames: usize, extra: usize, samples: I) -> Result<Vec<Sample>, ResampleError>
where
    I: IntoIterator<Item = Sample>,
{
    let len = frames
        .checked_add(extra.saturating_mul(2))
        .ok_or(ResampleError::Allocation { requested: usize::MAX })?;
    let mut padded = try_alloc(len, 0 as Sample)?;
    for (slot, s) in padded[extra..extra + frames].iter_mut().zip(samples) {
        *slot = s;
    }
    Ok(padded)
}
