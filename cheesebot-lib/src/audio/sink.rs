//! `rodio` adapter that pulls frames from a shared [`MixedStream`].

use rodio::source::SeekError;
use rodio::Source;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{CHANNELS, FRAME_BYTES, SAMPLE_RATE};

use super::mix::MixedStream;
use super::pcm;

/// Infinite `rodio` source backed by a [`MixedStream`].
///
/// Each time the local queue drains, one output frame is mixed and decoded
/// to `f32` samples.
pub struct StreamSource {
    stream: Arc<MixedStream>,
    frame_bytes: usize,
    queue: VecDeque<f32>,
}

impl StreamSource {
    /// Pull 20 ms frames from `stream`.
    pub fn new(stream: Arc<MixedStream>) -> Self {
        Self::with_frame_bytes(stream, FRAME_BYTES)
    }

    /// Pull frames of `frame_bytes` bytes from `stream`.
    pub fn with_frame_bytes(stream: Arc<MixedStream>, frame_bytes: usize) -> Self {
        Self {
            stream,
            frame_bytes: frame_bytes.max(2),
            queue: VecDeque::new(),
        }
    }

    fn refill(&mut self) {
        let frame = self.stream.read(self.frame_bytes);
        self.queue.extend(pcm::to_f32(&frame));
    }
}

impl Iterator for StreamSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.queue.is_empty() {
            self.refill();
        }
        self.queue.pop_front()
    }
}

impl Source for StreamSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        CHANNELS
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }

    fn try_seek(&mut self, _pos: Duration) -> Result<(), SeekError> {
        Err(SeekError::NotSupported {
            underlying_source: "StreamSource",
        })
    }
}
