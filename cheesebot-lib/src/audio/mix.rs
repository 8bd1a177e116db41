//! Additive mixer over a dynamic set of PCM byte sources.

use log::warn;
use std::io::Read;
use std::sync::Mutex;

use super::pcm;

/// Upper bound for the gain applied to any single source.
const MAX_SOURCE_GAIN: f64 = 0.5;

/// Byte source accepted by [`MixedStream`].
pub type PcmSource = Box<dyn Read + Send>;

/// Callback fired once when a source runs out of data.
pub type Completion = Box<dyn FnOnce() + Send>;

struct ActiveSource {
    source: PcmSource,
    on_complete: Option<Completion>,
}

/// Mix of every active source, read in fixed-size chunks.
///
/// Sources are pulled in insertion order. A source that returns fewer bytes
/// than requested is considered finished: it is zero-padded for this chunk,
/// dropped from the active list and its completion callback fires before
/// [`MixedStream::read`] returns.
#[derive(Default)]
pub struct MixedStream {
    sources: Mutex<Vec<ActiveSource>>,
}

impl MixedStream {
    /// Create a stream with no active sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source to the mix.
    ///
    /// # Arguments
    ///
    /// * `source` - Byte source, owned by the stream until it finishes.
    /// * `on_complete` - Optional callback fired when the source ends.
    pub fn add_source(&self, source: PcmSource, on_complete: Option<Completion>) -> &Self {
        self.sources.lock().unwrap().push(ActiveSource {
            source,
            on_complete,
        });
        self
    }

    /// Number of currently active sources.
    pub fn len(&self) -> usize {
        self.sources.lock().unwrap().len()
    }

    /// Return `true` when nothing is being mixed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce the next `size` bytes of mixed output.
    ///
    /// Each source contributes its chunk scaled by
    /// `min(0.5, 1 / active_count)`, where the count already excludes sources
    /// that finished earlier in this call, including the current one.
    pub fn read(&self, size: usize) -> Vec<u8> {
        let mut output = vec![0u8; size];
        let mut finished = Vec::new();

        {
            let mut sources = self.sources.lock().unwrap();
            let mut index = 0;
            while index < sources.len() {
                let mut chunk = read_chunk(&mut sources[index].source, size);

                if chunk.len() < size {
                    chunk.resize(size, 0);
                    let done = sources.remove(index);
                    if let Some(callback) = done.on_complete {
                        finished.push(callback);
                    }
                } else {
                    index += 1;
                }

                let gain = MAX_SOURCE_GAIN.min(1.0 / sources.len() as f64);
                pcm::scale(&mut chunk, gain);
                pcm::add(&mut output, &chunk);
            }
        }

        for callback in finished {
            callback();
        }

        output
    }
}

/// Pull up to `size` bytes, stopping early only at end of data.
fn read_chunk(source: &mut PcmSource, size: usize) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(size);
    if let Err(err) = source.by_ref().take(size as u64).read_to_end(&mut chunk) {
        warn!("dropping audio source after read error: {}", err);
        chunk.clear();
    }
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::looping::LoopingReader;
    use crate::audio::pcm::{from_samples, to_samples};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn source(samples: &[i16]) -> PcmSource {
        Box::new(Cursor::new(from_samples(samples)))
    }

    fn counter() -> (Arc<AtomicUsize>, Completion) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = count.clone();
        (
            count,
            Box::new(move || {
                hook.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn empty_stream_reads_silence() {
        let stream = MixedStream::new();
        assert_eq!(stream.read(16), vec![0u8; 16]);
        assert!(stream.is_empty());
    }

    #[test]
    fn single_source_is_halved() {
        let stream = MixedStream::new();
        stream.add_source(source(&[1000, -2000, 400, 8]), None);
        let out = stream.read(8);
        assert_eq!(to_samples(&out), vec![500, -1000, 200, 4]);
        assert_eq!(stream.len(), 1);
    }

    #[test]
    fn gain_follows_active_count() {
        let stream = MixedStream::new();
        stream
            .add_source(source(&[400, 400]), None)
            .add_source(source(&[800, 800]), None)
            .add_source(source(&[1200, 1200]), None)
            .add_source(source(&[1600, 1600]), None);
        // Extra data keeps every source active for this chunk.
        let out = stream.read(2);
        assert_eq!(to_samples(&out), vec![100 + 200 + 300 + 400]);
        assert_eq!(stream.len(), 4);
    }

    #[test]
    fn short_source_is_padded_removed_and_completed_once() {
        let stream = MixedStream::new();
        let (count, hook) = counter();
        stream.add_source(source(&[100, 200, 300, 400]), None);
        stream.add_source(source(&[1000]), Some(hook));

        let out = stream.read(4);
        // The background sees two sources, the finished clip sees one.
        assert_eq!(to_samples(&out), vec![50 + 500, 100]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(stream.len(), 1);

        let out = stream.read(4);
        assert_eq!(to_samples(&out), vec![150, 200]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn last_source_finishing_leaves_stream_empty() {
        let stream = MixedStream::new();
        let (count, hook) = counter();
        stream.add_source(source(&[64]), Some(hook));
        let out = stream.read(4);
        assert_eq!(to_samples(&out), vec![32, 0]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(stream.is_empty());
        assert_eq!(stream.read(4), vec![0u8; 4]);
    }

    #[test]
    fn completion_may_add_a_new_source() {
        let stream = Arc::new(MixedStream::new());
        let inner = stream.clone();
        stream.add_source(
            source(&[]),
            Some(Box::new(move || {
                inner.add_source(source(&[10, 10]), None);
            })),
        );
        assert_eq!(stream.read(4), vec![0u8; 4]);
        assert_eq!(to_samples(&stream.read(4)), vec![5, 5]);
    }

    #[test]
    fn background_outlives_injected_clip() {
        let background: Vec<i16> = (1..=50).map(|v| v * 4).collect();
        let clip: Vec<i16> = vec![200; 50];
        let stream = MixedStream::new();
        stream.add_source(
            Box::new(LoopingReader::with_capacity(
                64,
                Cursor::new(from_samples(&background)),
            )),
            None,
        );
        let (count, hook) = counter();
        stream.add_source(source(&clip), Some(hook));

        let mut bg_offset = 0;
        for frame in 0..15 {
            let out = to_samples(&stream.read(10));
            let expected: Vec<i16> = (0..5)
                .map(|i| {
                    let bg = background[(bg_offset + i) % background.len()] / 2;
                    if frame < 10 {
                        bg + 100
                    } else {
                        bg
                    }
                })
                .collect();
            assert_eq!(out, expected, "frame {}", frame);
            bg_offset += 5;

            let fired = count.load(Ordering::SeqCst);
            if frame < 10 {
                assert_eq!(fired, 0);
            } else {
                assert_eq!(fired, 1);
            }
        }
        assert_eq!(stream.len(), 1);
    }
}
