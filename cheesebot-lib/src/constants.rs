//! Shared constants for playback, scheduling and storage defaults.

/// Sample rate of every PCM stream handled by the bot (Hz).
pub const SAMPLE_RATE: u32 = 48_000;

/// Interleaved channel count of every PCM stream.
pub const CHANNELS: u16 = 2;

/// Bytes per sample for signed 16-bit PCM.
pub const SAMPLE_WIDTH: usize = 2;

/// Size of one 20 ms output frame in bytes.
pub const FRAME_BYTES: usize = (SAMPLE_RATE as usize / 50) * CHANNELS as usize * SAMPLE_WIDTH;

/// Read chunk size used when the filesystem does not report a block size.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Multiple of the block size used for the looping background buffer.
pub const LOOP_BUFFER_BLOCKS: usize = 1000;

/// Lower bound of the delay between two sound effects (seconds).
pub const SE_MIN_DELAY_SECS: u64 = 10;

/// Upper bound of the delay between two sound effects (seconds).
pub const SE_MAX_DELAY_SECS: u64 = 60;

/// Extension pattern of sound-effect clips inside the effects directory.
pub const SE_PATTERN: &str = "*.raw";

/// Number of buffered writes before the document store flushes to disk.
pub const WRITE_CACHE_SIZE: usize = 1000;
