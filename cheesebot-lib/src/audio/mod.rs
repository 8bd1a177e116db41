//! Raw PCM streaming: looping background reader, mixer and output adapter.

pub mod looping;
pub mod mix;
pub mod pcm;
pub mod sink;

pub use looping::LoopingReader;
pub use mix::{Completion, MixedStream, PcmSource};
pub use sink::StreamSource;
