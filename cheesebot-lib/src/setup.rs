//! One-shot background music setup after the platform connects.

use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::audio::{LoopingReader, MixedStream};
use crate::constants::{DEFAULT_BLOCK_SIZE, LOOP_BUFFER_BLOCKS};
use crate::error::{BotError, Result};
use crate::platform::{Channel, ChannelKind, Session, StreamPlayer};

/// Background music running in a voice channel.
pub struct Playback {
    pub channel: Channel,
    pub stream: Arc<MixedStream>,
    pub player: Box<dyn StreamPlayer>,
}

/// First voice channel, across all groups, whose name contains `needle`.
pub fn find_voice_channel(session: &dyn Session, needle: &str) -> Option<Channel> {
    session.channel_groups().into_iter().find_map(|group| {
        group
            .channels
            .into_iter()
            .find(|channel| channel.kind == ChannelKind::Voice && channel.name.contains(needle))
    })
}

/// Preferred read size for `file`, falling back to [`DEFAULT_BLOCK_SIZE`].
pub fn block_size(file: &File) -> usize {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let Ok(meta) = file.metadata() {
            if meta.blksize() > 0 {
                return meta.blksize() as usize;
            }
        }
    }
    #[cfg(not(unix))]
    let _ = file;
    DEFAULT_BLOCK_SIZE
}

/// Join the configured voice channel and start looping `bgm` there.
///
/// Returns `Ok(None)` when no voice channel name contains `voice_channel`.
/// An unreadable or empty `bgm` file is an error.
pub fn setup_background(
    session: &mut dyn Session,
    voice_channel: &str,
    bgm: &Path,
) -> Result<Option<Playback>> {
    let Some(channel) = find_voice_channel(session, voice_channel) else {
        return Ok(None);
    };

    let mut sink = session.join_voice(&channel)?;
    let mut reader = open_bgm(bgm)?;

    // Prime the loop so an empty file fails here rather than in the audio thread.
    let mut head = [0u8; 2];
    reader.read_exact(&mut head).map_err(|source| BotError::Bgm {
        path: bgm.to_path_buf(),
        source,
    })?;
    reader.rewind().map_err(|source| BotError::Bgm {
        path: bgm.to_path_buf(),
        source,
    })?;

    let stream = Arc::new(MixedStream::new());
    stream.add_source(Box::new(reader), None);

    let mut player = sink.create_stream_player(stream.clone())?;
    player.start();

    Ok(Some(Playback {
        channel,
        stream,
        player,
    }))
}

fn open_bgm(bgm: &Path) -> Result<LoopingReader<File>> {
    let file = File::open(bgm).map_err(|source| BotError::Bgm {
        path: bgm.to_path_buf(),
        source,
    })?;
    let chunk = block_size(&file);
    debug!("looping {:?} with {} byte blocks", bgm, chunk);
    Ok(LoopingReader::with_capacity(chunk * LOOP_BUFFER_BLOCKS, file))
}
