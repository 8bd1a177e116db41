//! Infinite cyclic reader over a finite seekable source.

use std::io::{self, BufReader, Read, Seek, SeekFrom};

/// Reader that rewinds its source on exhaustion so it never ends.
///
/// Every call to [`Read::read`] fills the whole buffer, splicing the end of
/// the source directly onto its start with no gap.
pub struct LoopingReader<R> {
    inner: BufReader<R>,
}

impl<R: Read + Seek> LoopingReader<R> {
    /// Wrap `inner` with a read buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner: BufReader::with_capacity(capacity.max(1), inner),
        }
    }

    /// Seek the wrapped source back to its start.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(0)).map(|_| ())
    }
}

impl<R: Read + Seek> Read for LoopingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        let mut rewound = false;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    // Nothing between two rewinds means the source is empty.
                    if rewound {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "looped source yields no data",
                        ));
                    }
                    self.rewind()?;
                    rewound = true;
                }
                Ok(read) => {
                    filled += read;
                    rewound = false;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(filled)
    }
}
