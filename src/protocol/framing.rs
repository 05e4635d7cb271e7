//! Length-prefixed camera frame stream
//!
//! One frame per logical unit on the wire:
//!
//! ```text
//! ┌──────────────────┬────────────────────────┐
//! │ Length (4 bytes) │ Payload (length bytes) │
//! │ Big-endian u32   │ compressed image       │
//! └──────────────────┴────────────────────────┘
//! ```
//!
//! The reader never delivers a truncated frame: short reads are retried
//! until the accumulated payload equals the declared length. A clean close
//! at a frame boundary ends the stream (the normal camera shutdown path);
//! a close mid-frame is an error. There is no frame skipping and no
//! back-pressure - a slow consumer stalls the producer's socket buffer.

use crate::error::{Error, Result};
use std::io::{Read, Write};

/// Sanity cap on a declared frame length
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Writer side of the camera channel
pub struct FrameWriter<W: Write> {
    inner: W,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Transmit one frame: 4-byte big-endian length, then the payload
    pub fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() > MAX_FRAME_LEN {
            return Err(Error::FrameTooLarge(frame.len()));
        }
        self.inner.write_all(&(frame.len() as u32).to_be_bytes())?;
        self.inner.write_all(frame)?;
        self.inner.flush()?;
        Ok(())
    }
}

/// Reader side of the camera channel
pub struct FrameReader<R: Read> {
    inner: R,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Receive the next complete frame, or `None` on orderly stream end
    pub fn recv_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let mut len_buf = [0u8; 4];
        match read_full(&mut self.inner, &mut len_buf)? {
            0 => return Ok(None),
            4 => {}
            n => {
                return Err(Error::Other(format!(
                    "Stream closed mid length prefix ({n}/4 bytes)"
                )))
            }
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_LEN {
            return Err(Error::FrameTooLarge(len));
        }

        let mut frame = vec![0u8; len];
        self.inner.read_exact(&mut frame)?;
        Ok(Some(frame))
    }
}

/// Fill `buf`, looping on short reads; returns the bytes actually read
/// (less than `buf.len()` only when the stream ends first)
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader returning at most `chunk` bytes per call, exercising the
    /// short-read retry path
    struct ChunkedReader {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
    }

    impl ChunkedReader {
        fn new(data: Vec<u8>, chunk: usize) -> Self {
            Self {
                data,
                pos: 0,
                chunk,
            }
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let remaining = self.data.len() - self.pos;
            let n = remaining.min(self.chunk).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn frame_bytes(payload: &[u8]) -> Vec<u8> {
        let mut wire = Vec::new();
        let mut writer = FrameWriter::new(&mut wire);
        writer.send_frame(payload).unwrap();
        wire
    }

    #[test]
    fn test_writer_wire_format() {
        let wire = frame_bytes(b"abc");
        assert_eq!(wire, vec![0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_stream_end_on_empty_input() {
        let mut reader = FrameReader::new(Cursor::new(Vec::new()));
        assert!(reader.recv_frame().unwrap().is_none());
    }

    #[test]
    fn test_reassembly_across_partial_reads() {
        for (len, chunk) in [(1usize, 1usize), (4096, 7), (10_000_000, 65_536)] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let mut reader = FrameReader::new(ChunkedReader::new(frame_bytes(&payload), chunk));
            let frame = reader.recv_frame().unwrap().unwrap();
            assert_eq!(frame, payload);
            assert!(reader.recv_frame().unwrap().is_none());
        }
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut wire = frame_bytes(b"first");
        wire.extend_from_slice(&frame_bytes(b"second"));
        let mut reader = FrameReader::new(ChunkedReader::new(wire, 3));
        assert_eq!(reader.recv_frame().unwrap().unwrap(), b"first");
        assert_eq!(reader.recv_frame().unwrap().unwrap(), b"second");
        assert!(reader.recv_frame().unwrap().is_none());
    }

    #[test]
    fn test_truncated_payload_is_error() {
        let mut wire = frame_bytes(b"hello");
        wire.truncate(wire.len() - 2);
        let mut reader = FrameReader::new(Cursor::new(wire));
        assert!(reader.recv_frame().is_err());
    }

    #[test]
    fn test_truncated_length_prefix_is_error() {
        let mut reader = FrameReader::new(Cursor::new(vec![0, 0]));
        assert!(reader.recv_frame().is_err());
    }

    #[test]
    fn test_oversized_length_rejected() {
        let wire = ((MAX_FRAME_LEN + 1) as u32).to_be_bytes().to_vec();
        let mut reader = FrameReader::new(Cursor::new(wire));
        assert!(matches!(
            reader.recv_frame(),
            Err(Error::FrameTooLarge(_))
        ));
    }
}
