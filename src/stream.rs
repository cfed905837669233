//!
//! The seekable byte stream a [`Document`](crate::Document) works on.
//!

use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

///
/// A random access byte stream that an EBML document can be read from and written to.
///
/// Besides [`Read`], [`Write`] and [`Seek`], a stream must be able to shrink, which is only needed when elements are removed without leaving a Void placeholder behind.
///
pub trait Stream: Read + Write + Seek {
    ///
    /// Shortens the stream to `len` bytes.
    ///
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl Stream for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }
}

impl Stream for Cursor<Vec<u8>> {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Vec::truncate(self.get_mut(), len);
        Ok(())
    }
}

impl Stream for Cursor<&mut Vec<u8>> {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Vec::truncate(self.get_mut(), len);
        Ok(())
    }
}

impl<T: Stream + ?Sized> Stream for &mut T {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        (**self).truncate(len)
    }
}

pub(crate) fn stream_length<S: Seek>(stream: &mut S) -> io::Result<u64> {
    stream.seek(SeekFrom::End(0))
}

/// Reads up to `len` bytes at `position`.  Fewer bytes are returned if the stream ends first.
pub(crate) fn read_block<S: Read + Seek>(stream: &mut S, position: u64, len: u64) -> io::Result<Vec<u8>> {
    stream.seek(SeekFrom::Start(position))?;
    let mut block = Vec::new();
    stream.by_ref().take(len).read_to_end(&mut block)?;
    Ok(block)
}

pub(crate) fn write_block<S: Write + Seek>(stream: &mut S, position: u64, bytes: &[u8]) -> io::Result<()> {
    stream.seek(SeekFrom::Start(position))?;
    stream.write_all(bytes)
}

///
/// Moves everything from `at` to the end of the stream up by `len` bytes.
///
/// The bytes in `at..at + len` keep their old content and are expected to be overwritten by the caller.
///
pub(crate) fn insert_gap<S: Stream>(stream: &mut S, at: u64, len: u64, buffer_len: usize) -> io::Result<()> {
    let mut end = stream_length(stream)?;
    let chunk = buffer_len.max(1) as u64;

    // Copy back to front so no chunk overwrites bytes that still have to move.
    while end > at {
        let start = end.saturating_sub(chunk).max(at);
        let block = read_block(stream, start, end - start)?;
        write_block(stream, start + len, &block)?;
        end = start;
    }
    Ok(())
}

///
/// Cuts `at..at + len` out of the stream, moving the trailing bytes down and shortening the stream.
///
pub(crate) fn remove_range<S: Stream>(stream: &mut S, at: u64, len: u64, buffer_len: usize) -> io::Result<()> {
    let total = stream_length(stream)?;
    let chunk = buffer_len.max(1) as u64;

    let mut source = at + len;
    while source < total {
        let block = read_block(stream, source, chunk.min(total - source))?;
        if block.is_empty() {
            break;
        }
        write_block(stream, source - len, &block)?;
        source += block.len() as u64;
    }
    stream.truncate(total.saturating_sub(len))?;
    stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_moves_tail() {
        let mut cursor = Cursor::new(vec![1, 2, 3, 4, 5]);
        insert_gap(&mut cursor, 2, 3, 2).unwrap();
        assert_eq!(&[1, 2, 3, 4, 5, 3, 4, 5], &cursor.get_ref()[..]);
    }

    #[test]
    fn gap_at_end_is_noop() {
        let mut cursor = Cursor::new(vec![1, 2]);
        insert_gap(&mut cursor, 2, 4, 16).unwrap();
        assert_eq!(&[1, 2], &cursor.get_ref()[..]);
    }

    #[test]
    fn remove_range_shrinks() {
        let mut cursor = Cursor::new(vec![1, 2, 3, 4, 5, 6, 7]);
        remove_range(&mut cursor, 1, 2, 2).unwrap();
        assert_eq!(&[1, 4, 5, 6, 7], &cursor.get_ref()[..]);
    }

    #[test]
    fn short_read_at_end() {
        let mut cursor = Cursor::new(vec![1, 2, 3]);
        assert_eq!(vec![2, 3], read_block(&mut cursor, 1, 10).unwrap());
    }
}
