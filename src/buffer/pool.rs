//! Thread-local buffer pool for bounded-size block reads.

use std::cell::RefCell;
use std::io::{self, Read};
use std::ops::{Deref, DerefMut};

/// Default read block size.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024; // 64 KiB

/// Maximum number of buffers to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// A reusable, zero-initialized read block of a fixed length.
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Takes a buffer of `len` bytes from the thread-local pool or creates one.
    pub fn take(len: usize) -> Self {
        let mut data = THREAD_BUFFER_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_default();
        data.clear();
        data.resize(len, 0);
        Self { data }
    }

    /// Reads into the block, retrying on interruption.
    ///
    /// Returns the number of bytes read; 0 means end of stream.
    pub fn fill_from<R: Read>(&mut self, reader: &mut R, limit: usize) -> io::Result<usize> {
        let limit = limit.min(self.data.len());
        loop {
            match reader.read(&mut self.data[..limit]) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        // Return the buffer to the pool if it's not too large
        if self.data.capacity() <= DEFAULT_BUFFER_SIZE * 2 {
            self.data.clear();
            THREAD_BUFFER_POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(std::mem::take(&mut self.data));
                }
            });
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::take(DEFAULT_BUFFER_SIZE)
    }
}

// Thread-local buffer pool
thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_buffer_take() {
        let buf = Buffer::take(1024);
        assert_eq!(buf.len(), 1024);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fill_from_respects_limit() {
        let mut buf = Buffer::take(16);
        let mut reader = Cursor::new(vec![7u8; 100]);
        let n = buf.fill_from(&mut reader, 4).unwrap();
        assert_eq!(n, 4);
        assert_eq!(&buf[..4], &[7, 7, 7, 7]);
    }

    #[test]
    fn test_buffer_reuse_is_zeroed() {
        {
            let mut buf = Buffer::take(8);
            buf.copy_from_slice(b"testdata");
        }

        // The buffer comes back from the pool without stale bytes
        let buf2 = Buffer::take(8);
        assert!(buf2.iter().all(|&b| b == 0));
    }
}
