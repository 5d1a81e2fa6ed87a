use std::ops::{Deref, DerefMut};

use crossbeam::queue::ArrayQueue;

/// Bounded pool of byte buffers reused across pushes.
#[derive(Debug)]
pub struct BufferPool {
    buffers: ArrayQueue<Vec<u8>>,
}
impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        let buffers = ArrayQueue::new(capacity.max(1));
        Self { buffers }
    }

    /// The buffer is empty and goes back to the pool when the guard drops.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self.buffers.pop().unwrap_or_default();
        PooledBuffer { buf, pool: self }
    }
    pub fn available(&self) -> usize {
        self.buffers.len()
    }
}

#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
}
impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;
    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}
impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}
impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        // Dropped when the pool is full.
        let _ = self.pool.buffers.push(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_released_buffers() {
        let pool = BufferPool::new(2);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[0; 1024]);
        }
        assert_eq!(pool.available(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 1024);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn stays_bounded() {
        let pool = BufferPool::new(2);
        let guards: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        drop(guards);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn released_on_early_return() {
        fn fails(pool: &BufferPool) -> Result<(), ()> {
            let mut buf = pool.acquire();
            buf.push(1);
            Err(())
        }
        let pool = BufferPool::new(1);
        assert!(fails(&pool).is_err());
        assert_eq!(pool.available(), 1);
    }
}
