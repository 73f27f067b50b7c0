//! Concurrent bounded queue: `push_back` blocks (or times
//! out) while full, `pop_front` blocks (or times out) while empty, plus
//! non-blocking inspection. `crossbeam_channel::bounded` already provides
//! exactly this push/pop/timeout/try contract, so [`BoundedQueue`] is a
//! thin named wrapper rather than a hand-rolled condvar queue — it is the
//! one component in the crate that takes an internal lock.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, TryRecvError, TrySendError};

use crate::error::{delay_write, end_of_file};
use crate::Result;

pub struct BoundedQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        BoundedQueue { tx, rx }
    }

    /// A cloneable producer/consumer handle sharing this queue's channel.
    pub fn handle(&self) -> Self {
        BoundedQueue {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }

    pub fn push_back(&self, value: T) {
        // An unbounded number of live handles means this can only fail if
        // every receiver has been dropped, which cannot happen while `self`
        // itself holds one.
        let _ = self.tx.send(value);
    }

    pub fn push_back_timeout(&self, value: T, timeout: Duration) -> Result<()> {
        match self.tx.send_timeout(value, timeout) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => Err(delay_write("push_back timed out")),
            Err(SendTimeoutError::Disconnected(_)) => {
                Err(delay_write("push_back: queue disconnected"))
            }
        }
    }

    pub fn try_push_back(&self, value: T) -> Result<()> {
        match self.tx.try_send(value) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(delay_write("queue is full")),
            Err(TrySendError::Disconnected(_)) => Err(delay_write("queue disconnected")),
        }
    }

    pub fn pop_front(&self) -> Result<T> {
        self.rx.recv().map_err(|_| end_of_file("queue closed"))
    }

    pub fn pop_front_timeout(&self, timeout: Duration) -> Result<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(v) => Ok(v),
            Err(RecvTimeoutError::Timeout) => Err(end_of_file("pop_front timed out")),
            Err(RecvTimeoutError::Disconnected) => Err(end_of_file("queue closed")),
        }
    }

    pub fn try_pop_front(&self) -> Result<Option<T>> {
        match self.rx.try_recv() {
            Ok(v) => Ok(Some(v)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(end_of_file("queue closed")),
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tx.is_full()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_push_pop_order() {
        let q = BoundedQueue::new(4);
        q.push_back(1);
        q.push_back(2);
        assert_eq!(q.pop_front().unwrap(), 1);
        assert_eq!(q.pop_front().unwrap(), 2);
    }

    #[test]
    fn test_try_push_full_errors() {
        let q = BoundedQueue::new(1);
        q.try_push_back(1).unwrap();
        assert!(q.try_push_back(2).is_err());
        assert!(q.is_full());
    }

    #[test]
    fn test_try_pop_empty_is_none() {
        let q: BoundedQueue<i32> = BoundedQueue::new(1);
        assert_eq!(q.try_pop_front().unwrap(), None);
    }

    #[test]
    fn test_pop_timeout_on_empty_queue() {
        let q: BoundedQueue<i32> = BoundedQueue::new(1);
        let err = q.pop_front_timeout(Duration::from_millis(10));
        assert!(err.is_err());
    }

    #[test]
    fn test_blocking_across_threads() {
        let q = BoundedQueue::new(1);
        let producer = q.handle();
        let handle = std::thread::spawn(move || {
            producer.push_back(7);
        });
        assert_eq!(q.pop_front().unwrap(), 7);
        handle.join().unwrap();
    }
}
