//! FIFO queues with batch-threshold signalling.
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Condvar, Mutex,
    },
};

/// Shared flag that ends every blocking wait in the server.
///
/// Waiters re-check the flag after every wake-up; setters must wake the
/// condition variables their waiters sleep on.
#[derive(Clone, Default)]
pub(crate) struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An unbounded FIFO with a condition variable for batch-size thresholds.
///
/// Producers push one element at a time and signal one consumer once the
/// queue reaches the consumer-side minimum. Consumers wait for the minimum,
/// drain up to a maximum, and re-signal one more consumer if the remainder
/// still meets the minimum. The maximum bounds the per-batch drain only;
/// the queue itself may grow under burst load.
pub(crate) struct SignalQueue<T> {
    deque: Mutex<VecDeque<T>>,
    cond: Condvar,
}

impl<T> SignalQueue<T> {
    pub fn new() -> Self {
        Self {
            deque: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
        }
    }

    /// Appends an element and returns the queue length after the push.
    pub fn push(&self, item: T) -> usize {
        let mut deque = self.deque.lock().unwrap();
        deque.push_back(item);
        deque.len()
    }

    /// Wakes one waiting consumer.
    pub fn notify_one(&self) {
        self.cond.notify_one();
    }

    /// Blocks until the queue holds at least `min` elements or `stop` is
    /// set, then drains up to `max` elements into `out` in FIFO order.
    ///
    /// Returns `false` if the wait ended because of `stop`. If the queue
    /// still holds `min` elements after the drain, one more consumer is
    /// signalled.
    pub fn pop_batch(&self, min: usize, max: usize, stop: &StopFlag, out: &mut Vec<T>) -> bool {
        let mut deque = self.deque.lock().unwrap();
        loop {
            if stop.is_set() {
                return false;
            }
            if deque.len() >= min {
                break;
            }
            deque = self.cond.wait(deque).unwrap();
        }
        while out.len() < max {
            match deque.pop_front() {
                Some(item) => out.push(item),
                None => break,
            }
        }
        let more = deque.len() >= min;
        drop(deque);
        if more {
            self.cond.notify_one();
        }
        true
    }

    /// Wakes every waiting consumer.
    ///
    /// Acquires the queue lock first, so a consumer that checked `stop`
    /// before this call is guaranteed to be inside the wait and receive the
    /// notification.
    pub fn wake_all(&self) {
        let _deque = self.deque.lock().unwrap();
        self.cond.notify_all();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.deque.lock().unwrap().len()
    }
}
