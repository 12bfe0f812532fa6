//! Fixed-capacity ring buffers
//!
//! [`RingBuffer`] is the generic container (also backing bounded loudness
//! histories). [`CircularEnergyBuffer`] layers a running sum on top of it so
//! sliding-window mean-square energy costs O(1) per sample.

use crate::constants::ENERGY_FLOOR;

/// Fixed-capacity FIFO that overwrites its oldest element once full
///
/// Storage is allocated once at construction; `push` never allocates.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` elements
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Insert at the tail, overwriting the oldest element when full
    ///
    /// A zero-capacity buffer silently discards everything.
    pub fn push(&mut self, item: T) {
        if self.slots.is_empty() {
            return;
        }

        self.slots[self.tail] = item;

        if self.is_full() {
            self.head = (self.head + 1) % self.slots.len();
        } else {
            self.len += 1;
        }

        self.tail = (self.tail + 1) % self.slots.len();
    }

    /// Push `item` and return the element it displaced
    ///
    /// Returns `None` while the buffer is still filling.
    pub fn evict(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() { self.peek() } else { None };
        self.push(item);
        evicted
    }

    /// Oldest element, without removing it
    pub fn peek(&self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            Some(self.slots[self.head])
        }
    }

    /// Element `index` positions after the oldest
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        Some(self.slots[(self.head + index) % self.slots.len()])
    }

    /// Remove and return the oldest element
    pub fn pop(&mut self) -> Option<T> {
        let item = self.peek()?;
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        Some(item)
    }

    /// Iterate oldest-first over the valid elements
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let capacity = self.slots.len();
        (0..self.len).map(move |i| self.slots[(self.head + i) % capacity])
    }

    /// Drop all elements, keeping the allocation
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Sliding window of per-sample energies with a running sum
///
/// The sum is maintained by delta update on every push (add the new value,
/// subtract the evicted one) and always equals the sum of the valid
/// elements, up to floating-point rounding.
///
/// Values above [`ENERGY_FLOOR`] and values at or below it are summed
/// separately, each with a count of the non-zero entries it holds. An
/// accumulator whose count drops to zero is set to exactly 0.0, so rounding
/// residue left by a loud passage cannot outlive it, even while a filter
/// tail of sub-floor energies is still draining out of the window.
#[derive(Debug, Clone)]
pub struct CircularEnergyBuffer {
    window: RingBuffer<f64>,
    loud: Accumulator,
    faint: Accumulator,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    nonzero: usize,
}

impl Accumulator {
    #[inline]
    fn add(&mut self, value: f64) {
        if value != 0.0 {
            self.nonzero += 1;
            self.sum += value;
        }
    }

    #[inline]
    fn remove(&mut self, value: f64) {
        if value != 0.0 {
            self.nonzero -= 1;
            self.sum = if self.nonzero == 0 { 0.0 } else { self.sum - value };
        }
    }
}

impl CircularEnergyBuffer {
    /// Create a window spanning `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            window: RingBuffer::new(capacity),
            loud: Accumulator::default(),
            faint: Accumulator::default(),
        }
    }

    /// Create a window of `round(sample_rate * window_sec)` samples
    pub fn with_duration(sample_rate: f64, window_sec: f64) -> Self {
        Self::new((sample_rate * window_sec).round() as usize)
    }

    /// Append one energy value, sliding the window once full
    pub fn push(&mut self, energy: f64) {
        self.evict(energy);
    }

    /// Append one energy value and return the value that left the window
    pub fn evict(&mut self, energy: f64) -> Option<f64> {
        if self.window.capacity() == 0 {
            return None;
        }

        let evicted = self.window.evict(energy);
        self.accumulator(energy).add(energy);
        if let Some(old) = evicted {
            self.accumulator(old).remove(old);
        }
        evicted
    }

    #[inline]
    fn accumulator(&mut self, energy: f64) -> &mut Accumulator {
        if energy > ENERGY_FLOOR {
            &mut self.loud
        } else {
            &mut self.faint
        }
    }

    /// Oldest energy value in the window
    pub fn peek(&self) -> Option<f64> {
        self.window.peek()
    }

    /// Running sum of the valid elements
    pub fn sum(&self) -> f64 {
        self.loud.sum + self.faint.sum
    }

    /// Mean energy over the full window
    ///
    /// Only meaningful once [`is_full`](Self::is_full) holds; before that the
    /// missing samples count as zero.
    pub fn mean(&self) -> f64 {
        if self.window.capacity() == 0 {
            0.0
        } else {
            self.sum() / self.window.capacity() as f64
        }
    }

    /// Iterate oldest-first over the window contents
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter()
    }

    pub fn clear(&mut self) {
        self.window.clear();
        self.loud = Accumulator::default();
        self.faint = Accumulator::default();
    }

    pub fn is_full(&self) -> bool {
        self.window.capacity() > 0 && self.window.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }
}
