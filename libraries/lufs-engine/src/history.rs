//! Block-loudness histories feeding the gated aggregations

use crate::buffer::RingBuffer;

#[derive(Debug, Clone)]
enum Storage {
    /// Keeps the most recent `capacity` entries
    Bounded(RingBuffer<f64>),
    /// Append-only
    Unbounded(Vec<f64>),
}

/// Ordered sequence of block-loudness values with a generation counter
///
/// The generation increments on every append, so a consumer can tell whether
/// the history changed since it last looked by comparing two integers.
#[derive(Debug, Clone)]
pub struct LoudnessHistory {
    storage: Storage,
    generation: u64,
}

impl LoudnessHistory {
    /// History that retains at most `capacity` entries
    pub fn bounded(capacity: usize) -> Self {
        Self {
            storage: Storage::Bounded(RingBuffer::new(capacity)),
            generation: 0,
        }
    }

    /// History that grows without limit
    pub fn unbounded() -> Self {
        Self {
            storage: Storage::Unbounded(Vec::new()),
            generation: 0,
        }
    }

    /// Bounded history sized for `duration_sec` of entries spaced `hop_sec` apart
    ///
    /// Falls back to an unbounded history when no duration is known.
    pub fn for_duration(duration_sec: Option<f64>, hop_sec: f64) -> Self {
        match duration_sec {
            Some(duration) if duration > 0.0 => {
                Self::bounded((duration / hop_sec).ceil() as usize)
            }
            _ => Self::unbounded(),
        }
    }

    /// Append one block loudness
    pub fn push(&mut self, loudness: f64) {
        match &mut self.storage {
            Storage::Bounded(ring) => ring.push(loudness),
            Storage::Unbounded(values) => values.push(loudness),
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Oldest-first iterator over the retained entries
    pub fn iter(&self) -> HistoryIter<'_> {
        match &self.storage {
            Storage::Bounded(ring) => HistoryIter::Bounded {
                ring,
                position: 0,
            },
            Storage::Unbounded(values) => HistoryIter::Unbounded(values.iter()),
        }
    }

    /// Number of appends since construction or the last [`clear`](Self::clear)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Bounded(ring) => ring.len(),
            Storage::Unbounded(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self.storage, Storage::Bounded(_))
    }

    /// Drop all entries, keeping the allocation
    pub fn clear(&mut self) {
        match &mut self.storage {
            Storage::Bounded(ring) => ring.clear(),
            Storage::Unbounded(values) => values.clear(),
        }
        self.generation = 0;
    }
}

/// Cloneable iterator over a [`LoudnessHistory`]
#[derive(Debug, Clone)]
pub enum HistoryIter<'a> {
    Bounded {
        ring: &'a RingBuffer<f64>,
        position: usize,
    },
    Unbounded(std::slice::Iter<'a, f64>),
}

impl Iterator for HistoryIter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        match self {
            Self::Bounded { ring, position } => {
                let value = ring.get(*position)?;
                *position += 1;
                Some(value)
            }
            Self::Unbounded(values) => values.next().copied(),
        }
    }
}
