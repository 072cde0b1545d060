use std::{collections::VecDeque, fmt};

use log::debug;

pub type FrameNumber = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePoolError {
    /// No frame left in the free pool
    Exhausted,
    /// The frame is not in the used pool
    NotFound(FrameNumber),
    /// The frame was handed to the pool twice
    Duplicate(FrameNumber),
}

impl fmt::Display for FramePoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramePoolError::Exhausted => write!(f, "free frame pool is exhausted"),
            FramePoolError::NotFound(frame) => write!(f, "frame {:#05X} is not in use", frame),
            FramePoolError::Duplicate(frame) => {
                write!(f, "frame {:#05X} was given to the pool twice", frame)
            }
        }
    }
}

impl std::error::Error for FramePoolError {}

/// Selects one of the two halves of a [`FramePool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Free,
    Used,
}

/// The physical frames owned by one process.
///
/// Every frame lives in exactly one of `free` or `used`. Frames are never
/// created or destroyed after construction, only moved between the two.
/// Both halves keep insertion order and removal never reorders the
/// remaining frames, so iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct FramePool {
    free: VecDeque<FrameNumber>,
    used: VecDeque<FrameNumber>,
}

impl FramePool {
    pub fn new<I>(frames: I) -> Result<Self, FramePoolError>
    where
        I: IntoIterator<Item = FrameNumber>,
    {
        let mut free = VecDeque::new();
        for frame in frames {
            if free.contains(&frame) {
                return Err(FramePoolError::Duplicate(frame));
            }
            free.push_back(frame);
        }
        debug!("Frame pool created with {} free frames", free.len());
        Ok(Self {
            free,
            used: VecDeque::new(),
        })
    }

    /// Pool with the frames `0..count` all free
    pub fn with_frames(count: u32) -> Self {
        Self {
            free: (0..count).collect(),
            used: VecDeque::new(),
        }
    }

    /// Move the oldest free frame into the used pool and hand it out
    pub fn allocate_free(&mut self) -> Result<FrameNumber, FramePoolError> {
        let frame = self.free.pop_front().ok_or(FramePoolError::Exhausted)?;
        self.used.push_back(frame);
        debug!("Allocated frame {:#05X}", frame);
        Ok(frame)
    }

    /// Move `frame` from the used pool back to the free pool
    pub fn release(&mut self, frame: FrameNumber) -> Result<(), FramePoolError> {
        let pos = self
            .used
            .iter()
            .position(|&f| f == frame)
            .ok_or(FramePoolError::NotFound(frame))?;
        self.used.remove(pos);
        self.free.push_back(frame);
        debug!("Released frame {:#05X}", frame);
        Ok(())
    }

    pub fn contains(&self, pool: Pool, frame: FrameNumber) -> bool {
        self.pool(pool).contains(&frame)
    }

    pub fn len(&self, pool: Pool) -> usize {
        self.pool(pool).len()
    }

    pub fn is_empty(&self, pool: Pool) -> bool {
        self.pool(pool).is_empty()
    }

    pub fn iter(&self, pool: Pool) -> impl Iterator<Item = FrameNumber> + '_ {
        self.pool(pool).iter().copied()
    }

    /// Number of frames owned, free or used
    pub fn total(&self) -> usize {
        self.free.len() + self.used.len()
    }

    /// True when no frame appears twice across both pools
    pub fn is_partitioned(&self) -> bool {
        let mut seen: Vec<FrameNumber> =
            self.free.iter().chain(self.used.iter()).copied().collect();
        seen.sort_unstable();
        seen.windows(2).all(|w| w[0] != w[1])
    }

    fn pool(&self, pool: Pool) -> &VecDeque<FrameNumber> {
        match pool {
            Pool::Free => &self.free,
            Pool::Used => &self.used,
        }
    }
}
