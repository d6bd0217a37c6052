//! Logical clock driving deadlines, accrual and vesting.

use serde::{Deserialize, Serialize};

/// Block height and timestamp supplied by the host.
///
/// Reward accrual and vesting count blocks; deadlines and price
/// accumulators use the timestamp.  Neither ever moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockClock {
    number: u64,
    timestamp: u64,
}

impl BlockClock {
    /// Creates a clock at the given height and time.
    #[must_use]
    pub const fn new(number: u64, timestamp: u64) -> Self {
        Self { number, timestamp }
    }

    /// Current block height.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Current block timestamp in seconds.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Timestamp truncated to 32 bits, as stored by price accumulators.
    #[must_use]
    pub const fn timestamp_u32(&self) -> u32 {
        (self.timestamp % (1u64 << 32)) as u32
    }

    /// Advances by `blocks` blocks and `seconds` seconds.
    pub fn advance(&mut self, blocks: u64, seconds: u64) {
        self.number = self.number.saturating_add(blocks);
        self.timestamp = self.timestamp.saturating_add(seconds);
    }
}
