//! Per-controller request sequencing: the latest request issued wins.

/// Issues monotonically increasing sequence numbers and remembers the latest one.
///
/// A completion carrying a number other than `latest()` belongs to a request that
/// has since been superseded and must not be applied.
#[derive(Debug, Default, Clone)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next number. The first number issued is 1.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq != 0 && seq == self.latest
    }
}
