/// Per-channel outbound sequence counters.
///
/// Each channel id owns an independent counter in `0..=255` that wraps back
/// to zero. Counter state lives for the life of the engine.
#[derive(Debug, Clone)]
pub struct SequenceCounters {
    next: [u8; 256],
}

impl SequenceCounters {
    pub fn new() -> Self {
        Self { next: [0; 256] }
    }

    /// Consume and return the next sequence number for `channel_id`.
    pub fn next(&mut self, channel_id: u8) -> u8 {
        let seq = self.next[channel_id as usize];
        self.next[channel_id as usize] = seq.wrapping_add(1);
        seq
    }

    /// Peek at the value the next call for `channel_id` would return.
    pub fn peek(&self, channel_id: u8) -> u8 {
        self.next[channel_id as usize]
    }
}

impl Default for SequenceCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up_and_wraps_after_255() {
        let mut counters = SequenceCounters::new();
        for expected in 0..=255u8 {
            assert_eq!(counters.next(11), expected);
        }
        assert_eq!(counters.next(11), 0);
    }

    #[test]
    fn channels_are_independent() {
        let mut counters = SequenceCounters::new();
        assert_eq!(counters.next(11), 0);
        assert_eq!(counters.next(11), 1);
        assert_eq!(counters.next(12), 0);
        assert_eq!(counters.next(11), 2);
        assert_eq!(counters.next(12), 1);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut counters = SequenceCounters::new();
        assert_eq!(counters.peek(7), 0);
        assert_eq!(counters.next(7), 0);
        assert_eq!(counters.peek(7), 1);
    }
}
