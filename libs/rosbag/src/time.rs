/// ROS 1 `time`: unsigned seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    pub sec: u32,
    pub nsec: u32,
}

impl Time {
    pub const fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Split a nanosecond count. Seconds past `u32::MAX` saturate.
    pub fn from_nsec(nsec: u64) -> Self {
        let sec = (nsec / 1_000_000_000).min(u64::from(u32::MAX)) as u32;
        Self {
            sec,
            nsec: (nsec % 1_000_000_000) as u32,
        }
    }

    pub fn to_nsec(self) -> u64 {
        u64::from(self.sec) * 1_000_000_000 + u64::from(self.nsec)
    }

    /// On-disk layout: `sec: u32 LE` followed by `nsec: u32 LE`.
    pub(crate) fn from_le_bytes(b: [u8; 8]) -> Self {
        Self {
            sec: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            nsec: u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
        }
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub(crate) fn to_le_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..4].copy_from_slice(&self.sec.to_le_bytes());
        out[4..].copy_from_slice(&self.nsec.to_le_bytes());
        out
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:09}", self.sec, self.nsec)
    }
}
