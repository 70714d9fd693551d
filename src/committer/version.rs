use std::fmt;

/// Version is a position in the mutation log: "the next record to be written is `record_id`
/// within changelog segment `segment_id`". Ordered by segment first, then record.
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub segment_id: u32,
    pub record_id: u32,
}

impl Version {
    pub fn new(segment_id: u32, record_id: u32) -> Self {
        Version { segment_id, record_id }
    }

    /// Version `count` records further into the same segment.
    pub fn advance(&self, count: usize) -> Version {
        Version::new(self.segment_id, self.record_id + count as u32)
    }

    /// First version of the next segment.
    pub fn rotate(&self) -> Version {
        Version::new(self.segment_id + 1, 0)
    }

    /// Wire representation: `(segment_id << 32) | record_id`. Keeps the version order.
    pub fn to_revision(&self) -> u64 {
        (u64::from(self.segment_id) << 32) | u64::from(self.record_id)
    }

    pub fn from_revision(revision: u64) -> Self {
        Version::new((revision >> 32) as u32, (revision & 0xFFFF_FFFF) as u32)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment_id, self.record_id)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment_id, self.record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_compares_segment_before_record() {
        assert!(Version::new(0, 100) < Version::new(1, 0));
        assert!(Version::new(1, 0) < Version::new(1, 1));
        assert_eq!(Version::new(3, 7), Version::new(3, 7));
        assert!(Version::new(2, 0) > Version::new(1, u32::MAX));
    }

    #[test]
    fn advance_and_rotate() {
        let v = Version::new(5, 10);
        assert_eq!(v.advance(0), v);
        assert_eq!(v.advance(3), Version::new(5, 13));
        assert_eq!(v.rotate(), Version::new(6, 0));
    }

    #[test]
    fn revision_preserves_order() {
        let versions = vec![
            Version::new(0, 0),
            Version::new(0, 1),
            Version::new(0, u32::MAX),
            Version::new(1, 0),
            Version::new(7, 42),
        ];
        for pair in versions.windows(2) {
            assert!(pair[0].to_revision() < pair[1].to_revision());
        }
        assert_eq!(Version::from_revision(Version::new(7, 42).to_revision()), Version::new(7, 42));
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", Version::new(5, 12)), "5:12");
        assert_eq!(format!("{:?}", Version::new(0, 1)), "0:1");
    }
}
