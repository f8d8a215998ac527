//! Wheel corner enumeration and front/rear group partitioning.

use std::fmt;

/// Number of wheel corners on the vehicle.
pub const CORNER_COUNT: usize = 4;

/// One of the four wheel positions, each with its own damper and sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl Corner {
    pub const ALL: [Corner; CORNER_COUNT] = [
        Corner::FrontLeft,
        Corner::FrontRight,
        Corner::RearLeft,
        Corner::RearRight,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// ADC channel wired to this corner's position sensor.
    #[inline]
    pub const fn channel(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: usize) -> Option<Corner> {
        Corner::ALL.get(index).copied()
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Corner::FrontLeft => "front-left",
            Corner::FrontRight => "front-right",
            Corner::RearLeft => "rear-left",
            Corner::RearRight => "rear-right",
        };
        f.write_str(name)
    }
}

/// A contiguous, disjoint pair of corners owned by one sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerGroup {
    Front,
    Rear,
}

impl CornerGroup {
    pub const ALL: [CornerGroup; 2] = [CornerGroup::Front, CornerGroup::Rear];

    pub fn corners(self) -> &'static [Corner] {
        match self {
            CornerGroup::Front => &[Corner::FrontLeft, Corner::FrontRight],
            CornerGroup::Rear => &[Corner::RearLeft, Corner::RearRight],
        }
    }

    /// Short log tag for this group's loop.
    pub const fn tag(self) -> &'static str {
        match self {
            CornerGroup::Front => "front",
            CornerGroup::Rear => "rear",
        }
    }
}

impl fmt::Display for CornerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_stable_and_round_trip() {
        for (i, corner) in Corner::ALL.iter().enumerate() {
            assert_eq!(corner.index(), i);
            assert_eq!(Corner::from_index(i), Some(*corner));
        }
        assert_eq!(Corner::from_index(CORNER_COUNT), None);
    }

    #[test]
    fn groups_partition_all_corners() {
        let mut seen: Vec<Corner> = CornerGroup::ALL
            .iter()
            .flat_map(|g| g.corners().iter().copied())
            .collect();
        seen.dedup();
        assert_eq!(seen, Corner::ALL.to_vec());
    }
}
