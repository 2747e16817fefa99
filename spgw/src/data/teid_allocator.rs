use super::Teid;
use std::ops::RangeInclusive;

pub const SPGW_USER_PLANE_TEIDS: RangeInclusive<Teid> = 1..=0x7FFF_FFFE;
pub const ROAMING_USER_PLANE_TEIDS: RangeInclusive<Teid> = 0x8000_0000..=0xFFFF_FFFE;

/// Hands out locally assigned TEIDs.
#[derive(Debug, Clone)]
pub struct TeidAllocator {
    user_plane_range: RangeInclusive<Teid>,
    next_user_plane: Teid,
}

impl TeidAllocator {
    pub fn new(user_plane_range: RangeInclusive<Teid>) -> Self {
        let start = (*user_plane_range.start()).max(1);
        TeidAllocator {
            user_plane_range: start..=*user_plane_range.end(),
            next_user_plane: start,
        }
    }

    /// The next user plane TEID of the range, wrapping back to its start.
    pub fn new_user_plane_teid(&mut self) -> Teid {
        let teid = self.next_user_plane;
        self.next_user_plane = if teid >= *self.user_plane_range.end() {
            *self.user_plane_range.start()
        } else {
            teid + 1
        };
        teid
    }

    /// A random non zero control plane TEID that `in_use` does not claim.
    pub fn new_control_plane_teid(&self, in_use: impl Fn(Teid) -> bool) -> Teid {
        loop {
            let teid = rand::random::<u32>();
            if teid != 0 && !in_use(teid) {
                return teid;
            }
        }
    }
}
