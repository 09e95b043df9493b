use crate::bitmask_flags::BitmaskFlags;
use crate::define_bitmask_flags;

use super::segment::Tag;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WallId(pub u16);

impl WallId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(pub u16);

impl TriggerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallType {
    /// Blown open by enough damage.
    Destroyable,
    Door,
    /// Looks solid but can be flown through.
    Illusion,
    /// Trigger-only wall with no blocking surface.
    Open,
    Closed,
    /// Force field style wall that is drawn see-through.
    Cloaked,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WallState {
    #[default]
    Closed,
    Opening,
    WaitOpen,
    Closing,
    Destroyed,
}

define_bitmask_flags!(WallFlag, u8, {
    Blasted,
    DoorOpened,
    IllusionOff,
});

pub type WallFlags = BitmaskFlags<u8>;

/// Stateful gate on a segment side.
#[derive(Clone, Debug, PartialEq)]
pub struct Wall {
    pub tag: Tag,
    pub ty: WallType,
    pub state: WallState,
    pub flags: WallFlags,
    pub trigger: Option<TriggerId>,
}

impl Wall {
    pub fn new(tag: Tag, ty: WallType) -> Self {
        Self {
            tag,
            ty,
            state: WallState::Closed,
            flags: WallFlags::default(),
            trigger: None,
        }
    }

    /// Whether objects and rays are stopped by this wall in its current state.
    pub fn is_solid(&self) -> bool {
        match self.ty {
            WallType::Open => false,
            WallType::Illusion => self.flags.has(WallFlag::IllusionOff),
            WallType::Door => {
                !(self.flags.has(WallFlag::DoorOpened) || self.state == WallState::WaitOpen)
            }
            WallType::Destroyable => {
                !(self.flags.has(WallFlag::Blasted) || self.state == WallState::Destroyed)
            }
            WallType::Closed | WallType::Cloaked => true,
        }
    }
}

/// Level trigger. Activation is handled outside the physics core.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trigger {
    pub targets: Vec<Tag>,
}
