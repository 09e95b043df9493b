/// Runtime options read by the physics core.
///
/// These are the few game settings that change physics side effects. Everything
/// else is fixed in [`crate::constants`] and [`crate::collision::settings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicsSettings {
    /// Difficulty level, 0 is trainee. Trainee halves lava damage.
    pub difficulty: u8,
    /// Cheat: explosions push but do not damage.
    pub disable_weapon_damage: bool,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            difficulty: 2,
            disable_weapon_damage: false,
        }
    }
}

impl PhysicsSettings {
    pub fn is_trainee(&self) -> bool {
        self.difficulty == 0
    }
}
