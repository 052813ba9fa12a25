#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Destroy every spawned instance when the synchronizer is deactivated.
    /// When unset, instances stay in the scene until their image is reported
    /// removed or the host tears the scene down.
    pub despawn_on_deactivate: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            despawn_on_deactivate: false,
        }
    }
}
