use crate::demo::DemoState;

pub fn update(state: &mut DemoState) -> anyhow::Result<()> {
    state.scene.early_update();
    state.update();
    state.scene.late_update();

    for (name, instance) in state.synchronizer.instances() {
        let Some(transform) = state.scene.get_object_transform(instance) else {
            anyhow::bail!("Instance for '{}' is missing from the scene", name);
        };

        if transform.has_changed() {
            log::trace!(
                "Frame {}: '{}' at {} (visible: {})",
                state.session.frame(),
                name,
                transform.translation(),
                state.scene.is_active_in_hierarchy(instance)
            );
        }
    }

    Ok(())
}
