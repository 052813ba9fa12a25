use glam::{Mat4, Quat, Vec3};
use std::cell::{Cell, Ref, RefCell};

use crate::tracking::Pose;

#[derive(Debug, Clone)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: f32,

    local_matrix: RefCell<Mat4>,
    world_matrix: RefCell<Mat4>,
    local_dirty: Cell<bool>,
    world_dirty: Cell<bool>,
    has_changed_since_last_update: Cell<bool>,
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            local_matrix: RefCell::new(Mat4::IDENTITY),
            world_matrix: RefCell::new(Mat4::IDENTITY),
            local_dirty: Cell::new(true),
            world_dirty: Cell::new(true),
            has_changed_since_last_update: Cell::new(true),
        }
    }

    pub fn get_local_matrix(&self) -> Ref<Mat4> {
        if self.local_dirty.get() {
            let matrix = Mat4::from_scale_rotation_translation(
                Vec3::splat(self.scale),
                self.rotation,
                self.translation,
            );

            self.local_matrix.replace(matrix);
            self.local_dirty.set(false);
            self.invalidate_world();
        }

        self.local_matrix.borrow()
    }

    pub fn get_world_matrix(&self) -> Ref<Mat4> {
        self.world_matrix.borrow()
    }

    pub fn set_world_matrix(&self, world_matrix: Mat4) {
        self.world_matrix.replace(world_matrix);
        self.world_dirty.set(false);
        self.has_changed_since_last_update.set(true);
    }

    pub fn invalidate_local(&self) {
        self.local_dirty.set(true);
        self.world_dirty.set(true);
        self.has_changed_since_last_update.set(true);
    }

    pub fn invalidate_world(&self) {
        self.world_dirty.set(true);
    }

    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty.get()
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.invalidate_local();
    }

    /// Overwrites position and rotation, keeping the current scale.
    pub fn set_pose(&mut self, pose: Pose) {
        self.translation = pose.position;
        self.rotation = pose.rotation;
        self.invalidate_local();
    }

    pub fn set_transform(&mut self, translation: Vec3, rotation: Quat, scale: f32) {
        self.translation = translation;
        self.rotation = rotation;
        self.scale = scale;
        self.invalidate_local();
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.translation, self.rotation)
    }

    pub fn reset_flags(&self) {
        self.has_changed_since_last_update.set(false);
    }

    pub fn has_changed(&self) -> bool {
        self.has_changed_since_last_update.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_pose_keeps_scale() {
        let mut transform = Transform::from_translation(Vec3::ZERO);
        transform.set_transform(Vec3::ZERO, Quat::IDENTITY, 2.0);
        transform.reset_flags();

        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.5));
        transform.set_pose(pose);

        assert_eq!(transform.pose(), pose);
        assert_eq!(transform.scale(), 2.0);
        assert!(transform.has_changed());
        assert!(transform.is_world_dirty());
    }

    #[test]
    fn local_matrix_is_recomputed_after_change() {
        let mut transform = Transform::from_translation(Vec3::ZERO);
        assert_eq!(*transform.get_local_matrix(), Mat4::IDENTITY);

        transform.set_translation(Vec3::X);
        let matrix = *transform.get_local_matrix();
        assert_eq!(matrix.transform_point3(Vec3::ZERO), Vec3::X);
    }
}
