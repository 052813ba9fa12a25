use std::collections::HashMap;

use crate::scene_graph::{ObjectId, Scene};
use crate::sync::config::SyncConfig;
use crate::sync::error::SetupError;
use crate::tracking::{SubscriptionId, TrackedImage, TrackedImageManager, TrackedImagesChanged};

/// Keeps one clone of a prototype object per tracked image, following the
/// image's pose and hiding the clone while the image is not fully tracked.
pub struct ImageTrackingSynchronizer {
    config: SyncConfig,
    prototype: Option<ObjectId>,
    spawned: HashMap<String, ObjectId>,
    subscription: Option<SubscriptionId>,
}

impl ImageTrackingSynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            prototype: None,
            spawned: HashMap::new(),
            subscription: None,
        }
    }

    pub fn with_prototype(mut self, prototype: ObjectId) -> Self {
        self.prototype = Some(prototype);
        self
    }

    pub fn set_prototype(&mut self, prototype: ObjectId) {
        self.prototype = Some(prototype);
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Starts listening to `manager`. If the prototype is missing from
    /// `scene` this fails and leaves the synchronizer inactive, dropping an
    /// earlier subscription.
    pub fn activate(
        &mut self,
        manager: &mut TrackedImageManager,
        scene: &Scene,
    ) -> Result<(), SetupError> {
        if let Err(err) = self.check_prototype(scene) {
            if let Some(subscription) = self.subscription.take() {
                manager.unsubscribe(subscription);
                log::warn!("Image tracking synchronizer stopped: {}", err);
            }
            return Err(err);
        }

        if self.subscription.is_none() {
            self.subscription = Some(manager.subscribe());
            log::info!("Image tracking synchronizer activated");
        }

        Ok(())
    }

    fn check_prototype(&self, scene: &Scene) -> Result<(), SetupError> {
        let prototype = self.prototype.ok_or(SetupError::MissingPrototype)?;

        if !scene.contains(prototype) {
            return Err(SetupError::PrototypeNotFound(prototype));
        }

        Ok(())
    }

    /// Stops listening. Batches published before this call are still
    /// applied, none published afterwards will be.
    pub fn deactivate(&mut self, manager: &mut TrackedImageManager, scene: &mut Scene) {
        let Some(subscription) = self.subscription else {
            return;
        };

        self.update(manager, scene);
        manager.unsubscribe(subscription);
        self.subscription = None;

        if self.config.despawn_on_deactivate {
            self.despawn_all(scene);
        }

        log::info!(
            "Image tracking synchronizer deactivated, {} instances remain",
            self.spawned.len()
        );
    }

    /// Applies every batch received since the last update.
    pub fn update(&mut self, manager: &mut TrackedImageManager, scene: &mut Scene) {
        let Some(subscription) = self.subscription else {
            return;
        };

        for batch in manager.receive(subscription) {
            self.handle_event_batch(scene, &batch);
        }
    }

    pub fn handle_event_batch(&mut self, scene: &mut Scene, batch: &TrackedImagesChanged) {
        for image in batch.added.iter().chain(&batch.updated) {
            self.sync_instance(scene, image);
        }

        for image in &batch.removed {
            match self.spawned.remove(&image.name) {
                Some(instance) => {
                    scene.destroy_object(instance);
                    log::debug!("Despawned instance for '{}'", image.name);
                }
                None => log::trace!("Removal of untracked image '{}'", image.name),
            }
        }
    }

    fn sync_instance(&mut self, scene: &mut Scene, image: &TrackedImage) {
        let existing = self
            .spawned
            .get(&image.name)
            .copied()
            .filter(|&instance| scene.contains(instance));

        let instance = match existing {
            Some(instance) => {
                scene.set_object_pose(instance, image.pose);
                instance
            }
            None => {
                let Some(instance) = self.prototype.and_then(|id| scene.clone_object(id)) else {
                    log::error!(
                        "Cannot spawn an instance for '{}': prototype is missing",
                        image.name
                    );
                    return;
                };

                if let Some(object) = scene.get_object_mut(instance) {
                    object.name = format!("{} ({})", object.name, image.name);
                }
                scene.set_object_pose(instance, image.pose);
                self.spawned.insert(image.name.clone(), instance);
                log::debug!("Spawned instance for '{}'", image.name);
                instance
            }
        };

        scene.set_object_active(instance, image.is_tracking());
    }

    /// Destroys every spawned instance and forgets them.
    pub fn despawn_all(&mut self, scene: &mut Scene) {
        for (_, instance) in self.spawned.drain() {
            scene.destroy_object(instance);
        }
    }

    pub fn instance(&self, name: &str) -> Option<ObjectId> {
        self.spawned.get(name).copied()
    }

    pub fn instances(&self) -> impl Iterator<Item = (&str, ObjectId)> {
        self.spawned
            .iter()
            .map(|(name, &instance)| (name.as_str(), instance))
    }

    pub fn len(&self) -> usize {
        self.spawned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
    }
}

impl Default for ImageTrackingSynchronizer {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::scene_graph::Object3D;
    use crate::tracking::{Pose, ReferenceImageLibrary, TrackingConfig, TrackingState};

    fn setup() -> (Scene, TrackedImageManager, ImageTrackingSynchronizer) {
        let mut scene = Scene::new();
        let prototype = scene.add_object(Object3D::named("Marker"));
        scene.set_object_active(prototype, false);

        let manager = TrackedImageManager::new(
            ReferenceImageLibrary::with_images(["cardA", "cardB"]),
            TrackingConfig::default(),
        );
        let synchronizer = ImageTrackingSynchronizer::default().with_prototype(prototype);

        (scene, manager, synchronizer)
    }

    fn image(name: &str, x: f32, tracking_state: TrackingState) -> TrackedImage {
        TrackedImage::new(
            name,
            Pose::new(Vec3::X * x, Quat::from_rotation_z(x)),
            tracking_state,
        )
    }

    #[test]
    fn activation_requires_prototype() {
        let mut scene = Scene::new();
        let mut manager =
            TrackedImageManager::new(ReferenceImageLibrary::new(), TrackingConfig::default());
        let mut synchronizer = ImageTrackingSynchronizer::default();

        assert_eq!(
            synchronizer.activate(&mut manager, &scene),
            Err(SetupError::MissingPrototype)
        );
        assert!(!synchronizer.is_active());
        assert_eq!(manager.subscriber_count(), 0);

        let prototype = scene.add_object(Object3D::named("Marker"));
        scene.destroy_object(prototype);
        synchronizer.set_prototype(prototype);

        assert_eq!(
            synchronizer.activate(&mut manager, &scene),
            Err(SetupError::PrototypeNotFound(prototype))
        );
        assert!(!synchronizer.is_active());
    }

    #[test]
    fn failed_reactivation_unsubscribes() {
        let (mut scene, mut manager, mut synchronizer) = setup();
        synchronizer.activate(&mut manager, &scene).unwrap();

        let prototype = scene.get_object_by_name("Marker").unwrap();
        scene.destroy_object(prototype);

        assert_eq!(
            synchronizer.activate(&mut manager, &scene),
            Err(SetupError::PrototypeNotFound(prototype))
        );
        assert!(!synchronizer.is_active());
        assert_eq!(manager.subscriber_count(), 0);

        manager.publish(TrackedImagesChanged::added([image(
            "cardA",
            1.0,
            TrackingState::Tracking,
        )]));
        synchronizer.update(&mut manager, &mut scene);
        assert!(synchronizer.is_empty());
    }

    #[test]
    fn activating_twice_subscribes_once() {
        let (mut scene, mut manager, mut synchronizer) = setup();
        synchronizer.activate(&mut manager, &scene).unwrap();
        synchronizer.activate(&mut manager, &scene).unwrap();
        assert_eq!(manager.subscriber_count(), 1);

        manager.publish(TrackedImagesChanged::added([image(
            "cardA",
            1.0,
            TrackingState::Tracking,
        )]));
        synchronizer.update(&mut manager, &mut scene);

        assert_eq!(synchronizer.len(), 1);
        assert_eq!(scene.object_count(), 2);
    }

    #[test]
    fn batches_are_only_applied_while_active() {
        let (mut scene, mut manager, mut synchronizer) = setup();

        manager.publish(TrackedImagesChanged::added([image(
            "cardA",
            1.0,
            TrackingState::Tracking,
        )]));
        synchronizer.activate(&mut manager, &scene).unwrap();
        synchronizer.update(&mut manager, &mut scene);
        assert!(synchronizer.is_empty());

        manager.publish(TrackedImagesChanged::added([image(
            "cardB",
            2.0,
            TrackingState::Tracking,
        )]));
        // Pending batches are flushed before unsubscribing.
        synchronizer.deactivate(&mut manager, &mut scene);
        assert!(synchronizer.instance("cardB").is_some());

        manager.publish(TrackedImagesChanged::removed([image(
            "cardB",
            2.0,
            TrackingState::None,
        )]));
        synchronizer.update(&mut manager, &mut scene);
        assert!(synchronizer.instance("cardB").is_some());
        assert_eq!(manager.subscriber_count(), 0);
    }

    #[test]
    fn deactivation_keeps_instances_by_default() {
        let (mut scene, mut manager, mut synchronizer) = setup();
        synchronizer.activate(&mut manager, &scene).unwrap();
        manager.publish(TrackedImagesChanged::added([image(
            "cardA",
            1.0,
            TrackingState::Tracking,
        )]));
        synchronizer.deactivate(&mut manager, &mut scene);

        let instance = synchronizer.instance("cardA").unwrap();
        assert!(scene.contains(instance));
    }

    #[test]
    fn deactivation_can_despawn_instances() {
        let (mut scene, mut manager, _) = setup();
        let prototype = scene.get_object_by_name("Marker").unwrap();
        let mut synchronizer = ImageTrackingSynchronizer::new(SyncConfig {
            despawn_on_deactivate: true,
        })
        .with_prototype(prototype);

        synchronizer.activate(&mut manager, &scene).unwrap();
        manager.publish(TrackedImagesChanged::added([
            image("cardA", 1.0, TrackingState::Tracking),
            image("cardB", 2.0, TrackingState::Limited),
        ]));
        synchronizer.deactivate(&mut manager, &mut scene);

        assert!(synchronizer.is_empty());
        assert_eq!(scene.object_count(), 1);
        assert!(scene.contains(prototype));
    }

    #[test]
    fn instance_destroyed_by_host_is_respawned() {
        let (mut scene, _, mut synchronizer) = setup();
        synchronizer.handle_event_batch(
            &mut scene,
            &TrackedImagesChanged::added([image("cardA", 1.0, TrackingState::Tracking)]),
        );
        let first = synchronizer.instance("cardA").unwrap();
        scene.destroy_object(first);

        synchronizer.handle_event_batch(
            &mut scene,
            &TrackedImagesChanged::updated([image("cardA", 2.0, TrackingState::Tracking)]),
        );
        let second = synchronizer.instance("cardA").unwrap();

        assert_ne!(first, second);
        assert!(scene.contains(second));
        assert_eq!(synchronizer.len(), 1);
    }

    #[test]
    fn spawned_instances_are_named_after_images() {
        let (mut scene, _, mut synchronizer) = setup();
        synchronizer.handle_event_batch(
            &mut scene,
            &TrackedImagesChanged::added([image("cardA", 1.0, TrackingState::Tracking)]),
        );

        let instance = synchronizer.instance("cardA").unwrap();
        assert_eq!(scene.get_object(instance).unwrap().name, "Marker (cardA)");
        assert!(scene.get_object(instance).unwrap().parent_id.is_none());
    }
}
