use std::path::Path;

use anyhow::Context;
use glam::Vec3;

use imagesync::scene_graph::{Object3D, ObjectId, Scene};
use imagesync::sync::{ImageTrackingSynchronizer, SyncConfig};
use imagesync::tracking::{ReferenceImageLibrary, TrackedImageManager, TrackingConfig};

use crate::simulation::SimulatedSession;

pub struct DemoState {
    pub scene: Scene,
    pub manager: TrackedImageManager,
    pub synchronizer: ImageTrackingSynchronizer,
    pub session: SimulatedSession,
}

impl DemoState {
    pub fn new(prototype_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut scene = Scene::new();

        let prototype = match prototype_path {
            Some(path) => load_gltf_prototype(&mut scene, path)?,
            None => default_prototype(&mut scene),
        };

        // The prototype itself is never shown, only its clones.
        scene.set_object_active(prototype, false);

        let session = SimulatedSession::new(0x1ace);
        let library = ReferenceImageLibrary::with_images(session.reference_images());
        let mut manager = TrackedImageManager::new(
            library,
            TrackingConfig {
                frames_until_removed: 10,
            },
        );

        let mut synchronizer =
            ImageTrackingSynchronizer::new(SyncConfig::default()).with_prototype(prototype);
        synchronizer
            .activate(&mut manager, &scene)
            .context("Failed to activate image tracking")?;

        Ok(Self {
            scene,
            manager,
            synchronizer,
            session,
        })
    }

    pub fn update(&mut self) {
        let observations = self.session.next_frame();
        self.manager.process_frame(&observations);
        self.synchronizer.update(&mut self.manager, &mut self.scene);
    }

    pub fn shutdown(&mut self) {
        self.synchronizer.deactivate(&mut self.manager, &mut self.scene);
        self.synchronizer.despawn_all(&mut self.scene);
    }
}

fn load_gltf_prototype(scene: &mut Scene, path: &Path) -> anyhow::Result<ObjectId> {
    let (document, _buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to load prototype from {}", path.display()))?;
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("No scenes in gltf")?;

    scene
        .spawn_gltf_scene(&gltf_scene)
        .context("Prototype scene has no nodes")
}

fn default_prototype(scene: &mut Scene) -> ObjectId {
    let marker = scene.add_object(Object3D::named("Marker"));
    let label = scene.add_object(Object3D::named("Label"));
    scene.set_object_parent(label, Some(marker));
    scene.set_object_translation(label, Vec3::Y * 0.05);
    marker
}
