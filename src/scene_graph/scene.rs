use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::transform::Transform;
use crate::tracking::Pose;

/// Host scene. Objects live in an arena; destroyed objects stay behind as
/// tombstones so that stale ids never resolve to a different object.
pub struct Scene {
    objects: Arena<Object3D>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id).filter(|object| !object.destroyed)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id).filter(|object| !object.destroyed)
    }

    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get_object(id).is_some()
    }

    /// Iterates live objects only.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object3D)> + '_ {
        self.objects.iter().filter(|(_, object)| !object.destroyed)
    }

    pub fn object_count(&self) -> usize {
        self.objects().count()
    }

    /// Builds an object hierarchy from a glTF scene and returns its root.
    /// Scenes with several top-level nodes get a synthetic root named after
    /// the scene.
    pub fn spawn_gltf_scene(&mut self, scene: &gltf::Scene) -> Option<ObjectId> {
        let nodes: Vec<_> = scene.nodes().collect();

        match nodes.as_slice() {
            [] => None,
            [node] => Some(self.spawn_gltf_node(node, None)),
            nodes => {
                let root_name = scene.name().unwrap_or("glTF Scene");
                let root_id = self.add_object(Object3D::named(root_name));

                for node in nodes {
                    self.spawn_gltf_node(node, Some(root_id));
                }

                Some(root_id)
            }
        }
    }

    fn spawn_gltf_node(&mut self, node: &gltf::Node, parent: Option<ObjectId>) -> ObjectId {
        let mut object = Object3D::named(node.name().unwrap_or("Unnamed"));
        let (translation, rotation, scale) = node.transform().decomposed();

        object.transform.set_transform(
            translation.into(),
            Quat::from_array(rotation),
            scale[0], // Assume uniform scale for simplicity
        );

        let object_id = self.add_object(object);

        if let Some(parent_id) = parent {
            self.set_object_parent(object_id, Some(parent_id));
        }

        for child in node.children() {
            self.spawn_gltf_node(&child, Some(object_id));
        }

        object_id
    }

    /// Deep-copies the subtree rooted at `id`. The copy is a root object.
    pub fn clone_object(&mut self, id: ObjectId) -> Option<ObjectId> {
        let copy_id = self.clone_subtree(id, None)?;
        log::trace!("Cloned object {:?} into {:?}", id, copy_id);
        Some(copy_id)
    }

    fn clone_subtree(&mut self, id: ObjectId, parent: Option<ObjectId>) -> Option<ObjectId> {
        let source = self.get_object(id)?;

        let mut copy = source.clone();
        copy.parent_id = parent;
        copy.child_ids = Vec::new();
        copy.transform.invalidate_local();

        let source_children = source.child_ids.clone();
        let copy_id = self.objects.alloc(copy);

        for child_id in source_children {
            if let Some(child_copy_id) = self.clone_subtree(child_id, Some(copy_id)) {
                self.objects[copy_id].child_ids.push(child_copy_id);
            }
        }

        Some(copy_id)
    }

    /// Detaches the object from its parent and destroys it together with all
    /// of its descendants. Returns `false` if the object was already gone.
    pub fn destroy_object(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.get_object(id) else {
            return false;
        };

        if let Some(parent_id) = object.parent_id {
            if let Some(parent) = self.get_object_mut(parent_id) {
                parent.child_ids.retain(|&child_id| child_id != id);
            }
        }

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let object = &mut self.objects[next];
            object.destroyed = true;
            object.parent_id = None;
            pending.append(&mut object.child_ids);
        }

        log::trace!("Destroyed object {:?}", id);
        true
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self
            .objects()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id);

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY);
        }
    }

    fn update_object_transform_recursive(&self, object_id: ObjectId, parent_world_matrix: Mat4) {
        if let Some(object) = self.get_object(object_id) {
            if object.transform.is_world_dirty() {
                let local_matrix = *object.transform.get_local_matrix();
                let world_matrix = parent_world_matrix * local_matrix;
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.get_object(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(old_parent_id) = self.get_object(child_id).and_then(|child| child.parent_id) {
            if let Some(old_parent) = self.get_object_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.get_object_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.get_object_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_pose(&mut self, object_id: ObjectId, pose: Pose) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_pose(pose);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.get_object(object_id).map(|object| &object.transform)
    }

    pub fn set_object_active(&mut self, object_id: ObjectId, active: bool) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.active = active;
        }
    }

    /// An object is shown only if it and every ancestor are active.
    pub fn is_active_in_hierarchy(&self, object_id: ObjectId) -> bool {
        let mut current = self.get_object(object_id);

        while let Some(object) = current {
            if !object.active {
                return false;
            }

            match object.parent_id {
                Some(parent_id) => current = self.get_object(parent_id),
                None => return true,
            }
        }

        false
    }

    pub fn early_update(&mut self) {
        for (_, object) in self.objects() {
            object.transform.reset_flags();
        }
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
