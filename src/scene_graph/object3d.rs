use glam::Vec3;
use id_arena::Id;

use crate::scene_graph::scene::Scene;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

#[derive(Debug, Clone)]
pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    /// Local active flag. Whether the object is actually shown also depends
    /// on its ancestors, see [`Scene::is_active_in_hierarchy`].
    pub active: bool,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
    pub(crate) destroyed: bool,
}

impl Object3D {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn children<'a, 'b>(&'a self, scene: &'b Scene) -> impl Iterator<Item = &'b Object3D> + 'b
    where
        'a: 'b,
    {
        self.child_ids
            .iter()
            .filter_map(move |id| scene.get_object(*id))
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::from_translation(Vec3::ZERO),
            active: true,
            parent_id: None,
            child_ids: Vec::new(),
            destroyed: false,
        }
    }
}
