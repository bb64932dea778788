//! Flat collection of drawable objects.
//!
//! There is no hierarchy: every [`GameObject`] carries its own world
//! [`Transform`]. The model type is generic so this crate stays free of GPU
//! types; the renderer instantiates it with its uploaded model.

use std::collections::HashMap;
use std::sync::Arc;

use crate::transform::Transform;

/// Identifier handed out by [`GameObjects::spawn`]. Never reused.
pub type ObjectId = u32;

/// One object in the scene.
#[derive(Debug)]
pub struct GameObject<M> {
    id: ObjectId,
    /// Shared mesh; several objects may draw the same model.
    pub model: Option<Arc<M>>,
    pub transform: Transform,
}

impl<M> GameObject<M> {
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

/// Objects in insertion order, addressable by id.
#[derive(Debug)]
pub struct GameObjects<M> {
    objects: Vec<GameObject<M>>,
    index: HashMap<ObjectId, usize>,
    next_id: ObjectId,
}

impl<M> Default for GameObjects<M> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            index: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<M> GameObjects<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty object and returns it for configuration.
    pub fn spawn(&mut self) -> &mut GameObject<M> {
        let id = self.next_id;
        self.next_id += 1;

        self.index.insert(id, self.objects.len());
        self.objects.push(GameObject {
            id,
            model: None,
            transform: Transform::default(),
        });
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject<M>> {
        self.index.get(&id).map(|&i| &self.objects[i])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject<M>> {
        self.index.get(&id).map(|&i| &mut self.objects[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject<M>> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameObject<M>> {
        self.objects.iter_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<'a, M> IntoIterator for &'a GameObjects<M> {
    type Item = &'a GameObject<M>;
    type IntoIter = std::slice::Iter<'a, GameObject<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_spawn_ids_increase() {
        let mut objects: GameObjects<()> = GameObjects::new();
        let a = objects.spawn().id();
        let b = objects.spawn().id();
        let c = objects.spawn().id();
        assert!(a < b && b < c);
        assert_eq!(objects.len(), 3);
    }

    #[test]
    fn test_iteration_is_insertion_order() {
        let mut objects: GameObjects<()> = GameObjects::new();
        for x in 0..4 {
            objects.spawn().transform.translation.x = x as f32;
        }
        let xs: Vec<f32> = objects.iter().map(|o| o.transform.translation.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_get_mut_by_id() {
        let mut objects: GameObjects<()> = GameObjects::new();
        objects.spawn();
        let id = objects.spawn().id();

        objects.get_mut(id).unwrap().transform.translation = Vec3::X;
        assert_eq!(objects.get(id).unwrap().transform.translation, Vec3::X);
        assert!(objects.get(id + 1).is_none());
    }

    #[test]
    fn test_objects_share_model() {
        let model = Arc::new("cube");
        let mut objects = GameObjects::new();
        objects.spawn().model = Some(model.clone());
        objects.spawn().model = Some(model.clone());
        assert_eq!(Arc::strong_count(&model), 3);
        assert!(objects.iter().all(|o| o.model.is_some()));
    }
}
