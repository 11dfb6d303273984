//! Object definitions and name lookup

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Definition of an object that instances refer to by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    pub name: String,
    /// Object type, used to pick the renderer (e.g. "Sprite", "Cube3D")
    pub kind: String,
    /// Natural size of the object (width, height, depth), if known
    pub dimensions: Option<Vec3>,
    /// Whether the object has a 3D representation
    pub is_3d: bool,
}

impl ObjectDefinition {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            dimensions: None,
            is_3d: false,
        }
    }

    pub fn with_dimensions(mut self, width: f32, height: f32, depth: f32) -> Self {
        self.dimensions = Some(Vec3::new(width, height, depth));
        self
    }

    pub fn with_3d(mut self, is_3d: bool) -> Self {
        self.is_3d = is_3d;
        self
    }
}

/// Resolves an object name to its definition.
pub trait ObjectResolver {
    fn resolve(&self, name: &str) -> Option<&ObjectDefinition>;
}

/// Named object definitions of a layout or of the whole project.
#[derive(Debug, Clone, Default)]
pub struct ObjectsContainer {
    objects: Vec<ObjectDefinition>,
}

impl ObjectsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. Names are unique within a container.
    pub fn insert(&mut self, object: ObjectDefinition) -> Result<(), CoreError> {
        if self.contains(&object.name) {
            return Err(CoreError::DuplicateObject(object.name));
        }
        self.objects.push(object);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<ObjectDefinition> {
        let index = self.objects.iter().position(|o| o.name == name)?;
        Some(self.objects.remove(index))
    }

    /// Rename a definition. Returns false if `old` does not exist or `new` is taken.
    ///
    /// Instances keep their old `object_name`; refactoring them is up to the caller.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if self.contains(new) {
            return false;
        }
        match self.objects.iter_mut().find(|o| o.name == old) {
            Some(object) => {
                object.name = new.to_string();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ObjectDefinition> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ObjectDefinition> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o.name == name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectResolver for ObjectsContainer {
    fn resolve(&self, name: &str) -> Option<&ObjectDefinition> {
        self.get(name)
    }
}

/// Lookup scope of a layout: its own objects shadow the project's globals.
#[derive(Debug, Clone, Copy)]
pub struct ObjectScope<'a> {
    pub layout: &'a ObjectsContainer,
    pub globals: &'a ObjectsContainer,
}

impl<'a> ObjectScope<'a> {
    pub fn new(layout: &'a ObjectsContainer, globals: &'a ObjectsContainer) -> Self {
        Self { layout, globals }
    }
}

impl ObjectResolver for ObjectScope<'_> {
    fn resolve(&self, name: &str) -> Option<&ObjectDefinition> {
        self.layout.get(name).or_else(|| self.globals.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicate_names() {
        let mut objects = ObjectsContainer::new();
        objects.insert(ObjectDefinition::new("Enemy", "Sprite")).unwrap();
        assert_eq!(
            objects.insert(ObjectDefinition::new("Enemy", "Text")),
            Err(CoreError::DuplicateObject("Enemy".to_string()))
        );
    }

    #[test]
    fn test_rename() {
        let mut objects = ObjectsContainer::new();
        objects.insert(ObjectDefinition::new("A", "Sprite")).unwrap();
        objects.insert(ObjectDefinition::new("B", "Sprite")).unwrap();

        assert!(!objects.rename("A", "B"));
        assert!(!objects.rename("Missing", "C"));
        assert!(objects.rename("A", "C"));
        assert!(objects.resolve("A").is_none());
        assert!(objects.resolve("C").is_some());
    }

    #[test]
    fn test_scope_prefers_layout_objects() {
        let mut layout = ObjectsContainer::new();
        layout
            .insert(ObjectDefinition::new("Player", "Sprite"))
            .unwrap();
        let mut globals = ObjectsContainer::new();
        globals
            .insert(ObjectDefinition::new("Player", "Cube3D"))
            .unwrap();
        globals.insert(ObjectDefinition::new("Hud", "Text")).unwrap();

        let scope = ObjectScope::new(&layout, &globals);
        assert_eq!(scope.resolve("Player").unwrap().kind, "Sprite");
        assert_eq!(scope.resolve("Hud").unwrap().kind, "Text");
        assert!(scope.resolve("Missing").is_none());
    }
}
