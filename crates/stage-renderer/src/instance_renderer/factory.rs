//! Factory registry for instance renderers.

use std::collections::HashMap;

use stage_core::{Instance, ObjectDefinition};

use super::{BoxRenderer, PlaceholderRenderer, RenderedInstance};
use crate::scene::{DrawContainer, Scene3d};

/// Creates renderers for one kind of object.
pub trait InstanceRendererFactory {
    /// Creates the renderer of `instance`, adding its nodes to `container`
    /// and, when available, to `scene_3d`.
    fn create(
        &self,
        definition: &ObjectDefinition,
        instance: &Instance,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) -> Box<dyn RenderedInstance>;
}

impl<F> InstanceRendererFactory for F
where
    F: Fn(
        &ObjectDefinition,
        &Instance,
        &mut DrawContainer,
        Option<&mut Scene3d>,
    ) -> Box<dyn RenderedInstance>,
{
    fn create(
        &self,
        definition: &ObjectDefinition,
        instance: &Instance,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) -> Box<dyn RenderedInstance> {
        self(definition, instance, container, scene_3d)
    }
}

/// Renderer factories keyed by object kind.
///
/// Unknown kinds get a [`PlaceholderRenderer`].
pub struct RendererFactories {
    factories: HashMap<String, Box<dyn InstanceRendererFactory>>,
}

impl RendererFactories {
    /// Creates a registry without any factory.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in renderers.
    pub fn with_builtin() -> Self {
        let mut factories = Self::new();
        factories.register(BoxRenderer::KIND, BoxRenderer::create);
        factories
    }

    /// Registers the factory of `kind`, replacing any previous one.
    pub fn register<F: InstanceRendererFactory + 'static>(
        &mut self,
        kind: impl Into<String>,
        factory: F,
    ) {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Unregisters the factory of `kind`.
    pub fn unregister(&mut self, kind: &str) -> bool {
        self.factories.remove(kind).is_some()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Creates a renderer with the factory of the definition's kind.
    pub fn create(
        &self,
        definition: &ObjectDefinition,
        instance: &Instance,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) -> Box<dyn RenderedInstance> {
        match self.factories.get(&definition.kind) {
            Some(factory) => factory.create(definition, instance, container, scene_3d),
            None => Box::new(PlaceholderRenderer::new(container)),
        }
    }
}

impl Default for RendererFactories {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::constants::placeholder;
    use glam::Vec3;

    #[test]
    fn test_builtin_registry() {
        let factories = RendererFactories::with_builtin();
        assert!(factories.contains(BoxRenderer::KIND));
        assert_eq!(factories.len(), 1);
        assert!(RendererFactories::new().is_empty());
    }

    #[test]
    fn test_unknown_kind_uses_placeholder() {
        let factories = RendererFactories::new();
        let mut container = DrawContainer::new();
        let definition = ObjectDefinition::new("Hero", "Sprite");

        let renderer = factories.create(&definition, &Instance::new("Hero"), &mut container, None);
        let metrics = renderer.metrics();
        assert_eq!(
            metrics.default_size,
            Vec3::new(placeholder::SIZE, placeholder::SIZE, 0.0)
        );
        assert!(container.contains(renderer.node()));
        assert!(renderer.node_3d().is_none());
    }

    #[test]
    fn test_registered_closure_factory() {
        let mut factories = RendererFactories::new();
        factories.register(
            "Sprite",
            |_: &ObjectDefinition,
             _: &Instance,
             container: &mut DrawContainer,
             _: Option<&mut Scene3d>|
             -> Box<dyn RenderedInstance> {
                let mut renderer = PlaceholderRenderer::new(container);
                renderer.set_size(Vec3::new(64.0, 16.0, 0.0));
                Box::new(renderer)
            },
        );

        let mut container = DrawContainer::new();
        let definition = ObjectDefinition::new("Hero", "Sprite");
        let renderer = factories.create(&definition, &Instance::new("Hero"), &mut container, None);
        assert_eq!(renderer.metrics().default_size, Vec3::new(64.0, 16.0, 0.0));

        assert!(factories.unregister("Sprite"));
        assert!(!factories.unregister("Sprite"));
    }

    #[test]
    fn test_box_kind_creates_3d_node_when_group_exists() {
        let factories = RendererFactories::with_builtin();
        let mut container = DrawContainer::new();
        let mut scene = Scene3d::new(&CameraConfig::default());
        let definition = ObjectDefinition::new("Crate", BoxRenderer::KIND)
            .with_dimensions(10.0, 20.0, 30.0)
            .with_3d(true);

        let renderer = factories.create(
            &definition,
            &Instance::new("Crate"),
            &mut container,
            Some(&mut scene),
        );
        let node_3d = renderer.node_3d().unwrap();
        assert!(scene.node(node_3d).is_some());
        assert!(scene.group().is_empty());

        let flat = factories.create(&definition, &Instance::new("Crate"), &mut container, None);
        assert!(flat.node_3d().is_none());
    }
}
