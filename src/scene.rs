// Scene module for Starfield-3D

use crate::geometry::MeshData;
use crate::material::Material;
use crate::math::{Color, Transform};
use glam::Vec3;
use std::path::PathBuf;

/// Index of a shared mesh inside a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Index of a registered texture inside a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// Index of a drawable object inside a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// How a texture's texels are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// sRGB colour data
    Color,
    /// Tangent-space normals, stored linearly
    Normal,
}

/// An image file the scene wants on the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRequest {
    pub id: TextureId,
    pub path: PathBuf,
    pub kind: TextureKind,
}

/// Represents a drawable object within the 3D scene.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub mesh: MeshId,
    pub material: Material,
    pub transform: Transform,
}

impl SceneObject {
    /// Creates a new scene object at the origin.
    pub fn new(name: impl Into<String>, mesh: MeshId, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            transform: Transform::identity(),
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }
}

/// Light sources understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Radiates from a point, falling off with distance
    Point {
        color: Color,
        intensity: f32,
        decay: f32,
        position: Vec3,
    },
    /// Lights every surface equally
    Ambient { color: Color, intensity: f32 },
}

impl Light {
    pub fn point(color: Color, position: Vec3) -> Self {
        Light::Point {
            color,
            intensity: 1.0,
            decay: 2.0,
            position,
        }
    }

    pub fn ambient(color: Color) -> Self {
        Light::Ambient {
            color,
            intensity: 1.0,
        }
    }
}

/// Represents the entire 3D scene.
///
/// Everything is insert-only: ids handed out stay valid for the scene's lifetime.
#[derive(Debug, Default)]
pub struct Scene {
    pub meshes: Vec<MeshData>,
    pub textures: Vec<TextureRequest>,
    pub objects: Vec<SceneObject>,
    pub lights: Vec<Light>,
    pub background: Option<TextureId>,
}

impl Scene {
    /// Creates a new, empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores geometry that any number of objects may share.
    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Registers an image file to be loaded in the background.
    pub fn add_texture(&mut self, path: impl Into<PathBuf>, kind: TextureKind) -> TextureId {
        let id = TextureId(self.textures.len());
        self.textures.push(TextureRequest {
            id,
            path: path.into(),
            kind,
        });
        id
    }

    /// Adds an object to the scene.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn set_background(&mut self, texture: TextureId) {
        self.background = Some(texture);
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0)
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureRequest> {
        self.textures.get(id.0)
    }

    pub fn drawable_count(&self) -> usize {
        self.objects.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Ambient contribution of every ambient light, summed.
    pub fn ambient_light(&self) -> Color {
        self.lights
            .iter()
            .fold(Color::BLACK, |acc, light| match *light {
                Light::Ambient { color, intensity } => {
                    let c = color.scaled(intensity);
                    Color {
                        r: acc.r + c.r,
                        g: acc.g + c.g,
                        b: acc.b + c.b,
                    }
                }
                Light::Point { .. } => acc,
            })
    }

    /// First point light, the only one the renderer shades with.
    pub fn point_light(&self) -> Option<&Light> {
        self.lights
            .iter()
            .find(|light| matches!(light, Light::Point { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;

    #[test]
    fn ids_follow_insertion_order() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(geometry::cuboid(1.0, 1.0, 1.0));
        let a = scene.add_object(SceneObject::new("a", mesh, Material::basic(Color::WHITE)));
        let b = scene.add_object(
            SceneObject::new("b", mesh, Material::basic(Color::WHITE)).at(Vec3::X),
        );
        assert_eq!(a, ObjectId(0));
        assert_eq!(b, ObjectId(1));
        assert_eq!(scene.get(b).map(|o| o.transform.position), Some(Vec3::X));
        assert_eq!(scene.get(a).map(|o| o.name.as_str()), Some("a"));
        assert!(scene.get(ObjectId(5)).is_none());
    }

    #[test]
    fn textures_are_registered_with_their_kind() {
        let mut scene = Scene::new();
        let color = scene.add_texture("moon.jpg", TextureKind::Color);
        let normal = scene.add_texture("normal.jpg", TextureKind::Normal);
        assert_eq!(scene.texture(normal).map(|t| t.kind), Some(TextureKind::Normal));
        assert_eq!(
            scene.texture(color).map(|t| t.path.clone()),
            Some(PathBuf::from("moon.jpg"))
        );
    }

    #[test]
    fn lights_are_summarised() {
        let mut scene = Scene::new();
        assert!(scene.point_light().is_none());
        scene.add_light(Light::point(Color::WHITE, Vec3::splat(5.0)));
        scene.add_light(Light::ambient(Color::WHITE));
        scene.add_light(Light::Ambient {
            color: Color::WHITE,
            intensity: 0.5,
        });
        assert_eq!(scene.light_count(), 3);
        assert_eq!(scene.ambient_light().r, 1.5);
        assert!(matches!(
            scene.point_light(),
            Some(Light::Point { position, .. }) if *position == Vec3::splat(5.0)
        ));
    }
}
