// Scene construction for Starfield-3D

use crate::camera::PerspectiveCamera;
use crate::config::Config;
use crate::geometry;
use crate::material::Material;
use crate::math::{rand_float_spread, Color};
use crate::scene::{Light, ObjectId, Scene, SceneObject, TextureKind};
use glam::Vec3;
use rand::Rng;

pub const FIELD_OF_VIEW: f32 = 75.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;

pub const BACKGROUND_TEXTURE: &str = "space.jpg";
pub const AVATAR_TEXTURE: &str = "Avatar.png";
pub const MOON_TEXTURE: &str = "moon.jpg";
pub const MOON_NORMAL_TEXTURE: &str = "normal.jpg";

/// The objects the frame and scroll drivers animate.
#[derive(Debug, Clone, Copy)]
pub struct Handles {
    pub torus: ObjectId,
    pub avatar: ObjectId,
    pub moon: ObjectId,
}

/// The whole demo state: scene graph, camera and the animated objects.
#[derive(Debug)]
pub struct Showcase {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub handles: Handles,
}

impl Showcase {
    /// Builds the scene once. `aspect` is the viewport aspect ratio at startup.
    pub fn build<R: Rng + ?Sized>(config: &Config, aspect: f32, rng: &mut R) -> Self {
        let mut camera = PerspectiveCamera::new(FIELD_OF_VIEW, aspect, NEAR_PLANE, FAR_PLANE);
        camera.transform.position = Vec3::new(-3.0, 0.0, 30.0);

        let mut scene = Scene::new();

        // Torus
        let torus_mesh = scene.add_mesh(geometry::torus(10.0, 3.0, 16, 100));
        let torus = scene.add_object(SceneObject::new(
            "torus",
            torus_mesh,
            Material::standard(Color::from_hex(0xff6347)),
        ));

        // Lights
        scene.add_light(Light::point(Color::from_hex(0xffffff), Vec3::new(5.0, 5.0, 5.0)));
        scene.add_light(Light::ambient(Color::from_hex(0xffffff)));

        // Stars share one sphere
        let star_mesh = scene.add_mesh(geometry::sphere(0.25, 24, 24));
        let star_material = Material::standard(Color::from_hex(0xffffff));
        for i in 0..config.stars {
            let position = Vec3::new(
                rand_float_spread(rng, config.star_spread),
                rand_float_spread(rng, config.star_spread),
                rand_float_spread(rng, config.star_spread),
            );
            scene.add_object(
                SceneObject::new(format!("star-{i}"), star_mesh, star_material.clone()).at(position),
            );
        }

        // Background
        let space = scene.add_texture(config.assets.join(BACKGROUND_TEXTURE), TextureKind::Color);
        scene.set_background(space);

        // Avatar
        let avatar_texture = scene.add_texture(config.assets.join(AVATAR_TEXTURE), TextureKind::Color);
        let cube = scene.add_mesh(geometry::cuboid(3.0, 3.0, 3.0));
        let avatar = scene.add_object(
            SceneObject::new("avatar", cube, Material::basic(Color::WHITE).with_map(avatar_texture))
                .at(Vec3::new(2.0, 0.0, -5.0)),
        );

        // Moon
        let moon_texture = scene.add_texture(config.assets.join(MOON_TEXTURE), TextureKind::Color);
        let moon_normal = scene.add_texture(config.assets.join(MOON_NORMAL_TEXTURE), TextureKind::Normal);
        let moon_mesh = scene.add_mesh(geometry::sphere(3.0, 32, 32));
        let moon = scene.add_object(
            SceneObject::new(
                "moon",
                moon_mesh,
                Material::standard(Color::WHITE)
                    .with_map(moon_texture)
                    .with_normal_map(moon_normal),
            )
            .at(Vec3::new(-10.0, 0.0, 30.0)),
        );

        log::info!(
            "Scene built: {} drawables, {} mesh triangles, {} lights, {} textures",
            scene.drawable_count(),
            scene.meshes.iter().map(|mesh| mesh.triangle_count()).sum::<usize>(),
            scene.light_count(),
            scene.textures.len()
        );
        log::info!(
            "Camera: fov {}\u{b0}, aspect {:.3}, clip {}..{}",
            camera.fov_degrees(),
            camera.aspect(),
            camera.near(),
            camera.far()
        );

        let handles = Handles {
            torus,
            avatar,
            moon,
        };
        for id in handles.all() {
            if let Some(object) = scene.get(id) {
                log::debug!("{} at {:?}", object.name, object.transform.position);
            }
        }

        Self {
            scene,
            camera,
            handles,
        }
    }
}

impl Handles {
    pub fn all(&self) -> [ObjectId; 3] {
        [self.torus, self.avatar, self.moon]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Shading;
    use rand::{rngs::StdRng, SeedableRng};
    use std::path::PathBuf;

    fn build() -> Showcase {
        Showcase::build(&Config::default(), 16.0 / 9.0, &mut StdRng::seed_from_u64(42))
    }

    #[test]
    fn object_and_light_counts() {
        let showcase = build();
        assert_eq!(showcase.scene.drawable_count(), 203);
        assert_eq!(showcase.scene.light_count(), 2);
        assert_eq!(showcase.scene.textures.len(), 4);
        // Stars share a mesh: torus, star, cube, moon
        assert_eq!(showcase.scene.meshes.len(), 4);
    }

    #[test]
    fn stars_stay_inside_spread() {
        let showcase = build();
        let stars: Vec<_> = showcase
            .scene
            .objects
            .iter()
            .filter(|o| o.name.starts_with("star-"))
            .collect();
        assert_eq!(stars.len(), 200);
        for star in stars {
            let p = star.transform.position;
            for c in [p.x, p.y, p.z] {
                assert!((-50.0..=50.0).contains(&c), "star coordinate {c} out of range");
            }
        }
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let a = build();
        let b = build();
        let positions = |s: &Showcase| -> Vec<Vec3> {
            s.scene.objects.iter().map(|o| o.transform.position).collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn named_objects_are_placed() {
        let showcase = build();
        let scene = &showcase.scene;
        let avatar = scene.get(showcase.handles.avatar).expect("avatar");
        let moon = scene.get(showcase.handles.moon).expect("moon");
        let torus = scene.get(showcase.handles.torus).expect("torus");

        assert_eq!(avatar.transform.position, Vec3::new(2.0, 0.0, -5.0));
        assert_eq!(moon.transform.position, Vec3::new(-10.0, 0.0, 30.0));
        assert_eq!(torus.transform.position, Vec3::ZERO);
        assert_eq!(avatar.material.shading, Shading::Basic);
        assert!(moon.material.map.is_some() && moon.material.normal_map.is_some());
    }

    #[test]
    fn camera_starts_with_fixed_intrinsics() {
        let showcase = build();
        let camera = &showcase.camera;
        assert_eq!(camera.fov_degrees(), 75.0);
        assert_eq!(camera.near(), 0.1);
        assert_eq!(camera.far(), 1000.0);
        assert_eq!(camera.position(), Vec3::new(-3.0, 0.0, 30.0));
    }

    #[test]
    fn textures_resolve_against_asset_dir() {
        let showcase = build();
        let scene = &showcase.scene;
        let background = scene.background.and_then(|id| scene.texture(id)).expect("background");
        assert_eq!(background.path, PathBuf::from("assets").join("space.jpg"));
        let normals: Vec<_> = scene
            .textures
            .iter()
            .filter(|t| t.kind == TextureKind::Normal)
            .collect();
        assert_eq!(normals.len(), 1);
        assert!(normals[0].path.ends_with("normal.jpg"));
    }
}
