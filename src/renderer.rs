// Renderer module for Starfield-3D

use crate::assets::{ImageData, LoadedTexture};
use crate::camera::PerspectiveCamera;
use crate::error::{Error, Result};
use crate::geometry::{MeshData, Vertex};
use crate::material::Material;
use crate::scene::{Light, Scene, SceneObject, TextureId, TextureKind};
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// Per-frame values shared by every object
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    point_position: [f32; 4],
    point_color: [f32; 4],
}

impl Globals {
    fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        // Only the first point light is shaded
        let (point_position, point_color) = match scene.point_light() {
            Some(&Light::Point {
                color,
                intensity,
                decay,
                position,
            }) => (position.extend(decay).to_array(), color.scaled(intensity).to_array(1.0)),
            _ => ([0.0; 4], [0.0; 4]),
        };

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_position: camera.position().extend(1.0).to_array(),
            ambient: scene.ambient_light().to_array(1.0),
            point_position,
            point_color,
        }
    }
}

// Per-object uniform block
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

impl ObjectUniforms {
    fn new(object: &SceneObject) -> Self {
        let material = &object.material;
        let flag = |on: bool| if on { 1.0 } else { 0.0 };
        Self {
            model: object.transform.matrix().to_cols_array_2d(),
            color: material.color.to_array(1.0),
            params: [
                flag(material.is_lit()),
                flag(material.normal_map.is_some()),
                0.0,
                0.0,
            ],
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuObject {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuTexture {
    // Kept alive for the view
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    scene_pipeline: wgpu::RenderPipeline,
    background_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    background_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    default_color: GpuTexture,
    default_normal: GpuTexture,
    textures: HashMap<TextureId, GpuTexture>,
    meshes: Vec<GpuMesh>,
    objects: Vec<GpuObject>,
    background: Option<wgpu::BindGroup>,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    /// Binds a renderer to `window` and uploads every mesh and object in `scene`.
    pub async fn new(window: Arc<Window>, scene: &Scene, camera: &PerspectiveCamera) -> Result<Self> {
        // Initialize wgpu
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        // Get surface from window
        let surface = instance.create_surface(window.clone())?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(Error::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Renderer Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits::default(),
                },
                None, // Trace path
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, alpha_mode) =
            choose_surface_format(&surface_caps.formats, &surface_caps.alpha_modes)?;

        // Surface is sized in physical pixels, which matches the display density
        let size = window.inner_size();
        log::info!(
            "Surface {}x{} ({:?}, scale factor {})",
            size.width,
            size.height,
            surface_format,
            window.scale_factor()
        );
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        // Bind group layouts
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[uniform_entry(0)],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                texture_entry(1),
                texture_entry(2),
                sampler_entry(3),
            ],
        });
        let background_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Background Bind Group Layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let scene_pipeline = create_scene_pipeline(
            &device,
            surface_format,
            &[&globals_layout, &object_layout],
        );
        let background_pipeline =
            create_background_pipeline(&device, surface_format, &background_layout);

        // Globals uniform
        let globals = Globals::new(scene, camera);
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::cast_slice(&[globals]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Map Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Stand-ins until the real textures arrive
        let default_color = create_texture(
            &device,
            &queue,
            &ImageData {
                width: 1,
                height: 1,
                rgba: vec![255, 255, 255, 255],
            },
            TextureKind::Color,
        );
        let default_normal = create_texture(
            &device,
            &queue,
            &ImageData {
                width: 1,
                height: 1,
                rgba: vec![128, 128, 255, 255],
            },
            TextureKind::Normal,
        );

        let meshes = scene
            .meshes
            .iter()
            .map(|mesh| upload_mesh(&device, mesh))
            .collect();

        let depth_view = create_depth_view(&device, &surface_config);

        let mut renderer = Self {
            device,
            queue,
            surface,
            surface_config,
            scene_pipeline,
            background_pipeline,
            globals_buffer,
            globals_bind_group,
            object_layout,
            background_layout,
            sampler,
            default_color,
            default_normal,
            textures: HashMap::new(),
            meshes,
            objects: Vec::new(),
            background: None,
            depth_view,
        };

        let objects = scene
            .objects
            .iter()
            .map(|object| renderer.create_object(object))
            .collect();
        renderer.objects = objects;

        Ok(renderer)
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.surface_config.width, self.surface_config.height)
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Puts a freshly decoded texture on the GPU and rebinds everything using it.
    pub fn upload_texture(&mut self, scene: &Scene, loaded: LoadedTexture) {
        let max = self.device.limits().max_texture_dimension_2d;
        if loaded.image.width > max || loaded.image.height > max {
            log::warn!(
                "Texture {:?} is {}x{}, larger than the device limit {max}; keeping the default",
                loaded.id,
                loaded.image.width,
                loaded.image.height
            );
            return;
        }

        let texture = create_texture(&self.device, &self.queue, &loaded.image, loaded.kind);
        self.textures.insert(loaded.id, texture);
        if let Some(request) = scene.texture(loaded.id) {
            log::info!("Texture {} loaded", request.path.display());
        }

        if scene.background == Some(loaded.id) {
            self.background = self
                .textures
                .get(&loaded.id)
                .map(|texture| self.create_background_bind_group(&texture.view));
        }

        for (index, object) in scene.objects.iter().enumerate() {
            if !object.material.uses(loaded.id) {
                continue;
            }
            let Some(gpu) = self.objects.get(index) else {
                continue;
            };
            let bind_group = self.create_object_bind_group(&gpu.uniform_buffer, &object.material);
            self.objects[index].bind_group = bind_group;
        }
    }

    /// Draws the background and every object as seen from `camera`.
    pub fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        // Update uniforms
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&[Globals::new(scene, camera)]),
        );
        for (gpu, object) in self.objects.iter().zip(&scene.objects) {
            self.queue.write_buffer(
                &gpu.uniform_buffer,
                0,
                bytemuck::cast_slice(&[ObjectUniforms::new(object)]),
            );
        }

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // Background first, it never writes depth
            if let Some(background) = &self.background {
                render_pass.set_pipeline(&self.background_pipeline);
                render_pass.set_bind_group(0, background, &[]);
                render_pass.draw(0..3, 0..1);
            }

            render_pass.set_pipeline(&self.scene_pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (gpu, object) in self.objects.iter().zip(&scene.objects) {
                let Some(mesh) = self.meshes.get(object.mesh.0) else {
                    continue;
                };
                render_pass.set_bind_group(1, &gpu.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn create_object(&self, object: &SceneObject) -> GpuObject {
        let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Uniform Buffer"),
            contents: bytemuck::cast_slice(&[ObjectUniforms::new(object)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.create_object_bind_group(&uniform_buffer, &object.material);
        GpuObject {
            uniform_buffer,
            bind_group,
        }
    }

    fn create_object_bind_group(&self, uniform_buffer: &wgpu::Buffer, material: &Material) -> wgpu::BindGroup {
        let map = self.texture_view(material.map, &self.default_color);
        let normal_map = self.texture_view(material.normal_map, &self.default_normal);

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(map),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(normal_map),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    fn create_background_bind_group(&self, view: &wgpu::TextureView) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Background Bind Group"),
            layout: &self.background_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    // Loaded texture if present, otherwise the fallback
    fn texture_view<'a>(&'a self, id: Option<TextureId>, fallback: &'a GpuTexture) -> &'a wgpu::TextureView {
        id.and_then(|id| self.textures.get(&id))
            .map(|texture| &texture.view)
            .unwrap_or(&fallback.view)
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn create_scene_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    // Load shader
    let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
    });

    // Define vertex buffer layout
    let vertex_buffer_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Scene Pipeline Layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Scene Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader_module,
            entry_point: "vs_main",
            buffers: &[vertex_buffer_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader_module,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

fn create_background_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Background Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("background.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Background Pipeline Layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Background Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader_module,
            entry_point: "vs_background",
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader_module,
            entry_point: "fs_background",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        // Shares the scene pass, so it must accept the depth attachment
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

fn upload_mesh(device: &wgpu::Device, mesh: &MeshData) -> GpuMesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Vertex Buffer"),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Index Buffer"),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: mesh.indices.len() as u32,
    }
}

fn create_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &ImageData,
    kind: TextureKind,
) -> GpuTexture {
    let format = match kind {
        TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureKind::Normal => wgpu::TextureFormat::Rgba8Unorm,
    };
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Scene Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture {
        _texture: texture,
        view,
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Picks the surface format and alpha mode. Prefers an sRGB format so linear
/// shader output is encoded on write.
fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    alpha_modes: &[wgpu::CompositeAlphaMode],
) -> Result<(wgpu::TextureFormat, wgpu::CompositeAlphaMode)> {
    let format = formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
        .ok_or(Error::IncompatibleSurface("formats"))?;
    let alpha_mode = alpha_modes
        .first()
        .copied()
        .ok_or(Error::IncompatibleSurface("alpha modes"))?;
    Ok((format, alpha_mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::showcase::Showcase;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn showcase() -> Showcase {
        Showcase::build(&Config::default(), 1.0, &mut StdRng::seed_from_u64(9))
    }

    #[test]
    fn surface_prefers_srgb_format() {
        use wgpu::{CompositeAlphaMode, TextureFormat};
        let chosen = choose_surface_format(
            &[TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb],
            &[CompositeAlphaMode::Opaque, CompositeAlphaMode::PreMultiplied],
        )
        .expect("formats available");
        assert_eq!(chosen, (TextureFormat::Bgra8UnormSrgb, CompositeAlphaMode::Opaque));

        let fallback = choose_surface_format(&[TextureFormat::Rgba16Float], &[CompositeAlphaMode::Auto])
            .expect("formats available");
        assert_eq!(fallback.0, TextureFormat::Rgba16Float);
    }

    #[test]
    fn empty_surface_capabilities_are_an_error() {
        let err = choose_surface_format(&[], &[wgpu::CompositeAlphaMode::Opaque]).unwrap_err();
        assert!(matches!(err, Error::IncompatibleSurface("formats")));

        let err = choose_surface_format(&[wgpu::TextureFormat::Bgra8UnormSrgb], &[]).unwrap_err();
        assert!(matches!(err, Error::IncompatibleSurface("alpha modes")));
        assert_eq!(err.to_string(), "surface reports no supported alpha modes");
    }

    #[test]
    fn uniform_blocks_match_shader_sizes() {
        assert_eq!(std::mem::size_of::<Globals>(), 128);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 96);
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn globals_carry_scene_lights() {
        let showcase = showcase();
        let globals = Globals::new(&showcase.scene, &showcase.camera);
        assert_eq!(globals.point_position, [5.0, 5.0, 5.0, 2.0]);
        for channel in globals.point_color[..3].iter().chain(&globals.ambient[..3]) {
            assert_relative_eq!(*channel, 1.0, epsilon = 1e-5);
        }
        assert_eq!(globals.camera_position, [-3.0, 0.0, 30.0, 1.0]);
    }

    #[test]
    fn object_flags_follow_material() {
        let showcase = showcase();
        let scene = &showcase.scene;
        let moon = scene.get(showcase.handles.moon).map(ObjectUniforms::new).expect("moon");
        let avatar = scene.get(showcase.handles.avatar).map(ObjectUniforms::new).expect("avatar");
        assert_eq!(moon.params[..2], [1.0, 1.0]);
        assert_eq!(avatar.params[..2], [0.0, 0.0]);
        assert_eq!(moon.model[3], [-10.0, 0.0, 30.0, 1.0]);
    }
}
