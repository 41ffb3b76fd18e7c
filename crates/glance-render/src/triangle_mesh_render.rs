//! Triangle mesh renderer.

use std::collections::HashSet;

use glam::{UVec3, Vec3};
use glance_core::{
    AxisAlignedBoundingBox, ColorMapOption, GeometryKind, MeshColorOption, MeshShadeOption,
    RenderOption, SharedGeometry,
};
use glance_geometry::TriangleMesh;

use crate::canvas::Canvas;
use crate::color_maps::{normal_to_color, ColorMap};
use crate::draw::{DrawBatch, DrawKey, DrawUniforms, Primitive, RendererId, Vertex};
use crate::renderer::{CachedBatch, GeometryRenderer, RendererBase};
use crate::view_control::ViewControl;

const FACES_SLOT: u32 = 0;
const WIREFRAME_SLOT: u32 = 1;

const WIREFRAME_COLOR: Vec3 = Vec3::splat(0.1);

/// Inputs the face batch depends on besides the mesh itself.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FaceKey {
    shade: MeshShadeOption,
    color: MeshColorOption,
    map: ColorMapOption,
    default_color: [u32; 3],
}

impl FaceKey {
    fn new(option: &RenderOption) -> Self {
        Self {
            shade: option.mesh_shade_option,
            color: option.mesh_color_option,
            map: option.color_map,
            default_color: option.default_mesh_color.to_array().map(f32::to_bits),
        }
    }
}

/// Contents read from the bound mesh at the last resync.
struct MeshData {
    vertices: Vec<Vec3>,
    triangles: Vec<UVec3>,
    vertex_normals: Vec<Vec3>,
    triangle_normals: Vec<Vec3>,
    colors: Option<Vec<Vec3>>,
    bbox: AxisAlignedBoundingBox,
}

impl MeshData {
    fn read(mesh: &TriangleMesh) -> Self {
        let n = mesh.vertices.len() as u32;
        let mut copy = TriangleMesh::new(
            mesh.vertices.clone(),
            mesh.triangles
                .iter()
                .copied()
                .filter(|t| t.x < n && t.y < n && t.z < n)
                .collect(),
        );
        if copy.triangles.len() != mesh.triangles.len() {
            log::warn!(
                "skipping {} triangles with out-of-range indices",
                mesh.triangles.len() - copy.triangles.len()
            );
        }
        copy.compute_triangle_normals();
        if mesh.has_vertex_normals() {
            copy.vertex_normals.clone_from(&mesh.vertex_normals);
        } else {
            copy.compute_vertex_normals();
        }
        Self {
            bbox: AxisAlignedBoundingBox::from_points(&copy.vertices).unwrap_or_default(),
            colors: mesh.has_vertex_colors().then(|| mesh.vertex_colors.clone()),
            vertices: copy.vertices,
            triangles: copy.triangles,
            vertex_normals: copy.vertex_normals,
            triangle_normals: copy.triangle_normals,
        }
    }

    fn color(&self, key: &FaceKey, map: &ColorMap, vertex: usize, normal: Vec3) -> Vec3 {
        let p = self.vertices[vertex];
        let along = |axis: usize| map.sample(self.bbox.percentage(p[axis], axis));
        match key.color {
            MeshColorOption::Default | MeshColorOption::Color => self
                .colors
                .as_ref()
                .map_or(Vec3::from_array(key.default_color.map(f32::from_bits)), |c| {
                    c[vertex]
                }),
            MeshColorOption::XCoordinate => along(0),
            MeshColorOption::YCoordinate => along(1),
            MeshColorOption::ZCoordinate => along(2),
            MeshColorOption::Normal => normal_to_color(normal),
        }
    }

    fn faces_batch(&self, key: &FaceKey) -> DrawBatch {
        let map = ColorMap::from_option(key.map);
        let mut batch = DrawBatch::new(Primitive::Triangles);
        match key.shade {
            MeshShadeOption::FlatShade => {
                for (t, normal) in self.triangles.iter().zip(&self.triangle_normals) {
                    for v in t.to_array() {
                        let v = v as usize;
                        batch.indices.push(batch.vertices.len() as u32);
                        batch.vertices.push(Vertex::new(
                            self.vertices[v],
                            *normal,
                            self.color(key, &map, v, *normal),
                        ));
                    }
                }
            }
            MeshShadeOption::SmoothShade => {
                batch.vertices = self
                    .vertices
                    .iter()
                    .zip(&self.vertex_normals)
                    .enumerate()
                    .map(|(i, (p, n))| Vertex::new(*p, *n, self.color(key, &map, i, *n)))
                    .collect();
                batch.indices = self.triangles.iter().flat_map(|t| t.to_array()).collect();
            }
        }
        batch
    }

    fn wireframe_batch(&self) -> DrawBatch {
        let mut batch = DrawBatch::new(Primitive::Lines);
        batch.vertices = self
            .vertices
            .iter()
            .zip(&self.vertex_normals)
            .map(|(p, n)| Vertex::new(*p, *n, WIREFRAME_COLOR))
            .collect();
        let mut seen = HashSet::new();
        for t in &self.triangles {
            for (a, b) in [(t.x, t.y), (t.y, t.z), (t.z, t.x)] {
                if seen.insert((a.min(b), a.max(b))) {
                    batch.indices.extend([a, b]);
                }
            }
        }
        batch
    }
}

/// Draws a [`TriangleMesh`] with flat or smooth shading and an optional wireframe.
pub struct TriangleMeshRenderer {
    base: RendererBase,
    data: Option<MeshData>,
    faces: CachedBatch<FaceKey>,
    wireframe: CachedBatch<()>,
}

impl TriangleMeshRenderer {
    /// Creates an unbound renderer.
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(),
            data: None,
            faces: CachedBatch::new(),
            wireframe: CachedBatch::new(),
        }
    }
}

impl Default for TriangleMeshRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryRenderer for TriangleMeshRenderer {
    fn id(&self) -> RendererId {
        self.base.id
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::TriangleMesh
    }

    fn initialize(&mut self, geometry: &SharedGeometry) -> bool {
        self.base.bind(geometry);
        if self.resync() {
            true
        } else {
            self.base.geometry = None;
            false
        }
    }

    fn resync(&mut self) -> bool {
        let Some(geometry) = &self.base.geometry else {
            return false;
        };
        let Ok(guard) = geometry.read() else {
            log::debug!("mesh renderer {}: geometry lock poisoned", self.base.id);
            return false;
        };
        let Some(mesh) = guard.as_any().downcast_ref::<TriangleMesh>() else {
            return false;
        };
        self.data = Some(MeshData::read(mesh));
        self.faces.invalidate();
        self.wireframe.invalidate();
        true
    }

    fn render(
        &mut self,
        option: &RenderOption,
        view: &ViewControl,
        canvas: &mut dyn Canvas,
    ) -> bool {
        let Some(data) = &self.data else {
            return false;
        };
        if !self.base.visible || data.triangles.is_empty() {
            return true;
        }

        let id = self.base.id;
        let uniforms = DrawUniforms::new(view, option);
        let key = FaceKey::new(option);
        let faces = self.faces.get_or_build(key, || data.faces_batch(&key));
        canvas.draw(DrawKey::new(id, FACES_SLOT), faces, &uniforms);

        if option.mesh_show_wireframe {
            let wireframe = self.wireframe.get_or_build((), || data.wireframe_batch());
            canvas.draw(DrawKey::new(id, WIREFRAME_SLOT), wireframe, &uniforms.unlit());
        }
        true
    }

    fn geometry(&self) -> Option<&SharedGeometry> {
        self.base.geometry.as_ref()
    }

    fn is_visible(&self) -> bool {
        self.base.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.base.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use glance_core::share;

    fn quad() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)],
        )
    }

    fn render_once(
        renderer: &mut TriangleMeshRenderer,
        option: &RenderOption,
    ) -> Vec<crate::canvas::DrawRecord> {
        let mut canvas = RecordingCanvas::new(32, 32);
        let journal = canvas.journal();
        canvas.begin_frame(Vec3::ONE);
        assert!(renderer.render(option, &ViewControl::default(), &mut canvas));
        let draws = journal.borrow().frame_draws.clone();
        draws
    }

    #[test]
    fn test_flat_and_smooth_vertex_counts() {
        let geometry: SharedGeometry = share(quad());
        let mut renderer = TriangleMeshRenderer::new();
        assert!(renderer.initialize(&geometry));

        let mut option = RenderOption::default();
        let flat = render_once(&mut renderer, &option);
        assert_eq!(flat[0].vertex_count, 6);
        assert_eq!(flat[0].index_count, 6);

        option.toggle_shading_option();
        let smooth = render_once(&mut renderer, &option);
        assert_eq!(smooth[0].vertex_count, 4);
        assert_eq!(smooth[0].index_count, 6);
    }

    #[test]
    fn test_wireframe_deduplicates_edges() {
        let geometry: SharedGeometry = share(quad());
        let mut renderer = TriangleMeshRenderer::new();
        renderer.initialize(&geometry);

        let mut option = RenderOption::default();
        option.toggle_mesh_show_wireframe();
        let draws = render_once(&mut renderer, &option);
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].primitive, Primitive::Lines);
        // 4 outer edges and 1 diagonal
        assert_eq!(draws[1].index_count, 10);
    }

    #[test]
    fn test_default_color_without_vertex_colors() {
        let data = MeshData::read(&quad());
        let option = RenderOption::default();
        let key = FaceKey::new(&option);
        let map = ColorMap::from_option(option.color_map);
        assert_eq!(data.color(&key, &map, 0, Vec3::Z), option.default_mesh_color);

        let mut colored = quad();
        colored.paint_uniform_color(Vec3::new(1.0, 0.0, 0.0));
        let data = MeshData::read(&colored);
        assert_eq!(data.color(&key, &map, 2, Vec3::Z), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_out_of_range_triangles_are_skipped() {
        let mut mesh = quad();
        mesh.triangles.push(UVec3::new(0, 1, 99));
        let data = MeshData::read(&mesh);
        assert_eq!(data.triangles.len(), 2);
        assert_eq!(data.triangle_normals.len(), 2);
    }

    #[test]
    fn test_back_face_flag_follows_option() {
        let geometry: SharedGeometry = share(quad());
        let mut renderer = TriangleMeshRenderer::new();
        renderer.initialize(&geometry);

        let mut option = RenderOption::default();
        option.toggle_mesh_show_back_face();
        let draws = render_once(&mut renderer, &option);
        assert_ne!(draws[0].flags & crate::draw::flags::BACK_FACE, 0);
    }
}
