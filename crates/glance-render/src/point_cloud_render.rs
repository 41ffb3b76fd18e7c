//! Point cloud renderer.

use glam::Vec3;
use glance_core::{
    AxisAlignedBoundingBox, ColorMapOption, GeometryKind, PointColorOption, RenderOption,
    SharedGeometry,
};
use glance_geometry::PointCloud;

use crate::canvas::Canvas;
use crate::color_maps::{normal_to_color, ColorMap};
use crate::draw::{DrawBatch, DrawKey, DrawUniforms, Primitive, RendererId, Vertex};
use crate::renderer::{CachedBatch, GeometryRenderer, RendererBase};
use crate::view_control::ViewControl;

const POINTS_SLOT: u32 = 0;
const NORMALS_SLOT: u32 = 1;

/// Normal segment length relative to the cloud's largest extent.
const NORMAL_LENGTH_RATIO: f32 = 0.02;

/// Contents read from the bound point cloud at the last resync.
struct PointCloudData {
    points: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    colors: Option<Vec<Vec3>>,
    bbox: AxisAlignedBoundingBox,
}

impl PointCloudData {
    fn read(cloud: &PointCloud) -> Self {
        Self {
            points: cloud.points.clone(),
            normals: cloud.has_normals().then(|| cloud.normals.clone()),
            colors: cloud.has_colors().then(|| cloud.colors.clone()),
            bbox: AxisAlignedBoundingBox::from_points(&cloud.points).unwrap_or_default(),
        }
    }

    fn point_colors(&self, option: PointColorOption, map: ColorMapOption) -> Vec<Vec3> {
        let map = ColorMap::from_option(map);
        let along = |axis: usize| -> Vec<Vec3> {
            self.points
                .iter()
                .map(|p| map.sample(self.bbox.percentage(p[axis], axis)))
                .collect()
        };
        match option {
            PointColorOption::Default | PointColorOption::Color => {
                self.colors.clone().unwrap_or_else(|| along(2))
            }
            PointColorOption::XCoordinate => along(0),
            PointColorOption::YCoordinate => along(1),
            PointColorOption::ZCoordinate => along(2),
            PointColorOption::Normal => match &self.normals {
                Some(normals) => normals.iter().map(|n| normal_to_color(*n)).collect(),
                None => along(2),
            },
        }
    }

    fn points_batch(&self, option: PointColorOption, map: ColorMapOption) -> DrawBatch {
        let colors = self.point_colors(option, map);
        let mut batch = DrawBatch::new(Primitive::Points);
        batch.vertices = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let normal = self.normals.as_ref().map_or(Vec3::ZERO, |n| n[i]);
                Vertex::new(*p, normal, colors[i])
            })
            .collect();
        batch
    }

    fn normals_batch(&self) -> DrawBatch {
        let mut batch = DrawBatch::new(Primitive::Lines);
        let Some(normals) = &self.normals else {
            return batch;
        };
        let extent = self.bbox.max_extent();
        let length = NORMAL_LENGTH_RATIO * if extent > 0.0 { extent } else { 1.0 };
        for (i, (p, n)) in self.points.iter().zip(normals).enumerate() {
            let color = normal_to_color(*n);
            batch.vertices.push(Vertex::new(*p, *n, color));
            batch.vertices.push(Vertex::new(*p + *n * length, *n, color));
            let base = (2 * i) as u32;
            batch.indices.extend([base, base + 1]);
        }
        batch
    }
}

/// Draws a [`PointCloud`] as screen-space sprites.
pub struct PointCloudRenderer {
    base: RendererBase,
    data: Option<PointCloudData>,
    points: CachedBatch<(PointColorOption, ColorMapOption)>,
    normals: CachedBatch<()>,
}

impl PointCloudRenderer {
    /// Creates an unbound renderer.
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(),
            data: None,
            points: CachedBatch::new(),
            normals: CachedBatch::new(),
        }
    }
}

impl Default for PointCloudRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryRenderer for PointCloudRenderer {
    fn id(&self) -> RendererId {
        self.base.id
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::PointCloud
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
            log::debug!("point cloud renderer {}: geometry lock poisoned", self.base.id);
            return false;
        };
        let Some(cloud) = guard.as_any().downcast_ref::<PointCloud>() else {
            return false;
        };
        self.data = Some(PointCloudData::read(cloud));
        self.points.invalidate();
        self.normals.invalidate();
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
        if !self.base.visible || data.points.is_empty() {
            return true;
        }

        let mut uniforms = DrawUniforms::new(view, option);
        if data.normals.is_none() {
            uniforms = uniforms.unlit();
        }

        let id = self.base.id;
        let points = self
            .points
            .get_or_build((option.point_color_option, option.color_map), || {
                data.points_batch(option.point_color_option, option.color_map)
            });
        canvas.draw(DrawKey::new(id, POINTS_SLOT), points, &uniforms);

        if option.point_show_normal && data.normals.is_some() {
            let normals = self.normals.get_or_build((), || data.normals_batch());
            canvas.draw(DrawKey::new(id, NORMALS_SLOT), normals, &uniforms.unlit());
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
    use glance_geometry::TriangleMesh;

    fn cloud() -> SharedGeometry {
        share(
            PointCloud::new(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)])
                .with_normals(vec![Vec3::Z, Vec3::Z]),
        )
    }

    #[test]
    fn test_initialize_rejects_wrong_type() {
        let mut renderer = PointCloudRenderer::new();
        let mesh: SharedGeometry = share(TriangleMesh::default());
        assert!(!renderer.initialize(&mesh));
        assert!(renderer.geometry().is_none());
    }

    #[test]
    fn test_z_coloring_without_stored_colors() {
        let geometry = cloud();
        let guard = geometry.read().unwrap();
        let data = PointCloudData::read(guard.as_any().downcast_ref::<PointCloud>().unwrap());
        let colors = data.point_colors(PointColorOption::Default, ColorMapOption::Gray);
        assert_eq!(colors, vec![Vec3::ZERO, Vec3::ONE]);

        let colors = data.point_colors(PointColorOption::Normal, ColorMapOption::Gray);
        assert_eq!(colors[0], Vec3::new(0.5, 0.5, 1.0));
    }

    #[test]
    fn test_render_draws_points_and_optional_normals() {
        let geometry = cloud();
        let mut renderer = PointCloudRenderer::new();
        assert!(renderer.initialize(&geometry));

        let mut canvas = RecordingCanvas::new(64, 64);
        let journal = canvas.journal();
        let view = ViewControl::default();
        let mut option = RenderOption::default();

        canvas.begin_frame(Vec3::ONE);
        assert!(renderer.render(&option, &view, &mut canvas));
        assert_eq!(journal.borrow().frame_draws.len(), 1);
        assert_eq!(journal.borrow().frame_draws[0].primitive, Primitive::Points);

        option.toggle_point_show_normal();
        canvas.begin_frame(Vec3::ONE);
        renderer.render(&option, &view, &mut canvas);
        let draws = journal.borrow().frame_draws.clone();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].primitive, Primitive::Lines);
        assert_eq!(draws[1].index_count, 4);
    }

    #[test]
    fn test_color_option_change_rebuilds_batch() {
        let geometry = cloud();
        let mut renderer = PointCloudRenderer::new();
        renderer.initialize(&geometry);
        let mut canvas = RecordingCanvas::new(64, 64);
        let journal = canvas.journal();
        let view = ViewControl::default();
        let mut option = RenderOption::default();

        canvas.begin_frame(Vec3::ONE);
        renderer.render(&option, &view, &mut canvas);
        canvas.begin_frame(Vec3::ONE);
        renderer.render(&option, &view, &mut canvas);
        assert_eq!(journal.borrow().uploads, 1);

        option.point_color_option = PointColorOption::XCoordinate;
        canvas.begin_frame(Vec3::ONE);
        renderer.render(&option, &view, &mut canvas);
        assert_eq!(journal.borrow().uploads, 2);
    }

    #[test]
    fn test_unsynced_mutation_is_not_seen() {
        let typed = glance_core::share(PointCloud::new(vec![Vec3::ZERO]));
        let geometry: SharedGeometry = typed.clone();
        let mut renderer = PointCloudRenderer::new();
        renderer.initialize(&geometry);

        typed.write().unwrap().points.push(Vec3::ONE);
        let mut canvas = RecordingCanvas::new(8, 8);
        let journal = canvas.journal();
        canvas.begin_frame(Vec3::ONE);
        renderer.render(&RenderOption::default(), &ViewControl::default(), &mut canvas);
        assert_eq!(journal.borrow().frame_draws[0].vertex_count, 1);

        assert!(renderer.resync());
        canvas.begin_frame(Vec3::ONE);
        renderer.render(&RenderOption::default(), &ViewControl::default(), &mut canvas);
        assert_eq!(journal.borrow().frame_draws[0].vertex_count, 2);
    }
}
