//! Camera state and interaction.
//!
//! The camera orbits a look-at point. Its distance follows from the field of
//! view, the zoom factor and the extent of the scene bounding box, so framing
//! stays stable as geometry is added or removed.

use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use glance_core::{AxisAlignedBoundingBox, Result};
use serde::{Deserialize, Serialize};

/// Largest field of view in degrees.
pub const FIELD_OF_VIEW_MAX: f32 = 90.0;
/// Smallest field of view in degrees. At this value the projection is orthographic.
pub const FIELD_OF_VIEW_MIN: f32 = 5.0;
/// Field of view after a reset.
pub const FIELD_OF_VIEW_DEFAULT: f32 = 60.0;
/// Field of view change per step.
pub const FIELD_OF_VIEW_STEP: f32 = 5.0;

/// Largest zoom factor.
pub const ZOOM_MAX: f32 = 2.0;
/// Smallest zoom factor.
pub const ZOOM_MIN: f32 = 0.02;
/// Zoom factor after a reset.
pub const ZOOM_DEFAULT: f32 = 0.7;
/// Zoom change per step.
pub const ZOOM_STEP: f32 = 0.02;

/// Rotation applied per pixel of mouse drag.
pub const ROTATION_RADIAN_PER_PIXEL: f32 = 0.003;

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Perspective projection.
    #[default]
    Perspective,
    /// Orthographic projection.
    Orthographic,
}

/// A serializable snapshot of the camera framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewParameters {
    /// Field of view in degrees.
    pub field_of_view: f32,
    /// Zoom factor.
    pub zoom: f32,
    /// Look-at point.
    pub lookat: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Direction from the look-at point towards the eye.
    pub front: Vec3,
    /// Minimum corner of the framed bounding box.
    pub bounding_box_min: Vec3,
    /// Maximum corner of the framed bounding box.
    pub bounding_box_max: Vec3,
}

/// Camera and viewport state.
#[derive(Debug, Clone)]
pub struct ViewControl {
    bounding_box: AxisAlignedBoundingBox,
    field_of_view: f32,
    zoom: f32,
    lookat: Vec3,
    up: Vec3,
    front: Vec3,
    eye: Vec3,
    distance: f32,
    view_ratio: f32,
    z_near: f32,
    z_far: f32,
    window_width: u32,
    window_height: u32,
}

impl Default for ViewControl {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl ViewControl {
    /// Creates a view control for a window of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let mut view = Self {
            bounding_box: AxisAlignedBoundingBox::empty(),
            field_of_view: FIELD_OF_VIEW_DEFAULT,
            zoom: ZOOM_DEFAULT,
            lookat: Vec3::ZERO,
            up: Vec3::Y,
            front: Vec3::Z,
            eye: Vec3::ZERO,
            distance: 0.0,
            view_ratio: 0.0,
            z_near: 0.0,
            z_far: 0.0,
            window_width: width.max(1),
            window_height: height.max(1),
        };
        view.update_matrices();
        view
    }

    /// Forgets the scene bounding box.
    pub fn reset_bounding_box(&mut self) {
        self.bounding_box = AxisAlignedBoundingBox::empty();
        self.update_matrices();
    }

    /// Grows the scene bounding box to include `bbox`.
    pub fn fit_in_geometry(&mut self, bbox: &AxisAlignedBoundingBox) {
        self.bounding_box.merge(bbox);
        self.update_matrices();
    }

    /// Re-frames the camera on the bounding box with default angles.
    pub fn reset(&mut self) {
        self.field_of_view = FIELD_OF_VIEW_DEFAULT;
        self.zoom = ZOOM_DEFAULT;
        self.lookat = self.bounding_box.center();
        self.up = Vec3::Y;
        self.front = Vec3::Z;
        self.update_matrices();
    }

    /// Sets the viewport size in pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.window_width = width.max(1);
        self.window_height = height.max(1);
        self.update_matrices();
    }

    /// Orbits the camera around the look-at point by a mouse delta in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let alpha = dx * ROTATION_RADIAN_PER_PIXEL;
        let beta = dy * ROTATION_RADIAN_PER_PIXEL;
        let right = self.right();
        if right == Vec3::ZERO {
            return;
        }
        let rotation =
            Quat::from_axis_angle(self.up, -alpha) * Quat::from_axis_angle(right, -beta);
        self.front = (rotation * self.front).normalize();
        self.up = (rotation * self.up).normalize();
        self.update_matrices();
    }

    /// Pans the camera by a mouse delta in pixels.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        let pixel = 2.0 * self.view_ratio / self.window_height as f32;
        let shift = self.right() * (-dx * pixel) + self.up * (dy * pixel);
        self.lookat += shift;
        self.update_matrices();
    }

    /// Changes the zoom factor by `step` increments.
    pub fn scale(&mut self, step: f32) {
        self.zoom = (self.zoom + step * ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
        self.update_matrices();
    }

    /// Changes the field of view by `step` increments.
    pub fn change_field_of_view(&mut self, step: f32) {
        self.field_of_view = (self.field_of_view + step * FIELD_OF_VIEW_STEP)
            .clamp(FIELD_OF_VIEW_MIN, FIELD_OF_VIEW_MAX);
        self.update_matrices();
    }

    /// Sets the look-at point.
    pub fn set_lookat(&mut self, lookat: Vec3) {
        self.lookat = lookat;
        self.update_matrices();
    }

    /// Sets the direction from the look-at point towards the eye.
    ///
    /// The up vector is re-orthogonalized against it.
    pub fn set_front(&mut self, front: Vec3) {
        let front = front.normalize_or_zero();
        if front == Vec3::ZERO {
            return;
        }
        self.front = front;
        self.orthogonalize_up();
        self.update_matrices();
    }

    /// Sets the up vector, re-orthogonalized against the front direction.
    pub fn set_up(&mut self, up: Vec3) {
        let up = up.normalize_or_zero();
        if up == Vec3::ZERO {
            return;
        }
        self.up = up;
        self.orthogonalize_up();
        self.update_matrices();
    }

    /// Sets the zoom factor, clamped to the valid range.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self.update_matrices();
    }

    /// Returns the current projection mode.
    pub fn projection_mode(&self) -> ProjectionMode {
        if self.field_of_view <= FIELD_OF_VIEW_MIN + f32::EPSILON {
            ProjectionMode::Orthographic
        } else {
            ProjectionMode::Perspective
        }
    }

    /// Returns the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.lookat, self.up)
    }

    /// Returns the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.aspect_ratio();
        match self.projection_mode() {
            ProjectionMode::Perspective => Mat4::perspective_rh(
                self.field_of_view.to_radians(),
                aspect,
                self.z_near,
                self.z_far,
            ),
            ProjectionMode::Orthographic => Mat4::orthographic_rh(
                -self.view_ratio * aspect,
                self.view_ratio * aspect,
                -self.view_ratio,
                self.view_ratio,
                self.z_near,
                self.z_far,
            ),
        }
    }

    /// Returns the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the camera position.
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Returns the look-at point.
    pub fn lookat(&self) -> Vec3 {
        self.lookat
    }

    /// Returns the up vector.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Returns the direction from the look-at point towards the eye.
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Returns the field of view in degrees.
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Returns the zoom factor.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Returns the distance from the eye to the look-at point.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Returns the near and far clip distances.
    pub fn clip_planes(&self) -> (f32, f32) {
        (self.z_near, self.z_far)
    }

    /// Returns the scene bounding box.
    pub fn bounding_box(&self) -> &AxisAlignedBoundingBox {
        &self.bounding_box
    }

    /// Returns the viewport size in pixels.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Returns width / height of the viewport.
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }

    /// Captures the current framing.
    pub fn view_parameters(&self) -> ViewParameters {
        ViewParameters {
            field_of_view: self.field_of_view,
            zoom: self.zoom,
            lookat: self.lookat,
            up: self.up,
            front: self.front,
            bounding_box_min: self.bounding_box.min,
            bounding_box_max: self.bounding_box.max,
        }
    }

    /// Restores a framing captured by [`Self::view_parameters`].
    pub fn set_view_parameters(&mut self, params: &ViewParameters) {
        self.field_of_view = params
            .field_of_view
            .clamp(FIELD_OF_VIEW_MIN, FIELD_OF_VIEW_MAX);
        self.zoom = params.zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self.lookat = params.lookat;
        self.bounding_box =
            AxisAlignedBoundingBox::new(params.bounding_box_min, params.bounding_box_max);
        self.front = params.front.try_normalize().unwrap_or(Vec3::Z);
        self.up = params.up.try_normalize().unwrap_or(Vec3::Y);
        self.orthogonalize_up();
        self.update_matrices();
    }

    /// Writes the current framing to a JSON file.
    pub fn save_view_parameters(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.view_parameters())?;
        std::fs::write(path.as_ref(), text)?;
        log::info!("saved view parameters to {}", path.as_ref().display());
        Ok(())
    }

    /// Restores the framing from a JSON file.
    pub fn load_view_parameters(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let params: ViewParameters = serde_json::from_str(&text)?;
        self.set_view_parameters(&params);
        Ok(())
    }

    fn right(&self) -> Vec3 {
        self.up.cross(self.front).normalize_or_zero()
    }

    fn orthogonalize_up(&mut self) {
        let up = self.up - self.front * self.up.dot(self.front);
        self.up = up.try_normalize().unwrap_or_else(|| self.front.any_orthonormal_vector());
    }

    fn update_matrices(&mut self) {
        // An empty or flat scene is framed as a unit box
        let extent = self.bounding_box.max_extent();
        let extent = if extent > 0.0 { extent } else { 1.0 };

        self.view_ratio = self.zoom * extent;
        self.distance = self.view_ratio / (self.field_of_view.to_radians() * 0.5).tan();
        self.eye = self.lookat + self.front * self.distance;
        self.z_near = (0.01 * extent).max(self.distance - 3.0 * extent);
        self.z_far = self.distance + 3.0 * extent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_scene() -> ViewControl {
        let mut view = ViewControl::new(800, 600);
        view.fit_in_geometry(&AxisAlignedBoundingBox::new(Vec3::ZERO, Vec3::splat(2.0)));
        view.reset();
        view
    }

    #[test]
    fn test_reset_centers_on_bounding_box() {
        let view = unit_scene();
        assert_eq!(view.lookat(), Vec3::ONE);
        assert_eq!(view.field_of_view(), FIELD_OF_VIEW_DEFAULT);
        assert_eq!(view.zoom(), ZOOM_DEFAULT);
        assert!((view.eye() - view.lookat()).length() - view.distance() < 1e-4);
        assert!(view.eye().z > view.lookat().z);
    }

    #[test]
    fn test_empty_scene_is_finite() {
        let view = ViewControl::default();
        assert!(view.view_projection_matrix().is_finite());
        let (near, far) = view.clip_planes();
        assert!(near > 0.0 && far > near);
    }

    #[test]
    fn test_field_of_view_minimum_is_orthographic() {
        let mut view = unit_scene();
        assert_eq!(view.projection_mode(), ProjectionMode::Perspective);
        view.change_field_of_view(-100.0);
        assert_eq!(view.field_of_view(), FIELD_OF_VIEW_MIN);
        assert_eq!(view.projection_mode(), ProjectionMode::Orthographic);
        view.change_field_of_view(100.0);
        assert_eq!(view.field_of_view(), FIELD_OF_VIEW_MAX);
    }

    #[test]
    fn test_rotate_keeps_frame_orthonormal() {
        let mut view = unit_scene();
        let distance = view.distance();
        view.rotate(120.0, -45.0);
        assert!((view.front().length() - 1.0).abs() < 1e-5);
        assert!((view.up().length() - 1.0).abs() < 1e-5);
        assert!(view.front().dot(view.up()).abs() < 1e-5);
        assert!((view.distance() - distance).abs() < 1e-4);
        assert_eq!(view.lookat(), Vec3::ONE);
    }

    #[test]
    fn test_drag_right_moves_eye_left() {
        let mut view = unit_scene();
        let before = view.eye();
        view.rotate(50.0, 0.0);
        assert!(view.eye().x < before.x);
    }

    #[test]
    fn test_translate_moves_lookat() {
        let mut view = unit_scene();
        view.translate(10.0, 0.0);
        assert!(view.lookat().x < 1.0);
        assert!((view.lookat().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_parameters_restore() {
        let mut view = unit_scene();
        view.rotate(30.0, 20.0);
        view.scale(5.0);
        let params = view.view_parameters();

        let mut other = ViewControl::new(800, 600);
        other.set_view_parameters(&params);
        assert!((other.eye() - view.eye()).length() < 1e-4);
        assert_eq!(other.bounding_box(), view.bounding_box());

        let json = serde_json::to_string(&params).unwrap();
        let back: ViewParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    proptest! {
        #[test]
        fn zoom_stays_in_range(steps in proptest::collection::vec(-200.0f32..200.0, 0..20)) {
            let mut view = unit_scene();
            for s in steps {
                view.scale(s);
                prop_assert!(view.zoom() >= ZOOM_MIN && view.zoom() <= ZOOM_MAX);
            }
        }
    }
}
