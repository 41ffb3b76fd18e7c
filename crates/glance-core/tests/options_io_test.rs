//! File round-trip for render options.

use glance_core::{MeshShadeOption, RenderOption, Vec3};

#[test]
fn test_render_option_file_round_trip() {
    let path = std::env::temp_dir().join(format!("glance_render_option_{}.json", std::process::id()));

    let mut option = RenderOption::default();
    option.background_color = Vec3::new(0.1, 0.2, 0.3);
    option.mesh_shade_option = MeshShadeOption::SmoothShade;
    option.show_coordinate_frame = false;
    option.save_json(&path).expect("save failed");

    let loaded = RenderOption::load_json(&path).expect("load failed");
    assert_eq!(loaded, option);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_missing_file_is_io_error() {
    let result = RenderOption::load_json("/nonexistent/glance/option.json");
    assert!(matches!(result, Err(glance_core::GlanceError::Io(_))));
}
