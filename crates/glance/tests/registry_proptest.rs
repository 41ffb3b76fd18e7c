//! Property tests for the geometry registry.

use glance::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
    Update(usize),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..6usize).prop_map(Op::Add),
        3 => (0..6usize).prop_map(Op::Remove),
        2 => (0..6usize).prop_map(Op::Update),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn registry_matches_model(ops in prop::collection::vec(op(), 0..40)) {
        let pool: Vec<SharedGeometry> = (0..6)
            .map(|i| {
                let offset = Vec3::splat(i as f32);
                let geometry: SharedGeometry =
                    share(PointCloud::new(vec![offset, offset + Vec3::ONE]));
                geometry
            })
            .collect();

        let mut vis = Visualizer::new(HeadlessBackend::new());
        vis.create_visualizer_window(WindowConfig::new("proptest", 64, 64)).unwrap();
        let mut model = [false; 6];

        vis.poll_events();

        for op in ops {
            let succeeded = match op {
                Op::Add(i) => {
                    let added = vis.add_geometry(pool[i].clone(), false).is_ok();
                    prop_assert_eq!(added, !model[i]);
                    model[i] = true;
                    added
                }
                Op::Remove(i) => {
                    let removed = vis.remove_geometry(&pool[i], false).is_ok();
                    prop_assert_eq!(removed, model[i]);
                    model[i] = false;
                    removed
                }
                Op::Update(i) => {
                    let updated = vis.update_geometry(Some(&pool[i])).is_ok();
                    prop_assert_eq!(updated, model[i]);
                    updated
                }
                Op::Clear => {
                    vis.clear_geometries();
                    model = [false; 6];
                    true
                }
            };

            // A successful mutation marks the view dirty; the next pass cleans it
            prop_assert_eq!(vis.is_redraw_required(), succeeded);
            prop_assert!(vis.poll_events());
            prop_assert!(!vis.is_redraw_required());

            let expected = model.iter().filter(|m| **m).count();
            prop_assert_eq!(vis.geometry_count(), expected);
            prop_assert_eq!(vis.geometry_renderer_count(), expected);
            for (geometry, registered) in pool.iter().zip(model) {
                prop_assert_eq!(vis.contains_geometry(geometry), registered);
            }
        }

        // Every renderer ever created is released exactly once
        vis.destroy_visualizer_window();
        let journal = vis.backend().journal().unwrap();
        let journal = journal.borrow();
        let mut released = journal.releases.clone();
        released.sort();
        released.dedup();
        prop_assert_eq!(released.len(), journal.releases.len());
    }
}
