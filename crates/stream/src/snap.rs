use glam::{DVec2, IVec2};
use tilespace_common::Bounds2;

/// Round `value` to the nearest multiple of `grid`. Non-positive grids
/// leave the value unchanged.
pub fn grid_snap(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        value
    } else {
        (value / grid).round() * grid
    }
}

/// Plain grid snap of an integer translation delta.
pub fn grid_snap_delta(delta: IVec2, grid: i32) -> IVec2 {
    if grid <= 1 {
        return delta;
    }
    IVec2::new(
        grid_snap(delta.x as f64, grid as f64) as i32,
        grid_snap(delta.y as f64, grid as f64) as i32,
    )
}

/// Landscape tiles snap to their terrain component grid, each axis to the
/// nearest multiple of the component size.
pub fn landscape_snap_delta(delta: IVec2, component_size: DVec2) -> IVec2 {
    IVec2::new(
        grid_snap(delta.x as f64, component_size.x) as i32,
        grid_snap(delta.y as f64, component_size.y) as i32,
    )
}

/// Bounds snapping: align the moving group's nearest edge with the nearest
/// static tile edge, independently per axis, when within `snap_distance`.
///
/// `moving` is the group's bounding box before the move. Static boxes
/// farther than `snap_distance` from the expected destination are ignored.
pub fn bounds_snap_delta(
    moving: Bounds2,
    delta: IVec2,
    snap_distance: f64,
    static_bounds: &[Bounds2],
) -> IVec2 {
    if snap_distance <= 0.0 {
        return delta;
    }

    let mut expected = moving.shifted(delta.as_dvec2());
    let test_box = expected.expanded(snap_distance);

    let mut min_distance = DVec2::splat(f64::MAX);
    let mut closest = DVec2::splat(f64::MAX);
    // Which moving-box side is going to be snapped.
    let mut box_side = DVec2::new(expected.min.x, expected.min.y);

    // Edge pairings tested per axis: min/min, min/max, max/min, max/max.
    let moving_x = [expected.min.x, expected.min.x, expected.max.x, expected.max.x];
    let moving_y = [expected.min.y, expected.min.y, expected.max.y, expected.max.y];

    for static_box in static_bounds {
        if !static_box.intersects(&test_box) {
            continue;
        }

        let static_x = [static_box.min.x, static_box.max.x, static_box.min.x, static_box.max.x];
        for i in 0..4 {
            let distance = (static_x[i] - moving_x[i]).abs();
            if distance < min_distance.x {
                min_distance.x = distance;
                closest.x = static_x[i];
                box_side.x = moving_x[i];
            }
        }

        let static_y = [static_box.min.y, static_box.max.y, static_box.min.y, static_box.max.y];
        for i in 0..4 {
            let distance = (static_y[i] - moving_y[i]).abs();
            if distance < min_distance.y {
                min_distance.y = distance;
                closest.y = static_y[i];
                box_side.y = moving_y[i];
            }
        }
    }

    if min_distance.x < snap_distance {
        let difference = closest.x - box_side.x;
        expected.min.x += difference;
        expected.max.x += difference;
    }
    if min_distance.y < snap_distance {
        let difference = closest.y - box_side.y;
        expected.min.y += difference;
        expected.max.y += difference;
    }

    let snapped = expected.center() - moving.center();
    IVec2::new(snapped.x.round() as i32, snapped.y.round() as i32)
}
