use crate::coord::CoordRecord;

/// Right triangle with legs 4 and 3, open ring.
pub(crate) fn triangle() -> Vec<CoordRecord> {
    vec![
        CoordRecord::with_id("B1", 0., 0., 1),
        CoordRecord::with_id("B2", 4., 0., 2),
        CoordRecord::with_id("B3", 4., 3., 3),
    ]
}

/// 10 x 10 square without IDs, open ring.
pub(crate) fn square() -> Vec<CoordRecord> {
    vec![
        CoordRecord::new(0., 0., 1),
        CoordRecord::new(10., 0., 2),
        CoordRecord::new(10., 10., 3),
        CoordRecord::new(0., 10., 4),
    ]
}
