use geo::{line_string, LineString};

use crate::geometry::FeatureDraft;

pub(crate) fn ls0() -> LineString {
    line_string![
        (x: 0., y: 1.),
        (x: 1., y: 2.)
    ]
}

pub(crate) fn ls1() -> LineString {
    line_string![
        (x: 3., y: 4.),
        (x: 5., y: 6.)
    ]
}

pub(crate) fn drafts() -> Vec<FeatureDraft> {
    vec![FeatureDraft::new(ls0(), "L1"), FeatureDraft::new(ls1(), "L2")]
}
