pub(crate) mod linestring;
pub(crate) mod properties;
pub(crate) mod records;
