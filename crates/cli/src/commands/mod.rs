pub(crate) mod build;
pub(crate) mod constraints;
pub(crate) mod validate;
pub(crate) mod visibility;
