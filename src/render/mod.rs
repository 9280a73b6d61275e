pub mod svg;
pub mod view;
