//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod render;

pub(crate) use convert::ConvertArgs;
pub(crate) use render::RenderArgs;
