// Report generation: HTML rendering, S3-backed artifact storage and the
// Redis render queue consumed by a background worker.

pub mod handlers;
pub mod queue;
pub mod render;
pub mod store;
