// Structured portfolio generation (fixed Markdown layout), the readiness
// check, the template library endpoints and serving of stored files.

pub mod analyze;
pub mod handlers;
