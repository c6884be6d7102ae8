mod json;
mod text;

pub use json::render_json;
pub use text::TreeRenderer;
