//! Label and calendar text: font lookup, glyph caching and compositing

mod font;
mod glyph_cache;
mod renderer;

pub use font::{FontDescription, FontId, FontManager, FontStyle, FontWeight};
pub use glyph_cache::GlyphCache;
pub use renderer::TextRenderer;
