pub mod commands;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use theme::{Paint, ThemeToken};
pub use types::{Color, Margins, Point, Rect, Viewport};
