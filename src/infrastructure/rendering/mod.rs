#[cfg(target_arch = "wasm32")]
pub mod canvas_surface;

#[cfg(target_arch = "wasm32")]
pub use canvas_surface::CanvasSurface;
