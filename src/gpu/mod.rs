pub mod batch;
pub mod buffer;
pub mod commands;
pub mod context;
pub mod driver;
pub mod error;
pub mod image;
pub mod object;
pub mod program;
pub mod staging;
pub mod sync;

pub use batch::*;
pub use buffer::*;
pub use commands::*;
pub use context::*;
pub use error::*;
pub use image::*;
pub use object::*;
pub use program::*;
pub use staging::*;
pub use sync::*;
