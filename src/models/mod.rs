pub mod gallery_item;
pub mod gallery_layout;
pub mod gallery_row;

pub use gallery_item::*;
pub use gallery_layout::*;
pub use gallery_row::*;
