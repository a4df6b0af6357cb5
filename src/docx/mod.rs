pub mod builder;

pub use builder::{AssembledDocument, Block, Figure, LayoutBuilder};
