pub mod help;
pub mod metadata;
pub mod preview;
pub mod status_bar;
pub mod tree;
