pub mod checkerboard;
pub mod constant;
pub mod imagemap;
