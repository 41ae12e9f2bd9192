pub mod logger;
pub mod tiling;
