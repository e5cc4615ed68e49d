pub mod color_literal;
pub mod color_space;
pub mod decoder;
pub mod inspect;
pub mod payload;
pub mod raster;
pub mod sampler;
pub mod scorer;
