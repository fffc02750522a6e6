pub mod raster;
pub mod webpmux;
