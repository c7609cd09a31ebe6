pub mod backend_config;
pub mod geometry_utils;
pub mod landmark_source;
pub mod replay;
pub mod systems;
pub mod tether_interface;
pub mod tracking;

pub type Point2D = (f32, f32);
