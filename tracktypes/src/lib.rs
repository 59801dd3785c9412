extern crate nalgebra as na;

pub mod catalog;
pub mod lla;
pub mod mode;
pub mod prelude;
pub mod record;
