pub extern crate nalgebra as na;

pub mod app;
pub mod config;
pub mod gui;
pub mod interrupt;
pub mod map;
pub mod refresh;
pub mod tracker;
pub mod viewer;
