pub mod config;
pub mod consts;
pub mod utils;

pub mod entity;
pub mod payroll;
pub mod repo;
pub mod pages;

#[cfg(test)]
mod testing;
