#![allow(dead_code)]

pub mod command;
pub mod file;
pub mod upstream;
