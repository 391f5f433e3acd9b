#![allow(dead_code)]

pub mod draw;
