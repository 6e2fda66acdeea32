pub mod cli;
pub mod config;
pub mod consts;
pub mod invoker;
pub mod spinner;
