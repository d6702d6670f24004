pub mod codecs;
pub mod config;
pub mod producer;
pub mod template;
