pub mod cms;
pub mod config;
pub mod content;
pub mod importers;
pub mod models;
pub mod normalize;
