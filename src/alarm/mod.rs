pub mod model;
pub mod settings;
pub mod wait;
