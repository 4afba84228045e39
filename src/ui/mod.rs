pub mod popup;
pub mod state;
