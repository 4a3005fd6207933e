/// UI module exports
pub mod components;
pub mod history;
pub mod popup;
