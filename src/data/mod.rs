pub mod export;
pub mod history;
pub mod image;
pub mod parameter;
pub mod parameters;
