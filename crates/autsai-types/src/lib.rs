pub mod api;
pub mod codec;
pub mod collection;
pub mod models;
pub mod notification;

pub use collection::Collection;
