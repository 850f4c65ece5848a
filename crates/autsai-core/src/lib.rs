//! Screen logic for the partner back office: view-models, the booking
//! filter engine, calendar windowing and the screen controllers that tie
//! them to a [`autsai_db::Gateway`].

pub mod calendar;
pub mod draft;
pub mod error;
pub mod filter;
pub mod sample;
pub mod screens;
pub mod shell;
pub mod view_models;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ScreenError;
