//! Enters giveaways automatically.
//! Scrapes every open giveaway, drops the ones already entered or not asked for in the
//! requests file and enters the rest until the site runs us out of points.

mod error;
mod macros;

pub mod classify;
pub mod config;
pub mod entered;
pub mod giveaway;
pub mod parse;
pub mod process;
pub mod request;
pub mod rules;
pub mod scrape;
pub mod session;
pub mod submit;

pub use error::{Error, Result};
