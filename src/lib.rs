#![warn(clippy::pedantic)]
#![allow(clippy::non_ascii_literal)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod grammar;
pub mod limits;
mod params;
mod parser;
mod request;

pub use crate::error::Error;
pub use crate::parser::{
    ParseStatus,
    Parser,
};
pub use crate::request::Request;
