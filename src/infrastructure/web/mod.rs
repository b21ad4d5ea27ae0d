//! Web acquisition adapters

pub mod browser;
pub mod html;

pub use browser::{BrowserSession, HttpBrowser, PageState};
