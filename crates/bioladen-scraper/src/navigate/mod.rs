//! Browser-side navigation of the dealer search form.

pub mod chrome;
mod controller;
pub mod locator;
mod page;
mod settings;
mod state;

pub use chrome::{ChromeBrowser, ChromePage};
pub use controller::{NavReport, NavigationController};
pub use locator::{Locator, LocatorChain};
pub use page::{BrowserPage, PageFactory};
pub use settings::NavSettings;
pub use state::{Interaction, NavState};
