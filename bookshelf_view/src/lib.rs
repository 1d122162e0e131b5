//! Page controller of the bookshelf catalogue: renders books and shelves
//! fetched through [`bookshelf_api::client`] into injected DOM collaborators.

pub mod controller;
pub mod dom;
pub mod templates;


pub use controller::ViewController;
pub use dom::{
    Alert, AlertKind, BookForm, Confirmer, Content, Element, EventKind, InputField, Listener,
    Modal, Notifier, Tab, TabStrip, ViewAction, ViewElements,
};
