//! Collaborators the view controller renders into. The page supplies the
//! implementations, the controller only ever sees these traits.

use std::rc::Rc;
use std::time::Duration;

use bookshelf_api::api::{BookId, ShelfId};

/// How long a notification stays on screen
pub const ALERT_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Books,
    Bookshelves,
    AddBook,
}

impl Tab {
    /// Value of the `data-tab` attribute of the navigation button
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Books => "books",
            Tab::Bookshelves => "bookshelves",
            Tab::AddBook => "add-book",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Book,
    Shelf,
}

/// Everything a user can trigger. Listeners carry these with the ids baked in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    SwitchTab(Tab),
    SubmitBook,
    FilterBooks,
    ClearFilter,
    CreateShelf,
    ShowBookDetails(BookId),
    DeleteBook(BookId),
    ShowShelfDetails(ShelfId),
    ShowAddBookToShelf(ShelfId),
    AddBookToShelf { shelf_id: ShelfId, book_id: BookId },
    RemoveBookFromShelf { shelf_id: ShelfId, book_id: BookId },
    CloseModal(Modal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    /// Form submission, the page suppresses the default navigation
    Submit,
}

impl EventKind {
    /// DOM event type to listen for
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Submit => "submit",
        }
    }
}

/// Listener to register on the element with `target` as its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub target: String,
    pub event: EventKind,
    pub action: ViewAction,
    /// Keeps the event from reaching listeners of enclosing elements
    pub stop_propagation: bool,
}

impl Listener {
    pub fn on_click(target: impl Into<String>, action: ViewAction) -> Self {
        Self {
            target: target.into(),
            event: EventKind::Click,
            action,
            stop_propagation: false,
        }
    }

    pub fn on_submit(target: impl Into<String>, action: ViewAction) -> Self {
        Self {
            event: EventKind::Submit,
            ..Self::on_click(target, action)
        }
    }

    pub fn stopping_propagation(self) -> Self {
        Self {
            stop_propagation: true,
            ..self
        }
    }
}

/// Rendered markup together with the listeners it needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    pub html: String,
    pub listeners: Vec<Listener>,
}

impl Content {
    pub fn markup(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            listeners: vec![],
        }
    }
}

pub trait Element {
    /// Replaces the inner markup, dropping listeners of the previous content
    fn set_content(&self, content: Content);
    fn set_visible(&self, visible: bool);
}

pub trait InputField {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
}

pub trait TabStrip {
    /// Marks the tab button and its panel active, deactivating the others
    fn activate(&self, tab: Tab);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

impl AlertKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            AlertKind::Success => "alert alert-success",
            AlertKind::Error => "alert alert-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub kind: AlertKind,
    /// The notifier removes the alert once this elapses, the user may dismiss it earlier
    pub ttl: Duration,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: AlertKind::Success,
            ttl: ALERT_TTL,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: AlertKind::Error,
            ttl: ALERT_TTL,
        }
    }
}

pub trait Notifier {
    fn notify(&self, alert: Alert);
}

pub trait Confirmer {
    fn confirm(&self, question: &str) -> bool;
}

/// Input fields of the add-book form
pub struct BookForm {
    pub title: Rc<dyn InputField>,
    pub author: Rc<dyn InputField>,
    pub isbn: Rc<dyn InputField>,
    pub publication_year: Rc<dyn InputField>,
    pub pages: Rc<dyn InputField>,
    pub genre: Rc<dyn InputField>,
    pub description: Rc<dyn InputField>,
}

impl BookForm {
    pub fn reset(&self) {
        for field in [
            &self.title,
            &self.author,
            &self.isbn,
            &self.publication_year,
            &self.pages,
            &self.genre,
            &self.description,
        ] {
            field.set_value("");
        }
    }
}

/// Every element the controller touches, handed over at construction
pub struct ViewElements {
    pub tabs: Rc<dyn TabStrip>,
    pub books_list: Rc<dyn Element>,
    pub shelves_list: Rc<dyn Element>,
    pub book_modal: Rc<dyn Element>,
    pub book_modal_body: Rc<dyn Element>,
    pub shelf_modal: Rc<dyn Element>,
    pub shelf_modal_body: Rc<dyn Element>,
    pub book_form: BookForm,
    pub shelf_name: Rc<dyn InputField>,
    pub shelf_owner: Rc<dyn InputField>,
    pub author_filter: Rc<dyn InputField>,
    pub genre_filter: Rc<dyn InputField>,
}

#[cfg(test)]
mod dom_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::dom::{
        Alert, AlertKind, BookForm, EventKind, InputField, Listener, Tab, ViewAction, ALERT_TTL,
    };

    #[derive(Default)]
    struct Field(RefCell<String>);

    impl InputField for Field {
        fn value(&self) -> String {
            self.0.borrow().clone()
        }

        fn set_value(&self, value: &str) {
            *self.0.borrow_mut() = value.to_string();
        }
    }

    #[test]
    fn test_alerts_expire_after_four_seconds() {
        let alert = Alert::error("Error adding book: HTTP 500");
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(alert.ttl, ALERT_TTL);
        assert_eq!(ALERT_TTL.as_secs(), 4);
        assert_eq!(alert.kind.class_name(), "alert alert-error");
        assert_eq!(Alert::success("ok").kind.class_name(), "alert alert-success");
    }

    #[test]
    fn test_listener_event_kinds() {
        let submit = Listener::on_submit("addBookForm", ViewAction::SubmitBook);
        assert_eq!(submit.event, EventKind::Submit);
        assert_eq!(submit.event.name(), "submit");
        let click = Listener::on_click("delete-book-1", ViewAction::DeleteBook(1)).stopping_propagation();
        assert_eq!(click.event.name(), "click");
        assert!(click.stop_propagation);
    }

    #[test]
    fn test_tab_names() {
        assert_eq!(Tab::Books.name(), "books");
        assert_eq!(Tab::Bookshelves.name(), "bookshelves");
        assert_eq!(Tab::AddBook.name(), "add-book");
    }

    #[test]
    fn test_reset_clears_every_field() {
        let fields: Vec<Rc<Field>> = (0..7).map(|_| Rc::new(Field::default())).collect();
        let form = BookForm {
            title: fields[0].clone(),
            author: fields[1].clone(),
            isbn: fields[2].clone(),
            publication_year: fields[3].clone(),
            pages: fields[4].clone(),
            genre: fields[5].clone(),
            description: fields[6].clone(),
        };
        for field in fields.iter() {
            field.set_value("filled");
        }
        form.reset();
        assert!(fields.iter().all(|field| field.value().is_empty()));
    }
}
