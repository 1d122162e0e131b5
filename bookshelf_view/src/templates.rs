//! Markup for every fragment the controller renders. Text coming from the
//! service or the user always goes through [`escape`].

use std::borrow::Cow;

use bookshelf_api::api::{Book, Bookshelf, Review, ShelfStats};
use bookshelf_api::client::RequestError;
use chrono::{DateTime, NaiveDateTime};

use crate::dom::{Content, Listener, Modal, Tab, ViewAction};

pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_safe(text)
}

/// `YYYY-MM-DD` for RFC 3339 and naive ISO-8601 timestamps, anything else is shown as is
pub fn format_date(timestamp: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    timestamp.to_string()
}

pub fn loading(message: &str) -> Content {
    notice(message)
}

/// Placeholder paragraph, also used for empty lists
pub fn notice(message: &str) -> Content {
    Content::markup(format!(r#"<p class="loading">{}</p>"#, escape(message)))
}

pub fn inline_error(context: &str, error: &RequestError) -> Content {
    notice(&format!("{context}: {}", error.message()))
}

pub fn book_card_id(book: &Book) -> String {
    format!("book-card-{}", book.id)
}

pub fn book_cards(books: &[Book]) -> Content {
    let mut content = Content::default();
    for book in books {
        let card_id = book_card_id(book);
        let delete_id = format!("delete-book-{}", book.id);
        content.html.push_str(&format!(
            r#"<div class="book-card" id="{card_id}">
    <h3>{title}</h3>
    <p class="author">by {author}</p>
    <div class="book-meta">
        <div>📅 {year}</div>
        <div>📖 {pages} pages</div>
        <div>ISBN: {isbn}</div>
    </div>
    <span class="book-genre">{genre}</span>
    <div class="book-actions">
        <button class="btn btn-secondary" id="{delete_id}">Delete</button>
    </div>
</div>
"#,
            title = escape(&book.title),
            author = escape(&book.author),
            year = book.publication_year,
            pages = book.pages,
            isbn = escape(&book.isbn),
            genre = escape(&book.genre),
        ));
        content
            .listeners
            .push(Listener::on_click(card_id, ViewAction::ShowBookDetails(book.id)));
        content.listeners.push(
            Listener::on_click(delete_id, ViewAction::DeleteBook(book.id)).stopping_propagation(),
        );
    }
    content
}

pub fn shelf_cards(shelves: &[Bookshelf]) -> Content {
    let mut content = Content::default();
    for shelf in shelves {
        let view_id = format!("view-shelf-{}", shelf.id);
        let add_id = format!("add-to-shelf-{}", shelf.id);
        content.html.push_str(&format!(
            r#"<div class="shelf-card">
    <h3>{name}</h3>
    <div class="shelf-info">👤 {owner}</div>
    <span class="book-count">{count} books</span>
    <div class="shelf-actions-buttons">
        <button class="btn btn-primary" id="{view_id}">View</button>
        <button class="btn btn-secondary" id="{add_id}">Add Book</button>
    </div>
</div>
"#,
            name = escape(&shelf.name),
            owner = escape(&shelf.owner),
            count = shelf.books.len(),
        ));
        content
            .listeners
            .push(Listener::on_click(view_id, ViewAction::ShowShelfDetails(shelf.id)));
        content
            .listeners
            .push(Listener::on_click(add_id, ViewAction::ShowAddBookToShelf(shelf.id)));
    }
    content
}

fn review_items(reviews: &[Review]) -> String {
    reviews
        .iter()
        .map(|review| {
            let comment = review
                .comment
                .as_deref()
                .map(|comment| format!(" - {}", escape(comment)))
                .unwrap_or_default();
            format!(
                "<li><strong>{}</strong> ({}/5){}</li>",
                escape(&review.reviewer),
                review.rating,
                comment
            )
        })
        .collect()
}

pub fn book_details(book: &Book) -> Content {
    let description = book
        .description
        .as_deref()
        .filter(|description| !description.is_empty())
        .map(|description| {
            format!(
                "<p><strong>Description:</strong> {}</p>\n",
                escape(description)
            )
        })
        .unwrap_or_default();
    let reviews = if book.reviews.is_empty() {
        String::new()
    } else {
        format!(
            "<h3>Reviews</h3>\n<ul class=\"reviews\">{}</ul>\n",
            review_items(&book.reviews)
        )
    };
    Content {
        html: format!(
            r#"<h2>{title}</h2>
<p><strong>Author:</strong> {author}</p>
<p><strong>ISBN:</strong> {isbn}</p>
<p><strong>Publication Year:</strong> {year}</p>
<p><strong>Pages:</strong> {pages}</p>
<p><strong>Genre:</strong> <span class="book-genre">{genre}</span></p>
{description}<p><strong>Added:</strong> {added}</p>
{reviews}"#,
            title = escape(&book.title),
            author = escape(&book.author),
            isbn = escape(&book.isbn),
            year = book.publication_year,
            pages = book.pages,
            genre = escape(&book.genre),
            added = escape(&format_date(&book.created_at)),
        ),
        listeners: vec![],
    }
}

/// "Fiction (2), Poetry (1)"
pub fn genre_summary(stats: &ShelfStats) -> String {
    stats
        .genres
        .iter()
        .map(|(genre, count)| format!("{} ({count})", escape(genre)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn shelf_details(shelf: &Bookshelf, stats: &ShelfStats) -> Content {
    let mut listeners = vec![];
    let stats_html = if stats.total_books > 0 {
        format!(
            r#"<div class="shelf-stats">
    <p><strong>Total Books:</strong> {}</p>
    <p><strong>Total Pages:</strong> {}</p>
    <p><strong>Average Pages per Book:</strong> {}</p>
    <p><strong>Genres:</strong> {}</p>
</div>
"#,
            stats.total_books,
            stats.total_pages,
            stats.avg_pages,
            genre_summary(stats)
        )
    } else {
        String::new()
    };

    let books_html = if shelf.books.is_empty() {
        "<p>No books in this shelf yet.</p>".to_string()
    } else {
        let mut items = String::new();
        for book in shelf.books.iter() {
            let remove_id = format!("remove-{}-{}", shelf.id, book.id);
            items.push_str(&format!(
                r#"<div class="shelf-book">
    <strong>{}</strong> by {}
    <button class="btn btn-danger" id="{remove_id}">Remove</button>
</div>
"#,
                escape(&book.title),
                escape(&book.author)
            ));
            listeners.push(Listener::on_click(
                remove_id,
                ViewAction::RemoveBookFromShelf {
                    shelf_id: shelf.id,
                    book_id: book.id,
                },
            ));
        }
        items
    };

    Content {
        html: format!(
            r#"<h2>{name}</h2>
<p><strong>Owner:</strong> {owner}</p>
<p><strong>Created:</strong> {created}</p>
{stats_html}<h3>Books in this Shelf:</h3>
<div>{books_html}</div>
"#,
            name = escape(&shelf.name),
            owner = escape(&shelf.owner),
            created = escape(&format_date(&shelf.created_at)),
        ),
        listeners,
    }
}

/// Books not yet on the shelf, each with an Add button
pub fn shelf_picker(shelf: &Bookshelf, available: &[&Book]) -> Content {
    let mut listeners = vec![];
    let mut items = String::new();
    for book in available {
        let add_id = format!("add-{}-{}", shelf.id, book.id);
        items.push_str(&format!(
            r#"<div class="shelf-book">
    <div>
        <strong>{}</strong><br>
        <small>{}</small>
    </div>
    <button class="btn btn-success" id="{add_id}">Add</button>
</div>
"#,
            escape(&book.title),
            escape(&book.author)
        ));
        listeners.push(Listener::on_click(
            add_id,
            ViewAction::AddBookToShelf {
                shelf_id: shelf.id,
                book_id: book.id,
            },
        ));
    }
    Content {
        html: format!(
            "<h2>Add Book to \"{}\"</h2>\n<div>{items}</div>\n",
            escape(&shelf.name)
        ),
        listeners,
    }
}

/// Listeners of the static page controls, registered once when the page loads
pub fn page_listeners() -> Vec<Listener> {
    let mut listeners: Vec<_> = [Tab::Books, Tab::Bookshelves, Tab::AddBook]
        .into_iter()
        .map(|tab| Listener::on_click(format!("nav-{}", tab.name()), ViewAction::SwitchTab(tab)))
        .collect();
    listeners.extend([
        Listener::on_submit("addBookForm", ViewAction::SubmitBook),
        Listener::on_click("createShelfBtn", ViewAction::CreateShelf),
        Listener::on_click("filterBtn", ViewAction::FilterBooks),
        Listener::on_click("clearFilterBtn", ViewAction::ClearFilter),
        Listener::on_click("book-modal-close", ViewAction::CloseModal(Modal::Book)),
        Listener::on_click("shelf-modal-close", ViewAction::CloseModal(Modal::Shelf)),
    ]);
    listeners
}

#[cfg(test)]
mod templates_tests {
    use std::collections::BTreeMap;

    use bookshelf_api::api::{Book, Bookshelf, Review, ShelfStats};
    use bookshelf_api::client::RequestError;

    use crate::dom::{EventKind, Modal, Tab, ViewAction};
    use crate::templates::{
        book_cards, book_details, format_date, inline_error, page_listeners, shelf_cards,
        shelf_details, shelf_picker,
    };

    fn book(id: i64, title: &str) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: "Octavia E. Butler".to_string(),
            isbn: "9780807083697".to_string(),
            publication_year: 1979,
            pages: 264,
            genre: "Science Fiction".to_string(),
            description: None,
            created_at: "2024-03-05T10:15:00.123456".to_string(),
            updated_at: None,
            reviews: vec![],
        }
    }

    fn shelf(books: Vec<Book>) -> Bookshelf {
        Bookshelf {
            id: 3,
            name: "Sci-Fi <3".to_string(),
            owner: "Jo".to_string(),
            books,
            created_at: "2024-01-02T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_script_in_title_is_escaped() {
        let rendered = book_cards(&[book(1, "<script>alert(1)</script>")]);
        assert!(!rendered.html.contains("<script>"));
        assert!(rendered.html.contains("&lt;script&gt;alert(1)&lt;&#x2F;script&gt;"));

        let details = book_details(&book(1, "<script>alert(1)</script>"));
        assert!(!details.html.contains("<script>"));
    }

    #[test]
    fn test_book_cards_bind_details_and_delete() {
        let rendered = book_cards(&[book(7, "Kindred"), book(8, "Dawn")]);
        assert_eq!(rendered.listeners.len(), 4);
        assert_eq!(rendered.listeners[0].target, "book-card-7");
        assert_eq!(rendered.listeners[0].action, ViewAction::ShowBookDetails(7));
        assert!(!rendered.listeners[0].stop_propagation);
        assert_eq!(rendered.listeners[1].action, ViewAction::DeleteBook(7));
        assert!(rendered.listeners[1].stop_propagation);
        for listener in rendered.listeners.iter() {
            assert!(rendered.html.contains(&format!("id=\"{}\"", listener.target)));
        }
    }

    #[test]
    fn test_shelf_cards_show_book_count() {
        let rendered = shelf_cards(&[shelf(vec![book(1, "Kindred")])]);
        assert!(rendered.html.contains("1 books"));
        assert!(rendered.html.contains("Sci-Fi &lt;3"));
        assert_eq!(rendered.listeners[0].action, ViewAction::ShowShelfDetails(3));
        assert_eq!(rendered.listeners[1].action, ViewAction::ShowAddBookToShelf(3));
    }

    #[test]
    fn test_book_details_optional_parts() {
        let plain = book_details(&book(1, "Kindred"));
        assert!(!plain.html.contains("Description"));
        assert!(!plain.html.contains("Reviews"));
        assert!(plain.html.contains("<strong>Added:</strong> 2024-03-05"));

        let mut reviewed = book(1, "Kindred");
        reviewed.description = Some("Time travel & <slavery>".to_string());
        reviewed.reviews = vec![Review {
            id: 1,
            reviewer: "Max".to_string(),
            rating: 5.0,
            comment: None,
            created_at: "2024-03-06T00:00:00Z".to_string(),
        }];
        let rendered = book_details(&reviewed);
        assert!(rendered.html.contains("Time travel &amp; &lt;slavery&gt;"));
        assert!(rendered.html.contains("<strong>Max</strong> (5/5)"));
    }

    #[test]
    fn test_shelf_details_hide_stats_of_empty_shelf() {
        let empty_stats = ShelfStats {
            bookshelf_id: 3,
            bookshelf_name: None,
            total_books: 0,
            total_pages: 0,
            avg_pages: 0.0,
            genres: BTreeMap::new(),
        };
        let rendered = shelf_details(&shelf(vec![]), &empty_stats);
        assert!(!rendered.html.contains("Total Books"));
        assert!(rendered.html.contains("No books in this shelf yet."));
        assert!(rendered.listeners.is_empty());

        let stats = ShelfStats {
            bookshelf_id: 3,
            bookshelf_name: Some("Sci-Fi <3".to_string()),
            total_books: 2,
            total_pages: 461,
            avg_pages: 230.5,
            genres: BTreeMap::from([
                ("Fantasy".to_string(), 1),
                ("Science Fiction".to_string(), 1),
            ]),
        };
        let rendered = shelf_details(&shelf(vec![book(1, "Kindred"), book(2, "Dawn")]), &stats);
        assert!(rendered.html.contains("<strong>Average Pages per Book:</strong> 230.5"));
        assert!(rendered.html.contains("Fantasy (1), Science Fiction (1)"));
        assert!(rendered.html.contains("<strong>Created:</strong> 2024-01-02"));
        assert_eq!(
            rendered.listeners[1].action,
            ViewAction::RemoveBookFromShelf {
                shelf_id: 3,
                book_id: 2
            }
        );
    }

    #[test]
    fn test_shelf_picker_binds_add_buttons() {
        let available = book(9, "Wild Seed");
        let rendered = shelf_picker(&shelf(vec![]), &[&available]);
        assert!(rendered.html.contains("Add Book to \"Sci-Fi &lt;3\""));
        assert_eq!(rendered.listeners.len(), 1);
        assert_eq!(rendered.listeners[0].target, "add-3-9");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05T10:15:00.123456"), "2024-03-05");
        assert_eq!(format_date("2024-03-05T23:15:00+00:00"), "2024-03-05");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_inline_error_is_escaped() {
        let rendered = inline_error("Error loading books", &RequestError::new("<b>down</b>"));
        assert_eq!(
            rendered.html,
            r#"<p class="loading">Error loading books: &lt;b&gt;down&lt;&#x2F;b&gt;</p>"#
        );
    }

    #[test]
    fn test_page_listeners_cover_static_controls() {
        let listeners = page_listeners();
        assert_eq!(listeners.len(), 9);
        assert_eq!(listeners[2].target, "nav-add-book");
        assert_eq!(listeners[2].action, ViewAction::SwitchTab(Tab::AddBook));
        assert!(listeners
            .iter()
            .any(|listener| listener.action == ViewAction::CloseModal(Modal::Shelf)));
        assert!(listeners.iter().all(|listener| !listener.stop_propagation));
        let submit: Vec<_> = listeners
            .iter()
            .filter(|listener| listener.event == EventKind::Submit)
            .collect();
        assert_eq!(submit.len(), 1);
        assert_eq!(submit[0].target, "addBookForm");
        assert_eq!(submit[0].action, ViewAction::SubmitBook);
    }
}
