//! Built-in sample catalog used by `--seed` and `POST /devmode/populate`.
//!
//! Every author gets two books, one series holding both books and one
//! anthology collecting both books, so each relationship (and each cascade)
//! has something to act on. Titles embed the author's name to stay unique.

use crate::error::ApiError;
use crate::model::{
    Anthology, Author, AuthorPayload, Book, Location, Member, MemberPayload, Series,
    SeriesPayload, ShelvedPayload, Story, StoryPayload,
};
use crate::store::Library;

const AUTHORS: [(&str, &str); 6] = [
    ("Fred", "Flintstone"),
    ("Wilma", "Flintstone"),
    ("Pebbles", "Flintstone"),
    ("Barney", "Rubble"),
    ("Betty", "Rubble"),
    ("Bamm-Bamm", "Rubble"),
];

const BOOKS: [(&str, Location); 2] = [
    ("Bedrock Nights", Location::Paperback),
    ("Quarry Days", Location::Kindle),
];

/// Replace the contents of `library` with the sample catalog.
pub fn populate(library: &mut Library) -> Result<(), ApiError> {
    library.clear();

    for (first, last) in AUTHORS {
        let author: Author = library.insert(AuthorPayload {
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            notes: Some(format!("Notes about {first} {last}")),
        })?;
        let author_id = author.stamp.id;
        let byline = format!("by {first} {last}");

        let mut books = Vec::with_capacity(BOOKS.len());
        for (index, (title, location)) in BOOKS.into_iter().enumerate() {
            let book: Book = library.insert(ShelvedPayload {
                author_id: Some(author_id),
                title: Some(format!("{title} {byline}")),
                location: Some(location),
                notes: None,
                read: Some(index % 2 == 0),
            })?;
            books.push(book.stamp.id);
        }

        let series: Series = library.insert(SeriesPayload {
            author_id: Some(author_id),
            title: Some(format!("Bedrock Saga {byline}")),
            notes: None,
        })?;
        let anthology: Anthology = library.insert(ShelvedPayload {
            author_id: Some(author_id),
            title: Some(format!("Collected Tales {byline}")),
            location: Some(Location::Hardcover),
            notes: None,
            read: Some(false),
        })?;

        for (ordinal, book_id) in (1..).zip(books) {
            library.insert::<Member>(MemberPayload {
                series_id: Some(series.stamp.id),
                book_id: Some(book_id),
                ordinal: Some(ordinal),
            })?;
            library.insert::<Story>(StoryPayload {
                anthology_id: Some(anthology.stamp.id),
                book_id: Some(book_id),
                ordinal: Some(ordinal),
            })?;
        }
    }

    tracing::info!(authors = AUTHORS.len(), "populated sample catalog");
    Ok(())
}
