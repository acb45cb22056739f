//! In-memory catalog store.
//!
//! # Design
//! All six tables live in one [`Library`] guarded by a single lock, so a
//! cascading delete or a foreign-key check always sees a consistent view.
//! Per-entity behaviour (validation, uniqueness, listing order, filters and
//! cascades) is described by the [`Entity`] trait. The CRUD operations
//! themselves are written once, generically, on `Library`.
//!
//! Ids come from a single counter shared by every table and are never
//! reused, so a deleted id keeps answering 404.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ApiError;
use crate::model::{
    Anthology, Author, AuthorFilter, AuthorPayload, Book, Member, MemberFilter, MemberPayload,
    OwnerFilter, Series, SeriesPayload, ShelvedPayload, Stamp, Story, StoryFilter, StoryPayload,
};

/// A record type stored in a [`Library`] table.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    /// Request body accepted by insert and update.
    type Payload: DeserializeOwned + Send + 'static;
    /// Query parameters accepted by `find_all`.
    type Filter: DeserializeOwned + Default + Send + 'static;

    /// Collection path segment, e.g. `authors`.
    const PATH: &'static str;
    /// Singular name used in messages and logs.
    const NAME: &'static str;

    fn stamp(&self) -> &Stamp;
    fn table(library: &Library) -> &BTreeMap<i64, Self>;
    fn table_mut(library: &mut Library) -> &mut BTreeMap<i64, Self>;

    /// Validate `payload` against the current library contents and build
    /// the record it describes.
    fn build(library: &Library, stamp: Stamp, payload: Self::Payload) -> Result<Self, ApiError>;

    /// Listing order.
    fn compare(&self, other: &Self) -> Ordering;

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Reject a record whose natural key collides with another record.
    fn check_unique(&self, _library: &Library) -> Result<(), ApiError> {
        Ok(())
    }

    /// Remove the dependents of the record `id`, which has already been
    /// taken out of its own table.
    fn cascade(_library: &mut Library, _id: i64) {}
}

#[derive(Debug, Default)]
pub struct Library {
    last_id: i64,
    authors: BTreeMap<i64, Author>,
    books: BTreeMap<i64, Book>,
    series: BTreeMap<i64, Series>,
    anthologies: BTreeMap<i64, Anthology>,
    members: BTreeMap<i64, Member>,
    stories: BTreeMap<i64, Story>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every record and restart id allocation.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn contains<E: Entity>(&self, id: i64) -> bool {
        E::table(self).contains_key(&id)
    }

    pub fn find<E: Entity>(&self, id: i64) -> Result<E, ApiError> {
        E::table(self)
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found::<E>(id))
    }

    pub fn find_all<E: Entity>(&self, filter: &E::Filter) -> Vec<E> {
        let mut records: Vec<E> = E::table(self)
            .values()
            .filter(|record| record.matches(filter))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.compare(b));
        records
    }

    pub fn insert<E: Entity>(&mut self, payload: E::Payload) -> Result<E, ApiError> {
        let id = self.last_id + 1;
        let record = E::build(self, Stamp::new(id, Utc::now()), payload)?;
        record.check_unique(self)?;
        self.last_id = id;
        E::table_mut(self).insert(id, record.clone());
        tracing::debug!(entity = E::NAME, id, "inserted");
        Ok(record)
    }

    pub fn update<E: Entity>(&mut self, id: i64, payload: E::Payload) -> Result<E, ApiError> {
        let current = E::table(self).get(&id).ok_or_else(|| not_found::<E>(id))?;
        let stamp = current.stamp().bumped(Utc::now());
        let record = E::build(self, stamp, payload)?;
        record.check_unique(self)?;
        E::table_mut(self).insert(id, record.clone());
        tracing::debug!(entity = E::NAME, id, version = record.stamp().version, "updated");
        Ok(record)
    }

    pub fn delete<E: Entity>(&mut self, id: i64) -> Result<E, ApiError> {
        let record = E::table_mut(self)
            .remove(&id)
            .ok_or_else(|| not_found::<E>(id))?;
        E::cascade(self, id);
        tracing::debug!(entity = E::NAME, id, "deleted");
        Ok(record)
    }

    /// Delete, with cascades, every `E` matching `predicate`.
    fn purge<E: Entity>(&mut self, predicate: impl Fn(&E) -> bool) {
        let doomed: Vec<i64> = E::table(self)
            .iter()
            .filter(|(_, record)| predicate(record))
            .map(|(id, _)| *id)
            .collect();
        for id in doomed {
            E::table_mut(self).remove(&id);
            E::cascade(self, id);
            tracing::debug!(entity = E::NAME, id, "deleted by cascade");
        }
    }
}

pub(crate) fn not_found<E: Entity>(id: i64) -> ApiError {
    ApiError::NotFound(format!("{} {id} not found", E::NAME))
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field}: is required")))
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::BadRequest(format!("{field}: is required"))),
    }
}

/// A required foreign key that must name an existing `P`.
fn required_parent<P: Entity>(
    library: &Library,
    value: Option<i64>,
    field: &str,
) -> Result<i64, ApiError> {
    let id = required(value, field)?;
    if library.contains::<P>(id) {
        Ok(id)
    } else {
        Err(ApiError::BadRequest(format!(
            "{field}: missing {} {id}",
            P::NAME
        )))
    }
}

fn by_title(a: &str, a_id: i64, b: &str, b_id: i64) -> Ordering {
    a.cmp(b).then(a_id.cmp(&b_id))
}

fn matches_id(expected: Option<i64>, actual: i64) -> bool {
    expected.map_or(true, |id| id == actual)
}

impl Entity for Author {
    type Payload = AuthorPayload;
    type Filter = AuthorFilter;
    const PATH: &'static str = "authors";
    const NAME: &'static str = "author";

    fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    fn table(library: &Library) -> &BTreeMap<i64, Self> {
        &library.authors
    }

    fn table_mut(library: &mut Library) -> &mut BTreeMap<i64, Self> {
        &mut library.authors
    }

    fn build(_library: &Library, stamp: Stamp, payload: AuthorPayload) -> Result<Self, ApiError> {
        Ok(Author {
            stamp,
            first_name: required_text(payload.first_name, "firstName")?,
            last_name: required_text(payload.last_name, "lastName")?,
            notes: payload.notes,
        })
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.last_name
            .cmp(&other.last_name)
            .then_with(|| self.first_name.cmp(&other.first_name))
            .then(self.stamp.id.cmp(&other.stamp.id))
    }

    fn matches(&self, filter: &AuthorFilter) -> bool {
        match &filter.name {
            None => true,
            Some(name) => {
                let name = name.to_lowercase();
                self.first_name.to_lowercase().contains(&name)
                    || self.last_name.to_lowercase().contains(&name)
            }
        }
    }

    fn check_unique(&self, library: &Library) -> Result<(), ApiError> {
        let duplicate = library.authors.values().any(|other| {
            other.stamp.id != self.stamp.id
                && other.first_name == self.first_name
                && other.last_name == self.last_name
        });
        if duplicate {
            return Err(ApiError::NotUnique(format!(
                "firstName/lastName: author {} {} already exists",
                self.first_name, self.last_name
            )));
        }
        Ok(())
    }

    fn cascade(library: &mut Library, id: i64) {
        library.purge::<Book>(|book| book.author_id == id);
        library.purge::<Series>(|series| series.author_id == id);
        library.purge::<Anthology>(|anthology| anthology.author_id == id);
    }
}

impl Entity for Book {
    type Payload = ShelvedPayload;
    type Filter = OwnerFilter;
    const PATH: &'static str = "books";
    const NAME: &'static str = "book";

    fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    fn table(library: &Library) -> &BTreeMap<i64, Self> {
        &library.books
    }

    fn table_mut(library: &mut Library) -> &mut BTreeMap<i64, Self> {
        &mut library.books
    }

    fn build(library: &Library, stamp: Stamp, payload: ShelvedPayload) -> Result<Self, ApiError> {
        Ok(Book {
            stamp,
            author_id: required_parent::<Author>(library, payload.author_id, "authorId")?,
            title: required_text(payload.title, "title")?,
            location: payload.location,
            notes: payload.notes,
            read: payload.read.unwrap_or(false),
        })
    }

    fn compare(&self, other: &Self) -> Ordering {
        by_title(&self.title, self.stamp.id, &other.title, other.stamp.id)
    }

    fn matches(&self, filter: &OwnerFilter) -> bool {
        matches_id(filter.author_id, self.author_id)
    }

    fn cascade(library: &mut Library, id: i64) {
        library.purge::<Member>(|member| member.book_id == id);
        library.purge::<Story>(|story| story.book_id == id);
    }
}

impl Entity for Series {
    type Payload = SeriesPayload;
    type Filter = OwnerFilter;
    const PATH: &'static str = "series";
    const NAME: &'static str = "series";

    fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    fn table(library: &Library) -> &BTreeMap<i64, Self> {
        &library.series
    }

    fn table_mut(library: &mut Library) -> &mut BTreeMap<i64, Self> {
        &mut library.series
    }

    fn build(library: &Library, stamp: Stamp, payload: SeriesPayload) -> Result<Self, ApiError> {
        Ok(Series {
            stamp,
            author_id: required_parent::<Author>(library, payload.author_id, "authorId")?,
            title: required_text(payload.title, "title")?,
            notes: payload.notes,
        })
    }

    fn compare(&self, other: &Self) -> Ordering {
        by_title(&self.title, self.stamp.id, &other.title, other.stamp.id)
    }

    fn matches(&self, filter: &OwnerFilter) -> bool {
        matches_id(filter.author_id, self.author_id)
    }

    fn cascade(library: &mut Library, id: i64) {
        library.purge::<Member>(|member| member.series_id == id);
    }
}

impl Entity for Anthology {
    type Payload = ShelvedPayload;
    type Filter = OwnerFilter;
    const PATH: &'static str = "anthologies";
    const NAME: &'static str = "anthology";

    fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    fn table(library: &Library) -> &BTreeMap<i64, Self> {
        &library.anthologies
    }

    fn table_mut(library: &mut Library) -> &mut BTreeMap<i64, Self> {
        &mut library.anthologies
    }

    fn build(library: &Library, stamp: Stamp, payload: ShelvedPayload) -> Result<Self, ApiError> {
        Ok(Anthology {
            stamp,
            author_id: required_parent::<Author>(library, payload.author_id, "authorId")?,
            title: required_text(payload.title, "title")?,
            location: payload.location,
            notes: payload.notes,
            read: payload.read.unwrap_or(false),
        })
    }

    fn compare(&self, other: &Self) -> Ordering {
        by_title(&self.title, self.stamp.id, &other.title, other.stamp.id)
    }

    fn matches(&self, filter: &OwnerFilter) -> bool {
        matches_id(filter.author_id, self.author_id)
    }

    fn cascade(library: &mut Library, id: i64) {
        library.purge::<Story>(|story| story.anthology_id == id);
    }
}

impl Entity for Member {
    type Payload = MemberPayload;
    type Filter = MemberFilter;
    const PATH: &'static str = "members";
    const NAME: &'static str = "member";

    fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    fn table(library: &Library) -> &BTreeMap<i64, Self> {
        &library.members
    }

    fn table_mut(library: &mut Library) -> &mut BTreeMap<i64, Self> {
        &mut library.members
    }

    fn build(library: &Library, stamp: Stamp, payload: MemberPayload) -> Result<Self, ApiError> {
        Ok(Member {
            stamp,
            series_id: required_parent::<Series>(library, payload.series_id, "seriesId")?,
            book_id: required_parent::<Book>(library, payload.book_id, "bookId")?,
            ordinal: required(payload.ordinal, "ordinal")?,
        })
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.series_id
            .cmp(&other.series_id)
            .then(self.ordinal.cmp(&other.ordinal))
            .then(self.stamp.id.cmp(&other.stamp.id))
    }

    fn matches(&self, filter: &MemberFilter) -> bool {
        matches_id(filter.series_id, self.series_id) && matches_id(filter.book_id, self.book_id)
    }
}

impl Entity for Story {
    type Payload = StoryPayload;
    type Filter = StoryFilter;
    const PATH: &'static str = "stories";
    const NAME: &'static str = "story";

    fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    fn table(library: &Library) -> &BTreeMap<i64, Self> {
        &library.stories
    }

    fn table_mut(library: &mut Library) -> &mut BTreeMap<i64, Self> {
        &mut library.stories
    }

    fn build(library: &Library, stamp: Stamp, payload: StoryPayload) -> Result<Self, ApiError> {
        Ok(Story {
            stamp,
            anthology_id: required_parent::<Anthology>(
                library,
                payload.anthology_id,
                "anthologyId",
            )?,
            book_id: required_parent::<Book>(library, payload.book_id, "bookId")?,
            ordinal: required(payload.ordinal, "ordinal")?,
        })
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.anthology_id
            .cmp(&other.anthology_id)
            .then(self.ordinal.cmp(&other.ordinal))
            .then(self.stamp.id.cmp(&other.stamp.id))
    }

    fn matches(&self, filter: &StoryFilter) -> bool {
        matches_id(filter.anthology_id, self.anthology_id)
            && matches_id(filter.book_id, self.book_id)
    }
}
