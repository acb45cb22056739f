//! Client suites against the live server.
//!
//! # Design
//! Every test starts its own server in dev mode on a random port and loads
//! the sample catalog, then exercises the blocking `Bookcase` client over
//! real HTTP. Tests never share state, so they can run in parallel.

use std::thread::sleep;
use std::time::Duration;

use bookcase_core::{
    ApiError, AuthorPayload, Bookcase, Location, MemberPayload, SeriesPayload, ShelvedPayload,
    StoryPayload, UreqTransport,
};

/// Start a dev-mode server on a random port and return a populated client.
fn start() -> Bookcase<UreqTransport> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            bookcase_server::run(listener, bookcase_server::Config { devmode: true }).await
        })
        .unwrap();
    });

    let bookcase = Bookcase::connect(&format!("http://{addr}"));
    bookcase.populate().unwrap();
    bookcase
}

/// Give `updated` room to move on coarse clocks.
fn pause() {
    sleep(Duration::from_millis(20));
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

#[test]
fn author_delete_cascades() {
    let bookcase = start();
    let authors = bookcase.authors().find_all().unwrap();
    assert!(!authors.is_empty());

    for author in authors {
        bookcase.authors().delete(author.id).unwrap();
        let err = bookcase.authors().find(author.id).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        assert!(bookcase.anthologies().find_by_author_id(author.id).unwrap().is_empty());
        assert!(bookcase.books().find_by_author_id(author.id).unwrap().is_empty());
        assert!(bookcase.series().find_by_author_id(author.id).unwrap().is_empty());
    }

    assert!(bookcase.authors().find_all().unwrap().is_empty());
    assert!(bookcase.members().find_all().unwrap().is_empty());
    assert!(bookcase.stories().find_all().unwrap().is_empty());
}

#[test]
fn author_find_and_order() {
    let bookcase = start();
    let authors = bookcase.authors().find_all().unwrap();
    assert!(!authors.is_empty());

    let mut previous: Option<String> = None;
    for author in &authors {
        assert_eq!(&bookcase.authors().find(author.id).unwrap(), author);
        let name = format!("{}|{}", author.last_name, author.first_name);
        if let Some(previous) = previous {
            assert!(name > previous, "{name} should sort after {previous}");
        }
        previous = Some(name);
    }

    let err = bookcase.authors().find(i64::MAX).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    let err = bookcase.authors().delete(i64::MAX).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn author_insert() {
    let bookcase = start();
    let mut input = AuthorPayload::new("Another", "Rubble");
    input.notes = Some("Notes about Another Rubble".to_string());

    let inserted = bookcase.authors().insert(&input).unwrap();
    assert_eq!(inserted.version, 0);
    assert_eq!(bookcase.authors().find(inserted.id).unwrap(), inserted);

    let err = bookcase.authors().insert(&AuthorPayload::default()).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    let mut missing_first = input.clone();
    missing_first.first_name = None;
    let err = bookcase.authors().insert(&missing_first).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    let mut missing_last = input.clone();
    missing_last.last_name = None;
    let err = bookcase.authors().insert(&missing_last).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = bookcase
        .authors()
        .insert(&AuthorPayload::new("Barney", "Rubble"))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotUnique(_)));
}

#[test]
fn author_update() {
    let bookcase = start();
    let original = bookcase.authors().find_by_name("Pebbles").unwrap().remove(0);
    pause();

    let mut input = AuthorPayload::from(&original);
    input.first_name = Some(format!("{} Updated", original.first_name));
    let updated = bookcase.authors().update(original.id, &input).unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.published, original.published);
    assert!(updated.updated > original.updated);
    assert!(updated.version > original.version);
    assert_eq!(updated.first_name, format!("{} Updated", original.first_name));
    assert_eq!(updated.last_name, original.last_name);

    let err = bookcase
        .authors()
        .update(i64::MAX, &AuthorPayload::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let rubble = bookcase.authors().find_by_name("Rubble").unwrap().remove(0);
    let mut missing_first = AuthorPayload::from(&rubble);
    missing_first.first_name = None;
    let err = bookcase.authors().update(rubble.id, &missing_first).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let flintstone = bookcase.authors().find_by_name("Flintstone").unwrap().remove(0);
    let err = bookcase
        .authors()
        .update(flintstone.id, &AuthorPayload::new("Barney", "Rubble"))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotUnique(_)));
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

#[test]
fn book_delete_cascades() {
    let bookcase = start();
    let books = bookcase.books().find_all().unwrap();
    assert!(!books.is_empty());

    for book in books {
        assert!(!bookcase.members().find_by_book_id(book.id).unwrap().is_empty());
        assert!(!bookcase.stories().find_by_book_id(book.id).unwrap().is_empty());

        bookcase.books().delete(book.id).unwrap();
        let err = bookcase.books().find(book.id).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        assert!(bookcase.members().find_by_book_id(book.id).unwrap().is_empty());
        assert!(bookcase.stories().find_by_book_id(book.id).unwrap().is_empty());
    }

    assert!(bookcase.books().find_all().unwrap().is_empty());
}

#[test]
fn book_find_and_order() {
    let bookcase = start();
    let books = bookcase.books().find_all().unwrap();
    assert!(!books.is_empty());
    for book in &books {
        assert_eq!(&bookcase.books().find(book.id).unwrap(), book);
    }
    assert!(books.windows(2).all(|w| w[0].title < w[1].title));

    let err = bookcase.books().find(i64::MAX).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn book_insert_and_update() {
    let bookcase = start();
    let author = bookcase.authors().find_all().unwrap().remove(0);
    let mut input = ShelvedPayload::new(author.id, "New Book");
    input.location = Some(Location::Other);
    input.notes = Some("Notes about New Book".to_string());
    input.read = Some(true);

    let inserted = bookcase.books().insert(&input).unwrap();
    assert_eq!(inserted.version, 0);
    assert!(inserted.read);
    assert_eq!(bookcase.books().find(inserted.id).unwrap(), inserted);

    let err = bookcase.books().insert(&ShelvedPayload::default()).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    let mut bad_author = input.clone();
    bad_author.author_id = Some(i64::MAX);
    let err = bookcase.books().insert(&bad_author).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    let mut no_title = input.clone();
    no_title.title = None;
    let err = bookcase.books().insert(&no_title).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    pause();
    let mut edit = ShelvedPayload::from(&inserted);
    edit.title = Some("New Book Updated".to_string());
    let updated = bookcase.books().update(inserted.id, &edit).unwrap();
    assert_eq!(updated.published, inserted.published);
    assert!(updated.updated > inserted.updated);
    assert_eq!(updated.version, inserted.version + 1);
    assert_eq!(updated.title, "New Book Updated");

    let mut no_author = ShelvedPayload::from(&updated);
    no_author.author_id = None;
    let err = bookcase.books().update(updated.id, &no_author).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    let mut bad_author = ShelvedPayload::from(&updated);
    bad_author.author_id = Some(i64::MAX);
    let err = bookcase.books().update(updated.id, &bad_author).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(bookcase.books().find(updated.id).unwrap(), updated);
}

// ---------------------------------------------------------------------------
// Series and members
// ---------------------------------------------------------------------------

#[test]
fn series_delete_cascades_to_members() {
    let bookcase = start();
    let series = bookcase.series().find_all().unwrap();
    assert!(!series.is_empty());

    for one in series {
        bookcase.series().delete(one.id).unwrap();
        let err = bookcase.series().find(one.id).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(bookcase.members().find_by_series_id(one.id).unwrap().is_empty());
    }

    assert!(bookcase.series().find_all().unwrap().is_empty());
    assert!(bookcase.members().find_all().unwrap().is_empty());
    // Books outlive the series that listed them.
    assert!(!bookcase.books().find_all().unwrap().is_empty());
}

#[test]
fn series_insert_and_update() {
    let bookcase = start();
    let author = bookcase.authors().find_all().unwrap().remove(0);
    let input = SeriesPayload::new(author.id, "New Series");

    let inserted = bookcase.series().insert(&input).unwrap();
    assert_eq!(inserted.version, 0);
    assert_eq!(bookcase.series().find(inserted.id).unwrap(), inserted);

    let mut bad_author = input.clone();
    bad_author.author_id = Some(i64::MAX);
    let err = bookcase.series().insert(&bad_author).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let original = bookcase.series().find_all().unwrap().remove(0);
    pause();
    let mut edit = SeriesPayload::from(&original);
    edit.title = Some(format!("{} Updated", original.title));
    let updated = bookcase.series().update(original.id, &edit).unwrap();
    assert!(updated.updated > original.updated);
    assert!(updated.version > original.version);
    assert_eq!(updated.title, format!("{} Updated", original.title));

    let mut no_title = SeriesPayload::from(&updated);
    no_title.title = None;
    let err = bookcase.series().update(updated.id, &no_title).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    let mut bad_author = SeriesPayload::from(&updated);
    bad_author.author_id = Some(i64::MAX);
    let err = bookcase.series().update(updated.id, &bad_author).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(bookcase.series().find(updated.id).unwrap(), updated);
}

#[test]
fn members_are_ordered_within_series() {
    let bookcase = start();
    for series in bookcase.series().find_all().unwrap() {
        let ordinals: Vec<i32> = bookcase
            .members()
            .find_by_series_id(series.id)
            .unwrap()
            .into_iter()
            .map(|m| m.ordinal)
            .collect();
        assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn member_insert_update_delete() {
    let bookcase = start();
    let book = bookcase.books().find_all().unwrap().remove(0);
    let series = bookcase.series().find_all().unwrap().remove(0);
    let input = MemberPayload::new(series.id, book.id, 123);

    let inserted = bookcase.members().insert(&input).unwrap();
    assert_eq!(inserted.version, 0);
    assert_eq!(bookcase.members().find(inserted.id).unwrap(), inserted);

    for broken in [
        MemberPayload::default(),
        MemberPayload { book_id: None, ..input.clone() },
        MemberPayload { book_id: Some(i64::MAX), ..input.clone() },
        MemberPayload { series_id: None, ..input.clone() },
        MemberPayload { series_id: Some(i64::MAX), ..input.clone() },
    ] {
        let err = bookcase.members().insert(&broken).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)), "{broken:?}");
    }

    pause();
    let mut edit = MemberPayload::from(&inserted);
    edit.ordinal = Some(inserted.ordinal + 100);
    let updated = bookcase.members().update(inserted.id, &edit).unwrap();
    assert_eq!(updated.ordinal, 223);
    assert!(updated.updated > inserted.updated);
    assert!(updated.version > inserted.version);

    let current = MemberPayload::from(&updated);
    for broken in [
        MemberPayload { book_id: None, ..current.clone() },
        MemberPayload { book_id: Some(i64::MAX), ..current.clone() },
        MemberPayload { series_id: None, ..current.clone() },
        MemberPayload { series_id: Some(i64::MAX), ..current.clone() },
    ] {
        let err = bookcase.members().update(updated.id, &broken).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)), "{broken:?}");
    }
    assert_eq!(bookcase.members().find(updated.id).unwrap(), updated);

    bookcase.members().delete(updated.id).unwrap();
    let err = bookcase.members().find(updated.id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    let err = bookcase.members().delete(i64::MAX).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Anthologies and stories
// ---------------------------------------------------------------------------

#[test]
fn anthology_delete_cascades_to_stories() {
    let bookcase = start();
    let anthologies = bookcase.anthologies().find_all().unwrap();
    assert!(!anthologies.is_empty());
    assert!(anthologies.windows(2).all(|w| w[0].title < w[1].title));

    for anthology in anthologies {
        assert!(!bookcase.stories().find_by_anthology_id(anthology.id).unwrap().is_empty());

        bookcase.anthologies().delete(anthology.id).unwrap();
        let err = bookcase.anthologies().find(anthology.id).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(bookcase.stories().find_by_anthology_id(anthology.id).unwrap().is_empty());
    }

    assert!(bookcase.anthologies().find_all().unwrap().is_empty());
}

#[test]
fn anthology_insert_and_update() {
    let bookcase = start();
    let author = bookcase.authors().find_all().unwrap().remove(0);
    let mut input = ShelvedPayload::new(author.id, "New Anthology");
    input.location = Some(Location::Other);

    let inserted = bookcase.anthologies().insert(&input).unwrap();
    assert_eq!(inserted.version, 0);
    assert!(!inserted.read);
    assert_eq!(bookcase.anthologies().find(inserted.id).unwrap(), inserted);

    let mut no_author = input.clone();
    no_author.author_id = None;
    let err = bookcase.anthologies().insert(&no_author).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    pause();
    let mut edit = ShelvedPayload::from(&inserted);
    edit.title = Some("New Anthology Updated".to_string());
    let updated = bookcase.anthologies().update(inserted.id, &edit).unwrap();
    assert_eq!(updated.version, 1);
    assert_eq!(updated.title, "New Anthology Updated");
    assert_eq!(updated.location, Some(Location::Other));

    let mut bad_author = ShelvedPayload::from(&updated);
    bad_author.author_id = Some(i64::MAX);
    let err = bookcase.anthologies().update(updated.id, &bad_author).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(bookcase.anthologies().find(updated.id).unwrap(), updated);
}

#[test]
fn story_insert_update_delete() {
    let bookcase = start();
    let anthology = bookcase.anthologies().find_all().unwrap().remove(0);
    let book = bookcase.books().find_all().unwrap().remove(0);
    let input = StoryPayload::new(anthology.id, book.id, 123);

    let inserted = bookcase.stories().insert(&input).unwrap();
    assert_eq!(inserted.version, 0);
    assert_eq!(bookcase.stories().find(inserted.id).unwrap(), inserted);

    let ordinals: Vec<i32> = bookcase
        .stories()
        .find_by_anthology_id(anthology.id)
        .unwrap()
        .into_iter()
        .map(|s| s.ordinal)
        .collect();
    assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ordinals.last(), Some(&123));

    for broken in [
        StoryPayload::default(),
        StoryPayload { book_id: None, ..input.clone() },
        StoryPayload { book_id: Some(i64::MAX), ..input.clone() },
        StoryPayload { anthology_id: None, ..input.clone() },
        StoryPayload { anthology_id: Some(i64::MAX), ..input.clone() },
    ] {
        let err = bookcase.stories().insert(&broken).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)), "{broken:?}");
    }

    let err = bookcase
        .stories()
        .update(i64::MAX, &StoryPayload::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    pause();
    let mut edit = StoryPayload::from(&inserted);
    edit.ordinal = Some(inserted.ordinal + 100);
    let updated = bookcase.stories().update(inserted.id, &edit).unwrap();
    assert_eq!(updated.ordinal, 223);
    assert!(updated.version > inserted.version);

    let current = StoryPayload::from(&updated);
    for broken in [
        StoryPayload { book_id: None, ..current.clone() },
        StoryPayload { book_id: Some(i64::MAX), ..current.clone() },
        StoryPayload { anthology_id: None, ..current.clone() },
        StoryPayload { anthology_id: Some(i64::MAX), ..current.clone() },
    ] {
        let err = bookcase.stories().update(updated.id, &broken).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)), "{broken:?}");
    }
    assert_eq!(bookcase.stories().find(updated.id).unwrap(), updated);

    bookcase.stories().delete(updated.id).unwrap();
    let err = bookcase.stories().find(updated.id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn depopulate_clears_catalog() {
    let bookcase = start();
    bookcase.depopulate().unwrap();
    assert!(bookcase.authors().find_all().unwrap().is_empty());
    assert!(bookcase.books().find_all().unwrap().is_empty());
    assert!(bookcase.stories().find_all().unwrap().is_empty());
}
