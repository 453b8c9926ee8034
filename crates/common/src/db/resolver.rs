//! Find-or-create resolution for reference entities
//!
//! Movie payloads carry reference entities (genres, actors, directors,
//! languages, countries, certifications) as natural keys. Each resolver
//! normalizes the key, looks it up, and lazily creates the row on a miss.
//! The functions are generic over [`ConnectionTrait`] so they compose into
//! the movie-creation transaction.
//!
//! Creation races are settled by the database: the insert runs with
//! `ON CONFLICT DO NOTHING`, and the follow-up select picks up whichever
//! row won.

use crate::db::models::{
    Actor, ActorActiveModel, ActorColumn, ActorEntity, Certification, CertificationActiveModel,
    CertificationColumn, CertificationEntity, Country, CountryActiveModel, CountryColumn,
    CountryEntity, Director, DirectorActiveModel, DirectorColumn, DirectorEntity, Genre,
    GenreActiveModel, GenreColumn, GenreEntity, Language, LanguageActiveModel, LanguageColumn,
    LanguageEntity,
};
use crate::errors::{AppError, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

/// Title-case a name: uppercase every letter that starts a run of letters,
/// lowercase the rest. Non-letters delimit runs, so "sci-fi" becomes
/// "Sci-Fi" and "ACTION" becomes "Action".
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_was_letter = false;

    for ch in input.chars() {
        if ch.is_alphabetic() {
            if prev_was_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_was_letter = true;
        } else {
            out.push(ch);
            prev_was_letter = false;
        }
    }

    out
}

fn vanished(kind: &str, key: &str) -> AppError {
    AppError::Database(DbErr::RecordNotFound(format!(
        "{} '{}' missing after upsert",
        kind, key
    )))
}

/// Resolve a certification by exact name, creating it if absent.
pub async fn certification<C: ConnectionTrait>(conn: &C, name: &str) -> Result<Certification> {
    if let Some(existing) = CertificationEntity::find()
        .filter(CertificationColumn::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    CertificationEntity::insert(CertificationActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(CertificationColumn::Name)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    CertificationEntity::find()
        .filter(CertificationColumn::Name.eq(name))
        .one(conn)
        .await?
        .ok_or_else(|| vanished("certification", name))
}

/// Resolve a country by ISO code (uppercased), creating it if absent.
pub async fn country<C: ConnectionTrait>(conn: &C, code: &str) -> Result<Country> {
    let code = code.to_uppercase();

    if let Some(existing) = CountryEntity::find()
        .filter(CountryColumn::Code.eq(&code))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    CountryEntity::insert(CountryActiveModel {
        code: Set(code.clone()),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(CountryColumn::Code).do_nothing().to_owned())
    .exec_without_returning(conn)
    .await?;

    CountryEntity::find()
        .filter(CountryColumn::Code.eq(&code))
        .one(conn)
        .await?
        .ok_or_else(|| vanished("country", &code))
}

/// Resolve a genre by title-cased name, creating it if absent.
pub async fn genre<C: ConnectionTrait>(conn: &C, name: &str) -> Result<Genre> {
    let name = title_case(name);

    if let Some(existing) = GenreEntity::find()
        .filter(GenreColumn::Name.eq(&name))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    GenreEntity::insert(GenreActiveModel {
        name: Set(name.clone()),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(GenreColumn::Name).do_nothing().to_owned())
    .exec_without_returning(conn)
    .await?;

    GenreEntity::find()
        .filter(GenreColumn::Name.eq(&name))
        .one(conn)
        .await?
        .ok_or_else(|| vanished("genre", &name))
}

/// Resolve an actor by title-cased name, creating it if absent.
pub async fn actor<C: ConnectionTrait>(conn: &C, name: &str) -> Result<Actor> {
    let name = title_case(name);

    if let Some(existing) = ActorEntity::find()
        .filter(ActorColumn::Name.eq(&name))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    ActorEntity::insert(ActorActiveModel {
        name: Set(name.clone()),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(ActorColumn::Name).do_nothing().to_owned())
    .exec_without_returning(conn)
    .await?;

    ActorEntity::find()
        .filter(ActorColumn::Name.eq(&name))
        .one(conn)
        .await?
        .ok_or_else(|| vanished("actor", &name))
}

/// Resolve a director by exact name, creating it if absent.
///
/// Director names are stored as submitted, without title-casing.
pub async fn director<C: ConnectionTrait>(conn: &C, name: &str) -> Result<Director> {
    if let Some(existing) = DirectorEntity::find()
        .filter(DirectorColumn::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    DirectorEntity::insert(DirectorActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(DirectorColumn::Name).do_nothing().to_owned())
    .exec_without_returning(conn)
    .await?;

    DirectorEntity::find()
        .filter(DirectorColumn::Name.eq(name))
        .one(conn)
        .await?
        .ok_or_else(|| vanished("director", name))
}

/// Resolve a language by title-cased name, creating it if absent.
pub async fn language<C: ConnectionTrait>(conn: &C, name: &str) -> Result<Language> {
    let name = title_case(name);

    if let Some(existing) = LanguageEntity::find()
        .filter(LanguageColumn::Name.eq(&name))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    LanguageEntity::insert(LanguageActiveModel {
        name: Set(name.clone()),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(LanguageColumn::Name).do_nothing().to_owned())
    .exec_without_returning(conn)
    .await?;

    LanguageEntity::find()
        .filter(LanguageColumn::Name.eq(&name))
        .one(conn)
        .await?
        .ok_or_else(|| vanished("language", &name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Genre;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[test]
    fn test_title_case_basic() {
        assert_eq!(title_case("action"), "Action");
        assert_eq!(title_case("ACTION"), "Action");
        assert_eq!(title_case("science fiction"), "Science Fiction");
    }

    #[test]
    fn test_title_case_word_boundaries() {
        // Any non-letter starts a new word
        assert_eq!(title_case("sci-fi"), "Sci-Fi");
        assert_eq!(title_case("film noir"), "Film Noir");
        assert_eq!(title_case("x1x"), "X1X");
        assert_eq!(title_case("o'brien"), "O'Brien");
    }

    #[test]
    fn test_title_case_empty() {
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("  "), "  ");
    }

    #[tokio::test]
    async fn test_genre_lookup_hit_uses_normalized_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[Genre {
                id: 7,
                name: "Sci-Fi".to_owned(),
            }]])
            .into_connection();

        let resolved = genre(&db, "sci-fi").await.unwrap();
        assert_eq!(resolved.id, 7);
        assert_eq!(resolved.name, "Sci-Fi");

        // Single lookup, no insert, and the query carried the normalized key
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(format!("{:?}", log[0]).contains("Sci-Fi"));
    }

    #[tokio::test]
    async fn test_genre_miss_inserts_then_reselects() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Genre>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[Genre {
                id: 3,
                name: "Western".to_owned(),
            }]])
            .into_connection();

        let resolved = genre(&db, "western").await.unwrap();
        assert_eq!(resolved.id, 3);

        // Lookup, upsert, re-select
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_country_code_uppercased() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[crate::db::models::Country {
                id: 1,
                code: "UA".to_owned(),
                name: None,
            }]])
            .into_connection();

        let resolved = country(&db, "ua").await.unwrap();
        assert_eq!(resolved.code, "UA");

        let log = db.into_transaction_log();
        assert!(format!("{:?}", log[0]).contains("UA"));
    }

    #[tokio::test]
    async fn test_director_name_not_normalized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[crate::db::models::Director {
                id: 5,
                name: "christopher nolan".to_owned(),
            }]])
            .into_connection();

        let resolved = director(&db, "christopher nolan").await.unwrap();
        assert_eq!(resolved.name, "christopher nolan");

        let log = db.into_transaction_log();
        assert!(format!("{:?}", log[0]).contains("christopher nolan"));
    }

    #[tokio::test]
    async fn test_vanished_row_is_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Genre>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<Genre>::new()])
            .into_connection();

        let err = genre(&db, "western").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
