//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support.

use crate::db::models::*;
use crate::db::{resolver, DbPool};
use crate::errors::{AppError, Result};
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, LoaderTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input for creating a movie together with its reference entities
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub name: String,
    pub year: NaiveDate,
    pub time: i32,
    pub score: f64,
    pub imdb: f64,
    pub votes: i32,
    pub meta_score: f64,
    pub overview: String,
    pub status: MovieStatus,
    pub budget: f64,
    pub gross: f64,
    pub certification: String,
    pub country: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub languages: Vec<String>,
}

/// Partial update for a movie; unset fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct MovieChanges {
    pub name: Option<String>,
    pub year: Option<NaiveDate>,
    pub score: Option<f64>,
    pub overview: Option<String>,
    pub status: Option<MovieStatus>,
    pub budget: Option<f64>,
    pub time: Option<i32>,
    pub gross: Option<f64>,
    pub imdb: Option<f64>,
    pub votes: Option<i32>,
    pub meta_score: Option<f64>,
}

impl MovieChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.year.is_none()
            && self.score.is_none()
            && self.overview.is_none()
            && self.status.is_none()
            && self.budget.is_none()
            && self.time.is_none()
            && self.gross.is_none()
            && self.imdb.is_none()
            && self.votes.is_none()
            && self.meta_score.is_none()
    }
}

/// Catalog filter parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieFilter {
    pub year: Option<i32>,
    pub imdb_min: Option<f64>,
    pub imdb_max: Option<f64>,
    pub genre_id: Option<i32>,
    pub name: Option<String>,
}

/// Favorite list filter parameters
#[derive(Debug, Clone, Default)]
pub struct FavoriteFilter {
    pub year: Option<i32>,
    pub name: Option<String>,
    pub imdb: Option<f64>,
}

/// Multi-value search parameters; empty lists impose no constraint
#[derive(Debug, Clone, Default)]
pub struct MovieSearch {
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub overview: Option<String>,
}

/// Sort direction for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A movie with every relation loaded
#[derive(Debug, Clone)]
pub struct MovieDetail {
    pub movie: Movie,
    pub certification: Certification,
    pub country: Country,
    pub genres: Vec<Genre>,
    pub actors: Vec<Actor>,
    pub directors: Vec<Director>,
    pub languages: Vec<Language>,
}

/// A movie with the relations shown on list pages
#[derive(Debug, Clone)]
pub struct MovieListItem {
    pub movie: Movie,
    pub languages: Vec<Language>,
    pub directors: Vec<Director>,
}

/// Genre with the number of movies carrying it
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct GenreWithCount {
    pub id: i32,
    pub name: String,
    pub movie_count: i64,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Movie Operations
    // ========================================================================

    /// Total number of movies in the catalog
    pub async fn count_movies(&self) -> Result<u64> {
        MovieEntity::find()
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// One page of the catalog ordered by id, with list-page relations
    pub async fn list_movies_page(&self, offset: u64, limit: u64) -> Result<Vec<MovieListItem>> {
        let movies = MovieEntity::find()
            .order_by_asc(MovieColumn::Id)
            .offset(offset)
            .limit(limit)
            .all(self.read_conn())
            .await?;

        self.attach_list_relations(movies).await
    }

    /// Create a movie and its reference entities in one transaction.
    ///
    /// A movie with the same name and release date is rejected up front.
    /// Certification, country, genres, actors, languages and directors are
    /// resolved lazily inside the transaction, so a failure at any point
    /// leaves nothing behind.
    pub async fn create_movie(&self, data: NewMovie) -> Result<MovieDetail> {
        let existing = MovieEntity::find()
            .filter(ColumnTrait::eq(&MovieColumn::Name, &data.name))
            .filter(ColumnTrait::eq(&MovieColumn::Year, data.year))
            .one(self.write_conn())
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateMovie {
                name: data.name,
                year: data.year,
            });
        }

        let txn = self.write_conn().begin().await?;

        let certification = resolver::certification(&txn, &data.certification).await?;
        let country = resolver::country(&txn, &data.country).await?;

        let movie = MovieActiveModel {
            uuid: Set(Uuid::new_v4()),
            name: Set(data.name),
            year: Set(data.year),
            time: Set(data.time),
            score: Set(data.score),
            imdb: Set(data.imdb),
            votes: Set(data.votes),
            meta_score: Set(data.meta_score),
            overview: Set(data.overview),
            status: Set(data.status),
            budget: Set(data.budget),
            gross: Set(data.gross),
            country_id: Set(country.id),
            certification_id: Set(certification.id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(constraint_to_invalid_input)?;

        for name in &data.genres {
            let genre = resolver::genre(&txn, name).await?;
            MovieGenreActiveModel {
                movie_id: Set(movie.id),
                genre_id: Set(genre.id),
            }
            .insert(&txn)
            .await
            .map_err(constraint_to_invalid_input)?;
        }

        for name in &data.actors {
            let actor = resolver::actor(&txn, name).await?;
            MovieActorActiveModel {
                movie_id: Set(movie.id),
                actor_id: Set(actor.id),
            }
            .insert(&txn)
            .await
            .map_err(constraint_to_invalid_input)?;
        }

        for name in &data.languages {
            let language = resolver::language(&txn, name).await?;
            MovieLanguageActiveModel {
                movie_id: Set(movie.id),
                language_id: Set(language.id),
            }
            .insert(&txn)
            .await
            .map_err(constraint_to_invalid_input)?;
        }

        for name in &data.directors {
            let director = resolver::director(&txn, name).await?;
            MovieDirectorActiveModel {
                movie_id: Set(movie.id),
                director_id: Set(director.id),
            }
            .insert(&txn)
            .await
            .map_err(constraint_to_invalid_input)?;
        }

        txn.commit().await?;

        self.get_movie_detail(movie.id).await
    }

    /// Fetch a movie with every relation loaded
    pub async fn get_movie_detail(&self, id: i32) -> Result<MovieDetail> {
        let movie = MovieEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .ok_or(AppError::MovieNotFound)?;

        self.load_movie_detail(movie).await
    }

    async fn load_movie_detail(&self, movie: Movie) -> Result<MovieDetail> {
        let conn = self.read_conn();

        let certification = movie
            .find_related(CertificationEntity)
            .one(conn)
            .await?
            .ok_or_else(|| missing_relation(movie.id, "certification"))?;
        let country = movie
            .find_related(CountryEntity)
            .one(conn)
            .await?
            .ok_or_else(|| missing_relation(movie.id, "country"))?;
        let genres = movie.find_related(GenreEntity).all(conn).await?;
        let actors = movie.find_related(ActorEntity).all(conn).await?;
        let directors = movie.find_related(DirectorEntity).all(conn).await?;
        let languages = movie.find_related(LanguageEntity).all(conn).await?;

        Ok(MovieDetail {
            movie,
            certification,
            country,
            genres,
            actors,
            directors,
            languages,
        })
    }

    /// Apply a partial update to a movie
    pub async fn update_movie(&self, id: i32, changes: MovieChanges) -> Result<()> {
        let conn = self.write_conn();

        let movie = MovieEntity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(AppError::MovieNotFound)?;

        if changes.is_empty() {
            return Ok(());
        }

        let mut active: MovieActiveModel = movie.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(score) = changes.score {
            active.score = Set(score);
        }
        if let Some(overview) = changes.overview {
            active.overview = Set(overview);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        if let Some(budget) = changes.budget {
            active.budget = Set(budget);
        }
        if let Some(time) = changes.time {
            active.time = Set(time);
        }
        if let Some(gross) = changes.gross {
            active.gross = Set(gross);
        }
        if let Some(imdb) = changes.imdb {
            active.imdb = Set(imdb);
        }
        if let Some(votes) = changes.votes {
            active.votes = Set(votes);
        }
        if let Some(meta_score) = changes.meta_score {
            active.meta_score = Set(meta_score);
        }

        active
            .update(conn)
            .await
            .map_err(constraint_to_invalid_input)?;
        Ok(())
    }

    /// Delete a movie by id
    pub async fn delete_movie(&self, id: i32) -> Result<()> {
        let result = MovieEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::MovieNotFound);
        }
        Ok(())
    }

    /// Movies matching the given filter
    pub async fn filter_movies(&self, filter: &MovieFilter) -> Result<Vec<Movie>> {
        let mut query = MovieEntity::find();

        if let Some(year) = filter.year {
            let (start, end) = year_bounds(year)?;
            query = query
                .filter(MovieColumn::Year.gte(start))
                .filter(MovieColumn::Year.lt(end));
        }
        if let Some(min) = filter.imdb_min {
            query = query.filter(MovieColumn::Imdb.gte(min));
        }
        if let Some(max) = filter.imdb_max {
            query = query.filter(MovieColumn::Imdb.lte(max));
        }
        if let Some(ref name) = filter.name {
            query = query.filter(contains_ci(MovieColumn::Name, name));
        }
        if let Some(genre_id) = filter.genre_id {
            query = query
                .join(JoinType::InnerJoin, MovieRelation::MovieGenres.def())
                .filter(MovieGenreColumn::GenreId.eq(genre_id));
        }

        query.all(self.read_conn()).await.map_err(Into::into)
    }

    /// Catalog sorted by a named key; unknown keys leave the order unspecified
    pub async fn sort_movies(&self, sort_by: &str, order: SortOrder) -> Result<Vec<Movie>> {
        let mut query = MovieEntity::find();
        if let Some(column) = movie_sort_column(sort_by) {
            query = apply_order(query, column, order);
        }
        query.all(self.read_conn()).await.map_err(Into::into)
    }

    /// Movies matching any of the given genre, actor and director names,
    /// with an optional overview substring
    pub async fn search_movies(&self, search: &MovieSearch) -> Result<Vec<Movie>> {
        let mut query = MovieEntity::find();

        if !search.genres.is_empty() {
            query = query
                .join(JoinType::InnerJoin, MovieRelation::MovieGenres.def())
                .join(JoinType::InnerJoin, MovieGenreRelation::Genre.def())
                .filter(GenreColumn::Name.is_in(search.genres.clone()));
        }
        if !search.actors.is_empty() {
            query = query
                .join(JoinType::InnerJoin, MovieRelation::MovieActors.def())
                .join(JoinType::InnerJoin, MovieActorRelation::Actor.def())
                .filter(ActorColumn::Name.is_in(search.actors.clone()));
        }
        if !search.directors.is_empty() {
            query = query
                .join(JoinType::InnerJoin, MovieRelation::MovieDirectors.def())
                .join(JoinType::InnerJoin, MovieDirectorRelation::Director.def())
                .filter(DirectorColumn::Name.is_in(search.directors.clone()));
        }
        if let Some(ref overview) = search.overview {
            query = query.filter(contains_ci(MovieColumn::Overview, overview));
        }

        query
            .distinct()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Movies carrying the given genre, with list-page relations
    pub async fn list_movies_by_genre(&self, genre_id: i32) -> Result<Vec<MovieListItem>> {
        let movies = MovieEntity::find()
            .join(JoinType::InnerJoin, MovieRelation::MovieGenres.def())
            .filter(MovieGenreColumn::GenreId.eq(genre_id))
            .order_by_asc(MovieColumn::Id)
            .all(self.read_conn())
            .await?;

        self.attach_list_relations(movies).await
    }

    async fn attach_list_relations(&self, movies: Vec<Movie>) -> Result<Vec<MovieListItem>> {
        let conn = self.read_conn();

        let languages = movies
            .load_many_to_many(LanguageEntity, MovieLanguageEntity, conn)
            .await?;
        let directors = movies
            .load_many_to_many(DirectorEntity, MovieDirectorEntity, conn)
            .await?;

        Ok(movies
            .into_iter()
            .zip(languages)
            .zip(directors)
            .map(|((movie, languages), directors)| MovieListItem {
                movie,
                languages,
                directors,
            })
            .collect())
    }

    // ========================================================================
    // Genre Operations
    // ========================================================================

    /// Genres with movie counts; genres without movies are not listed
    pub async fn list_genres_with_counts(&self) -> Result<Vec<GenreWithCount>> {
        GenreEntity::find()
            .select_only()
            .column(GenreColumn::Id)
            .column(GenreColumn::Name)
            .column_as(MovieGenreColumn::MovieId.count(), "movie_count")
            .join(JoinType::InnerJoin, GenreRelation::MovieGenres.def())
            .group_by(GenreColumn::Id)
            .order_by_desc(MovieGenreColumn::MovieId.count())
            .into_model::<GenreWithCount>()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Like Operations
    // ========================================================================

    /// Record a like or dislike; a repeat submission overwrites the flag
    pub async fn save_movie_like(&self, user_id: i32, movie_id: i32, is_like: bool) -> Result<()> {
        let conn = self.write_conn();

        let existing = MovieLikeEntity::find()
            .filter(MovieLikeColumn::UserId.eq(user_id))
            .filter(MovieLikeColumn::MovieId.eq(movie_id))
            .one(conn)
            .await?;

        match existing {
            Some(record) => {
                let mut active: MovieLikeActiveModel = record.into();
                active.is_like = Set(is_like);
                active.update(conn).await?;
            }
            None => {
                MovieLikeActiveModel {
                    user_id: Set(user_id),
                    movie_id: Set(movie_id),
                    is_like: Set(is_like),
                    ..Default::default()
                }
                .insert(conn)
                .await
                .map_err(constraint_to_invalid_input)?;
            }
        }

        Ok(())
    }

    /// Like and dislike counts for a movie
    pub async fn movie_like_stats(&self, movie_id: i32) -> Result<(u64, u64)> {
        let conn = self.read_conn();

        let likes = MovieLikeEntity::find()
            .filter(MovieLikeColumn::MovieId.eq(movie_id))
            .filter(MovieLikeColumn::IsLike.eq(true))
            .count(conn)
            .await?;
        let dislikes = MovieLikeEntity::find()
            .filter(MovieLikeColumn::MovieId.eq(movie_id))
            .filter(MovieLikeColumn::IsLike.eq(false))
            .count(conn)
            .await?;

        Ok((likes, dislikes))
    }

    // ========================================================================
    // Favorite Operations
    // ========================================================================

    /// Add a movie to the user's favorites and return the movie
    pub async fn add_favorite(&self, user_id: i32, movie_id: i32) -> Result<Movie> {
        let conn = self.write_conn();

        let movie = MovieEntity::find_by_id(movie_id)
            .one(conn)
            .await?
            .ok_or(AppError::MovieNotFound)?;

        let existing = FavoriteMovieEntity::find()
            .filter(FavoriteMovieColumn::UserId.eq(user_id))
            .filter(FavoriteMovieColumn::MovieId.eq(movie_id))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateFavorite);
        }

        FavoriteMovieActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateFavorite,
            _ => AppError::Database(err),
        })?;

        Ok(movie)
    }

    /// The user's favorite movies, filtered and sorted
    pub async fn list_favorites(
        &self,
        user_id: i32,
        filter: &FavoriteFilter,
        sort_by: &str,
        order: SortOrder,
    ) -> Result<Vec<Movie>> {
        let mut query = MovieEntity::find()
            .join(JoinType::InnerJoin, MovieRelation::FavoriteMovies.def())
            .filter(FavoriteMovieColumn::UserId.eq(user_id));

        if let Some(year) = filter.year {
            let (start, end) = year_bounds(year)?;
            query = query
                .filter(MovieColumn::Year.gte(start))
                .filter(MovieColumn::Year.lt(end));
        }
        if let Some(ref name) = filter.name {
            query = query.filter(contains_ci(MovieColumn::Name, name));
        }
        if let Some(imdb) = filter.imdb {
            query = query.filter(ColumnTrait::eq(&MovieColumn::Imdb, imdb));
        }
        if let Some(column) = favorite_sort_column(sort_by) {
            query = apply_order(query, column, order);
        }

        query.all(self.read_conn()).await.map_err(Into::into)
    }

    /// Remove a movie from the user's favorites
    pub async fn remove_favorite(&self, user_id: i32, movie_id: Option<i32>) -> Result<()> {
        let movie_id = movie_id.ok_or(AppError::FavoriteNotFound)?;
        let conn = self.write_conn();

        let favorite = FavoriteMovieEntity::find()
            .filter(FavoriteMovieColumn::UserId.eq(user_id))
            .filter(FavoriteMovieColumn::MovieId.eq(movie_id))
            .one(conn)
            .await?
            .ok_or(AppError::FavoriteNotFound)?;

        favorite.delete(conn).await?;
        Ok(())
    }

    // ========================================================================
    // Rating Operations
    // ========================================================================

    /// Record a one-time rating for a movie
    pub async fn rate_movie(&self, user_id: i32, movie_id: i32, rating: i32) -> Result<()> {
        let conn = self.write_conn();

        let existing = MovieRatingEntity::find()
            .filter(MovieRatingColumn::UserId.eq(user_id))
            .filter(MovieRatingColumn::MovieId.eq(movie_id))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateRating);
        }

        MovieRatingActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            rating: Set(rating),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateRating,
            _ => AppError::Database(err),
        })?;

        Ok(())
    }

    // ========================================================================
    // Comment Operations
    // ========================================================================

    /// Create a top-level comment on a movie
    pub async fn create_comment(
        &self,
        user_id: i32,
        movie_id: i32,
        content: String,
    ) -> Result<Comment> {
        CommentActiveModel {
            content: Set(content),
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            parent_id: Set(None),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(self.write_conn())
        .await
        .map_err(constraint_to_invalid_input)
    }

    /// Reply to a comment, inheriting its movie.
    ///
    /// The author of the parent comment is notified unless they reply to
    /// themselves. Reply and notification commit together.
    pub async fn reply_to_comment(
        &self,
        comment_id: i32,
        user: &User,
        content: String,
    ) -> Result<Comment> {
        let txn = self.write_conn().begin().await?;

        let parent = CommentEntity::find_by_id(comment_id)
            .one(&txn)
            .await?
            .ok_or(AppError::CommentNotFound)?;

        let reply = CommentActiveModel {
            content: Set(content),
            user_id: Set(user.id),
            movie_id: Set(parent.movie_id),
            parent_id: Set(Some(parent.id)),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if parent.user_id != user.id {
            NotificationActiveModel {
                recipient_id: Set(parent.user_id),
                message: Set(format!(
                    "User {} replied to your movie comment.",
                    user.email
                )),
                is_read: Set(false),
                created_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(reply)
    }

    /// Like a comment once, notifying its author.
    ///
    /// Liking the same comment twice is a conflict; liking your own
    /// comment produces no notification.
    pub async fn like_comment(&self, comment_id: i32, user: &User) -> Result<()> {
        let txn = self.write_conn().begin().await?;

        let comment = CommentEntity::find_by_id(comment_id)
            .one(&txn)
            .await?
            .ok_or(AppError::CommentNotFound)?;

        let existing = CommentLikeEntity::find()
            .filter(CommentLikeColumn::UserId.eq(user.id))
            .filter(CommentLikeColumn::CommentId.eq(comment_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateCommentLike);
        }

        CommentLikeActiveModel {
            user_id: Set(user.id),
            comment_id: Set(comment_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateCommentLike,
            _ => AppError::Database(err),
        })?;

        if comment.user_id != user.id {
            NotificationActiveModel {
                recipient_id: Set(comment.user_id),
                message: Set(format!("User {} liked your comment.", user.email)),
                is_read: Set(false),
                created_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Notification Operations
    // ========================================================================

    /// Notification messages for a user, newest first
    pub async fn list_notifications(&self, user_id: i32) -> Result<Vec<String>> {
        let notifications = NotificationEntity::find()
            .filter(NotificationColumn::RecipientId.eq(user_id))
            .order_by_desc(NotificationColumn::CreatedAt)
            .all(self.read_conn())
            .await?;

        Ok(notifications.into_iter().map(|n| n.message).collect())
    }

    /// Mark every unread notification for a user as read
    pub async fn mark_notifications_read(&self, user_id: i32) -> Result<u64> {
        let result = NotificationEntity::update_many()
            .col_expr(NotificationColumn::IsRead, Expr::value(true))
            .filter(NotificationColumn::RecipientId.eq(user_id))
            .filter(NotificationColumn::IsRead.eq(false))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected)
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Load a user together with their group
    pub async fn find_user_with_group(&self, user_id: i32) -> Result<Option<(User, UserGroup)>> {
        let row = UserEntity::find_by_id(user_id)
            .find_also_related(UserGroupEntity)
            .one(self.read_conn())
            .await?;

        match row {
            None => Ok(None),
            Some((user, Some(group))) => Ok(Some((user, group))),
            Some((user, None)) => Err(AppError::Internal {
                message: format!("user {} references a missing group", user.id),
            }),
        }
    }

    // ========================================================================
    // Token Operations
    // ========================================================================

    /// Delete every token that expired before now; returns the count
    pub async fn delete_expired_tokens(&self) -> Result<u64> {
        let result = TokenEntity::delete_many()
            .filter(TokenColumn::ExpiresAt.lt(Utc::now()))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected)
    }
}

// ========================================================================
// Query Helpers
// ========================================================================

fn movie_sort_column(key: &str) -> Option<MovieColumn> {
    match key {
        "price" => Some(MovieColumn::Budget),
        "year" => Some(MovieColumn::Year),
        "imdb" => Some(MovieColumn::Imdb),
        "votes" => Some(MovieColumn::Votes),
        _ => None,
    }
}

fn favorite_sort_column(key: &str) -> Option<MovieColumn> {
    match key {
        "year" => Some(MovieColumn::Year),
        "imdb" => Some(MovieColumn::Imdb),
        "name" => Some(MovieColumn::Name),
        _ => None,
    }
}

fn apply_order(
    query: Select<MovieEntity>,
    column: MovieColumn,
    order: SortOrder,
) -> Select<MovieEntity> {
    match order {
        SortOrder::Asc => query.order_by_asc(column),
        SortOrder::Desc => query.order_by_desc(column),
    }
}

/// Calendar-year bounds for filtering the release date column
fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = year
        .checked_add(1)
        .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1));

    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(AppError::Validation {
            message: format!("Year {} is out of range", year),
            field: Some("year".to_string()),
        }),
    }
}

/// Case-insensitive substring match on a movie column
fn contains_ci(column: MovieColumn, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((MovieEntity, column))))
        .like(format!("%{}%", needle.to_lowercase()))
}

fn constraint_to_invalid_input(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_))
        | Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::InvalidInput,
        _ => AppError::Database(err),
    }
}

fn missing_relation(movie_id: i32, relation: &str) -> AppError {
    AppError::Internal {
        message: format!("movie {} has no {}", movie_id, relation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn mock_repository(db: MockDatabase) -> Repository {
        Repository::new(DbPool {
            primary: db.into_connection(),
            replica: None,
        })
    }

    fn sample_movie(id: i32) -> Movie {
        Movie {
            id,
            uuid: Uuid::new_v4(),
            name: "Inception".to_string(),
            year: NaiveDate::from_ymd_opt(2010, 7, 16).unwrap(),
            time: 148,
            score: 87.0,
            imdb: 8.8,
            votes: 2_400_000,
            meta_score: 74.0,
            overview: "A thief steals corporate secrets through dreams.".to_string(),
            status: MovieStatus::Released,
            budget: 160_000_000.0,
            gross: 836_800_000.0,
            country_id: 1,
            certification_id: 1,
        }
    }

    fn sample_user(id: i32, email: &str) -> User {
        User {
            id,
            email: email.to_string(),
            hashed_password: "hash".to_string(),
            group_id: 1,
        }
    }

    #[test]
    fn test_movie_sort_column_mapping() {
        assert_eq!(movie_sort_column("price"), Some(MovieColumn::Budget));
        assert_eq!(movie_sort_column("year"), Some(MovieColumn::Year));
        assert_eq!(movie_sort_column("imdb"), Some(MovieColumn::Imdb));
        assert_eq!(movie_sort_column("votes"), Some(MovieColumn::Votes));
        assert_eq!(movie_sort_column("name"), None);
        assert_eq!(movie_sort_column(""), None);
    }

    #[test]
    fn test_favorite_sort_column_mapping() {
        assert_eq!(favorite_sort_column("year"), Some(MovieColumn::Year));
        assert_eq!(favorite_sort_column("imdb"), Some(MovieColumn::Imdb));
        assert_eq!(favorite_sort_column("name"), Some(MovieColumn::Name));
        assert_eq!(favorite_sort_column("price"), None);
    }

    #[test]
    fn test_year_bounds_cover_calendar_year() {
        let (start, end) = year_bounds(1994).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(1994, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(1995, 1, 1).unwrap());
    }

    #[test]
    fn test_year_bounds_rejects_out_of_range() {
        assert!(year_bounds(i32::MAX).is_err());
    }

    #[test]
    fn test_movie_changes_is_empty() {
        assert!(MovieChanges::default().is_empty());

        let changes = MovieChanges {
            score: Some(90.0),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[tokio::test]
    async fn test_create_movie_rejects_duplicate_name_and_year() {
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[sample_movie(1)]]),
        );

        let data = NewMovie {
            name: "Inception".to_string(),
            year: NaiveDate::from_ymd_opt(2010, 7, 16).unwrap(),
            time: 148,
            score: 87.0,
            imdb: 8.8,
            votes: 2_400_000,
            meta_score: 74.0,
            overview: "A thief steals corporate secrets through dreams.".to_string(),
            status: MovieStatus::Released,
            budget: 160_000_000.0,
            gross: 836_800_000.0,
            certification: "PG-13".to_string(),
            country: "US".to_string(),
            genres: vec!["Action".to_string()],
            actors: vec![],
            directors: vec![],
            languages: vec![],
        };

        let err = repo.create_movie(data).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateMovie { .. }));
    }

    #[tokio::test]
    async fn test_update_movie_missing_is_not_found() {
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<Movie>::new()]),
        );

        let err = repo
            .update_movie(42, MovieChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MovieNotFound));
    }

    #[tokio::test]
    async fn test_update_movie_empty_changes_skips_write() {
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[sample_movie(1)]]),
        );

        repo.update_movie(1, MovieChanges::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_movie_like_flips_existing_record() {
        let existing = MovieLike {
            id: 9,
            user_id: 1,
            movie_id: 5,
            is_like: true,
        };
        let flipped = MovieLike {
            is_like: false,
            ..existing.clone()
        };

        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[flipped]]),
        );

        repo.save_movie_like(1, 5, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_rate_movie_twice_is_conflict() {
        let existing = MovieRating {
            id: 3,
            user_id: 1,
            movie_id: 5,
            rating: 8,
        };
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let err = repo.rate_movie(1, 5, 9).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateRating));
    }

    #[tokio::test]
    async fn test_add_favorite_twice_is_conflict() {
        let existing = FavoriteMovie {
            id: 2,
            user_id: 1,
            movie_id: 5,
        };
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sample_movie(5)]])
                .append_query_results([[existing]]),
        );

        let err = repo.add_favorite(1, 5).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateFavorite));
    }

    #[tokio::test]
    async fn test_add_favorite_missing_movie_is_not_found() {
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<Movie>::new()]),
        );

        let err = repo.add_favorite(1, 999).await.unwrap_err();
        assert!(matches!(err, AppError::MovieNotFound));
    }

    #[tokio::test]
    async fn test_remove_favorite_without_movie_id_is_not_found() {
        let repo = mock_repository(MockDatabase::new(DatabaseBackend::Postgres));

        let err = repo.remove_favorite(1, None).await.unwrap_err();
        assert!(matches!(err, AppError::FavoriteNotFound));
    }

    #[tokio::test]
    async fn test_reply_inherits_movie_and_notifies_author() {
        let parent = Comment {
            id: 10,
            content: "Great movie".to_string(),
            user_id: 1,
            movie_id: 55,
            parent_id: None,
            created_at: Utc::now().fixed_offset(),
        };
        let reply = Comment {
            id: 11,
            content: "Agreed".to_string(),
            user_id: 2,
            movie_id: 55,
            parent_id: Some(10),
            created_at: Utc::now().fixed_offset(),
        };
        let notification = Notification {
            id: 1,
            recipient_id: 1,
            message: "User bob@example.com replied to your movie comment.".to_string(),
            is_read: false,
            created_at: Utc::now().fixed_offset(),
        };

        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[parent]])
                .append_query_results([[reply]])
                .append_query_results([[notification]]),
        );

        let user = sample_user(2, "bob@example.com");
        let created = repo
            .reply_to_comment(10, &user, "Agreed".to_string())
            .await
            .unwrap();

        assert_eq!(created.movie_id, 55);
        assert_eq!(created.parent_id, Some(10));
    }

    #[tokio::test]
    async fn test_reply_to_own_comment_skips_notification() {
        let parent = Comment {
            id: 10,
            content: "Great movie".to_string(),
            user_id: 2,
            movie_id: 55,
            parent_id: None,
            created_at: Utc::now().fixed_offset(),
        };
        let reply = Comment {
            id: 11,
            content: "Replying to myself".to_string(),
            user_id: 2,
            movie_id: 55,
            parent_id: Some(10),
            created_at: Utc::now().fixed_offset(),
        };

        // Only the parent lookup and the reply insert are budgeted; a
        // notification insert would exhaust the mock and fail the call.
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[parent]])
                .append_query_results([[reply]]),
        );

        let user = sample_user(2, "bob@example.com");
        let created = repo
            .reply_to_comment(10, &user, "Replying to myself".to_string())
            .await
            .unwrap();
        assert_eq!(created.parent_id, Some(10));
    }

    #[tokio::test]
    async fn test_reply_to_missing_comment_is_not_found() {
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<Comment>::new()]),
        );

        let user = sample_user(2, "bob@example.com");
        let err = repo
            .reply_to_comment(10, &user, "Hello".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CommentNotFound));
    }

    #[tokio::test]
    async fn test_like_comment_twice_is_conflict() {
        let comment = Comment {
            id: 10,
            content: "Great movie".to_string(),
            user_id: 1,
            movie_id: 55,
            parent_id: None,
            created_at: Utc::now().fixed_offset(),
        };
        let existing = CommentLike {
            id: 4,
            user_id: 2,
            comment_id: 10,
        };

        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .append_query_results([[existing]]),
        );

        let user = sample_user(2, "bob@example.com");
        let err = repo.like_comment(10, &user).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateCommentLike));
    }

    #[tokio::test]
    async fn test_list_notifications_returns_messages() {
        let rows = vec![
            Notification {
                id: 2,
                recipient_id: 1,
                message: "User bob@example.com liked your comment.".to_string(),
                is_read: false,
                created_at: Utc::now().fixed_offset(),
            },
            Notification {
                id: 1,
                recipient_id: 1,
                message: "User bob@example.com replied to your movie comment.".to_string(),
                is_read: true,
                created_at: Utc::now().fixed_offset(),
            },
        ];
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([rows]),
        );

        let messages = repo.list_notifications(1).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "User bob@example.com liked your comment.");
    }

    #[tokio::test]
    async fn test_mark_notifications_read_reports_count() {
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }]),
        );

        let updated = repo.mark_notifications_read(1).await.unwrap();
        assert_eq!(updated, 2);
    }

    #[tokio::test]
    async fn test_delete_expired_tokens_reports_count() {
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }]),
        );

        let deleted = repo.delete_expired_tokens().await.unwrap();
        assert_eq!(deleted, 3);
    }

    #[tokio::test]
    async fn test_delete_movie_missing_is_not_found() {
        let repo = mock_repository(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]),
        );

        let err = repo.delete_movie(42).await.unwrap_err();
        assert!(matches!(err, AppError::MovieNotFound));
    }
}
