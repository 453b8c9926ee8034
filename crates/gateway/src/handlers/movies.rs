//! Movie catalog handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::handlers::DetailResponse;
use crate::middleware::auth::CurrentUser;
use crate::AppState;
use cinescope_common::{
    auth::{check_group, ADMIN_ONLY, STAFF},
    db::models::{Actor, Certification, Country, Director, Genre, Language, Movie, MovieStatus},
    db::{
        MovieChanges, MovieDetail, MovieFilter, MovieListItem, MovieSearch, NewMovie, Repository,
        SortOrder,
    },
    errors::{AppError, Result},
    metrics,
};

/// Pagination parameters for the movie list
#[derive(Debug, Deserialize, Validate)]
pub struct PageParams {
    /// Page number (1-based index)
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u64,

    /// Number of items per page
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 20))]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    10
}

/// Request to add a movie together with its reference entities
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMovieRequest {
    #[validate(length(max = 255))]
    pub name: String,

    #[validate(custom(function = validate_release_year))]
    pub year: NaiveDate,

    /// Aggregate score on a 0-100 scale
    #[validate(range(min = 0.0, max = 100.0))]
    pub score: f64,

    pub overview: String,

    pub status: MovieStatus,

    #[validate(range(min = 0.0))]
    pub budget: f64,

    /// Runtime in minutes
    #[validate(range(min = 0))]
    pub time: i32,

    #[validate(range(min = 0.0))]
    pub imdb: f64,

    #[validate(range(min = 0))]
    pub votes: i32,

    #[validate(range(min = 0.0))]
    pub meta_score: f64,

    #[validate(range(min = 0.0))]
    pub gross: f64,

    pub certification: String,

    pub country: String,

    pub genres: Vec<String>,

    pub actors: Vec<String>,

    pub directors: Vec<String>,

    pub languages: Vec<String>,
}

impl From<CreateMovieRequest> for NewMovie {
    fn from(request: CreateMovieRequest) -> Self {
        Self {
            name: request.name,
            year: request.year,
            time: request.time,
            score: request.score,
            imdb: request.imdb,
            votes: request.votes,
            meta_score: request.meta_score,
            overview: request.overview,
            status: request.status,
            budget: request.budget,
            gross: request.gross,
            certification: request.certification,
            country: request.country,
            genres: request.genres,
            actors: request.actors,
            directors: request.directors,
            languages: request.languages,
        }
    }
}

/// Partial update; absent fields stay untouched
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMovieRequest {
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[validate(custom(function = validate_release_year))]
    pub year: Option<NaiveDate>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub score: Option<f64>,

    pub overview: Option<String>,

    pub status: Option<MovieStatus>,

    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,

    #[validate(range(min = 0))]
    pub time: Option<i32>,

    #[validate(range(min = 0.0))]
    pub gross: Option<f64>,

    #[validate(range(min = 0.0))]
    pub imdb: Option<f64>,

    #[validate(range(min = 0))]
    pub votes: Option<i32>,

    #[validate(range(min = 0.0))]
    pub meta_score: Option<f64>,
}

impl From<UpdateMovieRequest> for MovieChanges {
    fn from(request: UpdateMovieRequest) -> Self {
        Self {
            name: request.name,
            year: request.year,
            score: request.score,
            overview: request.overview,
            status: request.status,
            budget: request.budget,
            time: request.time,
            gross: request.gross,
            imdb: request.imdb,
            votes: request.votes,
            meta_score: request.meta_score,
        }
    }
}

/// Sort selection for the sorted listing
#[derive(Debug, Deserialize)]
pub struct SortParams {
    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    #[serde(default)]
    pub order: SortOrder,
}

fn default_sort_by() -> String {
    "year".to_string()
}

/// Search terms; list-valued parameters arrive comma-separated
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub genres: Option<String>,
    pub actors: Option<String>,
    pub directors: Option<String>,
    pub overview: Option<String>,
}

/// Reference entity rendered as id + name
#[derive(Debug, Serialize)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

impl From<Genre> for NamedRef {
    fn from(genre: Genre) -> Self {
        Self {
            id: genre.id,
            name: genre.name,
        }
    }
}

impl From<Actor> for NamedRef {
    fn from(actor: Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.name,
        }
    }
}

impl From<Director> for NamedRef {
    fn from(director: Director) -> Self {
        Self {
            id: director.id,
            name: director.name,
        }
    }
}

impl From<Language> for NamedRef {
    fn from(language: Language) -> Self {
        Self {
            id: language.id,
            name: language.name,
        }
    }
}

impl From<Certification> for NamedRef {
    fn from(certification: Certification) -> Self {
        Self {
            id: certification.id,
            name: certification.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountryRef {
    pub id: i32,
    pub code: String,
    pub name: Option<String>,
}

impl From<Country> for CountryRef {
    fn from(country: Country) -> Self {
        Self {
            id: country.id,
            code: country.code,
            name: country.name,
        }
    }
}

/// List-page projection of a movie
#[derive(Debug, Serialize)]
pub struct MovieListItemOut {
    pub id: i32,
    pub name: String,
    pub year: NaiveDate,
    pub time: i32,
    pub imdb: f64,
    pub languages: Vec<NamedRef>,
    pub directors: Vec<NamedRef>,
}

impl From<MovieListItem> for MovieListItemOut {
    fn from(item: MovieListItem) -> Self {
        let MovieListItem {
            movie,
            languages,
            directors,
        } = item;
        Self {
            id: movie.id,
            name: movie.name,
            year: movie.year,
            time: movie.time,
            imdb: movie.imdb,
            languages: languages.into_iter().map(Into::into).collect(),
            directors: directors.into_iter().map(Into::into).collect(),
        }
    }
}

/// Paginated movie list
#[derive(Debug, Serialize)]
pub struct MovieListPage {
    pub movies: Vec<MovieListItemOut>,
    pub prev_page: Option<String>,
    pub next_page: Option<String>,
    pub total_pages: u64,
    pub total_items: u64,
}

/// Full projection of a movie with every relation
#[derive(Debug, Serialize)]
pub struct MovieDetailOut {
    pub id: i32,
    pub uuid: Uuid,
    pub name: String,
    pub year: NaiveDate,
    pub score: f64,
    pub overview: String,
    pub status: MovieStatus,
    pub budget: f64,
    pub time: i32,
    pub imdb: f64,
    pub votes: i32,
    pub meta_score: f64,
    pub gross: f64,
    pub certification: NamedRef,
    pub country: CountryRef,
    pub genres: Vec<NamedRef>,
    pub actors: Vec<NamedRef>,
    pub languages: Vec<NamedRef>,
    pub directors: Vec<NamedRef>,
}

impl From<MovieDetail> for MovieDetailOut {
    fn from(detail: MovieDetail) -> Self {
        let MovieDetail {
            movie,
            certification,
            country,
            genres,
            actors,
            directors,
            languages,
        } = detail;
        Self {
            id: movie.id,
            uuid: movie.uuid,
            name: movie.name,
            year: movie.year,
            score: movie.score,
            overview: movie.overview,
            status: movie.status,
            budget: movie.budget,
            time: movie.time,
            imdb: movie.imdb,
            votes: movie.votes,
            meta_score: movie.meta_score,
            gross: movie.gross,
            certification: certification.into(),
            country: country.into(),
            genres: genres.into_iter().map(Into::into).collect(),
            actors: actors.into_iter().map(Into::into).collect(),
            languages: languages.into_iter().map(Into::into).collect(),
            directors: directors.into_iter().map(Into::into).collect(),
        }
    }
}

/// Paginated catalog listing
pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<MovieListPage>> {
    params.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());

    let total_items = repo.count_movies().await?;
    if total_items == 0 {
        return Err(AppError::NoMoviesFound);
    }

    let offset = (params.page - 1) * params.per_page;
    let page = repo.list_movies_page(offset, params.per_page).await?;
    if page.is_empty() {
        return Err(AppError::NoMoviesFound);
    }

    let total_pages = total_items.div_ceil(params.per_page);

    Ok(Json(MovieListPage {
        movies: page.into_iter().map(Into::into).collect(),
        prev_page: (params.page > 1).then(|| page_url(params.page - 1, params.per_page)),
        next_page: (params.page < total_pages).then(|| page_url(params.page + 1, params.per_page)),
        total_pages,
        total_items,
    }))
}

fn page_url(page: u64, per_page: u64) -> String {
    format!("/theater/movies/?page={}&per_page={}", page, per_page)
}

/// Add a movie; reference entities are created or linked automatically
pub async fn create_movie(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<MovieDetailOut>)> {
    check_group(current_user.group, STAFF)?;
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let detail = repo.create_movie(request.into()).await?;

    metrics::record_movie_created();
    tracing::info!(
        movie_id = detail.movie.id,
        name = %detail.movie.name,
        "Movie created"
    );

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// Movie details by id
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
) -> Result<Json<MovieDetailOut>> {
    let repo = Repository::new(state.db.clone());
    let detail = repo.get_movie_detail(movie_id).await?;

    Ok(Json(detail.into()))
}

/// Partially update a movie
pub async fn update_movie(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(movie_id): Path<i32>,
    Json(request): Json<UpdateMovieRequest>,
) -> Result<Json<DetailResponse>> {
    check_group(current_user.group, STAFF)?;
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    repo.update_movie(movie_id, request.into()).await?;

    tracing::info!(movie_id, "Movie updated");

    Ok(Json(DetailResponse {
        detail: "Movie updated successfully.",
    }))
}

/// Remove a movie and its junction rows
pub async fn delete_movie(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(movie_id): Path<i32>,
) -> Result<StatusCode> {
    check_group(current_user.group, ADMIN_ONLY)?;

    let repo = Repository::new(state.db.clone());
    repo.delete_movie(movie_id).await?;

    metrics::record_movie_deleted();
    tracing::info!(movie_id, "Movie deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Filtered listing; conditions combine conjunctively
pub async fn filter_movies(
    State(state): State<AppState>,
    Query(filter): Query<MovieFilter>,
) -> Result<Json<Vec<Movie>>> {
    let repo = Repository::new(state.db.clone());
    let movies = repo.filter_movies(&filter).await?;

    Ok(Json(movies))
}

/// Catalog ordered by an allow-listed sort key
pub async fn sort_movies(
    State(state): State<AppState>,
    Query(params): Query<SortParams>,
) -> Result<Json<Vec<Movie>>> {
    let repo = Repository::new(state.db.clone());
    let movies = repo.sort_movies(&params.sort_by, params.order).await?;

    Ok(Json(movies))
}

/// Search by related entity names and overview text
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Movie>>> {
    let search = MovieSearch {
        genres: split_csv(params.genres.as_deref()),
        actors: split_csv(params.actors.as_deref()),
        directors: split_csv(params.directors.as_deref()),
        overview: params.overview,
    };

    let repo = Repository::new(state.db.clone());
    let movies = repo.search_movies(&search).await?;

    Ok(Json(movies))
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn validate_release_year(year: &NaiveDate) -> std::result::Result<(), ValidationError> {
    let limit = Utc::now().year() + 1;
    if year.year() > limit {
        return Err(ValidationError::new("year").with_message(
            format!("The release year cannot be greater than {}", limit).into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create_request() -> CreateMovieRequest {
        CreateMovieRequest {
            name: "Arrival".to_string(),
            year: NaiveDate::from_ymd_opt(2016, 11, 11).unwrap(),
            score: 81.0,
            overview: "A linguist is recruited to decipher an alien language.".to_string(),
            status: MovieStatus::Released,
            budget: 47_000_000.0,
            time: 116,
            imdb: 7.9,
            votes: 691_000,
            meta_score: 81.0,
            gross: 203_000_000.0,
            certification: "PG-13".to_string(),
            country: "US".to_string(),
            genres: vec!["Sci-Fi".to_string(), "Drama".to_string()],
            actors: vec!["Amy Adams".to_string()],
            directors: vec!["Denis Villeneuve".to_string()],
            languages: vec!["English".to_string()],
        }
    }

    #[test]
    fn page_params_default_to_first_page() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 10);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn page_params_reject_out_of_range_values() {
        let zero_page = PageParams {
            page: 0,
            per_page: 10,
        };
        assert!(zero_page.validate().is_err());

        let oversized = PageParams {
            page: 1,
            per_page: 21,
        };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn page_urls_carry_both_parameters() {
        assert_eq!(page_url(3, 15), "/theater/movies/?page=3&per_page=15");
    }

    #[test]
    fn create_request_allows_next_calendar_year() {
        let mut request = sample_create_request();
        request.year = NaiveDate::from_ymd_opt(Utc::now().year() + 1, 6, 1).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_far_future_year() {
        let mut request = sample_create_request();
        request.year = NaiveDate::from_ymd_opt(Utc::now().year() + 2, 1, 1).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn create_request_rejects_score_above_scale() {
        let mut request = sample_create_request();
        request.score = 120.5;
        assert!(request.validate().is_err());
    }

    #[test]
    fn update_request_maps_only_set_fields() {
        let request = UpdateMovieRequest {
            score: Some(88.0),
            ..Default::default()
        };

        let changes: MovieChanges = request.into();
        assert_eq!(changes.score, Some(88.0));
        assert!(changes.name.is_none());
        assert!(!changes.is_empty());
    }

    #[test]
    fn empty_update_request_produces_empty_changes() {
        let changes: MovieChanges = UpdateMovieRequest::default().into();
        assert!(changes.is_empty());
    }

    #[test]
    fn split_csv_trims_and_drops_empty_parts() {
        assert_eq!(
            split_csv(Some("Sci-Fi, Drama,,  Crime ")),
            vec!["Sci-Fi", "Drama", "Crime"]
        );
        assert!(split_csv(None).is_empty());
    }
}
