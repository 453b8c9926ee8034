//! Movie entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Production status of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum MovieStatus {
    #[sea_orm(string_value = "Released")]
    Released,

    #[sea_orm(string_value = "Post Production")]
    #[serde(rename = "Post Production")]
    PostProduction,

    #[sea_orm(string_value = "In Production")]
    #[serde(rename = "In Production")]
    InProduction,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: Uuid,

    pub name: String,

    /// Release date
    pub year: Date,

    /// Runtime in minutes
    pub time: i32,

    /// Aggregate score on a 0-100 scale
    pub score: f64,

    pub imdb: f64,

    pub votes: i32,

    pub meta_score: f64,

    #[sea_orm(column_type = "Text")]
    pub overview: String,

    pub status: MovieStatus,

    pub budget: f64,

    pub gross: f64,

    pub country_id: i32,

    pub certification_id: i32,
}

// `DeriveEntityModel` generates `Column` without `PartialEq`; compare
// discriminants exactly as a derive on this unit-only enum would.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,

    #[sea_orm(
        belongs_to = "super::certification::Entity",
        from = "Column::CertificationId",
        to = "super::certification::Column::Id"
    )]
    Certification,

    #[sea_orm(has_many = "super::movie_genre::Entity")]
    MovieGenres,

    #[sea_orm(has_many = "super::movie_actor::Entity")]
    MovieActors,

    #[sea_orm(has_many = "super::movie_director::Entity")]
    MovieDirectors,

    #[sea_orm(has_many = "super::movie_language::Entity")]
    MovieLanguages,

    #[sea_orm(has_many = "super::movie_like::Entity")]
    MovieLikes,

    #[sea_orm(has_many = "super::favorite_movie::Entity")]
    FavoriteMovies,

    #[sea_orm(has_many = "super::movie_rating::Entity")]
    MovieRatings,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<super::certification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Certification.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_genre::Relation::Genre.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::movie_genre::Relation::Movie.def().rev())
    }
}

impl Related<super::actor::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_actor::Relation::Actor.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::movie_actor::Relation::Movie.def().rev())
    }
}

impl Related<super::director::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_director::Relation::Director.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::movie_director::Relation::Movie.def().rev())
    }
}

impl Related<super::language::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_language::Relation::Language.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::movie_language::Relation::Movie.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
