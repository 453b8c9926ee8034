//! SeaORM entity models
//!
//! Database entities for the Cinescope catalog and social layer

mod actor;
mod certification;
mod comment;
mod comment_like;
mod country;
mod director;
mod favorite_movie;
mod genre;
mod language;
mod movie;
mod movie_actor;
mod movie_director;
mod movie_genre;
mod movie_language;
mod movie_like;
mod movie_rating;
mod notification;
mod token;
mod user;
mod user_group;

pub use movie::{
    ActiveModel as MovieActiveModel,
    Column as MovieColumn,
    Entity as MovieEntity,
    Model as Movie,
    MovieStatus,
    Relation as MovieRelation,
};

pub use genre::{
    ActiveModel as GenreActiveModel,
    Column as GenreColumn,
    Entity as GenreEntity,
    Model as Genre,
    Relation as GenreRelation,
};

pub use actor::{
    ActiveModel as ActorActiveModel,
    Column as ActorColumn,
    Entity as ActorEntity,
    Model as Actor,
};

pub use director::{
    ActiveModel as DirectorActiveModel,
    Column as DirectorColumn,
    Entity as DirectorEntity,
    Model as Director,
};

pub use language::{
    ActiveModel as LanguageActiveModel,
    Column as LanguageColumn,
    Entity as LanguageEntity,
    Model as Language,
};

pub use country::{
    ActiveModel as CountryActiveModel,
    Column as CountryColumn,
    Entity as CountryEntity,
    Model as Country,
};

pub use certification::{
    ActiveModel as CertificationActiveModel,
    Column as CertificationColumn,
    Entity as CertificationEntity,
    Model as Certification,
};

pub use movie_genre::{
    ActiveModel as MovieGenreActiveModel,
    Column as MovieGenreColumn,
    Entity as MovieGenreEntity,
    Model as MovieGenre,
    Relation as MovieGenreRelation,
};

pub use movie_actor::{
    ActiveModel as MovieActorActiveModel,
    Column as MovieActorColumn,
    Entity as MovieActorEntity,
    Model as MovieActor,
    Relation as MovieActorRelation,
};

pub use movie_director::{
    ActiveModel as MovieDirectorActiveModel,
    Column as MovieDirectorColumn,
    Entity as MovieDirectorEntity,
    Model as MovieDirector,
    Relation as MovieDirectorRelation,
};

pub use movie_language::{
    ActiveModel as MovieLanguageActiveModel,
    Column as MovieLanguageColumn,
    Entity as MovieLanguageEntity,
    Model as MovieLanguage,
};

pub use movie_like::{
    ActiveModel as MovieLikeActiveModel,
    Column as MovieLikeColumn,
    Entity as MovieLikeEntity,
    Model as MovieLike,
};

pub use favorite_movie::{
    ActiveModel as FavoriteMovieActiveModel,
    Column as FavoriteMovieColumn,
    Entity as FavoriteMovieEntity,
    Model as FavoriteMovie,
};

pub use movie_rating::{
    ActiveModel as MovieRatingActiveModel,
    Column as MovieRatingColumn,
    Entity as MovieRatingEntity,
    Model as MovieRating,
};

pub use comment::{
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
    Entity as CommentEntity,
    Model as Comment,
};

pub use comment_like::{
    ActiveModel as CommentLikeActiveModel,
    Column as CommentLikeColumn,
    Entity as CommentLikeEntity,
    Model as CommentLike,
};

pub use notification::{
    ActiveModel as NotificationActiveModel,
    Column as NotificationColumn,
    Entity as NotificationEntity,
    Model as Notification,
};

pub use user::{
    ActiveModel as UserActiveModel,
    Column as UserColumn,
    Entity as UserEntity,
    Model as User,
};

pub use user_group::{
    ActiveModel as UserGroupActiveModel,
    Column as UserGroupColumn,
    Entity as UserGroupEntity,
    Model as UserGroup,
    UserGroupName,
};

pub use token::{
    ActiveModel as TokenActiveModel,
    Column as TokenColumn,
    Entity as TokenEntity,
    Model as Token,
};
