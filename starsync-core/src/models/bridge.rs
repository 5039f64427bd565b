
use super::record::{FilmActorRecord, FilmCategoryRecord};
use crate::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::FromRow)]
pub struct BridgeFilmActor {
    pub film_key: i64,
    pub actor_key: i64,
}

impl From<FilmActorRecord> for BridgeFilmActor {
    fn from(record: FilmActorRecord) -> Self {
        Self {
            film_key: keys::film_key(record.film_id),
            actor_key: keys::actor_key(record.actor_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::FromRow)]
pub struct BridgeFilmCategory {
    pub film_key: i64,
    pub category_key: i64,
}

impl From<FilmCategoryRecord> for BridgeFilmCategory {
    fn from(record: FilmCategoryRecord) -> Self {
        Self {
            film_key: keys::film_key(record.film_id),
            category_key: keys::category_key(record.category_id),
        }
    }
}
