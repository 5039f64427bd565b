mod bridge;
mod calendar;
mod dimension;
mod fact;
mod record;

pub use bridge::{BridgeFilmActor, BridgeFilmCategory};
pub use calendar::{parse_date_key, DimDate};
pub use dimension::{DimActor, DimCategory, DimCustomer, DimFilm, DimStore};
pub use fact::{FactPayment, FactRental};
pub use record::{
    ActorRecord, CategoryRecord, CustomerRecord, FilmActorRecord, FilmCategoryRecord, FilmRecord,
    PaymentRecord, RentalRecord, StoreRecord,
};
