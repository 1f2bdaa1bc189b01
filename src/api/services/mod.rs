pub mod shortie;

pub use shortie::{
    CreateShortieRequest, CreateShortieResponse, ErrorBody, ShortieApi, shortie_routes,
};
