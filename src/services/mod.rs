pub mod shortie_service;

pub use shortie_service::{CreatedShortie, ServiceSettings, ShortieService};
