pub mod short_id;

pub use short_id::{MAX_ID_LENGTH, generate_short_id, url_digest_hex};
