//! Id mode: print the identifier a URL maps to

use crate::errors::{Result, ShortieError};
use crate::utils::{MAX_ID_LENGTH, generate_short_id};

pub fn print_id(url: &str, length: usize) -> Result<()> {
    if length == 0 || length > MAX_ID_LENGTH {
        return Err(ShortieError::validation(format!(
            "length must be within 1..={}, got {}",
            MAX_ID_LENGTH, length
        )));
    }
    println!("{}", generate_short_id(url, length));
    Ok(())
}
