//! Persisted record shapes
//!
//! All records serialize with camelCase field names so that documents written
//! by earlier clients of the same store stay readable.

mod gig;
mod offering;
mod transaction;
mod user;

pub use gig::{Gig, GigStatus};
pub use offering::{Availability, Offering};
pub use transaction::{Transaction, TransactionStatus};
pub use user::User;

use rand::Rng;

/// URL-safe alphabet used for generated ids
const ID_ALPHABET: &[u8; 64] = b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";
const ID_LEN: usize = 21;

/// Generate a random record id (21 URL-safe characters)
pub fn new_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect()
}
