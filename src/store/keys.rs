// Key patterns for every persisted record type

pub const USER_PREFIX: &str = "user:";
pub const GIG_PREFIX: &str = "gig:";
pub const OFFERING_PREFIX: &str = "offering:";
pub const TRANSACTION_PREFIX: &str = "transaction:";

pub fn user(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

pub fn gig(gig_id: &str) -> String {
    format!("{GIG_PREFIX}{gig_id}")
}

pub fn offering(user_id: &str, offering_id: &str) -> String {
    format!("{OFFERING_PREFIX}{user_id}:{offering_id}")
}

/// Prefix covering every offering owned by `user_id`
pub fn offerings_of(user_id: &str) -> String {
    format!("{OFFERING_PREFIX}{user_id}:")
}

pub fn transaction(transaction_id: &str) -> String {
    format!("{TRANSACTION_PREFIX}{transaction_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_patterns() {
        assert_eq!(user("0xabc"), "user:0xabc");
        assert_eq!(gig("g1"), "gig:g1");
        assert_eq!(offering("u1", "o1"), "offering:u1:o1");
        assert!(offering("u1", "o1").starts_with(&offerings_of("u1")));
        assert_eq!(transaction("t1"), "transaction:t1");
    }
}
