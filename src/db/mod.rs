//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Athlete profiles (keyed by identity uid)
    pub const USERS: &str = "users";
    /// Performance records (generated document IDs)
    pub const PERFORMANCES: &str = "performances";
}

/// Generate a random 20-character document ID, the same length Firestore uses.
pub fn new_document_id() -> Result<String, ring::error::Unspecified> {
    use ring::rand::{SecureRandom, SystemRandom};

    let mut bytes = [0u8; 10];
    SystemRandom::new().fill(&mut bytes)?;
    Ok(hex::encode(bytes))
}
