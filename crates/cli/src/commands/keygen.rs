use rand::distributions::Alphanumeric;
use rand::Rng;

pub const KEY_LENGTH: usize = 32;

/// Random alphanumeric API key suitable for `LOADBRIDGE_AUTH_API_KEY`.
pub fn generate_key() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(KEY_LENGTH).map(char::from).collect()
}

pub fn run() -> String {
    generate_key()
}

#[cfg(test)]
mod tests {
    use super::{generate_key, KEY_LENGTH};

    #[test]
    fn keys_are_alphanumeric_and_fresh() {
        let first = generate_key();
        let second = generate_key();

        assert_eq!(first.len(), KEY_LENGTH);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
