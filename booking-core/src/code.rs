use uuid::Uuid;

/// Human-readable reservation identifier: `BK` followed by the first eight
/// hex characters of a v4 UUID, uppercased (e.g. `BK3F9A01C2`). Collisions
/// are astronomically unlikely, but the storage layer still enforces
/// uniqueness and the factory regenerates on a constraint violation.
pub fn generate_booking_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("BK{}", id[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn code_has_expected_shape() {
        let code = generate_booking_code();
        assert_eq!(code.len(), 10);
        assert!(code.starts_with("BK"));
        assert!(code[2..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn codes_are_unique_across_many_generations() {
        let codes: HashSet<String> = (0..10_000).map(|_| generate_booking_code()).collect();
        assert_eq!(codes.len(), 10_000);
    }
}
