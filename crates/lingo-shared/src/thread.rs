//! Conversation identity.
//!
//! Both participants of a two-party thread must derive the same key no
//! matter which side computes it, so grouped retrieval for either viewer
//! lands on the same rows.

/// Derive the order-independent thread key for a pair of participants.
///
/// The two identifiers are sorted lexicographically and joined with `_`.
/// Pure and stable: `conversation_key(a, b) == conversation_key(b, a)`.
/// A self-chat degenerates to `"a_a"`.
pub fn conversation_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}_{b}")
    } else {
        format!("{b}_{a}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_independent() {
        assert_eq!(conversation_key("kim1", "jane1"), conversation_key("jane1", "kim1"));
        assert_eq!(conversation_key("kim1", "jane1"), "jane1_kim1");
    }

    #[test]
    fn self_chat_degenerates() {
        assert_eq!(conversation_key("admin1", "admin1"), "admin1_admin1");
    }

    #[test]
    fn stable_across_calls() {
        let first = conversation_key("a", "b");
        for _ in 0..10 {
            assert_eq!(conversation_key("a", "b"), first);
        }
    }
}
