use regex::Regex;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskingStrategy {
    Full,
    Partial,
    Hash,
    Redact,
    Tokenize,
    Encrypt,
}

/// A masking rule: a regex field-name pattern paired with a strategy. First
/// matching rule (in list order) wins per key (spec §4.7).
#[derive(Debug, Clone)]
pub struct MaskingRule {
    pub id: String,
    pub field_pattern: String,
    pub strategy: MaskingStrategy,
}

impl MaskingRule {
    pub fn new(id: impl Into<String>, field_pattern: impl Into<String>, strategy: MaskingStrategy) -> Self {
        Self {
            id: id.into(),
            field_pattern: field_pattern.into(),
            strategy,
        }
    }

    fn field_matches(&self, key: &str) -> bool {
        Regex::new(&self.field_pattern).map(|re| re.is_match(key)).unwrap_or(false)
    }
}

fn non_cryptographic_hash_hex(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest)
}

fn apply_strategy(strategy: MaskingStrategy, value: &str) -> String {
    match strategy {
        MaskingStrategy::Full => "****".to_string(),
        MaskingStrategy::Partial => {
            if value.len() <= 4 {
                "****".to_string()
            } else {
                let chars: Vec<char> = value.chars().collect();
                let head: String = chars[..2].iter().collect();
                let tail: String = chars[chars.len() - 2..].iter().collect();
                let middle = "*".repeat(chars.len() - 4);
                format!("{head}{middle}{tail}")
            }
        }
        MaskingStrategy::Hash => non_cryptographic_hash_hex(value),
        MaskingStrategy::Redact => "[REDACTED]".to_string(),
        MaskingStrategy::Tokenize => {
            let hash = non_cryptographic_hash_hex(value);
            format!("TOK-{}", &hash[..8])
        }
        MaskingStrategy::Encrypt => format!("ENC-{}", non_cryptographic_hash_hex(value)),
    }
}

/// Mask every (key, value) pair in `fields` against the first rule whose
/// `field_pattern` matches the key. Unmatched keys pass through unchanged.
pub fn mask_fields(rules: &[MaskingRule], fields: &[(String, String)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(key, value)| {
            let masked = rules
                .iter()
                .find(|rule| rule.field_matches(key))
                .map(|rule| apply_strategy(rule.strategy, value))
                .unwrap_or_else(|| value.clone());
            (key.clone(), masked)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_strategy_preserves_first_and_last_two_chars() {
        assert_eq!(apply_strategy(MaskingStrategy::Partial, "4111111111111111"), "41************11");
    }

    #[test]
    fn partial_strategy_falls_back_to_full_when_too_short() {
        assert_eq!(apply_strategy(MaskingStrategy::Partial, "ab"), "****");
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![
            MaskingRule::new("r1", "^ssn$", MaskingStrategy::Full),
            MaskingRule::new("r2", "^s.*$", MaskingStrategy::Redact),
        ];
        let fields = vec![("ssn".to_string(), "123-45-6789".to_string())];
        let masked = mask_fields(&rules, &fields);
        assert_eq!(masked[0].1, "****");
    }

    #[test]
    fn tokenize_is_stable_for_same_input() {
        let a = apply_strategy(MaskingStrategy::Tokenize, "secret");
        let b = apply_strategy(MaskingStrategy::Tokenize, "secret");
        assert_eq!(a, b);
        assert!(a.starts_with("TOK-"));
    }
}
