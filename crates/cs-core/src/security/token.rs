//! Superficial credential checks.

const TOKEN_PREFIXES: [&str; 2] = ["ghp_", "github_pat_"];

/// Whether a pasted credential has the shape of a GitHub personal access
/// token. A format check only; the API decides whether it is valid.
pub fn looks_like_github_token(token: &str) -> bool {
    let token = token.trim();
    TOKEN_PREFIXES
        .iter()
        .any(|prefix| token.len() > prefix.len() && token.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_and_fine_grained_prefixes() {
        assert!(looks_like_github_token("ghp_abc123"));
        assert!(looks_like_github_token("github_pat_11AAA"));
        assert!(looks_like_github_token("  ghp_padded  "));
    }

    #[test]
    fn other_shapes_are_flagged() {
        assert!(!looks_like_github_token(""));
        assert!(!looks_like_github_token("ghp_"));
        assert!(!looks_like_github_token("gho_oauth"));
        assert!(!looks_like_github_token("plain-password"));
    }
}
