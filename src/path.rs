// Canonical cache-key form: backslash-free, no leading slash. Idempotent.
pub fn normalize(path: &str) -> String {
    let slashed: String = path
        .chars()
        .map(|c| if c == '\\' { '/' } else { c })
        .collect();
    slashed.strip_prefix('/').map(str::to_owned).unwrap_or(slashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_backslashes() {
        assert_eq!(normalize("/a\\b"), "a/b");
    }

    #[test]
    fn strips_single_leading_slash() {
        assert_eq!(normalize("/a/b"), "a/b");
        assert_eq!(normalize("//a/b"), "/a/b");
    }

    #[test]
    fn leaves_relative_paths_alone() {
        assert_eq!(normalize("a/b"), "a/b");
    }

    #[test]
    fn is_idempotent() {
        for input in ["/a\\b", "a/b", "//weird//path", "\\\\win\\style"] {
            let once = normalize(input);
            let twice = normalize(&once);
            assert_eq!(once, twice, "normalize not idempotent for {input:?}");
        }
    }
}
