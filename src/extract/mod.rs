use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+#.-]*[ \t]*\r?\n?(.*?)```").expect("valid regex"));

/// Inner text of the first triple-backtick fence, if any. The opening fence
/// may carry a language tag.
pub fn fenced_block(text: &str) -> Option<String> {
    FENCE
        .captures(text)
        .map(|c| c[1].trim().to_string())
}

/// Lenient extraction: the first fenced block, or the trimmed raw text when
/// the model ignored the single-fence rule. No syntax validation.
pub fn extract(text: &str) -> String {
    match fenced_block(text) {
        Some(code) => code,
        None => {
            warn!("model output contained no fenced code block; returning raw text");
            text.trim().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_inner_text_of_a_tagged_fence() {
        let text = "```python\nimport json\nprint(1)\n```";
        assert_eq!(extract(text), "import json\nprint(1)");
    }

    #[test]
    fn extracts_untagged_fence() {
        let text = "here you go:\n```\nx = 1\n```\nhope it helps";
        assert_eq!(extract(text), "x = 1");
    }

    #[test]
    fn extraction_is_idempotent_on_fenced_input() {
        let inner = "def f():\n    return 2";
        let once = extract(&format!("```python\n{inner}\n```"));
        assert_eq!(once, inner);
        assert_eq!(extract(&once), once);
    }

    #[test]
    fn fenceless_input_comes_back_trimmed_and_unchanged() {
        let text = "  no fences here\njust code  \n";
        assert_eq!(extract(text), "no fences here\njust code");
        assert!(fenced_block(text).is_none());
    }

    #[test]
    fn first_of_multiple_fences_wins() {
        let text = "```python\nfirst\n```\ntext\n```python\nsecond\n```";
        assert_eq!(extract(text), "first");
    }
}
