// Masks passwords typed on a command line. Used for anything that outlives the
// turn: persisted history and suggestions built from earlier lines.

use regex::Regex;
use std::sync::LazyLock;

pub const MASK: &str = "******";

// (pattern, prefix to keep) pairs applied in order; the mask follows the prefix
const PATTERNS: &[(&str, &str)] = &[
    (
        r#"(?i)(^|\s)(-p|--password)(\s+|=)("[^"]*"|'[^']*'|\S+)"#,
        "${1}${2}${3}",
    ),
    (r#"(?i)(password\s*=\s*)("[^"]*"|'[^']*'|\S+)"#, "${1}"),
];

static REDACTIONS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .filter_map(|(pattern, prefix)| {
            Regex::new(pattern)
                .ok()
                .map(|regex| (regex, format!("{}{}", prefix, MASK)))
        })
        .collect()
});

pub fn redact_secrets(command: &str) -> String {
    REDACTIONS
        .iter()
        .fold(command.to_string(), |text, (regex, replacement)| {
            regex.replace_all(&text, replacement.as_str()).into_owned()
        })
}
