use regex::{Captures, Regex};

use crate::error::Result;

/// Replaces literal content in stored contexts
pub const PLACEHOLDER: &str = "...";

// Stands in for an already-collapsed group while nested groups are folded outward
const COLLAPSED: char = '\u{E000}';

/// Extracts a single source line for a call and strips literal data from it
pub struct ContextRedactor {
    /// Triple-quoted, then double-quoted, then single-quoted. A literal still
    /// open at the end of the line runs to the end of the line.
    literal_regex: Regex,
    paren_group_regex: Regex,
}

impl ContextRedactor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            literal_regex: Regex::new(concat!(
                r#"""""(?:[^\\]|\\.?)*?(?:"""|$)"#,
                r#"|'''(?:[^\\]|\\.?)*?(?:'''|$)"#,
                r#"|"(?:[^"\\]|\\.?)*(?:"|$)"#,
                r#"|'(?:[^'\\]|\\.?)*(?:'|$)"#,
            ))?,
            paren_group_regex: Regex::new(r"\([^()]*\)")?,
        })
    }

    /// Redacted context for the 1-based `line_number`, or an empty string when
    /// the line does not exist
    pub fn redact(&self, file_content: &str, line_number: usize) -> String {
        let line = match line_number
            .checked_sub(1)
            .and_then(|index| file_content.lines().nth(index))
        {
            Some(line) => line.trim(),
            None => return String::new(),
        };

        let redacted = self
            .literal_regex
            .replace_all(line, |caps: &Captures| redact_literal(&caps[0]));

        // Innermost groups first; each pass removes at least one pair of parentheses
        let collapsed = COLLAPSED.to_string();
        let mut redacted = redacted.into_owned();
        while self.paren_group_regex.is_match(&redacted) {
            redacted = self
                .paren_group_regex
                .replace_all(&redacted, collapsed.as_str())
                .into_owned();
        }

        redacted.replace(COLLAPSED, &format!("({})", PLACEHOLDER))
    }
}

/// `"abc"` becomes `"..."`, an unterminated `"""abc` becomes `"""...`
fn redact_literal(literal: &str) -> String {
    let quote = if literal.starts_with(r#"""""#) || literal.starts_with("'''") {
        &literal[..3]
    } else {
        &literal[..1]
    };

    if literal.len() >= 2 * quote.len() && literal.ends_with(quote) {
        format!("{}{}{}", quote, PLACEHOLDER, quote)
    } else {
        format!("{}{}", quote, PLACEHOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redact(content: &str, line: usize) -> String {
        ContextRedactor::new().unwrap().redact(content, line)
    }

    #[test]
    fn test_string_arguments_never_leak() {
        let context = redact("foo(\"secret\", x)\n", 1);
        assert!(!context.contains("secret"));
        assert!(context.contains(PLACEHOLDER));
        assert_eq!(context, "foo(...)");
    }

    #[test]
    fn test_literals_outside_parentheses() {
        let content = "x = 1\n    password = \"hunter2\"  \nkey = 'abc' + other\n";
        assert_eq!(redact(content, 2), "password = \"...\"");
        assert_eq!(redact(content, 3), "key = '...' + other");
    }

    #[test]
    fn test_nested_groups_collapse() {
        assert_eq!(
            redact("df.select(F.col('name'), F.lit(42)).where(cond(a, b))", 1),
            "df.select(...).where(...)"
        );
    }

    #[test]
    fn test_escaped_quotes_and_mixed_quoting() {
        let context = redact(r#"log("it's \"quoted\" data", 'say "hi"')"#, 1);
        assert!(!context.contains("quoted"));
        assert!(!context.contains("hi"));
        assert_eq!(context, "log(...)");

        assert_eq!(redact(r#"msg = "it's" + 'x'"#, 1), r#"msg = "..." + '...'"#);
        assert_eq!(redact(r#"x = 'don"t' + y"#, 1), "x = '...' + y");
    }

    #[test]
    fn test_triple_quoted_literal_on_one_line() {
        assert_eq!(
            redact(r#"spark.sql("""SELECT * FROM t""").show()"#, 1),
            "spark.sql(...).show()"
        );
        assert_eq!(redact("q = '''SELECT 1'''", 1), "q = '''...'''");
    }

    #[test]
    fn test_literal_left_open_at_end_of_line() {
        let content = "df = spark.sql(\"\"\"SELECT ssn, password FROM users\n  WHERE 1 = 1\"\"\")\n";
        let context = redact(content, 1);
        assert!(!context.contains("ssn"));
        assert!(!context.contains("password"));
        assert_eq!(context, "df = spark.sql(\"\"\"...");

        let context = redact("df = spark.sql('''SELECT ssn FROM users\n''')\n", 1);
        assert!(!context.contains("ssn"));
        assert_eq!(context, "df = spark.sql('''...");

        let context = redact("log(\"token=abc123 \\\n  rest\")\n", 1);
        assert!(!context.contains("token"));
        assert_eq!(context, "log(\"...");
    }

    #[test]
    fn test_out_of_range_lines() {
        assert_eq!(redact("foo()\n", 0), "");
        assert_eq!(redact("foo()\n", 2), "");
        assert_eq!(redact("", 1), "");
    }

    #[test]
    fn test_unbalanced_parentheses_are_kept() {
        assert_eq!(redact("spark.read.option('k',", 1), "spark.read.option('...',");
    }
}
