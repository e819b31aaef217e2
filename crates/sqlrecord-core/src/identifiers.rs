//! Identifier quoting and placeholder styles.

/// Placeholder style for bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `?` placeholders (MySQL, SQLite, ODBC-style drivers).
    #[default]
    Question,
    /// `$1, $2, ...` placeholders (PostgreSQL).
    Dollar,
}

impl Dialect {
    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Question => "?".to_string(),
            Dialect::Dollar => format!("${index}"),
        }
    }
}

/// Quote an identifier with ANSI double quotes, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Sequence backing a serial primary key, PostgreSQL naming convention.
pub fn sequence_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_seq")
}

/// Turn `first_name` into `First name` for messages.
pub fn humanize(column: &str) -> String {
    let spaced = column.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Question.placeholder(3), "?");
        assert_eq!(Dialect::Dollar.placeholder(3), "$3");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("first_name"), "First name");
        assert_eq!(humanize("email"), "Email");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_sequence_name() {
        assert_eq!(sequence_name("users", "id"), "users_id_seq");
    }
}
