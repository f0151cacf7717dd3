//! Naming conventions
//!
//! Entity names are PascalCase, field names camelCase. Tables are the
//! snake_case plural of the entity name and columns the snake_case form of
//! the field name. Pluralisation is a simple English heuristic
//! ("Person" becomes "persons"), not a dictionary lookup.

/// Convert a camelCase or PascalCase string to snake_case.
///
/// A word starts at each capital that follows a lowercase letter or digit,
/// and at the last capital of a run that is followed by a lowercase letter.
/// `UserID` becomes `user_id`, `HTTPServer` becomes `http_server`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 && !result.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// Pluralise a snake_case word with simple English rules
pub fn pluralize(snake: &str) -> String {
    if snake.ends_with('y') {
        format!("{}ies", &snake[..snake.len() - 1])
    } else if snake.ends_with('s')
        || snake.ends_with('x')
        || snake.ends_with("ch")
        || snake.ends_with("sh")
    {
        format!("{}es", snake)
    } else {
        format!("{}s", snake)
    }
}

/// Table name for an entity: snake_case plural (`UserProfile` → `user_profiles`)
pub fn table_name(entity_name: &str) -> String {
    pluralize(&to_snake_case(entity_name))
}

/// Column name for a field: snake_case (`createdBy` → `created_by`)
pub fn column_name(field_name: &str) -> String {
    to_snake_case(field_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("userId"), "user_id");
        assert_eq!(to_snake_case("UserID"), "user_id");
        assert_eq!(to_snake_case("createdAt"), "created_at");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("already_Snake"), "already_snake");
    }

    #[test]
    fn test_acronyms_keep_word_boundaries() {
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("parseHTMLBody"), "parse_html_body");
        assert_eq!(to_snake_case("APIKey"), "api_key");
        assert_eq!(to_snake_case("address2Line"), "address2_line");
        assert_eq!(column_name("userID"), "user_id");
        assert_eq!(column_name("HTTPServer"), "http_server");
        assert_eq!(table_name("APIKey"), "api_keies");
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name("User"), "users");
        assert_eq!(table_name("Category"), "categories");
        assert_eq!(table_name("UserProfile"), "user_profiles");
        assert_eq!(table_name("Address"), "addresses");
        assert_eq!(table_name("Box"), "boxes");
        assert_eq!(table_name("Match"), "matches");
        assert_eq!(table_name("Wish"), "wishes");
    }

    #[test]
    fn test_table_name_is_stable() {
        assert_eq!(table_name("BlogPost"), table_name("BlogPost"));
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name("firstName"), "first_name");
        assert_eq!(column_name("id"), "id");
    }
}
