//! Общие проверки полей, на которых построены валидаторы записей.

use validator::ValidateEmail;

/// Значение необязательного поля. Пустая строка считается незаполненной.
pub fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Формат адреса плюс домен с точкой: `a@localhost` не принимается.
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
        && email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.split('.').count() > 1)
}

/// Длина в символах, а не в байтах.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_are_not_filled() {
        assert_eq!(filled(&None), None);
        assert_eq!(filled(&Some(String::new())), None);
        assert_eq!(filled(&Some("x".to_string())), Some("x"));
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("organizer@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn domain_needs_a_dot() {
        assert!(!is_valid_email("a@localhost"));
        assert!(!is_valid_email("a@b"));
        assert!(is_valid_email("a@b.kz"));
    }

    #[test]
    fn length_counts_characters() {
        assert_eq!(char_len("+7 701"), 6);
        assert_eq!(char_len("тел"), 3);
    }
}
