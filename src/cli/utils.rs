//! Shared CLI utilities.

/// Parse a `NAME=VALUE` replacement argument. The value may be empty or
/// contain further `=` signs; the name may not be empty.
pub fn parse_replacement(arg: &str) -> Result<(String, String), String> {
    let Some((name, value)) = arg.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got `{arg}`"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing placeholder name in `{arg}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::parse_replacement;

    #[test]
    fn splits_on_first_equals() {
        assert_eq!(
            parse_replacement("dsn=mysql://u:p@h/db?x=1"),
            Ok(("dsn".to_string(), "mysql://u:p@h/db?x=1".to_string()))
        );
        assert_eq!(parse_replacement(" root =/srv"), Ok(("root".to_string(), "/srv".to_string())));
        assert_eq!(parse_replacement("empty="), Ok(("empty".to_string(), String::new())));
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(parse_replacement("novalue").is_err());
        assert!(parse_replacement("=value").is_err());
    }
}
