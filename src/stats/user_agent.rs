//! User-agent classification for stats tags, backed by the woothee
//! project's agent dataset.

use woothee::parser::Parser;

const UNKNOWN: &str = "UNKNOWN";

fn known(value: &str) -> String {
    if value == UNKNOWN {
        String::new()
    } else {
        value.to_string()
    }
}

/// `(os, browser)`, each empty when the agent is not recognised.
pub fn classify(user_agent: &str) -> (String, String) {
    let parser = Parser::new();
    match parser.parse(user_agent) {
        Some(result) => (known(result.os), known(result.name)),
        None => (String::new(), String::new()),
    }
}

pub fn browser_name(user_agent: &str) -> String {
    classify(user_agent).1
}

pub fn os_name(user_agent: &str) -> String {
    classify(user_agent).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_agents() {
        let firefox = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
        assert_eq!(browser_name(firefox), "Firefox");
        assert_eq!(os_name(firefox), "Linux");

        let chrome = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                      (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        assert_eq!(browser_name(chrome), "Chrome");
        assert!(os_name(chrome).starts_with("Windows"));
    }

    #[test]
    fn mobile_agents() {
        let android = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
                       (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
        assert_eq!(os_name(android), "Android");
    }

    #[test]
    fn unknown_agents_are_empty() {
        assert_eq!(browser_name(""), "");
        assert_eq!(os_name(""), "");
        assert_eq!(browser_name("foo"), "");
        assert_eq!(os_name("foo"), "");
    }
}
