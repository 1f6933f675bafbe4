use anyhow::Result;
use url::Url;

/// Format integer seconds as `"{h} h {m} min {s} s"`, omitting a unit only
/// when it and every larger unit are zero. Zero renders as `"0 s"`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{} h", hours));
    }
    if minutes > 0 || !parts.is_empty() {
        parts.push(format!("{} min", minutes));
    }
    if secs > 0 || !parts.is_empty() {
        parts.push(format!("{} s", secs));
    }

    if parts.is_empty() {
        "0 s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Insert spaces into camel-case labels: a space goes before an uppercase
/// letter that starts a new word, while acronym runs stay intact
/// ("PaidSearch" -> "Paid Search", "HTMLParser" -> "HTML Parser").
/// Ampersands get a leading space ("News&Politics" -> "News & Politics"
/// after camel-case spacing).
pub fn insert_spaces(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    let mut spaced = String::with_capacity(label.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let word_start = prev.is_lowercase()
                || prev.is_ascii_digit()
                || prev == '&'
                || (prev.is_uppercase() && next_is_lower);
            if word_start {
                spaced.push(' ');
            }
        }
        spaced.push(c);
    }

    spaced.replace('&', " &")
}

/// First character uppercase, remainder lowercase
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Validate that a resolved audio URL is a dereferenceable http(s) URL
pub fn validate_audio_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid audio URL: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Audio URL must use HTTP or HTTPS protocol");
    }

    Ok(())
}
