/// Escapes text for interpolation into HTML element content or quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b class="x">A & B's</b>"#),
            "&lt;b class=&quot;x&quot;&gt;A &amp; B&#39;s&lt;/b&gt;"
        );
        assert_eq!(escape("Carvão Vegetal"), "Carvão Vegetal");
    }
}
