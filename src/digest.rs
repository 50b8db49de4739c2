use crate::feeds::FeedItem;

const HEADER: &str = "🚨 *Cyber Security Updates* 🚨\n\n";
const FOOTER: &str = "🛡 Stay Safe | #CyberSecurity";
const PLACEHOLDER: &str = "🛡 No major cyber security updates right now.\nStay alert!";

/// Render the digest message for one cycle. Items arrive already deduplicated,
/// in fetch order; an empty slice renders the fixed placeholder.
pub fn render(items: &[FeedItem]) -> String {
    if items.is_empty() {
        return PLACEHOLDER.to_string();
    }

    let mut msg = String::from(HEADER);
    for item in items {
        msg.push_str(&format!("🔹 *{}*\n👉 {}\n\n", item.title, item.link));
    }
    msg.push_str(FOOTER);
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, link: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: link.to_string(),
        }
    }

    #[test]
    fn test_empty_renders_placeholder_exactly() {
        assert_eq!(
            render(&[]),
            "🛡 No major cyber security updates right now.\nStay alert!"
        );
    }

    #[test]
    fn test_one_block_per_item_in_order() {
        let items = vec![
            item("Breach at Example Corp", "https://example.com/breach"),
            item("Patch Tuesday roundup", "https://example.com/patches"),
        ];
        let msg = render(&items);

        assert!(msg.starts_with("🚨 *Cyber Security Updates* 🚨\n\n"));
        assert!(msg.ends_with("🛡 Stay Safe | #CyberSecurity"));
        assert!(msg.contains("🔹 *Breach at Example Corp*\n👉 https://example.com/breach\n\n"));
        assert!(msg.contains("🔹 *Patch Tuesday roundup*\n👉 https://example.com/patches\n\n"));

        let first = msg.find("https://example.com/breach").unwrap();
        let second = msg.find("https://example.com/patches").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_titles_and_links_kept_verbatim() {
        let items = vec![item("CVE-2025-0001: RCE in *widget*", "https://example.com/a?x=1&y=2")];
        let msg = render(&items);
        assert!(msg.contains("CVE-2025-0001: RCE in *widget*"));
        assert!(msg.contains("https://example.com/a?x=1&y=2"));
    }
}
