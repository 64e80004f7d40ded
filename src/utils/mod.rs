use std::net::Ipv4Addr;

/// Convert a display name to a slug the way NetBox (Django) does:
/// drop anything but word characters, whitespace and hyphens, collapse
/// whitespace/hyphen runs into one hyphen, trim `-` and `_` from the ends.
/// Non-ASCII letters are dropped rather than transliterated.
/// e.g., "Ship 42 / Main Deck" -> "ship-42-main-deck", "O'Brien" -> "obrien"
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_dash = false;
    for c in s.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c);
        }
    }
    if pending_dash {
        slug.push('-');
    }
    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Build a switch hostname from a site slug.
/// With a tag: "{SLUG}-{TAG}-SW-{n}", without: "{SLUG}-SW-{n}".
pub fn switch_name(site_slug: &str, tag: Option<&str>, index: u32) -> String {
    let site = site_slug.to_uppercase();
    match tag {
        Some(tag) if !tag.is_empty() => format!("{}-{}-SW-{}", site, tag.to_uppercase(), index),
        _ => format!("{}-SW-{}", site, index),
    }
}

/// Parse an IPv4 CIDR ("10.0.0.5/24") into (network, broadcast, prefix length).
/// Host bits are cleared, so the returned network is canonical.
pub fn parse_cidr(cidr: &str) -> Result<(u32, u32, u8), String> {
    let (addr, len) = cidr
        .trim()
        .split_once('/')
        .ok_or_else(|| format!("Invalid CIDR '{}': missing prefix length", cidr))?;

    let addr: Ipv4Addr = addr
        .parse()
        .map_err(|_| format!("Invalid CIDR '{}': bad address", cidr))?;
    let len: u8 = len
        .parse()
        .map_err(|_| format!("Invalid CIDR '{}': bad prefix length", cidr))?;
    if len > 32 {
        return Err(format!("Invalid CIDR '{}': prefix length must be 0-32", cidr));
    }

    let mask: u32 = if len == 0 { 0 } else { u32::MAX << (32 - len) };
    let network = u32::from(addr) & mask;
    let broadcast = network | !mask;
    Ok((network, broadcast, len))
}

/// Format a network integer and prefix length as CIDR notation
pub fn format_cidr(network: u32, prefix_len: u8) -> String {
    format!("{}/{}", Ipv4Addr::from(network), prefix_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Harbor One"), "harbor-one");
        assert_eq!(slugify("  Ship 42 / Main Deck "), "ship-42-main-deck");
        assert_eq!(slugify("already-slugged"), "already-slugged");
        assert_eq!(slugify("--"), "");
        assert_eq!(slugify("O'Brien Deck"), "obrien-deck");
        assert_eq!(slugify("a_b"), "a_b");
        assert_eq!(slugify("_Bridge & Helm_"), "bridge-helm");
        assert_eq!(slugify("Deck 3 - Aft"), "deck-3-aft");
        assert_eq!(slugify("Café Deck"), "caf-deck");
        assert_eq!(slugify("!!"), "");
    }

    #[test]
    fn test_switch_name() {
        assert_eq!(switch_name("harbor-one", None, 1), "HARBOR-ONE-SW-1");
        assert_eq!(switch_name("harbor-one", Some("core"), 2), "HARBOR-ONE-CORE-SW-2");
        assert_eq!(switch_name("ms-aurora", Some("CABIN"), 12), "MS-AURORA-CABIN-SW-12");
        assert_eq!(switch_name("x", Some(""), 3), "X-SW-3");
    }

    #[test]
    fn test_parse_cidr() {
        assert_eq!(
            parse_cidr("192.168.1.0/24").unwrap(),
            (0xC0A8_0100, 0xC0A8_01FF, 24)
        );
        let (network, _, len) = parse_cidr("10.20.30.40/16").unwrap();
        assert_eq!(format_cidr(network, len), "10.20.0.0/16");
        assert_eq!(parse_cidr("0.0.0.0/0").unwrap(), (0, u32::MAX, 0));
        assert_eq!(parse_cidr("10.0.0.1/32").unwrap().1, 0x0A00_0001);
    }

    #[test]
    fn test_parse_cidr_rejects_garbage() {
        assert!(parse_cidr("10.0.0.0").is_err());
        assert!(parse_cidr("10.0.0/24").is_err());
        assert!(parse_cidr("10.0.0.0/33").is_err());
        assert!(parse_cidr("10.0.0.0/abc").is_err());
        assert!(parse_cidr("").is_err());
    }
}
