//! Masking of identifiers before they reach any log line.

/// `0x1234...abcd`: first 6 and last 4 characters.
pub fn mask_address(address: &str) -> String {
    mask(address, 6, 4)
}

/// `0x12345678...90abcdef`: first 10 and last 8 characters.
pub fn mask_tx_hash(hash: &str) -> String {
    mask(hash, 10, 8)
}

fn mask(value: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    // Short values would be revealed in full by head + tail
    if chars.len() <= head + tail {
        let visible: String = chars.iter().take(head.min(chars.len() / 2)).collect();
        return format!("{}...", visible);
    }
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_address() {
        assert_eq!(
            mask_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            "0xf39F...2266"
        );
    }

    #[test]
    fn test_mask_tx_hash() {
        let hash = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";
        assert_eq!(mask_tx_hash(hash), "0x88df0164...a713944b");
    }

    #[test]
    fn test_mask_short_and_empty() {
        assert_eq!(mask_address(""), "");
        assert_eq!(mask_tx_hash("0xABC123"), "0xAB...");
        assert_eq!(mask_address("0xABC"), "0x...");
    }
}
