//! `shmseg` subcommands

pub mod access;
pub mod create;
pub mod inspect;
pub mod selftest;
pub mod version;

/// Parse an unsigned integer given in decimal, `0x` hex, `0o` octal or `0b` binary
pub fn parse_number(text: &str) -> Result<u64, String> {
    let text = text.trim().replace('_', "");
    let (digits, radix) = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(oct) = text.strip_prefix("0o") {
        (oct, 8)
    } else if let Some(bin) = text.strip_prefix("0b") {
        (bin, 2)
    } else {
        (text.as_str(), 10)
    };

    u64::from_str_radix(digits, radix).map_err(|e| format!("invalid number '{}': {}", text, e))
}

/// Parse permission bits; bare digits are octal (`600` == `0o600`)
pub fn parse_mode(text: &str) -> Result<u32, String> {
    let digits = text.trim().trim_start_matches("0o");
    u32::from_str_radix(digits, 8).map_err(|e| format!("invalid mode '{}': {}", text, e))
}

/// Parse a byte count for `--size`
pub fn parse_size(text: &str) -> Result<usize, String> {
    let value = parse_number(text)?;
    usize::try_from(value).map_err(|_| format!("size {} does not fit in usize", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_radixes() {
        assert_eq!(parse_number("66"), Ok(66));
        assert_eq!(parse_number("0x42"), Ok(0x42));
        assert_eq!(parse_number("0o17"), Ok(0o17));
        assert_eq!(parse_number("0b101"), Ok(5));
        assert_eq!(parse_number("1_024"), Ok(1024));
        assert!(parse_number("0xZZ").is_err());
        assert!(parse_number("-1").is_err());
    }

    #[test]
    fn test_parse_mode_is_octal() {
        assert_eq!(parse_mode("600"), Ok(0o600));
        assert_eq!(parse_mode("0o644"), Ok(0o644));
        assert!(parse_mode("999").is_err());
    }
}
