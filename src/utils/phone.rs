/// Country prefix every national number is rewritten to.
const COUNTRY_PREFIX: &str = "90";

/// Canonicalizes a Turkish phone number to its 12 digit `90XXXXXXXXXX` form.
///
/// Non-digits are dropped, then the first matching rule applies:
/// - 12 digits starting with `90` are kept,
/// - 11 digits starting with `0` get the `0` replaced by `9`,
/// - 10 digits get `90` prepended.
///
/// Anything else is returned as its bare digits. This is a key normalizer,
/// not a validator.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    match digits.len() {
        12 if digits.starts_with(COUNTRY_PREFIX) => digits,
        11 if digits.starts_with('0') => format!("9{digits}"),
        10 => format!("{COUNTRY_PREFIX}{digits}"),
        _ => digits,
    }
}
