const MEASURES_PREFIX: &str = "[Measures].";

/// Decodes XML-name escapes of the form `_xHHHH_` back to the character they
/// stand for (`_x005b_` -> `[`, `_x0020_` -> ` `, ...). Sequences that are not
/// a valid escape are kept verbatim.
pub fn decode_xml_name(name: &str) -> String {
    let mut decoded = String::with_capacity(name.len());
    let mut rest = name;

    while let Some(start) = rest.find("_x") {
        decoded.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match decode_escape(candidate) {
            Some(c) => {
                decoded.push(c);
                rest = &candidate[7..];
            }
            None => {
                decoded.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

fn decode_escape(candidate: &str) -> Option<char> {
    let bytes = candidate.as_bytes();
    if bytes.len() < 7 || bytes[6] != b'_' {
        return None;
    }
    let hex = candidate.get(2..6)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Chart label for a cell element name: decoded, without the `[Measures].` prefix.
pub fn label_for(name: &str) -> String {
    let decoded = decode_xml_name(name);
    match decoded.strip_prefix(MEASURES_PREFIX) {
        Some(bare) => bare
            .strip_prefix('[')
            .and_then(|b| b.strip_suffix(']'))
            .unwrap_or(bare)
            .to_string(),
        None => decoded,
    }
}

pub fn is_caption(name: &str) -> bool {
    name.to_ascii_uppercase().contains("MEMBER_CAPTION")
}
