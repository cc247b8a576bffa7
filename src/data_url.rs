use base64::{Engine as _, engine::general_purpose::STANDARD};

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";

/// JPEG when the bytes start with the `FF D8` marker, PNG otherwise.
#[must_use]
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, ..] => JPEG_MIME,
        _ => PNG_MIME,
    }
}

/// `data:<mime>;base64,<payload>` from an already base64-encoded payload.
#[must_use]
pub fn from_base64(mime: &str, payload: &str) -> String {
    format!("data:{mime};base64,{payload}")
}

#[must_use]
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    from_base64(mime, &STANDARD.encode(bytes))
}

/// Everything after the first comma; a string without a comma is treated as
/// a bare payload.
#[must_use]
pub fn payload(data_url: &str) -> &str {
    data_url
        .split_once(',')
        .map_or(data_url, |(_, payload)| payload)
}

/// # Errors
///
/// Returns err if the payload is not valid standard base64
pub fn decode(data_url: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(payload(data_url).trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_jpeg_magic_and_defaults_to_png() {
        assert_eq!(sniff_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), JPEG_MIME);
        assert_eq!(sniff_image_mime(&[0x89, b'P', b'N', b'G']), PNG_MIME);
        assert_eq!(sniff_image_mime(&[0xFF]), PNG_MIME);
        assert_eq!(sniff_image_mime(&[]), PNG_MIME);
    }

    #[test]
    fn decoded_payload_reencodes_to_the_same_text() {
        let payload_text = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
        let url = from_base64(PNG_MIME, payload_text);
        let bytes = decode(&url).unwrap();
        assert_eq!(STANDARD.encode(&bytes), payload_text);
        assert_eq!(encode(PNG_MIME, &bytes), url);
    }

    #[test]
    fn payload_without_header_is_used_as_is() {
        assert_eq!(payload("aGVsbG8="), "aGVsbG8=");
        assert_eq!(decode("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn invalid_payload_is_an_error() {
        assert!(decode("data:image/png;base64,@@not base64@@").is_err());
    }
}
