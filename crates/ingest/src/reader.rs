use serde::Serialize;
use thiserror::Error;

/// Rejections raised before any analysis work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Meeting text is required")]
    EmptyText,
    #[error("Error reading file {name}: content is not valid UTF-8")]
    Undecodable { name: String },
    #[error("Error reading file {name}: file is empty")]
    EmptyFile { name: String },
}

/// A transcript to analyze, keyed by the name the caller gave it.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub name: String,
    pub text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Result<Self, InputError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(InputError::EmptyText);
        }

        Ok(Self {
            name: name.into(),
            text,
        })
    }

    /// Build a document from uploaded file bytes.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, InputError> {
        let text = std::str::from_utf8(bytes).map_err(|_| InputError::Undecodable {
            name: name.to_string(),
        })?;

        if text.trim().is_empty() {
            return Err(InputError::EmptyFile {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_text() {
        assert_eq!(Document::new("inline", "   \n").unwrap_err(), InputError::EmptyText);
    }

    #[test]
    fn test_decodes_utf8_upload() {
        let doc = Document::from_bytes("minutes.txt", "Café opened.".as_bytes()).unwrap();
        assert_eq!(doc.name, "minutes.txt");
        assert_eq!(doc.text, "Café opened.");
    }

    #[test]
    fn test_rejects_invalid_utf8_upload() {
        let err = Document::from_bytes("bad.bin", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert_eq!(
            err,
            InputError::Undecodable {
                name: "bad.bin".to_string()
            }
        );
        assert!(err.to_string().contains("bad.bin"));
    }

    #[test]
    fn test_rejects_empty_upload() {
        let err = Document::from_bytes("empty.txt", b"").unwrap_err();
        assert!(matches!(err, InputError::EmptyFile { .. }));
    }
}
