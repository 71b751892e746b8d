use chrono::NaiveDate;
use std::path::Path;
use uuid::Uuid;

/// screenshot uploaded alongside a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub bytes: Vec<u8>,
    /// name of the uploaded file, used only for its extension
    pub file_name: Option<String>,
}

impl AttachmentUpload {
    pub fn new(bytes: Vec<u8>, file_name: Option<String>) -> Self {
        Self { bytes, file_name }
    }

    /// extension including the dot; ".png" when the upload has no name
    pub fn extension(&self) -> String {
        match &self.file_name {
            None => ".png".to_string(),
            Some(name) => Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{}", e))
                .unwrap_or_default(),
        }
    }
}

/// member id reduced to `[A-Za-z0-9_-]`, non-ascii dropped, at most `max_len` chars
pub fn safe_member_segment(member_id: &str, max_len: usize) -> String {
    member_id
        .chars()
        .filter(|c| c.is_ascii())
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .take(max_len)
        .collect()
}

/// storage name `{YYYYMMDD}_{member}_{uuid}{ext}`; the member part is omitted when empty
pub fn attachment_name(date: NaiveDate, member_id: &str, upload: &AttachmentUpload, max_len: usize) -> String {
    let member = safe_member_segment(member_id, max_len);
    let uid = Uuid::new_v4().simple();
    let day = date.format("%Y%m%d");
    let ext = upload.extension();

    if member.is_empty() {
        format!("{}_{}{}", day, uid, ext)
    } else {
        format!("{}_{}_{}{}", day, member, uid, ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_member_segment() {
        assert_eq!(safe_member_segment("José María", 50), "Jos_Mara");
        assert_eq!(safe_member_segment("user-42_x", 50), "user-42_x");
        assert_eq!(safe_member_segment("a/b.c", 50), "a_b_c");
        assert_eq!(safe_member_segment("abcdef", 3), "abc");
        assert_eq!(safe_member_segment("日本", 50), "");
    }

    #[test]
    fn test_extension() {
        assert_eq!(AttachmentUpload::new(vec![], None).extension(), ".png");
        assert_eq!(AttachmentUpload::new(vec![], Some("proof.JPG".into())).extension(), ".JPG");
        assert_eq!(AttachmentUpload::new(vec![], Some("noext".into())).extension(), "");
    }

    #[test]
    fn test_attachment_name_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        let upload = AttachmentUpload::new(vec![1, 2, 3], Some("shot.jpg".into()));

        let name = attachment_name(date, "123456789", &upload, 50);
        assert!(name.starts_with("20240209_123456789_"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), "20240209_123456789_".len() + 32 + ".jpg".len());

        let anonymous = attachment_name(date, "日本", &upload, 50);
        assert!(anonymous.starts_with("20240209_"));
        assert_eq!(anonymous.len(), "20240209_".len() + 32 + ".jpg".len());

        // fresh uuid every time
        assert_ne!(attachment_name(date, "u", &upload, 50), attachment_name(date, "u", &upload, 50));
    }
}
