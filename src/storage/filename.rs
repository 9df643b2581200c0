use chrono::{DateTime, Utc};
use unicode_normalization::UnicodeNormalization;

/// File extensions the extractor accepts.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Whether the text after the last `.` is an allowed extension (case-insensitive).
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Accents are folded to their base letter, path separators and whitespace
/// runs become a single `_`, anything outside `[A-Za-z0-9_.-]` is dropped and
/// leading/trailing dots and underscores are stripped. May return an empty
/// string.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let spaced = ascii.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// The name a stored upload gets: `YYYYmmdd_HHMMSS_` plus the sanitised name.
pub fn stored_filename(original: &str, now: DateTime<Utc>) -> String {
    let mut safe = secure_filename(original);
    if safe.is_empty() {
        safe = "upload".to_string();
    }
    format!("{}{}", now.format("%Y%m%d_%H%M%S_"), safe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("resume.pdf"));
        assert!(allowed_file("Resume.DOCX"));
        assert!(allowed_file("archive.tar.doc"));
        assert!(!allowed_file("resume.txt"));
        assert!(!allowed_file("pdf"));
        assert!(!allowed_file("resume."));
    }

    #[test]
    fn test_secure_filename_strips_paths() {
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename(r"C:\Users\me\cv.pdf"), "C_Users_me_cv.pdf");
    }

    #[test]
    fn test_secure_filename_folds_unicode_and_whitespace() {
        assert_eq!(secure_filename("My cool   résumé.pdf"), "My_cool_resume.pdf");
        assert_eq!(
            secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"),
            "i_contain_cool_umlauts.txt"
        );
    }

    #[test]
    fn test_secure_filename_can_be_empty() {
        assert_eq!(secure_filename("日本語"), "");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_stored_filename_prefix() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            stored_filename("Jane Doe CV.pdf", now),
            "20240309_140507_Jane_Doe_CV.pdf"
        );
        assert_eq!(stored_filename("日本語", now), "20240309_140507_upload");
    }
}
