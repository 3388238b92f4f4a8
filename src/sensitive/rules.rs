//! Path rules for files that should not be committed without confirmation.

const CREDENTIAL_WORDS: &[&str] = &["key", "secret", "token", "password", "credential"];

const ARTIFACT_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "out",
    "target",
    ".next",
    ".nuxt",
    "__pycache__",
    ".venv",
    "venv",
    "vendor",
    "coverage",
    ".gradle",
    ".terraform",
    ".cache",
];

const TEMP_EXTENSIONS: &[&str] = &["tmp", "temp", "swp", "swo", "bak", "log", "orig"];

const TEMP_NAMES: &[&str] = &[".ds_store", "thumbs.db", "desktop.ini"];

const CERT_EXTENSIONS: &[&str] = &[
    "pem", "key", "p12", "pfx", "crt", "cer", "der", "jks", "keystore", "ppk",
];

const SSH_KEY_NAMES: &[&str] = &["id_rsa", "id_dsa", "id_ecdsa", "id_ed25519"];

/// `.env` or `.env.<anything>`.
pub fn is_env_file(name: &str) -> bool {
    name == ".env" || name.starts_with(".env.")
}

pub fn names_credential(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    CREDENTIAL_WORDS.iter().any(|w| lower.contains(w))
}

pub fn in_artifact_dir(directories: &[&str]) -> bool {
    directories.iter().any(|d| ARTIFACT_DIRS.contains(d))
}

pub fn is_temp_file(name: &str, extension: Option<&str>) -> bool {
    name.ends_with('~')
        || TEMP_NAMES.contains(&name.to_ascii_lowercase().as_str())
        || extension.is_some_and(|e| TEMP_EXTENSIONS.contains(&e))
}

pub fn is_cert_or_key(name: &str, extension: Option<&str>) -> bool {
    let lower = name.to_ascii_lowercase();
    SSH_KEY_NAMES.contains(&lower.as_str())
        || SSH_KEY_NAMES
            .iter()
            .any(|k| lower.strip_prefix(k) == Some(".pub"))
        || extension.is_some_and(|e| CERT_EXTENSIONS.contains(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_file_names() {
        assert!(is_env_file(".env"));
        assert!(is_env_file(".env.local"));
        assert!(!is_env_file("env.ts"));
        assert!(!is_env_file(".envrc"));
    }

    #[test]
    fn test_credential_words_are_case_insensitive() {
        assert!(names_credential("API_KEYS.json"));
        assert!(names_credential("db-Password.txt"));
        assert!(!names_credential("README.md"));
    }

    #[test]
    fn test_artifact_dirs() {
        assert!(in_artifact_dir(&["web", "node_modules", "react"]));
        assert!(in_artifact_dir(&["target"]));
        assert!(!in_artifact_dir(&["src", "bin"]));
    }

    #[test]
    fn test_temp_files() {
        assert!(is_temp_file("notes.txt~", Some("txt~")));
        assert!(is_temp_file(".DS_Store", None));
        assert!(is_temp_file("server.log", Some("log")));
        assert!(!is_temp_file("main.rs", Some("rs")));
    }

    #[test]
    fn test_cert_and_key_files() {
        assert!(is_cert_or_key("server.pem", Some("pem")));
        assert!(is_cert_or_key("id_ed25519", None));
        assert!(is_cert_or_key("id_rsa.pub", Some("pub")));
        assert!(!is_cert_or_key("cert.md", Some("md")));
    }
}
