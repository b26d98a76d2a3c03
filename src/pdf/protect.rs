//! Password protection
//!
//! Assembles the encryption parameters for a protected copy and hands them to
//! lopdf's AES-256 standard security handler.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use lopdf::encryption::crypt_filters::{Aes256CryptFilter, CryptFilter};
use lopdf::{EncryptionState, EncryptionVersion, Permissions};

use crate::document::SourceDocument;
use crate::error::{Error, Result};

/// Suffix appended to the user password when no owner password is given
pub const OWNER_PASSWORD_SUFFIX: &str = "_owner";

/// What a reader holding only the user password may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSet {
    /// Printing at full resolution
    pub print_high_quality: bool,
    /// Printing at all (degraded unless `print_high_quality`)
    pub print: bool,
    pub modify: bool,
    pub copy: bool,
    pub annotate: bool,
    pub fill_forms: bool,
    /// Text extraction for accessibility tools
    pub accessibility: bool,
    /// Insert, rotate or delete pages
    pub assemble: bool,
}

impl Default for PermissionSet {
    fn default() -> Self {
        Self {
            print_high_quality: false,
            print: true,
            modify: false,
            copy: false,
            annotate: false,
            fill_forms: true,
            accessibility: true,
            assemble: false,
        }
    }
}

impl PermissionSet {
    fn to_lopdf(self) -> Permissions {
        let mut permissions = Permissions::empty();
        let flags = [
            (self.print, Permissions::PRINTABLE),
            (self.print && self.print_high_quality, Permissions::PRINTABLE_IN_HIGH_QUALITY),
            (self.modify, Permissions::MODIFIABLE),
            (self.copy, Permissions::COPYABLE),
            (self.annotate, Permissions::ANNOTABLE),
            (self.fill_forms, Permissions::FILLABLE),
            (self.accessibility, Permissions::COPYABLE_FOR_ACCESSIBILITY),
            (self.assemble, Permissions::ASSEMBLABLE),
        ];
        for (allowed, flag) in flags {
            if allowed {
                permissions |= flag;
            }
        }
        permissions
    }
}

/// Everything needed to encrypt one document
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionParams {
    pub user_password: String,
    pub owner_password: String,
    pub permissions: PermissionSet,
}

impl fmt::Debug for EncryptionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionParams")
            .field("user_password", &"***")
            .field("owner_password", &"***")
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl EncryptionParams {
    /// Parameters for `password` with the default owner password and
    /// permissions
    pub fn for_password(password: &str) -> Result<Self> {
        Self::with_owner(password, None)
    }

    /// Parameters with an explicit owner password
    pub fn with_owner(password: &str, owner_password: Option<&str>) -> Result<Self> {
        if password.trim().is_empty() {
            return Err(Error::EmptyPassword);
        }
        let owner_password = match owner_password {
            Some(owner) if !owner.trim().is_empty() => owner.to_string(),
            _ => format!("{}{}", password, OWNER_PASSWORD_SUFFIX),
        };
        Ok(Self {
            user_password: password.to_string(),
            owner_password,
            permissions: PermissionSet::default(),
        })
    }
}

/// Save an encrypted copy of `source`
pub fn protect_document(source: &SourceDocument, params: &EncryptionParams) -> Result<Vec<u8>> {
    let mut doc = source.document().clone();

    let mut file_key = [0u8; 32];
    getrandom::getrandom(&mut file_key).map_err(|e| Error::Encryption(e.to_string()))?;

    let crypt_filter: Arc<dyn CryptFilter> = Arc::new(Aes256CryptFilter);
    let version = EncryptionVersion::V5 {
        encrypt_metadata: true,
        crypt_filters: BTreeMap::from([(b"StdCF".to_vec(), crypt_filter)]),
        file_encryption_key: &file_key,
        stream_filter: b"StdCF".to_vec(),
        string_filter: b"StdCF".to_vec(),
        owner_password: &params.owner_password,
        user_password: &params.user_password,
        permissions: params.permissions.to_lopdf(),
    };

    let state = EncryptionState::try_from(version).map_err(|e| Error::Encryption(e.to_string()))?;
    doc.encrypt(&state)
        .map_err(|e| Error::Encryption(e.to_string()))?;

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    log::info!("Encrypted {} ({} bytes)", source.name(), buffer.len());
    Ok(buffer)
}

/// Rough password strength, as shown next to the password field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    None,
    Weak,
    Fair,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    pub fn label(self) -> &'static str {
        match self {
            PasswordStrength::None => "",
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Fair => "Fair",
            PasswordStrength::Strong => "Strong",
            PasswordStrength::VeryStrong => "Very Strong",
        }
    }
}

/// Rate a password by length and character mix
pub fn password_strength(password: &str) -> PasswordStrength {
    let len = password.chars().count();
    if len == 0 {
        return PasswordStrength::None;
    }
    if len < 6 {
        return PasswordStrength::Weak;
    }
    if len < 10 {
        return PasswordStrength::Fair;
    }

    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());
    if upper && digit && symbol {
        PasswordStrength::VeryStrong
    } else {
        PasswordStrength::Strong
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::metadata::load_document;
    use crate::pdf::test_support::sample_pdf;
    use crate::queue::IdGenerator;

    #[test]
    fn test_params_default_owner_password() {
        let params = EncryptionParams::for_password("hunter2").unwrap();
        assert_eq!(params.user_password, "hunter2");
        assert_eq!(params.owner_password, "hunter2_owner");
        assert_eq!(params.permissions, PermissionSet::default());
    }

    #[test]
    fn test_params_explicit_owner_password() {
        let params = EncryptionParams::with_owner("a", Some("b")).unwrap();
        assert_eq!(params.owner_password, "b");

        let params = EncryptionParams::with_owner("a", Some("  ")).unwrap();
        assert_eq!(params.owner_password, "a_owner");
    }

    #[test]
    fn test_params_reject_blank_password() {
        assert!(matches!(
            EncryptionParams::for_password("   "),
            Err(Error::EmptyPassword)
        ));
    }

    #[test]
    fn test_default_permissions() {
        let permissions = PermissionSet::default().to_lopdf();
        assert!(permissions.contains(Permissions::PRINTABLE));
        assert!(permissions.contains(Permissions::FILLABLE));
        assert!(permissions.contains(Permissions::COPYABLE_FOR_ACCESSIBILITY));
        assert!(!permissions.contains(Permissions::PRINTABLE_IN_HIGH_QUALITY));
        assert!(!permissions.contains(Permissions::MODIFIABLE));
        assert!(!permissions.contains(Permissions::COPYABLE));
        assert!(!permissions.contains(Permissions::ANNOTABLE));
        assert!(!permissions.contains(Permissions::ASSEMBLABLE));
    }

    #[test]
    fn test_protect_produces_encrypted_pdf() {
        let bytes = sample_pdf(2, "P");
        let doc = load_document(IdGenerator::new().next_id(), "p.pdf", &bytes).unwrap();
        let params = EncryptionParams::for_password("correct horse").unwrap();

        let protected = protect_document(&doc, &params).unwrap();
        assert!(protected.starts_with(b"%PDF-"));
        assert!(protected.windows(8).any(|w| w == b"/Encrypt"));
        assert!(!protected.windows(4).any(|w| w == b"(P-1"));
    }

    #[test]
    fn test_protected_copy_authenticates() {
        let mut ids = IdGenerator::new();
        let bytes = sample_pdf(1, "Q");
        let doc = load_document(ids.next_id(), "q.pdf", &bytes).unwrap();
        let params = EncryptionParams::for_password("hunter2").unwrap();

        let protected = protect_document(&doc, &params).unwrap();
        let reopened = lopdf::Document::load_mem(&protected).unwrap();
        assert!(reopened.authenticate_user_password("hunter2").is_ok());
        assert!(reopened.authenticate_owner_password("hunter2_owner").is_ok());
        assert!(reopened.authenticate_user_password("hunter3").is_err());

        // Encrypted files are refused as sources
        assert!(matches!(
            load_document(ids.next_id(), "q-protected.pdf", &protected),
            Err(Error::UnreadableDocument { .. })
        ));
    }

    #[test]
    fn test_password_strength_levels() {
        assert_eq!(password_strength(""), PasswordStrength::None);
        assert_eq!(password_strength("abc"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdefg"), PasswordStrength::Fair);
        assert_eq!(password_strength("abcdefghijk"), PasswordStrength::Strong);
        assert_eq!(password_strength("Abcdefgh1!x"), PasswordStrength::VeryStrong);
        assert_eq!(PasswordStrength::VeryStrong.label(), "Very Strong");
    }
}
