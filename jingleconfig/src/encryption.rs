//! Chiffrement des secrets basé sur l'identifiant de la machine
//!
//! Le `client_secret` du catalogue peut être stocké chiffré dans
//! `config.yaml`. La clé est dérivée de l'identifiant matériel de la machine :
//! le fichier n'est donc pas portable d'une machine à l'autre.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Result, anyhow};
use base64::Engine;
use sha2::{Digest, Sha256};

/// Préfixe pour identifier les secrets chiffrés
const ENCRYPTED_PREFIX: &str = "encrypted:";

const NONCE_LEN: usize = 12;

/// Récupère l'identifiant matériel de la machine
///
/// Sur Linux, utilise `/etc/machine-id` ou `/var/lib/dbus/machine-id`.
/// Sur macOS, utilise `ioreg -d2 -c IOPlatformExpertDevice`.
fn get_machine_uuid() -> Result<String> {
    #[cfg(target_os = "linux")]
    {
        use std::fs;

        for candidate in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(uuid) = fs::read_to_string(candidate) {
                let uuid = uuid.trim();
                if !uuid.is_empty() {
                    return Ok(uuid.to_string());
                }
            }
        }

        Err(anyhow!("Failed to read machine-id"))
    }

    #[cfg(target_os = "macos")]
    {
        use std::process::Command;

        let output = Command::new("ioreg")
            .args(["-d2", "-c", "IOPlatformExpertDevice"])
            .output()?;

        let output_str = String::from_utf8_lossy(&output.stdout);
        for line in output_str.lines() {
            if line.contains("IOPlatformUUID") {
                // Format: "IOPlatformUUID" = "XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX"
                if let Some(uuid) = line.split('"').nth(3) {
                    return Ok(uuid.to_string());
                }
            }
        }

        Err(anyhow!("Failed to extract IOPlatformUUID from ioreg"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        Err(anyhow!("Unsupported platform for machine UUID extraction"))
    }
}

/// Dérive une clé AES-256 à partir de l'identifiant de la machine
fn derive_key() -> Result<[u8; 32]> {
    let machine_uuid = get_machine_uuid()?;

    let mut hasher = Sha256::new();
    hasher.update(machine_uuid.as_bytes());
    hasher.update(b"jinglebox-config-encryption-v1");

    let mut key = [0u8; 32];
    key.copy_from_slice(&hasher.finalize());
    Ok(key)
}

/// Chiffre un secret avec la clé dérivée de la machine
///
/// Le résultat est au format `encrypted:BASE64(nonce || ciphertext)`.
/// Le nonce est dérivé du secret : le même secret produit toujours le même
/// texte chiffré, ce qui évite de réécrire la configuration inutilement.
pub fn encrypt_secret(secret: &str) -> Result<String> {
    let key = derive_key()?;
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b"jinglebox-nonce-v1");
    let nonce_hash = hasher.finalize();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&nonce_hash[..NONCE_LEN]);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, secret.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(format!(
        "{}{}",
        ENCRYPTED_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(&combined)
    ))
}

/// Déchiffre un secret au format `encrypted:BASE64`
///
/// # Errors
///
/// Retourne une erreur si le préfixe manque, si le base64 est invalide ou si
/// le déchiffrement échoue (autre machine, données corrompues).
pub fn decrypt_secret(encrypted: &str) -> Result<String> {
    let base64_data = encrypted
        .strip_prefix(ENCRYPTED_PREFIX)
        .ok_or_else(|| anyhow!("Invalid encrypted secret format (missing prefix)"))?;

    let key = derive_key()?;
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let combined = base64::engine::general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| anyhow!("Invalid base64: {}", e))?;

    if combined.len() < NONCE_LEN {
        return Err(anyhow!("Invalid ciphertext (too short)"));
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| anyhow!("Decryption failed (wrong machine or corrupted data): {}", e))?;

    String::from_utf8(plaintext).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
}

/// Vérifie si une valeur est un secret chiffré
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// Retourne le secret en clair, qu'il soit stocké chiffré ou non
pub fn reveal_secret(value: &str) -> Result<String> {
    if is_encrypted(value) {
        decrypt_secret(value)
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_encrypted() {
        assert!(is_encrypted("encrypted:SGVsbG8="));
        assert!(!is_encrypted("plaintext"));
        assert!(!is_encrypted(""));
    }

    #[test]
    fn test_plaintext_is_revealed_as_is() {
        assert_eq!(reveal_secret("plaintext").unwrap(), "plaintext");
    }

    #[test]
    fn test_missing_prefix_is_rejected() {
        assert!(decrypt_secret("SGVsbG8=").is_err());
    }

    #[test]
    fn test_encrypt_decrypt() {
        // Certains conteneurs n'exposent pas de machine-id
        let Ok(encrypted) = encrypt_secret("SuperSecret123!") else {
            return;
        };
        assert!(encrypted.starts_with(ENCRYPTED_PREFIX));
        assert_eq!(encrypt_secret("SuperSecret123!").unwrap(), encrypted);
        assert_eq!(reveal_secret(&encrypted).unwrap(), "SuperSecret123!");
    }
}
