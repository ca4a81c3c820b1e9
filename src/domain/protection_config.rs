use std::collections::HashMap;

use secrecy::Secret;

/// The validated, immutable folder -> password snapshot the engine matches
/// against, plus the realm announced in challenges.
///
/// Must be instantiated with `ProtectionConfig::new`, which enforces the
/// constraints at load time (rather than on every request): folder names are
/// single top-level path segments -- non-empty, no `/`, no surrounding
/// whitespace -- and the realm is printable ASCII without `"` or `\`, so a
/// `WWW-Authenticate` header built from it can never be malformed.
///
/// A folder absent from the map is implicitly unprotected; an empty map is the
/// designed "protection disabled" state, not an error. The snapshot is never
/// mutated after construction -- a redeploy replaces it wholesale for the next
/// process generation.
#[derive(Debug)]
pub struct ProtectionConfig {
    realm: String,
    folders: HashMap<String, Secret<String>>,
}

impl ProtectionConfig {
    pub fn new(
        realm: String,
        folders: HashMap<String, Secret<String>>,
    ) -> Result<Self, String> {
        let realm_ok = !realm.is_empty()
            && realm
                .chars()
                .all(|c| c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\');
        if !realm_ok {
            return Err(format!("Invalid realm: {realm:?}"));
        }

        for name in folders.keys() {
            let empty = name.is_empty();
            let embedded_slash = name.contains('/');
            let padded = name.trim() != name;
            if empty || embedded_slash || padded {
                return Err(format!("Invalid folder name: {name:?}"));
            }
        }

        Ok(Self { realm, folders })
    }

    /// The configured password for `folder`, or `None` if the folder is not
    /// protected. Lookup is exact and case-sensitive.
    pub fn password_for(
        &self,
        folder: &str,
    ) -> Option<&Secret<String>> {
        self.folders.get(folder)
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }
}
