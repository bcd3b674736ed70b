//! Private keys of the funded accounts, one hex key per line.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use log::info;

use crate::{account::Account, error::StoreError};

#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Trimmed, non-empty lines of the key file. A missing file holds no keys.
    pub fn load_keys(&self) -> Result<Vec<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    /// Ask for a key on `input` when the store is empty, validate it and write it back.
    pub fn prompt_and_persist_if_empty(
        &self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<Vec<String>, StoreError> {
        let keys = self.load_keys()?;
        if !keys.is_empty() {
            return Ok(keys);
        }

        write!(output, "Enter your private key: ")
            .and_then(|_| output.flush())
            .map_err(|e| StoreError::io(&self.path, e))?;

        let mut line = String::new();
        input
            .read_line(&mut line)
            .map_err(|e| StoreError::io(&self.path, e))?;
        let key = line.trim().to_string();

        // Fail before persisting anything unusable.
        Account::from_private_key(&key)?;

        std::fs::write(&self.path, format!("{key}\n")).map_err(|e| StoreError::io(&self.path, e))?;
        info!("Private key saved to {}", self.path.display());

        Ok(vec![key])
    }

    pub fn accounts(&self, keys: &[String]) -> Result<Vec<Account>, StoreError> {
        keys.iter().map(|key| Account::from_private_key(key)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::account::tests::{DEV_KEY, DEV_KEY_2};

    #[test]
    fn loads_trimmed_non_empty_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private_keys.txt");
        std::fs::write(&path, format!("  {DEV_KEY}  \n\n{DEV_KEY_2}\n")).unwrap();

        let store = KeyStore::new(&path);
        let keys = store.load_keys().unwrap();
        assert_eq!(keys, vec![DEV_KEY.to_string(), DEV_KEY_2.to_string()]);
        assert_eq!(store.accounts(&keys).unwrap().len(), 2);
    }

    #[test]
    fn prompts_and_persists_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private_keys.txt");
        let store = KeyStore::new(&path);

        let mut input = Cursor::new(format!("{DEV_KEY}\n"));
        let mut output = Vec::new();
        let keys = store.prompt_and_persist_if_empty(&mut input, &mut output).unwrap();

        assert_eq!(keys, vec![DEV_KEY.to_string()]);
        assert!(String::from_utf8(output).unwrap().contains("private key"));
        assert_eq!(store.load_keys().unwrap(), keys);
    }

    #[test]
    fn does_not_prompt_when_keys_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private_keys.txt");
        std::fs::write(&path, format!("{DEV_KEY}\n")).unwrap();

        let mut input = Cursor::new(String::new());
        let mut output = Vec::new();
        let keys = KeyStore::new(&path)
            .prompt_and_persist_if_empty(&mut input, &mut output)
            .unwrap();

        assert_eq!(keys.len(), 1);
        assert!(output.is_empty());
    }

    #[test]
    fn invalid_prompted_key_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private_keys.txt");
        let store = KeyStore::new(&path);

        let mut input = Cursor::new("nope\n".to_string());
        let result = store.prompt_and_persist_if_empty(&mut input, &mut Vec::new());

        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
        assert!(!path.exists());
    }
}
