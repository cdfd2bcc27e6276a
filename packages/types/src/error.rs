use serde::{Deserialize, Serialize};

use crate::codes;

/// Error body returned by etcd with a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EtcdError {
    pub error_code: i32,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub cause: Option<String>,

    #[serde(default)]
    pub index: u64,
}

impl EtcdError {
    pub fn is_key_not_found(&self) -> bool {
        self.error_code == codes::KEY_NOT_FOUND
    }

    pub fn is_test_failed(&self) -> bool {
        self.error_code == codes::TEST_FAILED
    }

    pub fn is_node_exist(&self) -> bool {
        self.error_code == codes::NODE_EXIST
    }

    pub fn is_not_dir(&self) -> bool {
        self.error_code == codes::NOT_DIR
    }

    pub fn is_dir_not_empty(&self) -> bool {
        self.error_code == codes::DIR_NOT_EMPTY
    }
}

impl std::fmt::Display for EtcdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "etcd error {}: {}", self.error_code, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({})", cause)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_key_not_found() {
        let body = r#"{"errorCode":100,"message":"Key not found","cause":"/sample","index":7}"#;
        let error: EtcdError = serde_json::from_str(body).unwrap();

        assert_eq!(error.error_code, 100);
        assert_eq!(error.message, "Key not found");
        assert_eq!(error.cause.as_deref(), Some("/sample"));
        assert_eq!(error.index, 7);
        assert!(error.is_key_not_found());
        assert!(!error.is_test_failed());
    }

    #[test]
    fn decode_without_cause() {
        let body = r#"{"errorCode":101,"message":"Compare failed","index":3}"#;
        let error: EtcdError = serde_json::from_str(body).unwrap();

        assert!(error.is_test_failed());
        assert!(error.cause.is_none());
    }

    #[test]
    fn display_includes_code_and_cause() {
        let error = EtcdError {
            error_code: 105,
            message: "Key already exists".to_string(),
            cause: Some("/sample".to_string()),
            index: 1,
        };
        let text = error.to_string();
        assert!(text.contains("105"));
        assert!(text.contains("Key already exists"));
        assert!(text.contains("/sample"));
    }

    #[test]
    fn missing_error_code_is_rejected() {
        let result = serde_json::from_str::<EtcdError>(r#"{"message":"nope"}"#);
        assert!(result.is_err());
    }
}
