use std::{fmt, str::FromStr};

/// Kind of value a parameter holds. The parameter store only accepts these
/// three literals on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// `String`
    PlainText,
    /// `StringList`, a comma separated list of values.
    MultiValueText,
    /// `SecureString`, encrypted server side with the account's KMS key.
    EncryptedText,
}

impl ValueType {
    pub const ALL: [ValueType; 3] = [
        ValueType::PlainText,
        ValueType::MultiValueText,
        ValueType::EncryptedText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "String",
            Self::MultiValueText => "StringList",
            Self::EncryptedText => "SecureString",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(Self::PlainText),
            "StringList" => Ok(Self::MultiValueText),
            "SecureString" => Ok(Self::EncryptedText),
            other => Err(DomainError::InvalidValueType(other.to_string())),
        }
    }
}

/// A single create-or-update request, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutParameterRequest {
    key: String,
    value: String,
    value_type: ValueType,
    overwrite: bool,
}

impl PutParameterRequest {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        value_type: ValueType,
        overwrite: bool,
    ) -> Result<Self, DomainError> {
        let key = key.into();
        if key.is_empty() {
            return Err(DomainError::EmptyKey);
        }

        Ok(Self {
            key,
            value: value.into(),
            value_type,
            overwrite,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    InvalidValueType(String),
    EmptyKey,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValueType(value_type) => write!(
                f,
                "invalid value_type '{}', use one of the expected values (String, StringList, SecureString)",
                value_type
            ),
            Self::EmptyKey => write!(f, "parameter key is required"),
        }
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_parses_wire_literals() {
        assert_eq!("String".parse::<ValueType>().unwrap(), ValueType::PlainText);
        assert_eq!(
            "StringList".parse::<ValueType>().unwrap(),
            ValueType::MultiValueText
        );
        assert_eq!(
            "SecureString".parse::<ValueType>().unwrap(),
            ValueType::EncryptedText
        );
    }

    #[test]
    fn test_value_type_display_matches_parse() {
        for value_type in ValueType::ALL {
            assert_eq!(
                value_type.to_string().parse::<ValueType>().unwrap(),
                value_type
            );
        }
    }

    #[test]
    fn test_value_type_rejects_empty() {
        let err = "".parse::<ValueType>().unwrap_err();
        assert_eq!(err, DomainError::InvalidValueType(String::new()));
    }

    #[test]
    fn test_value_type_is_case_sensitive() {
        for input in ["string", "STRING", "securestring", " String", "String "] {
            assert!(input.parse::<ValueType>().is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn test_invalid_value_type_message_names_input() {
        let err = "Secret".parse::<ValueType>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid value_type"));
        assert!(message.contains("'Secret'"));
    }

    #[test]
    fn test_request_rejects_empty_key() {
        let result = PutParameterRequest::new("", "value", ValueType::PlainText, false);
        assert_eq!(result.unwrap_err(), DomainError::EmptyKey);
    }

    #[test]
    fn test_request_keeps_fields_verbatim() {
        let request =
            PutParameterRequest::new("app/db/password", "s3cr3t", ValueType::EncryptedText, true)
                .unwrap();

        assert_eq!(request.key(), "app/db/password");
        assert_eq!(request.value(), "s3cr3t");
        assert_eq!(request.value_type(), ValueType::EncryptedText);
        assert!(request.overwrite());
    }
}
