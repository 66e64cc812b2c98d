use serde::{Deserialize, Serialize};

use crate::{route::Route, Client, Result, Version};

/// Server status, from `GET api/server`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInformation {
    /// Server version.
    pub version: Version,

    /// Why the server is running in safe mode, or `None` if it is not.
    #[serde(rename = "safemode", default, with = "safe_mode_field")]
    pub safe_mode: Option<SafeMode>,
}

/// Reason OctoPrint started in safe mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeMode {
    /// Safe mode was enabled in the settings.
    Settings,

    /// The previous startup did not complete.
    IncompleteStartup,

    /// Safe mode was requested on the command line.
    Flag,
}

/// On the wire `safemode` is either `false` or one of the [SafeMode]
/// reasons. `true` and unknown reasons are rejected.
mod safe_mode_field {
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    use super::SafeMode;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        Disabled(bool),
        Enabled(SafeMode),
    }

    pub(super) fn serialize<S: Serializer>(value: &Option<SafeMode>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(reason) => reason.serialize(serializer),
            None => serializer.serialize_bool(false),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SafeMode>, D::Error> {
        match Field::deserialize(deserializer)? {
            Field::Disabled(false) => Ok(None),
            Field::Disabled(true) => Err(D::Error::custom("safemode must be false or a reason, got true")),
            Field::Enabled(reason) => Ok(Some(reason)),
        }
    }
}

impl Client {
    /// Retrieve the server version and safe mode state.
    pub async fn server_information(&self) -> Result<ServerInformation> {
        self.get_json(Route::ServerInformation).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_deserialize_safe_mode_reason() {
        let info: ServerInformation =
            serde_json::from_str(r#"{ "version": "1.5.0", "safemode": "incomplete_startup" }"#).unwrap();

        assert_eq!(
            info,
            ServerInformation {
                version: Version::new(1, 5, Some(0)),
                safe_mode: Some(SafeMode::IncompleteStartup),
            }
        );
    }

    #[test]
    fn test_deserialize_safe_mode_disabled() {
        let info: ServerInformation = serde_json::from_str(r#"{ "version": "1.9.3", "safemode": false }"#).unwrap();
        assert_eq!(info.safe_mode, None);

        let info: ServerInformation = serde_json::from_str(r#"{ "version": "1.9.3" }"#).unwrap();
        assert_eq!(info.safe_mode, None);
    }

    #[test]
    fn test_deserialize_safe_mode_rejects_unknown() {
        for safemode in [r#""maintenance""#, "true", "1", "null"] {
            let payload = format!(r#"{{ "version": "1.5.0", "safemode": {} }}"#, safemode);
            assert!(
                serde_json::from_str::<ServerInformation>(&payload).is_err(),
                "{}",
                payload
            );
        }
    }

    #[test]
    fn test_serialize_safe_mode() {
        let info = ServerInformation {
            version: Version::new(1, 5, Some(0)),
            safe_mode: None,
        };
        assert_eq!(
            serde_json::to_value(info).unwrap(),
            serde_json::json!({ "version": "1.5.0", "safemode": false })
        );

        let info = ServerInformation {
            safe_mode: Some(SafeMode::Flag),
            ..info
        };
        assert_eq!(
            serde_json::to_value(info).unwrap(),
            serde_json::json!({ "version": "1.5.0", "safemode": "flag" })
        );
    }
}
