//! Serde adapters for option fields that travel to the server as integers.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Writes `value` as an int32 when it fits and as an int64 otherwise, the way the server expects
/// time limits such as `wtimeout` and `expireAfterSeconds`.
fn serialize_count<S: Serializer>(
    value: Option<u128>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(count) => match i32::try_from(count) {
            Ok(small) => serializer.serialize_i32(small),
            Err(_) => serializer.serialize_i64(i64::try_from(count).unwrap_or(i64::MAX)),
        },
        None => serializer.serialize_none(),
    }
}

/// `Option<Duration>` as a whole number of seconds (`expireAfterSeconds`).
pub(crate) mod duration_option_as_int_seconds {
    use super::*;

    pub(crate) fn serialize<S: Serializer>(
        val: &Option<Duration>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serialize_count(val.map(|duration| u128::from(duration.as_secs())), serializer)
    }

    pub(crate) fn deserialize<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

/// `Option<Duration>` as a whole number of milliseconds (`wtimeout`).
pub(crate) mod duration_option_as_int_millis {
    use super::*;

    pub(crate) fn serialize<S: Serializer>(
        val: &Option<Duration>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serialize_count(val.map(|duration| duration.as_millis()), serializer)
    }

    pub(crate) fn deserialize<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
