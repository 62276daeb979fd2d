use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// A text property that may vary across the characters of one node.
///
/// On the wire: the string `"mixed"` is [`Mixed::Mixed`], `null` or a missing
/// field is [`Mixed::Absent`], anything else is [`Mixed::Uniform`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mixed<T> {
    Uniform(T),
    Mixed,
    Absent,
}

impl<T> Default for Mixed<T> {
    fn default() -> Self {
        Mixed::Absent
    }
}

impl<T> Mixed<T> {
    /// The value when uniform, otherwise None.
    pub fn uniform(&self) -> Option<&T> {
        match self {
            Mixed::Uniform(v) => Some(v),
            Mixed::Mixed | Mixed::Absent => None,
        }
    }

    pub fn into_uniform(self) -> Option<T> {
        match self {
            Mixed::Uniform(v) => Some(v),
            Mixed::Mixed | Mixed::Absent => None,
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Mixed::Mixed)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Mixed::Absent)
    }
}

impl<T> From<T> for Mixed<T> {
    fn from(value: T) -> Self {
        Mixed::Uniform(value)
    }
}

#[derive(serde::Deserialize)]
enum MixedMarker {
    #[serde(rename = "mixed")]
    Mixed,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Repr<T> {
    Marker(MixedMarker),
    Value(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Mixed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Repr<T>>::deserialize(deserializer)? {
            None => Mixed::Absent,
            Some(Repr::Marker(MixedMarker::Mixed)) => Mixed::Mixed,
            Some(Repr::Value(v)) => Mixed::Uniform(v),
        })
    }
}

impl<T: Serialize> Serialize for Mixed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Mixed::Uniform(v) => v.serialize(serializer),
            Mixed::Mixed => serializer.serialize_str("mixed"),
            Mixed::Absent => serializer.serialize_none(),
        }
    }
}
