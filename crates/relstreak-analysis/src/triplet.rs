//! Relation triplets and triplet combinations
//!
//! A [`Triplet`] is one `(subject, relation, object)` record attached to a
//! frame. A [`Combination`] is the deduplicated set of triplets that occur
//! together in one frame; it is canonically ordered so that equal sets compare,
//! hash and sort identically regardless of the order the triplets were listed
//! in.
//!
//! # Serialization
//!
//! Triplets are encoded as JSON arrays of exactly three scalar fields:
//!
//! ```json
//! ["person", "holding", "cup"]
//! ```
//!
//! Numbers and booleans are accepted and kept as their textual form, since
//! labels are opaque. Integers and booleans are written as in JSON (`7`,
//! `true`). Floats use the shortest round-trip digits with at least one
//! fractional digit, switching to exponent form outside `1e-4..1e16` (`1.0`,
//! `0.25`, `1e+20`, `1e-05`). Any other shape is rejected.

use std::{
    collections::{BTreeSet, btree_set},
    fmt,
};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, IgnoredAny, SeqAccess, Visitor},
    ser::SerializeTuple as _,
};

/// A `(subject, relation, object)` relation record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triplet {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triplet {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.subject, self.relation, self.object)
    }
}

impl Serialize for Triplet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.subject)?;
        tuple.serialize_element(&self.relation)?;
        tuple.serialize_element(&self.object)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Triplet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TripletVisitor;

        impl<'de> Visitor<'de> for TripletVisitor {
            type Value = Triplet;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an array of exactly three labels [subject, relation, object]")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut next = |index: usize| -> Result<String, A::Error> {
                    seq.next_element::<Label>()?
                        .map(|label| label.0)
                        .ok_or_else(|| de::Error::invalid_length(index, &self))
                };
                let subject = next(0)?;
                let relation = next(1)?;
                let object = next(2)?;

                let mut extra = 0;
                while seq.next_element::<IgnoredAny>()?.is_some() {
                    extra += 1;
                }
                if extra > 0 {
                    return Err(de::Error::invalid_length(3 + extra, &self));
                }

                Ok(Triplet {
                    subject,
                    relation,
                    object,
                })
            }
        }

        deserializer.deserialize_seq(TripletVisitor)
    }
}

/// One opaque triplet field.
struct Label(String);

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LabelVisitor;

        impl Visitor<'_> for LabelVisitor {
            type Value = Label;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a string, number or boolean label")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Label(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Label(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Label(v.to_string()))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Label(v.to_string()))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Label(float_label(v)))
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Label(v.to_string()))
            }
        }

        deserializer.deserialize_any(LabelVisitor)
    }
}

fn float_label(v: f64) -> String {
    let scientific = format!("{v:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };
    if (-4..16).contains(&exponent) {
        let fixed = v.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            format!("{fixed}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

/// The deduplicated set of triplets occurring together in one frame.
///
/// Iteration order is the triplet ordering, not the order the triplets were
/// listed in the source frame.
///
/// # Examples
///
/// ```
/// use relstreak_analysis::triplet::{Combination, Triplet};
///
/// let a = Triplet::new("person", "holding", "cup");
/// let b = Triplet::new("cup", "on", "table");
///
/// let first = [a.clone(), b.clone(), a.clone()].into_iter().collect::<Combination>();
/// let second = [b, a].into_iter().collect::<Combination>();
///
/// assert_eq!(first, second);
/// assert_eq!(first.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Combination(BTreeSet<Triplet>);

impl Combination {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, triplet: &Triplet) -> bool {
        self.0.contains(triplet)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Triplet> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Combination {
    type Item = &'a Triplet;
    type IntoIter = btree_set::Iter<'a, Triplet>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Triplet> for Combination {
    fn from_iter<I: IntoIterator<Item = Triplet>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a Triplet> for Combination {
    fn from_iter<I: IntoIterator<Item = &'a Triplet>>(iter: I) -> Self {
        Self(iter.into_iter().cloned().collect())
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, triplet) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(triplet, f)?;
        }
        f.write_str("}")
    }
}

impl Serialize for Combination {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_string_triplet() {
        let triplet: Triplet = serde_json::from_str(r#"["person", "holding", "cup"]"#).unwrap();
        assert_eq!(triplet, Triplet::new("person", "holding", "cup"));
    }

    #[test]
    fn test_float_labels() {
        let triplet: Triplet = serde_json::from_str(r#"[1.0, 0.25, 1e20]"#).unwrap();
        assert_eq!(triplet, Triplet::new("1.0", "0.25", "1e+20"));

        let triplet: Triplet = serde_json::from_str(r#"[1e-5, 0.0001, -3.5e16]"#).unwrap();
        assert_eq!(triplet, Triplet::new("1e-05", "0.0001", "-3.5e+16"));
    }

    #[test]
    fn test_deserialize_scalar_labels() {
        let triplet: Triplet = serde_json::from_str(r#"[7, "near", true]"#).unwrap();
        assert_eq!(triplet, Triplet::new("7", "near", "true"));
    }

    #[test]
    fn test_reject_short_triplet() {
        let err = serde_json::from_str::<Triplet>(r#"["person", "holding"]"#).unwrap_err();
        assert!(err.to_string().contains("invalid length 2"), "{err}");
    }

    #[test]
    fn test_reject_long_triplet() {
        let err =
            serde_json::from_str::<Triplet>(r#"["person", "holding", "cup", "extra"]"#).unwrap_err();
        assert!(err.to_string().contains("invalid length 4"), "{err}");
    }

    #[test]
    fn test_reject_nested_label() {
        assert!(serde_json::from_str::<Triplet>(r#"["person", ["holding"], "cup"]"#).is_err());
        assert!(serde_json::from_str::<Triplet>(r#"{"subject": "person"}"#).is_err());
    }

    #[test]
    fn test_serialize_as_array() {
        let json = serde_json::to_string(&Triplet::new("a", "r", "b")).unwrap();
        assert_eq!(json, r#"["a","r","b"]"#);
    }

    #[test]
    fn test_combination_display_is_canonical() {
        let combination = [Triplet::new("c", "s", "d"), Triplet::new("a", "r", "b")]
            .into_iter()
            .collect::<Combination>();
        assert_eq!(combination.to_string(), "{a - r - b, c - s - d}");
    }
}
