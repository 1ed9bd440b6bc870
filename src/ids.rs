//! Azure Resource Manager resource IDs.
//!
//! An ARM ID is a `/`-delimited path of alternating static keys and
//! user-specified values, e.g.
//! `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Cache/Redis/{redisName}`.
//! Each typed ID declares its [`Segment`] layout once; parsing and formatting
//! are both driven by that layout so they stay exact inverses.

mod common;
mod network;
mod redis;
mod storagecache;
mod synapse;

pub use common::{ResourceGroupId, SubscriptionId};
pub use network::SubnetId;
pub use redis::{FirewallRuleId, LinkedServerId, RedisId};
pub use storagecache::{CacheId, StorageTargetId};
pub use synapse::{SparkPoolId, SqlPoolId, WorkspaceId};

use std::fmt;

use thiserror::Error;

/// One component of an ID layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// A literal that must appear verbatim, e.g. `resourceGroups`.
    Static(&'static str),
    /// A user-specified, non-empty value. The label is used in templates and
    /// error messages, e.g. `redisName`.
    Value(&'static str),
}

/// How strictly static segments are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Strict,
    /// Static segments match regardless of ASCII case and are normalized to
    /// their canonical casing. Values are kept as given.
    Insensitive,
}

/// Why an input did not match an ID layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("the ID must start with a `/`")]
    MissingLeadingSlash,

    #[error("the segment `{segment}` was not specified")]
    MissingSegment { segment: &'static str },

    #[error("expected the segment `{expected}` but got `{found}`")]
    UnexpectedSegment {
        expected: &'static str,
        found: String,
    },

    #[error("expected the segment `{expected}` but got `{found}` (segments are case-sensitive)")]
    CaseMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("unexpected trailing segments `{remainder}`")]
    TrailingSegments { remainder: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("parsing {id_type} ID {input:?}: {reason}")]
    InvalidFormat {
        id_type: &'static str,
        input: String,
        reason: FormatError,
    },
}

impl IdError {
    pub fn reason(&self) -> &FormatError {
        match self {
            IdError::InvalidFormat { reason, .. } => reason,
        }
    }
}

/// A typed ARM resource ID.
pub trait ResourceId: fmt::Display + Sized {
    /// Human-readable kind used in error messages, e.g. "Redis Linked Server".
    const ID_TYPE: &'static str;

    const SEGMENTS: &'static [Segment];

    /// Builds the ID from the user-specified values, in layout order.
    fn from_values(values: Vec<String>) -> Self;

    /// The user-specified values, in layout order.
    fn values(&self) -> Vec<&str>;

    fn parse(input: &str) -> Result<Self, IdError> {
        parse_values(Self::ID_TYPE, Self::SEGMENTS, input, ParseMode::Strict).map(Self::from_values)
    }

    fn parse_insensitively(input: &str) -> Result<Self, IdError> {
        parse_values(Self::ID_TYPE, Self::SEGMENTS, input, ParseMode::Insensitive)
            .map(Self::from_values)
    }

    /// The layout with placeholders, e.g. `/subscriptions/{subscriptionId}/...`.
    fn template() -> String {
        template(Self::SEGMENTS)
    }

    /// A type-erased view with named segments.
    fn to_parsed(&self) -> ParsedId {
        let values = self.values();
        let segments = Self::SEGMENTS
            .iter()
            .filter_map(|segment| match segment {
                Segment::Value(label) => Some(*label),
                Segment::Static(_) => None,
            })
            .zip(values.iter().map(|v| v.to_string()))
            .collect();

        ParsedId {
            id_type: Self::ID_TYPE,
            segments,
            canonical: self.to_string(),
        }
    }
}

/// A parsed ID without its static type, as produced by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    pub id_type: &'static str,
    /// `(label, value)` for every user-specified segment, in layout order.
    pub segments: Vec<(&'static str, String)>,
    /// The canonical string form.
    pub canonical: String,
}

impl ParsedId {
    pub fn value(&self, label: &str) -> Option<&str> {
        self.segments
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ParsedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Parses `input` as `T` and erases the type. Usable as a plain `fn` pointer.
pub fn parse_erased<T: ResourceId>(input: &str, mode: ParseMode) -> Result<ParsedId, IdError> {
    let id = match mode {
        ParseMode::Strict => T::parse(input)?,
        ParseMode::Insensitive => T::parse_insensitively(input)?,
    };
    Ok(id.to_parsed())
}

/// Walks `input` against `segments` and returns the user-specified values.
pub fn parse_values(
    id_type: &'static str,
    segments: &[Segment],
    input: &str,
    mode: ParseMode,
) -> Result<Vec<String>, IdError> {
    let invalid = |reason: FormatError| IdError::InvalidFormat {
        id_type,
        input: input.to_string(),
        reason,
    };

    let path = input
        .strip_prefix('/')
        .ok_or_else(|| invalid(FormatError::MissingLeadingSlash))?;

    let mut parts = path.split('/');
    let mut values = Vec::new();

    for segment in segments {
        let part = parts.next();
        match *segment {
            Segment::Static(expected) => match part {
                Some(found) if found == expected => {}
                Some(found)
                    if mode == ParseMode::Insensitive && found.eq_ignore_ascii_case(expected) => {}
                Some(found) if found.eq_ignore_ascii_case(expected) => {
                    return Err(invalid(FormatError::CaseMismatch {
                        expected,
                        found: found.to_string(),
                    }));
                }
                Some("") | None => {
                    return Err(invalid(FormatError::MissingSegment { segment: expected }));
                }
                Some(found) => {
                    return Err(invalid(FormatError::UnexpectedSegment {
                        expected,
                        found: found.to_string(),
                    }));
                }
            },
            Segment::Value(label) => match part {
                Some(value) if !value.is_empty() => values.push(value.to_string()),
                _ => return Err(invalid(FormatError::MissingSegment { segment: label })),
            },
        }
    }

    let remainder: Vec<&str> = parts.collect();
    if !remainder.is_empty() {
        return Err(invalid(FormatError::TrailingSegments {
            remainder: remainder.join("/"),
        }));
    }

    Ok(values)
}

/// Formats `values` into `segments`. Exact inverse of [`parse_values`].
pub fn format_values(segments: &[Segment], values: &[&str]) -> String {
    let mut out = String::new();
    let mut values = values.iter();
    for segment in segments {
        out.push('/');
        match segment {
            Segment::Static(s) => out.push_str(s),
            Segment::Value(_) => out.push_str(values.next().copied().unwrap_or_default()),
        }
    }
    out
}

pub fn template(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        match segment {
            Segment::Static(s) => out.push_str(s),
            Segment::Value(label) => {
                out.push('{');
                out.push_str(label);
                out.push('}');
            }
        }
    }
    out
}

/// Declares a typed resource ID struct and its [`ResourceId`] impl.
///
/// Fields are listed in the same order as the `Segment::Value`s of the layout.
macro_rules! define_resource_id {
    (
        $(#[$meta:meta])*
        $name:ident($id_type:literal) {
            segments: [$($segment:expr),+ $(,)?],
            fields: { $($field:ident),+ $(,)? }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            $(pub $field: String,)+
        }

        impl $name {
            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: impl Into<String>),+) -> Self {
                Self {
                    $($field: $field.into(),)+
                }
            }
        }

        impl $crate::ids::ResourceId for $name {
            const ID_TYPE: &'static str = $id_type;

            const SEGMENTS: &'static [$crate::ids::Segment] = &[$($segment),+];

            fn from_values(values: Vec<String>) -> Self {
                let mut values = values.into_iter();
                Self {
                    $($field: values.next().unwrap_or_default(),)+
                }
            }

            fn values(&self) -> Vec<&str> {
                vec![$(self.$field.as_str()),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                use $crate::ids::ResourceId;
                f.write_str(&$crate::ids::format_values(Self::SEGMENTS, &self.values()))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::ids::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as $crate::ids::ResourceId>::parse(s)
            }
        }
    };
}

pub(crate) use define_resource_id;
