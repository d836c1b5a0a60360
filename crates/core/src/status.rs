//! Status enums mapping to SMALLSERIAL lookup tables.
//!
//! Each variant's discriminant matches the seed data (1-based) in the
//! corresponding `*_statuses` table, and its name matches the `name`
//! column. Over the API statuses travel as their names.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Return the status name as seeded in the lookup table.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name.trim().to_ascii_lowercase().as_str() {
                    $( $label => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = String::deserialize(deserializer)?;
                Self::from_name(&name).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} '{name}'",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

define_status_enum! {
    /// Document processing status.
    DocumentStatus {
        /// Waiting in the extraction queue.
        Pending = 1 => "pending",
        Processing = 2 => "processing",
        Completed = 3 => "completed",
        Error = 4 => "error",
        /// Presigned URL issued; the client has not confirmed the upload.
        Uploading = 5 => "uploading",
    }
}

define_status_enum! {
    /// Contract lifecycle status.
    ContractStatus {
        Draft = 1 => "draft",
        Active = 2 => "active",
        Expired = 3 => "expired",
        Terminated = 4 => "terminated",
        Unknown = 5 => "unknown",
    }
}
