//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table. Over JSON the variants travel as their
//! upper-case labels (`"PENDING"`, `"EXACT_GTIN"`, ...).

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
            /// Every variant in seed order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Map a database ID back to its variant.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Wire/display label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Parse a wire label (case-insensitive).
            pub fn parse(label: &str) -> Option<Self> {
                $(
                    if label.eq_ignore_ascii_case($label) {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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
                let raw = String::deserialize(deserializer)?;
                $name::parse(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} '{raw}'",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

define_status_enum! {
    /// Correction workflow status.
    CorrectionStatus {
        Draft = 1 => "DRAFT",
        Pending = 2 => "PENDING",
        Approved = 3 => "APPROVED",
        Rejected = 4 => "REJECTED",
    }
}

define_status_enum! {
    /// How a supplier item was linked to its canonical product.
    MatchMethod {
        Manual = 1 => "MANUAL",
        ExactGtin = 2 => "EXACT_GTIN",
        FuzzyName = 3 => "FUZZY_NAME",
        BarcodeScan = 4 => "BARCODE_SCAN",
        SupplierMapped = 5 => "SUPPLIER_MAPPED",
    }
}

impl CorrectionStatus {
    /// APPROVED and REJECTED are final; nothing transitions out of them.
    pub fn is_terminal(self) -> bool {
        matches!(self, CorrectionStatus::Approved | CorrectionStatus::Rejected)
    }

    /// The statuses that count against the one-open-correction-per-item rule.
    pub const OPEN: &'static [CorrectionStatus] =
        &[CorrectionStatus::Draft, CorrectionStatus::Pending];
}
