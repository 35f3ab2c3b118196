use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Macro to generate enum with wire string + as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Physician => "Physician",
    Nurse => "Nurse",
    PhysicalTherapist => "PT",
    SocialWorker => "SocialWorker",
    System => "System",
});

str_enum!(NoteKind {
    General => "general",
    Assessment => "assessment",
    Contact => "contact",
    Plan => "plan",
    Risk => "risk",
    System => "system",
});

str_enum!(ContactChannel {
    Phone => "Phone",
    WhatsApp => "WhatsApp",
    InPerson => "In-Person",
});

str_enum!(TaskStatus {
    Open => "Open",
    Done => "Done",
});
