//! Enumerations whose values travel as strings on the wire.
//!
//! Each enum declares its exact wire name per variant. The same mapping
//! drives query/path encoding (through [`WireEnum`]) and JSON bodies (through
//! serde renames), so the two can never drift apart. Descriptors refer to an
//! enum by its [`WireEnum::TYPE_NAME`] and accepted [`WireEnum::WIRE_NAMES`].

/// An enum with a fixed string form on the wire.
pub trait WireEnum: Copy + 'static {
    const TYPE_NAME: &'static str;
    const ALL: &'static [Self];
    const WIRE_NAMES: &'static [&'static str];

    fn wire_name(self) -> &'static str;

    fn from_wire(wire: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.wire_name() == wire)
    }
}

/// Declares a [`WireEnum`] together with its serde representation and
/// parameter binding.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $crate::wire::WireEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const ALL: &'static [Self] = &[$($name::$variant),+];
            const WIRE_NAMES: &'static [&'static str] = &[$($wire),+];

            fn wire_name(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl $crate::params::IntoParam for $name {
            fn into_param(self) -> Option<$crate::params::ParamValue> {
                Some($crate::params::ParamValue::from_enum(self))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::wire::WireEnum::wire_name(*self))
            }
        }
    };
}

wire_enum! {
    /// Sport an activity, club or event belongs to.
    pub enum Sport {
        Cycling => "CYCLING",
        Running => "RUNNING",
    }
}

wire_enum! {
    /// A player's relationship to a club.
    pub enum ClubMemberStatus {
        Member => "MEMBER",
        Invited => "INVITED",
        Requested => "REQUESTED",
        Banned => "BANNED",
        Rejected => "REJECTED",
        Left => "LEFT",
    }
}

wire_enum! {
    /// Club size bucket used by club search.
    pub enum ClubMemberCount {
        Small => "SMALL",
        Medium => "MEDIUM",
        Large => "LARGE",
        ExtraLarge => "EXTRA_LARGE",
    }
}

wire_enum! {
    pub enum ClubsSortField {
        Name => "NAME",
        MemberCount => "MEMBER_COUNT",
        CreatedOn => "CREATED_ON",
    }
}

wire_enum! {
    pub enum ClubsSortDirection {
        Ascending => "ASC",
        Descending => "DESC",
    }
}

wire_enum! {
    /// Which activities the activity feed returns.
    pub enum ActivityFeedType {
        Followees => "FOLLOWEES",
        JustMe => "JUST_ME",
        Favorites => "FAVORITES",
        OtherProfile => "OTHER_PROFILE",
    }
}

wire_enum! {
    pub enum EventTypeV2 {
        GroupRide => "GROUP_RIDE",
        GroupWorkout => "GROUP_WORKOUT",
        Race => "RACE",
        TimeTrial => "TIME_TRIAL",
    }
}

wire_enum! {
    /// Gallery a stock club image belongs to.
    pub enum ClubImageType {
        Avatar => "AVATAR",
        Banner => "BANNER",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mapping<E: WireEnum + std::fmt::Debug + PartialEq>(expected: &[(E, &str)]) {
        assert_eq!(E::ALL.len(), expected.len(), "{}: variant count", E::TYPE_NAME);
        for (value, wire) in expected {
            assert_eq!(value.wire_name(), *wire);
            assert_eq!(E::from_wire(wire), Some(*value));
        }
        let names: Vec<&str> = expected.iter().map(|(_, w)| *w).collect();
        assert_eq!(E::WIRE_NAMES, names.as_slice());
    }

    #[test]
    fn sport_wire_names() {
        assert_mapping(&[(Sport::Cycling, "CYCLING"), (Sport::Running, "RUNNING")]);
    }

    #[test]
    fn club_member_status_wire_names() {
        assert_mapping(&[
            (ClubMemberStatus::Member, "MEMBER"),
            (ClubMemberStatus::Invited, "INVITED"),
            (ClubMemberStatus::Requested, "REQUESTED"),
            (ClubMemberStatus::Banned, "BANNED"),
            (ClubMemberStatus::Rejected, "REJECTED"),
            (ClubMemberStatus::Left, "LEFT"),
        ]);
    }

    #[test]
    fn club_search_enum_wire_names() {
        assert_mapping(&[
            (ClubMemberCount::Small, "SMALL"),
            (ClubMemberCount::Medium, "MEDIUM"),
            (ClubMemberCount::Large, "LARGE"),
            (ClubMemberCount::ExtraLarge, "EXTRA_LARGE"),
        ]);
        assert_mapping(&[
            (ClubsSortField::Name, "NAME"),
            (ClubsSortField::MemberCount, "MEMBER_COUNT"),
            (ClubsSortField::CreatedOn, "CREATED_ON"),
        ]);
        assert_mapping(&[
            (ClubsSortDirection::Ascending, "ASC"),
            (ClubsSortDirection::Descending, "DESC"),
        ]);
    }

    #[test]
    fn feed_and_event_enum_wire_names() {
        assert_mapping(&[
            (ActivityFeedType::Followees, "FOLLOWEES"),
            (ActivityFeedType::JustMe, "JUST_ME"),
            (ActivityFeedType::Favorites, "FAVORITES"),
            (ActivityFeedType::OtherProfile, "OTHER_PROFILE"),
        ]);
        assert_mapping(&[
            (EventTypeV2::GroupRide, "GROUP_RIDE"),
            (EventTypeV2::GroupWorkout, "GROUP_WORKOUT"),
            (EventTypeV2::Race, "RACE"),
            (EventTypeV2::TimeTrial, "TIME_TRIAL"),
        ]);
        assert_mapping(&[(ClubImageType::Avatar, "AVATAR"), (ClubImageType::Banner, "BANNER")]);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ClubMemberStatus::Requested).unwrap();
        assert_eq!(json, "\"REQUESTED\"");
        let back: ActivityFeedType = serde_json::from_str("\"JUST_ME\"").unwrap();
        assert_eq!(back, ActivityFeedType::JustMe);
    }

    #[test]
    fn unknown_wire_name_is_rejected() {
        assert_eq!(Sport::from_wire("cycling"), None);
    }
}
