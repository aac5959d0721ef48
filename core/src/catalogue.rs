//! The endpoint catalogue.
//!
//! Every remote operation is one [`EndpointDescriptor`], declared here and
//! validated once when the catalogue is built. Names are exposed as
//! constants so typed wrappers and tests can never drift from the table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{DescriptorBuilder, EndpointDescriptor, ResponseKind, ValueKind};
use crate::error::ApiError;
use crate::wire::{
    ActivityFeedType, ClubImageType, ClubMemberCount, ClubMemberStatus, ClubsSortDirection,
    ClubsSortField, EventTypeV2, Sport, WireEnum,
};

// Club membership.
pub const UNBAN_CLUB_MEMBER: &str = "unban_club_member";
pub const REMOVE_CLUB_MEMBER: &str = "remove_club_member";
pub const REJECT_CLUB_APPLICATION: &str = "reject_club_application";
pub const ACCEPT_CLUB_APPLICATION: &str = "accept_club_application";
pub const DENY_CLUB_INVITE: &str = "deny_club_invite";
pub const LEAVE_CLUB: &str = "leave_club";
pub const WITHDRAW_CLUB_INVITE: &str = "withdraw_club_invite";
pub const BAN_CLUB_MEMBER: &str = "ban_club_member";
pub const CHANGE_CLUB_SECURITY_LEVEL: &str = "change_club_security_level";
pub const WITHDRAW_CLUB_APPLICATION: &str = "withdraw_club_application";
pub const BATCH_INVITE_TO_CLUB: &str = "batch_invite_to_club";
pub const JOIN_CLUB: &str = "join_club";
pub const ACCEPT_CLUB_INVITE: &str = "accept_club_invite";
pub const CLUB_MEMBER_STATUSES: &str = "club_member_statuses";

// Clubs.
pub const SEARCH_CLUBS: &str = "search_clubs";
pub const LIST_CLUBS: &str = "list_clubs";
pub const REPORT_CLUB: &str = "report_club";
pub const CLUB_CHAT: &str = "club_chat";
pub const CLUB_ROSTER: &str = "club_roster";
pub const FIND_CLUB_MEMBERS: &str = "find_club_members";
pub const VALIDATE_CLUB_NAME: &str = "validate_club_name";
pub const UPDATE_CLUB: &str = "update_club";
pub const CREATE_CLUB: &str = "create_club";
pub const MY_CLUB_COUNT: &str = "my_club_count";
pub const ACCEPT_CLUB_TERMS: &str = "accept_club_terms";
pub const POST_CLUB_COMMENT: &str = "post_club_comment";
pub const REPORT_CLUB_COMMENT: &str = "report_club_comment";
pub const FIND_CLUB_BY_SHORT_NAME: &str = "find_club_by_short_name";
pub const MY_CLUBS: &str = "my_clubs";
pub const MY_CLUBS_WITH_STATUS: &str = "my_clubs_with_status";
pub const DELETE_CLUB_COMMENT: &str = "delete_club_comment";
pub const CLUB_ANNOUNCEMENTS: &str = "club_announcements";
pub const CREATE_CLUB_ANNOUNCEMENT: &str = "create_club_announcement";
pub const UPDATE_CLUB_ANNOUNCEMENT: &str = "update_club_announcement";
pub const DELETE_CLUB_ANNOUNCEMENT: &str = "delete_club_announcement";
pub const CLUB_STATS: &str = "club_stats";
pub const LATEST_CLUB_TERMS: &str = "latest_club_terms";
pub const CLUB_GALLERY: &str = "club_gallery";
pub const GET_CLUB: &str = "get_club";
pub const CLUB_CREATION_ELIGIBILITY: &str = "club_creation_eligibility";
pub const CLUB_ACTIVITY_FEED: &str = "club_activity_feed";

// Partner integrations.
pub const CONNECT_PARTNER: &str = "connect_partner";
pub const CONNECT_PARTNER_OAUTH1: &str = "connect_partner_oauth1";
pub const PARTNER_USER: &str = "partner_user";
pub const DISCONNECT_PARTNER: &str = "disconnect_partner";
pub const PARTNER_AUTHORIZE_URL: &str = "partner_authorize_url";
pub const SEARCH_PARTNER_PROFILES: &str = "search_partner_profiles";
pub const PARTNER_CREDENTIALS: &str = "partner_credentials";
pub const PARTNER_STATUS: &str = "partner_status";

// Meetups (private events).
pub const UPDATE_MEETUP: &str = "update_meetup";
pub const REJECT_MEETUP: &str = "reject_meetup";
pub const ACCEPT_MEETUP: &str = "accept_meetup";
pub const DELETE_MEETUP: &str = "delete_meetup";
pub const CREATE_MEETUP: &str = "create_meetup";
pub const MEETUP_FEED: &str = "meetup_feed";
pub const GET_MEETUP: &str = "get_meetup";
pub const MEETUP_ENTITLEMENT: &str = "meetup_entitlement";

// Profiles, follows and goals.
pub const UPDATE_ACTIVITY_NOTES: &str = "update_activity_notes";
pub const UPDATE_ACTIVITY: &str = "update_activity";
pub const UPDATE_MY_PROFILE: &str = "update_my_profile";
pub const FOLLOWERS: &str = "followers";
pub const FOLLOWEES: &str = "followees";
pub const FOLLOWEES_IN_COMMON: &str = "followees_in_common";
pub const PROFILE_STATISTICS: &str = "profile_statistics";
pub const GIVE_RIDE_ON: &str = "give_ride_on";
pub const FOLLOW: &str = "follow";
pub const UNFOLLOW: &str = "unfollow";
pub const UPDATE_FOLLOWER: &str = "update_follower";
pub const UPLOAD_PROFILE_PHOTO: &str = "upload_profile_photo";
pub const GOALS: &str = "goals";
pub const CREATE_GOAL: &str = "create_goal";
pub const UPDATE_GOAL: &str = "update_goal";
pub const DELETE_GOAL: &str = "delete_goal";
pub const REPORT_USER: &str = "report_user";
pub const GET_PROFILE: &str = "get_profile";
pub const GET_PROFILE_BY_PUBLIC_ID: &str = "get_profile_by_public_id";
pub const PROFILE_ACTIVITIES: &str = "profile_activities";
pub const PROFILE_ACTIVITY_RIDE_ONS: &str = "profile_activity_ride_ons";
pub const DELETE_ACTIVITY: &str = "delete_activity";
pub const UPDATE_PRIVACY: &str = "update_privacy";
pub const MY_PROFILE: &str = "my_profile";
pub const SEARCH_PROFILES: &str = "search_profiles";

// Activities and feeds.
pub const ACTIVITY_RIDE_ONS: &str = "activity_ride_ons";
pub const COMMENT_ON_ACTIVITY: &str = "comment_on_activity";
pub const GET_ACTIVITY: &str = "get_activity";
pub const ACTIVITY_COMMENTS: &str = "activity_comments";
pub const DELETE_ACTIVITY_COMMENT: &str = "delete_activity_comment";
pub const ACTIVITY_FEED: &str = "activity_feed";

// Events.
pub const GET_EVENT: &str = "get_event";
pub const CANCEL_EVENT_SIGNUP: &str = "cancel_event_signup";
pub const EVENT_SIGNUP: &str = "event_signup";
pub const REPORT_EVENT: &str = "report_event";
pub const DELETE_EVENT: &str = "delete_event";
pub const INVITED_RIDE_SWEEPERS: &str = "invited_ride_sweepers";
pub const INVITED_RIDE_LEADERS: &str = "invited_ride_leaders";
pub const SUBGROUP_ENTRANTS: &str = "subgroup_entrants";
pub const RACE_RESULTS: &str = "race_results";
pub const CREATE_EVENT: &str = "create_event";
pub const UPDATE_EVENT: &str = "update_event";
pub const EVENT_TEMPLATES: &str = "event_templates";
pub const CAMPAIGN_EVENTS: &str = "campaign_events";
pub const EVENT_FEED: &str = "event_feed";

// Campaigns.
pub const CAMPAIGN_PROGRESS: &str = "campaign_progress";
pub const PROFILE_CAMPAIGNS: &str = "profile_campaigns";

// Notifications and push.
pub const NOTIFICATIONS: &str = "notifications";
pub const UPDATE_NOTIFICATION: &str = "update_notification";
pub const REGISTER_PUSH_TOKEN: &str = "register_push_token";
pub const SET_PUSH_ENABLES: &str = "set_push_enables";

// Platform.
pub const SUPPORT_PORTAL_JWT: &str = "support_portal_jwt";
pub const SERVER: &str = "server";
pub const RELAY_SERVERS: &str = "relay_servers";
pub const GAME_INFO: &str = "game_info";
pub const GAME_INFO_VERSION: &str = "game_info_version";
pub const ACTIVE_ANNOUNCEMENTS: &str = "active_announcements";
pub const RESET_PASSWORD: &str = "reset_password";

/// Validated, immutable set of endpoint descriptors keyed by name.
#[derive(Debug, Clone)]
pub struct Catalogue {
    endpoints: HashMap<&'static str, Arc<EndpointDescriptor>>,
}

impl Catalogue {
    /// The platform's full endpoint set.
    pub fn standard() -> Result<Self, ApiError> {
        Self::from_builders(standard_endpoints())
    }

    /// Build and validate each descriptor. Fails on the first invalid
    /// declaration or duplicate name.
    pub fn from_builders(
        builders: impl IntoIterator<Item = DescriptorBuilder>,
    ) -> Result<Self, ApiError> {
        let mut endpoints = HashMap::new();
        for builder in builders {
            let descriptor = builder.build()?;
            let name = descriptor.name();
            if endpoints.insert(name, Arc::new(descriptor)).is_some() {
                return Err(ApiError::configuration(name, "endpoint declared twice"));
            }
        }
        Ok(Self { endpoints })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<EndpointDescriptor>> {
        self.endpoints.get(name)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.values().map(|d| &**d)
    }
}

const INT: ValueKind = ValueKind::Int;
const STR: ValueKind = ValueKind::Str;
const BOOL: ValueKind = ValueKind::Bool;

fn one_of<E: WireEnum>() -> ValueKind {
    ValueKind::enumeration::<E>()
}

fn get(name: &'static str, template: &'static str) -> DescriptorBuilder {
    EndpointDescriptor::get(name, template).accept_json()
}

/// JSON in, JSON out.
fn post_json(name: &'static str, template: &'static str) -> DescriptorBuilder {
    EndpointDescriptor::post(name, template).json_content_type().accept_json()
}

fn put_json(name: &'static str, template: &'static str) -> DescriptorBuilder {
    EndpointDescriptor::put(name, template).json_content_type().accept_json()
}

fn club_membership(name: &'static str, action: &'static str) -> DescriptorBuilder {
    post_json(name, action).json_body()
}

fn standard_endpoints() -> Vec<DescriptorBuilder> {
    use ResponseKind::{JsonList, JsonObject, JsonScalar, RawString};

    vec![
        // Club membership.
        club_membership(UNBAN_CLUB_MEMBER, "clubs/membership/unban"),
        club_membership(REMOVE_CLUB_MEMBER, "clubs/membership/kick"),
        club_membership(REJECT_CLUB_APPLICATION, "clubs/membership/reject-request"),
        club_membership(ACCEPT_CLUB_APPLICATION, "clubs/membership/accept-request"),
        club_membership(DENY_CLUB_INVITE, "clubs/membership/reject-invite"),
        club_membership(LEAVE_CLUB, "clubs/membership/leave"),
        club_membership(WITHDRAW_CLUB_INVITE, "clubs/membership/cancel-invite"),
        club_membership(BAN_CLUB_MEMBER, "clubs/membership/ban"),
        club_membership(CHANGE_CLUB_SECURITY_LEVEL, "clubs/membership/change-security-level"),
        club_membership(WITHDRAW_CLUB_APPLICATION, "clubs/membership/cancel-request"),
        club_membership(BATCH_INVITE_TO_CLUB, "clubs/membership/batch-invite").full_response(),
        club_membership(JOIN_CLUB, "clubs/membership/join").full_response(),
        club_membership(ACCEPT_CLUB_INVITE, "clubs/membership/accept-invite").full_response(),
        get(CLUB_MEMBER_STATUSES, "clubs/membership/{clubId}/status")
            .path("clubId", STR)
            .repeated_query("profileIds", INT)
            .returns(JsonList),
        // Clubs.
        get(SEARCH_CLUBS, "clubs/club")
            .query("limit", INT)
            .query("start", INT)
            .optional_query("name", STR)
            .repeated_query("sport", one_of::<Sport>())
            .optional_query("member_count", one_of::<ClubMemberCount>())
            .optional_query("location", STR)
            .optional_query("sort_field", one_of::<ClubsSortField>())
            .optional_query("sort_dir", one_of::<ClubsSortDirection>())
            .returns(JsonObject),
        get(LIST_CLUBS, "clubs/club")
            .query("limit", INT)
            .query("start", INT)
            .returns(JsonObject),
        EndpointDescriptor::put(REPORT_CLUB, "clubs/club/report").accept_json().json_body(),
        get(CLUB_CHAT, "clubs/club/{clubId}/comment")
            .path("clubId", STR)
            .query("created_before", INT)
            .query("start", INT)
            .query("limit", INT)
            .returns(JsonObject),
        get(CLUB_ROSTER, "clubs/club/{id}/roster")
            .path("id", STR)
            .repeated_query("status", one_of::<ClubMemberStatus>())
            .query("limit", INT)
            .query("start", INT)
            .returns(JsonObject),
        get(FIND_CLUB_MEMBERS, "clubs/club/{id}/roster/find")
            .path("id", STR)
            .repeated_query("status", one_of::<ClubMemberStatus>())
            .query("limit", INT)
            .query("start", INT)
            .optional_query("query", STR)
            .query("sort", BOOL)
            .returns(JsonObject),
        post_json(VALIDATE_CLUB_NAME, "clubs/club/validate").json_body().full_response(),
        put_json(UPDATE_CLUB, "clubs/club").json_body().returns(RawString).full_response(),
        post_json(CREATE_CLUB, "clubs/club").json_body().returns(RawString).full_response(),
        get(MY_CLUB_COUNT, "clubs/club/my-clubs/count")
            .repeated_query("status", one_of::<ClubMemberStatus>())
            .returns(JsonScalar),
        post_json(ACCEPT_CLUB_TERMS, "clubs/terms/{termsId}/accept").path("termsId", INT),
        post_json(POST_CLUB_COMMENT, "clubs/club/{clubId}/comment")
            .path("clubId", STR)
            .json_body()
            .returns(JsonObject),
        EndpointDescriptor::put(REPORT_CLUB_COMMENT, "clubs/club/{clubId}/comment/report")
            .accept_json()
            .path("clubId", STR)
            .json_body(),
        get(FIND_CLUB_BY_SHORT_NAME, "clubs/club/find/short-name")
            .optional_query("shortName", STR)
            .returns(JsonObject),
        get(MY_CLUBS, "clubs/club/list/my-clubs")
            .query("limit", INT)
            .query("start", INT)
            .returns(JsonObject),
        get(MY_CLUBS_WITH_STATUS, "clubs/club/list/my-clubs")
            .query("limit", INT)
            .query("start", INT)
            .repeated_query("status", one_of::<ClubMemberStatus>())
            .returns(JsonObject),
        EndpointDescriptor::delete(DELETE_CLUB_COMMENT, "clubs/club/{clubId}/comment/{commentId}")
            .json_content_type()
            .accept_json()
            .path("clubId", STR)
            .path("commentId", STR),
        get(CLUB_ANNOUNCEMENTS, "clubs/club/{clubId}/announcements")
            .path("clubId", STR)
            .returns(JsonList),
        post_json(CREATE_CLUB_ANNOUNCEMENT, "clubs/club/{clubId}/announcement")
            .path("clubId", STR)
            .json_body()
            .returns(JsonObject),
        put_json(UPDATE_CLUB_ANNOUNCEMENT, "clubs/club/{clubId}/announcement/{announcementId}")
            .path("clubId", STR)
            .path("announcementId", STR)
            .json_body(),
        EndpointDescriptor::delete(
            DELETE_CLUB_ANNOUNCEMENT,
            "clubs/club/{clubId}/announcement/{announcementId}",
        )
            .json_content_type()
            .accept_json()
            .path("clubId", STR)
            .path("announcementId", STR),
        get(CLUB_STATS, "clubs/club/{clubId}/stats")
            .path("clubId", STR)
            .optional_query("daysOffset", INT)
            .returns(JsonObject),
        get(LATEST_CLUB_TERMS, "clubs/terms/latest").returns(JsonObject),
        get(CLUB_GALLERY, "clubs/gallery/{type}")
            .path("type", one_of::<ClubImageType>())
            .returns(JsonList),
        get(GET_CLUB, "clubs/club/{clubId}").path("clubId", STR).returns(JsonObject),
        get(CLUB_CREATION_ELIGIBILITY, "clubs/club/can-create").returns(JsonObject),
        get(CLUB_ACTIVITY_FEED, "activity-feed/feed/club/{clubId}")
            .path("clubId", STR)
            .query("includeSelf", BOOL)
            .query("includeFollowees", BOOL)
            .query("includeFavorites", BOOL)
            .optional_query("start_after_activity_id", INT)
            .query("limit", INT)
            .returns(JsonList),
        // Partner integrations.
        post_json(CONNECT_PARTNER, "partners/{partner}/auth")
            .path("partner", STR)
            .json_body(),
        post_json(CONNECT_PARTNER_OAUTH1, "partners/{partner}/oauth1/connect")
            .path("partner", STR)
            .json_body(),
        get(PARTNER_USER, "partners/{partner}/user").path("partner", STR).returns(JsonObject),
        EndpointDescriptor::delete(DISCONNECT_PARTNER, "partners/{partner}/auth")
            .path("partner", STR),
        get(PARTNER_AUTHORIZE_URL, "partners/{partner}/oauth1/authorize_url_json")
            .path("partner", STR)
            .returns(JsonObject),
        post_json(SEARCH_PARTNER_PROFILES, "partners/{partner}/search/profiles")
            .path("partner", STR)
            .query("created_before", INT)
            .query("start", INT)
            .query("limit", INT)
            .json_body()
            .returns(JsonList),
        get(PARTNER_CREDENTIALS, "partners/{partner}/credentials")
            .path("partner", STR)
            .returns(JsonList),
        get(PARTNER_STATUS, "partners/{partner}/auth").path("partner", STR).returns(JsonObject),
        // Meetups.
        put_json(UPDATE_MEETUP, "private_event/{eventId}").path("eventId", INT).json_body(),
        put_json(REJECT_MEETUP, "private_event/{eventId}/reject").path("eventId", INT),
        put_json(ACCEPT_MEETUP, "private_event/{eventId}/accept").path("eventId", INT),
        EndpointDescriptor::delete(DELETE_MEETUP, "private_event/{eventId}")
            .json_content_type()
            .accept_json()
            .path("eventId", INT),
        post_json(CREATE_MEETUP, "private_event").json_body().returns(JsonObject),
        get(MEETUP_FEED, "private_event/feed")
            .optional_query("start_date", INT)
            .optional_query("end_date", INT)
            .optional_query("status", STR)
            .query("organizer_only_past_events", BOOL)
            .returns(JsonList),
        get(GET_MEETUP, "private_event/{eventId}").path("eventId", INT).returns(JsonObject),
        get(MEETUP_ENTITLEMENT, "private_event/entitlement").returns(JsonObject),
        // Profiles.
        EndpointDescriptor::put(
            UPDATE_ACTIVITY_NOTES,
            "profiles/{profileId}/activities/{activityId}",
        )
            .accept_json()
            .path("profileId", INT)
            .path("activityId", INT)
            .json_body(),
        EndpointDescriptor::put(UPDATE_ACTIVITY, "profiles/{profileId}/activities/{activityId}")
            .accept_json()
            .path("profileId", INT)
            .path("activityId", INT)
            .json_body(),
        put_json(UPDATE_MY_PROFILE, "profiles/me/{profileId}")
            .path("profileId", INT)
            .json_body()
            .returns(JsonObject),
        get(FOLLOWERS, "profiles/{profileId}/followers")
            .path("profileId", INT)
            .query("start", INT)
            .query("limit", INT)
            .query("include-follow-requests", BOOL)
            .returns(JsonList),
        get(FOLLOWEES, "profiles/{profileId}/followees")
            .path("profileId", INT)
            .query("start", INT)
            .query("limit", INT)
            .returns(JsonList),
        get(FOLLOWEES_IN_COMMON, "profiles/{loggedInProfileId}/followees-in-common/{profileId}")
            .path("loggedInProfileId", INT)
            .path("profileId", INT)
            .returns(JsonList),
        get(PROFILE_STATISTICS, "profiles/{profileId}/statistics")
            .path("profileId", INT)
            .optional_query("sport", one_of::<Sport>())
            .optional_query("startDateTime", STR)
            .returns(JsonObject),
        post_json(GIVE_RIDE_ON, "profiles/{profileId}/activities/{activityId}/rideon")
            .path("profileId", INT)
            .path("activityId", INT)
            .json_body(),
        post_json(FOLLOW, "profiles/{fromProfileId}/following/{toProfileId}")
            .path("fromProfileId", INT)
            .path("toProfileId", INT)
            .json_body()
            .returns(JsonObject),
        EndpointDescriptor::delete(UNFOLLOW, "profiles/{fromProfileId}/following/{toProfileId}")
            .path("fromProfileId", INT)
            .path("toProfileId", INT),
        put_json(UPDATE_FOLLOWER, "profiles/{followeeId}/follower/{followerId}")
            .path("followeeId", INT)
            .path("followerId", INT)
            .json_body(),
        EndpointDescriptor::post(UPLOAD_PROFILE_PHOTO, "profiles/{profileId}/photo")
            .accept_json()
            .path("profileId", INT)
            .multipart_body(&["profileImage"]),
        get(GOALS, "profiles/{profileId}/goals").path("profileId", INT).returns(JsonList),
        EndpointDescriptor::post(CREATE_GOAL, "profiles/{profileId}/goals")
            .accept_json()
            .path("profileId", INT)
            .json_body()
            .returns(JsonObject),
        EndpointDescriptor::put(UPDATE_GOAL, "profiles/{profileId}/goals/{goalId}")
            .accept_json()
            .path("profileId", INT)
            .path("goalId", INT)
            .json_body(),
        EndpointDescriptor::delete(DELETE_GOAL, "profiles/{profileId}/goals/{goalId}")
            .path("profileId", INT)
            .path("goalId", INT),
        EndpointDescriptor::put(REPORT_USER, "profiles/report").accept_json().json_body(),
        get(GET_PROFILE, "profiles/{profileId}").path("profileId", INT).returns(JsonObject),
        get(GET_PROFILE_BY_PUBLIC_ID, "profiles/{publicId}")
            .path("publicId", STR)
            .returns(JsonObject),
        get(PROFILE_ACTIVITIES, "profiles/{profileId}/activities")
            .path("profileId", INT)
            .query("before", INT)
            .query("limit", INT)
            .returns(JsonList),
        get(PROFILE_ACTIVITY_RIDE_ONS, "profiles/{profileId}/activities/{activityId}/rideon")
            .path("profileId", INT)
            .path("activityId", INT)
            .query("created_before", INT)
            .query("start", INT)
            .query("limit", INT)
            .returns(JsonList),
        EndpointDescriptor::delete(DELETE_ACTIVITY, "profiles/{profileId}/activities/{activityId}")
            .path("profileId", INT)
            .path("activityId", INT),
        post_json(UPDATE_PRIVACY, "profiles/{profileId}/privacy")
            .path("profileId", INT)
            .json_body(),
        get(MY_PROFILE, "profiles/me/").returns(JsonObject),
        post_json(SEARCH_PROFILES, "search/profiles/restricted")
            .query("created_before", INT)
            .query("start", INT)
            .query("limit", INT)
            .query("followers_only", BOOL)
            .query("social_facts", BOOL)
            .json_body()
            .returns(JsonList),
        // Activities.
        get(ACTIVITY_RIDE_ONS, "activities/{activityId}/rideon")
            .path("activityId", INT)
            .query("only_me", BOOL)
            .returns(JsonList),
        EndpointDescriptor::post(COMMENT_ON_ACTIVITY, "activities/{activityId}/comment")
            .accept_json()
            .path("activityId", INT)
            .json_body()
            .returns(JsonObject),
        get(GET_ACTIVITY, "activities/{activityId}")
            .path("activityId", INT)
            .query("rideOnTimesLimit", INT)
            .returns(JsonObject),
        get(ACTIVITY_COMMENTS, "activities/{activityId}/comment")
            .path("activityId", INT)
            .query("created_before", INT)
            .query("start", INT)
            .query("limit", INT)
            .returns(JsonList),
        EndpointDescriptor::delete(
            DELETE_ACTIVITY_COMMENT,
            "activities/{activityId}/comment/{commentId}",
        )
            .path("activityId", INT)
            .path("commentId", INT),
        get(ACTIVITY_FEED, "activity-feed/feed/")
            .optional_query("feedType", one_of::<ActivityFeedType>())
            .optional_query("profile_id", INT)
            .optional_query("start_after_activity_id", INT)
            .query("limit", INT)
            .returns(JsonList),
        // Events.
        get(GET_EVENT, "events/{id}")
            .path("id", INT)
            .optional_query("eventSecret", STR)
            .query("skip_cache", BOOL)
            .returns(JsonObject),
        EndpointDescriptor::delete(CANCEL_EVENT_SIGNUP, "events/signup/{eventId}")
            .path("eventId", INT),
        post_json(EVENT_SIGNUP, "events/subgroups/signup/{subgroupId}")
            .path("subgroupId", INT)
            .optional_query("eventSecret", STR)
            .json_body()
            .returns(JsonObject),
        EndpointDescriptor::put(REPORT_EVENT, "events/report").accept_json().json_body(),
        EndpointDescriptor::delete(DELETE_EVENT, "events/{id}").path("id", INT),
        get(INVITED_RIDE_SWEEPERS, "events/subgroups/invited_ride_sweepers/{subgroupId}")
            .path("subgroupId", INT)
            .returns(JsonList),
        get(INVITED_RIDE_LEADERS, "events/subgroups/invited_ride_leaders/{subgroupId}")
            .path("subgroupId", INT)
            .returns(JsonList),
        get(SUBGROUP_ENTRANTS, "events/subgroups/entrants/{subgroupId}")
            .path("subgroupId", INT)
            .optional_query("participation", STR)
            .query("registered_before", INT)
            .query("start", INT)
            .query("limit", INT)
            .optional_query("type", STR)
            .returns(JsonList),
        get(RACE_RESULTS, "race-results/entries")
            .query("event_subgroup_id", INT)
            .query("start", INT)
            .query("limit", INT)
            .returns(JsonObject),
        post_json(CREATE_EVENT, "events-core/events").json_body().returns(JsonObject),
        put_json(UPDATE_EVENT, "events-core/events/{event_id}")
            .path("event_id", INT)
            .json_body()
            .full_response(),
        get(EVENT_TEMPLATES, "events-core/events/template/categories?affiliation=clubs")
            .optional_query("eventType", one_of::<EventTypeV2>())
            .optional_query("sport", one_of::<Sport>())
            .returns(JsonList),
        get(CAMPAIGN_EVENTS, "event-feed/campaign/{shortName}")
            .path("shortName", STR)
            .query("from", INT)
            .query("to", INT)
            .repeated_query("sports", one_of::<Sport>())
            .returns(JsonList),
        get(EVENT_FEED, "event-feed")
            .optional_query("from", INT)
            .optional_query("to", INT)
            .query("limit", INT)
            .repeated_query("sport", one_of::<Sport>())
            .optional_query("microservice", STR)
            .optional_query("microserviceResourceId", STR)
            .optional_query("cursor", STR)
            .returns(JsonObject),
        // Campaigns.
        get(CAMPAIGN_PROGRESS, "campaign/activity/report/campaigns/shortName/{shortName}")
            .path("shortName", STR)
            .returns(JsonObject),
        get(PROFILE_CAMPAIGNS, "campaign/profile/campaigns").returns(JsonObject),
        // Notifications and push.
        get(NOTIFICATIONS, "notifications").returns(JsonList),
        put_json(UPDATE_NOTIFICATION, "notifications/{notificationId}")
            .path("notificationId", INT)
            .json_body(),
        post_json(REGISTER_PUSH_TOKEN, "push/fcm/{type}/{token}")
            .path("type", STR)
            .path("token", STR)
            .json_body(),
        put_json(SET_PUSH_ENABLES, "push/fcm/{type}/{token}/enables")
            .path("type", STR)
            .path("token", STR)
            .json_body(),
        // Platform.
        post_json(SUPPORT_PORTAL_JWT, "support_portal/jwt").returns(RawString),
        get(SERVER, "server").returns(JsonObject),
        get(RELAY_SERVERS, "servers").returns(JsonObject).full_response(),
        get(GAME_INFO, "game_info").returns(JsonObject),
        get(GAME_INFO_VERSION, "game_info/version").returns(JsonObject),
        get(ACTIVE_ANNOUNCEMENTS, "announcements/active").returns(JsonList),
        EndpointDescriptor::post(RESET_PASSWORD, "users/password-reset/")
            .accept_json()
            .header("Content-type", "application/x-www-form-urlencoded")
            .form_body(&["password-new", "password-confirm"]),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::descriptor::BodyKind;
    use crate::http::HttpMethod;

    fn standard() -> Catalogue {
        Catalogue::standard().unwrap()
    }

    /// Verb and path of every endpoint the platform exposes.
    const ROUTES: &[(&str, &str)] = &[
        ("DELETE", "activities/{activityId}/comment/{commentId}"),
        ("DELETE", "clubs/club/{clubId}/announcement/{announcementId}"),
        ("DELETE", "clubs/club/{clubId}/comment/{commentId}"),
        ("DELETE", "events/signup/{eventId}"),
        ("DELETE", "events/{id}"),
        ("DELETE", "partners/{partner}/auth"),
        ("DELETE", "private_event/{eventId}"),
        ("DELETE", "profiles/{fromProfileId}/following/{toProfileId}"),
        ("DELETE", "profiles/{profileId}/activities/{activityId}"),
        ("DELETE", "profiles/{profileId}/goals/{goalId}"),
        ("GET", "activities/{activityId}"),
        ("GET", "activities/{activityId}/comment"),
        ("GET", "activities/{activityId}/rideon"),
        ("GET", "activity-feed/feed/"),
        ("GET", "activity-feed/feed/club/{clubId}"),
        ("GET", "announcements/active"),
        ("GET", "campaign/activity/report/campaigns/shortName/{shortName}"),
        ("GET", "campaign/profile/campaigns"),
        ("GET", "clubs/club"),
        ("GET", "clubs/club"),
        ("GET", "clubs/club/can-create"),
        ("GET", "clubs/club/find/short-name"),
        ("GET", "clubs/club/list/my-clubs"),
        ("GET", "clubs/club/list/my-clubs"),
        ("GET", "clubs/club/my-clubs/count"),
        ("GET", "clubs/club/{clubId}"),
        ("GET", "clubs/club/{clubId}/announcements"),
        ("GET", "clubs/club/{clubId}/comment"),
        ("GET", "clubs/club/{clubId}/stats"),
        ("GET", "clubs/club/{id}/roster"),
        ("GET", "clubs/club/{id}/roster/find"),
        ("GET", "clubs/gallery/{type}"),
        ("GET", "clubs/membership/{clubId}/status"),
        ("GET", "clubs/terms/latest"),
        ("GET", "event-feed"),
        ("GET", "event-feed/campaign/{shortName}"),
        ("GET", "events-core/events/template/categories?affiliation=clubs"),
        ("GET", "events/subgroups/entrants/{subgroupId}"),
        ("GET", "events/subgroups/invited_ride_leaders/{subgroupId}"),
        ("GET", "events/subgroups/invited_ride_sweepers/{subgroupId}"),
        ("GET", "events/{id}"),
        ("GET", "game_info"),
        ("GET", "game_info/version"),
        ("GET", "notifications"),
        ("GET", "partners/{partner}/auth"),
        ("GET", "partners/{partner}/credentials"),
        ("GET", "partners/{partner}/oauth1/authorize_url_json"),
        ("GET", "partners/{partner}/user"),
        ("GET", "private_event/entitlement"),
        ("GET", "private_event/feed"),
        ("GET", "private_event/{eventId}"),
        ("GET", "profiles/me/"),
        ("GET", "profiles/{loggedInProfileId}/followees-in-common/{profileId}"),
        ("GET", "profiles/{profileId}"),
        ("GET", "profiles/{profileId}/activities"),
        ("GET", "profiles/{profileId}/activities/{activityId}/rideon"),
        ("GET", "profiles/{profileId}/followees"),
        ("GET", "profiles/{profileId}/followers"),
        ("GET", "profiles/{profileId}/goals"),
        ("GET", "profiles/{profileId}/statistics"),
        ("GET", "profiles/{publicId}"),
        ("GET", "race-results/entries"),
        ("GET", "server"),
        ("GET", "servers"),
        ("POST", "activities/{activityId}/comment"),
        ("POST", "clubs/club"),
        ("POST", "clubs/club/validate"),
        ("POST", "clubs/club/{clubId}/announcement"),
        ("POST", "clubs/club/{clubId}/comment"),
        ("POST", "clubs/membership/accept-invite"),
        ("POST", "clubs/membership/accept-request"),
        ("POST", "clubs/membership/ban"),
        ("POST", "clubs/membership/batch-invite"),
        ("POST", "clubs/membership/cancel-invite"),
        ("POST", "clubs/membership/cancel-request"),
        ("POST", "clubs/membership/change-security-level"),
        ("POST", "clubs/membership/join"),
        ("POST", "clubs/membership/kick"),
        ("POST", "clubs/membership/leave"),
        ("POST", "clubs/membership/reject-invite"),
        ("POST", "clubs/membership/reject-request"),
        ("POST", "clubs/membership/unban"),
        ("POST", "clubs/terms/{termsId}/accept"),
        ("POST", "events-core/events"),
        ("POST", "events/subgroups/signup/{subgroupId}"),
        ("POST", "partners/{partner}/auth"),
        ("POST", "partners/{partner}/oauth1/connect"),
        ("POST", "partners/{partner}/search/profiles"),
        ("POST", "private_event"),
        ("POST", "profiles/{fromProfileId}/following/{toProfileId}"),
        ("POST", "profiles/{profileId}/activities/{activityId}/rideon"),
        ("POST", "profiles/{profileId}/goals"),
        ("POST", "profiles/{profileId}/photo"),
        ("POST", "profiles/{profileId}/privacy"),
        ("POST", "push/fcm/{type}/{token}"),
        ("POST", "search/profiles/restricted"),
        ("POST", "support_portal/jwt"),
        ("POST", "users/password-reset/"),
        ("PUT", "clubs/club"),
        ("PUT", "clubs/club/report"),
        ("PUT", "clubs/club/{clubId}/announcement/{announcementId}"),
        ("PUT", "clubs/club/{clubId}/comment/report"),
        ("PUT", "events-core/events/{event_id}"),
        ("PUT", "events/report"),
        ("PUT", "notifications/{notificationId}"),
        ("PUT", "private_event/{eventId}"),
        ("PUT", "private_event/{eventId}/accept"),
        ("PUT", "private_event/{eventId}/reject"),
        ("PUT", "profiles/me/{profileId}"),
        ("PUT", "profiles/report"),
        ("PUT", "profiles/{followeeId}/follower/{followerId}"),
        ("PUT", "profiles/{profileId}/activities/{activityId}"),
        ("PUT", "profiles/{profileId}/activities/{activityId}"),
        ("PUT", "profiles/{profileId}/goals/{goalId}"),
        ("PUT", "push/fcm/{type}/{token}/enables"),
    ];

    #[test]
    fn every_declaration_validates() {
        let catalogue = standard();
        assert_eq!(catalogue.len(), standard_endpoints().len());
        assert_eq!(catalogue.len(), ROUTES.len());
    }

    #[test]
    fn routes_match_the_platform() {
        let catalogue = standard();
        let mut declared: Vec<(&str, &str)> = catalogue
            .iter()
            .map(|d| (d.method().as_str(), d.template()))
            .collect();
        declared.sort_unstable();
        let mut expected = ROUTES.to_vec();
        expected.sort_unstable();
        assert_eq!(declared, expected);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err =
            Catalogue::from_builders([get(SERVER, "server"), get(SERVER, "servers")]).unwrap_err();
        assert!(matches!(err, ApiError::Configuration { .. }));
    }

    #[test]
    fn shared_templates_stay_distinct_endpoints() {
        let catalogue = standard();
        let plain = catalogue.get(MY_CLUBS).unwrap();
        let with_status = catalogue.get(MY_CLUBS_WITH_STATUS).unwrap();
        assert_eq!(plain.template(), with_status.template());
        assert!(plain.query_param("status").is_none());
        assert!(with_status.query_param("status").is_some_and(|s| s.repeated));

        let by_id = catalogue.get(GET_PROFILE).unwrap();
        let by_public = catalogue.get(GET_PROFILE_BY_PUBLIC_ID).unwrap();
        assert_eq!(by_id.path_param("profileId").unwrap().kind, ValueKind::Int);
        assert_eq!(by_public.path_param("publicId").unwrap().kind, ValueKind::Str);
    }

    #[test]
    fn password_reset_is_form_encoded_with_its_own_header() {
        let d = standard().get(RESET_PASSWORD).cloned().unwrap();
        assert_eq!(d.method(), HttpMethod::Post);
        assert_eq!(d.template(), "users/password-reset/");
        assert_eq!(
            d.headers(),
            &[
                ("Accept", "application/json"),
                ("Content-type", "application/x-www-form-urlencoded")
            ]
        );
        assert_eq!(
            *d.body(),
            BodyKind::Form {
                fields: vec!["password-new", "password-confirm"]
            }
        );
    }

    #[test]
    fn photo_upload_is_single_part_multipart() {
        let d = standard().get(UPLOAD_PROFILE_PHOTO).cloned().unwrap();
        assert_eq!(
            *d.body(),
            BodyKind::Multipart {
                parts: vec!["profileImage"]
            }
        );
        assert_eq!(d.headers(), &[("Accept", "application/json")]);
    }

    #[test]
    fn template_query_is_fixed() {
        let d = standard().get(EVENT_TEMPLATES).cloned().unwrap();
        assert_eq!(d.fixed_query(), &[("affiliation".to_string(), "clubs".to_string())]);
    }

    #[test]
    fn response_wrapped_endpoints_keep_metadata() {
        let catalogue = standard();
        let full: HashSet<_> = catalogue
            .iter()
            .filter(|d| d.full_response())
            .map(|d| d.name())
            .collect();
        let expected: HashSet<_> = [
            BATCH_INVITE_TO_CLUB,
            JOIN_CLUB,
            ACCEPT_CLUB_INVITE,
            VALIDATE_CLUB_NAME,
            UPDATE_CLUB,
            CREATE_CLUB,
            UPDATE_EVENT,
            RELAY_SERVERS,
        ]
        .into_iter()
        .collect();
        assert_eq!(full, expected);
    }

    #[test]
    fn bare_deletes_carry_no_headers() {
        let catalogue = standard();
        for name in [
            CANCEL_EVENT_SIGNUP,
            DELETE_EVENT,
            DELETE_GOAL,
            DISCONNECT_PARTNER,
            DELETE_ACTIVITY_COMMENT,
            UNFOLLOW,
            DELETE_ACTIVITY,
        ] {
            let d = catalogue.get(name).unwrap();
            assert_eq!(d.method(), HttpMethod::Delete, "{name}");
            assert!(d.headers().is_empty(), "{name}");
        }
    }

    #[test]
    fn only_get_endpoints_have_no_body_by_construction() {
        for d in standard().iter() {
            if d.method() == HttpMethod::Get {
                assert_eq!(*d.body(), BodyKind::None, "{}", d.name());
            }
        }
    }
}
