//! Typed entry points, one per catalogue endpoint.
//!
//! Each method binds its arguments to the matching descriptor and returns a
//! [`CallHandle`] immediately. Response types are chosen by the caller; any
//! `serde` type whose shape matches the endpoint's response works, and
//! `serde_json::Value` always does.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::body::{Part, RequestBody};
use crate::call::{CallBuilder, Context};
use crate::catalogue::{self as ep, Catalogue};
use crate::config::ClientConfig;
use crate::dispatcher::{ApiResponse, CallHandle};
use crate::error::ApiError;
use crate::paging::collect_pages;
use crate::transport::{AuthProvider, ReqwestTransport, Transport};
use crate::wire::{
    ActivityFeedType, ClubImageType, ClubMemberCount, ClubMemberStatus, ClubsSortDirection,
    ClubsSortField, EventTypeV2, Sport,
};

/// A type a response body can be decoded into.
pub trait Payload: DeserializeOwned + Send + 'static {}

impl<T: DeserializeOwned + Send + 'static> Payload for T {}

/// Filters for [`RideApi::search_clubs`].
#[derive(Debug, Clone, Default)]
pub struct ClubSearch<'a> {
    pub name: Option<&'a str>,
    pub sports: &'a [Sport],
    pub member_count: Option<ClubMemberCount>,
    pub location: Option<&'a str>,
    pub sort_field: Option<ClubsSortField>,
    pub sort_dir: Option<ClubsSortDirection>,
}

/// Filters for [`RideApi::event_feed`].
#[derive(Debug, Clone, Default)]
pub struct EventFeedQuery<'a> {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub sports: &'a [Sport],
    pub microservice: Option<&'a str>,
    pub microservice_resource_id: Option<&'a str>,
    pub cursor: Option<&'a str>,
}

/// Client for the platform API.
///
/// Cheap to clone; clones share the transport, auth hook and catalogue.
#[derive(Clone)]
pub struct RideApi {
    ctx: Arc<Context>,
    catalogue: Arc<Catalogue>,
}

impl RideApi {
    pub fn new(
        config: ClientConfig,
        transport: impl Transport + 'static,
        auth: impl AuthProvider + 'static,
    ) -> Result<Self, ApiError> {
        Self::with_catalogue(config, transport, auth, Catalogue::standard()?)
    }

    /// Client over a shared `reqwest` transport.
    pub fn with_reqwest(
        config: ClientConfig,
        auth: impl AuthProvider + 'static,
    ) -> Result<Self, ApiError> {
        Self::new(config, ReqwestTransport::new(), auth)
    }

    pub fn with_catalogue(
        config: ClientConfig,
        transport: impl Transport + 'static,
        auth: impl AuthProvider + 'static,
        catalogue: Catalogue,
    ) -> Result<Self, ApiError> {
        let ctx = Context::new(&config, Arc::new(transport), Arc::new(auth))?;
        Ok(Self {
            ctx: Arc::new(ctx),
            catalogue: Arc::new(catalogue),
        })
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Untyped entry point: start a call to any endpoint by name.
    pub fn call(&self, endpoint: &str) -> CallBuilder {
        match self.catalogue.get(endpoint) {
            Some(descriptor) => CallBuilder::new(Arc::clone(&self.ctx), Arc::clone(descriptor)),
            None => CallBuilder::failed(
                Arc::clone(&self.ctx),
                ApiError::configuration(endpoint, "no such endpoint in the catalogue"),
            ),
        }
    }

    fn membership(&self, endpoint: &str, request: &impl Serialize) -> CallHandle<()> {
        self.call(endpoint).json(request).send()
    }

    // Club membership.

    pub fn unban_club_member(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::UNBAN_CLUB_MEMBER, request)
    }

    pub fn remove_club_member(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::REMOVE_CLUB_MEMBER, request)
    }

    pub fn reject_club_application(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::REJECT_CLUB_APPLICATION, request)
    }

    pub fn accept_club_application(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::ACCEPT_CLUB_APPLICATION, request)
    }

    pub fn deny_club_invite(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::DENY_CLUB_INVITE, request)
    }

    pub fn leave_club(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::LEAVE_CLUB, request)
    }

    pub fn withdraw_club_invite(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::WITHDRAW_CLUB_INVITE, request)
    }

    pub fn ban_club_member(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::BAN_CLUB_MEMBER, request)
    }

    pub fn change_club_security_level(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::CHANGE_CLUB_SECURITY_LEVEL, request)
    }

    pub fn withdraw_club_application(&self, request: &impl Serialize) -> CallHandle<()> {
        self.membership(ep::WITHDRAW_CLUB_APPLICATION, request)
    }

    pub fn batch_invite_to_club(&self, request: &impl Serialize) -> CallHandle<ApiResponse<()>> {
        self.call(ep::BATCH_INVITE_TO_CLUB).json(request).send_with_response()
    }

    pub fn join_club(&self, request: &impl Serialize) -> CallHandle<ApiResponse<()>> {
        self.call(ep::JOIN_CLUB).json(request).send_with_response()
    }

    pub fn accept_club_invite(&self, request: &impl Serialize) -> CallHandle<ApiResponse<()>> {
        self.call(ep::ACCEPT_CLUB_INVITE).json(request).send_with_response()
    }

    pub fn club_member_statuses<T: Payload>(
        &self,
        club_id: &str,
        profile_ids: &[i64],
    ) -> CallHandle<T> {
        self.call(ep::CLUB_MEMBER_STATUSES)
            .path("clubId", club_id)
            .query("profileIds", profile_ids)
            .send()
    }

    // Clubs.

    pub fn search_clubs<T: Payload>(
        &self,
        limit: i32,
        start: i32,
        filter: &ClubSearch<'_>,
    ) -> CallHandle<T> {
        self.call(ep::SEARCH_CLUBS)
            .query("limit", limit)
            .query("start", start)
            .query("name", filter.name)
            .query("sport", filter.sports)
            .query("member_count", filter.member_count)
            .query("location", filter.location)
            .query("sort_field", filter.sort_field)
            .query("sort_dir", filter.sort_dir)
            .send()
    }

    pub fn list_clubs<T: Payload>(&self, limit: i32, start: i32) -> CallHandle<T> {
        self.call(ep::LIST_CLUBS).query("limit", limit).query("start", start).send()
    }

    pub fn report_club(&self, report: &impl Serialize) -> CallHandle<()> {
        self.call(ep::REPORT_CLUB).json(report).send()
    }

    pub fn club_chat<T: Payload>(
        &self,
        club_id: &str,
        created_before: i64,
        start: i32,
        limit: i32,
    ) -> CallHandle<T> {
        self.call(ep::CLUB_CHAT)
            .path("clubId", club_id)
            .query("created_before", created_before)
            .query("start", start)
            .query("limit", limit)
            .send()
    }

    pub fn club_roster<T: Payload>(
        &self,
        club_id: &str,
        statuses: &[ClubMemberStatus],
        limit: i32,
        start: i32,
    ) -> CallHandle<T> {
        self.call(ep::CLUB_ROSTER)
            .path("id", club_id)
            .query("status", statuses)
            .query("limit", limit)
            .query("start", start)
            .send()
    }

    pub fn find_club_members<T: Payload>(
        &self,
        club_id: &str,
        statuses: &[ClubMemberStatus],
        limit: i32,
        start: i32,
        query: Option<&str>,
        sort: bool,
    ) -> CallHandle<T> {
        self.call(ep::FIND_CLUB_MEMBERS)
            .path("id", club_id)
            .query("status", statuses)
            .query("limit", limit)
            .query("start", start)
            .query("query", query)
            .query("sort", sort)
            .send()
    }

    pub fn validate_club_name(&self, request: &impl Serialize) -> CallHandle<ApiResponse<()>> {
        self.call(ep::VALIDATE_CLUB_NAME).json(request).send_with_response()
    }

    /// Responds with the club id as plain text.
    pub fn update_club(&self, request: &impl Serialize) -> CallHandle<ApiResponse<String>> {
        self.call(ep::UPDATE_CLUB).json(request).send_with_response()
    }

    /// Responds with the new club's id as plain text.
    pub fn create_club(&self, request: &impl Serialize) -> CallHandle<ApiResponse<String>> {
        self.call(ep::CREATE_CLUB).json(request).send_with_response()
    }

    pub fn my_club_count(&self, statuses: &[ClubMemberStatus]) -> CallHandle<i64> {
        self.call(ep::MY_CLUB_COUNT).query("status", statuses).send()
    }

    pub fn accept_club_terms(&self, terms_id: i32) -> CallHandle<()> {
        self.call(ep::ACCEPT_CLUB_TERMS).path("termsId", terms_id).send()
    }

    pub fn post_club_comment<T: Payload>(
        &self,
        club_id: &str,
        comment: &impl Serialize,
    ) -> CallHandle<T> {
        self.call(ep::POST_CLUB_COMMENT).path("clubId", club_id).json(comment).send()
    }

    pub fn report_club_comment(&self, club_id: &str, report: &impl Serialize) -> CallHandle<()> {
        self.call(ep::REPORT_CLUB_COMMENT).path("clubId", club_id).json(report).send()
    }

    pub fn find_club_by_short_name<T: Payload>(&self, short_name: Option<&str>) -> CallHandle<T> {
        self.call(ep::FIND_CLUB_BY_SHORT_NAME).query("shortName", short_name).send()
    }

    pub fn my_clubs<T: Payload>(&self, limit: i32, start: i32) -> CallHandle<T> {
        self.call(ep::MY_CLUBS).query("limit", limit).query("start", start).send()
    }

    pub fn my_clubs_with_status<T: Payload>(
        &self,
        limit: i32,
        start: i32,
        statuses: &[ClubMemberStatus],
    ) -> CallHandle<T> {
        self.call(ep::MY_CLUBS_WITH_STATUS)
            .query("limit", limit)
            .query("start", start)
            .query("status", statuses)
            .send()
    }

    pub fn delete_club_comment(&self, club_id: &str, comment_id: &str) -> CallHandle<()> {
        self.call(ep::DELETE_CLUB_COMMENT)
            .path("clubId", club_id)
            .path("commentId", comment_id)
            .send()
    }

    pub fn club_announcements<T: Payload>(&self, club_id: &str) -> CallHandle<T> {
        self.call(ep::CLUB_ANNOUNCEMENTS).path("clubId", club_id).send()
    }

    pub fn create_club_announcement<T: Payload>(
        &self,
        club_id: &str,
        announcement: &impl Serialize,
    ) -> CallHandle<T> {
        self.call(ep::CREATE_CLUB_ANNOUNCEMENT)
            .path("clubId", club_id)
            .json(announcement)
            .send()
    }

    pub fn update_club_announcement(
        &self,
        club_id: &str,
        announcement_id: &str,
        announcement: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::UPDATE_CLUB_ANNOUNCEMENT)
            .path("clubId", club_id)
            .path("announcementId", announcement_id)
            .json(announcement)
            .send()
    }

    pub fn delete_club_announcement(&self, club_id: &str, announcement_id: &str) -> CallHandle<()> {
        self.call(ep::DELETE_CLUB_ANNOUNCEMENT)
            .path("clubId", club_id)
            .path("announcementId", announcement_id)
            .send()
    }

    pub fn club_stats<T: Payload>(&self, club_id: &str, days_offset: Option<i32>) -> CallHandle<T> {
        self.call(ep::CLUB_STATS)
            .path("clubId", club_id)
            .query("daysOffset", days_offset)
            .send()
    }

    pub fn latest_club_terms<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::LATEST_CLUB_TERMS).send()
    }

    pub fn club_gallery<T: Payload>(&self, image_type: ClubImageType) -> CallHandle<T> {
        self.call(ep::CLUB_GALLERY).path("type", image_type).send()
    }

    pub fn get_club<T: Payload>(&self, club_id: &str) -> CallHandle<T> {
        self.call(ep::GET_CLUB).path("clubId", club_id).send()
    }

    pub fn club_creation_eligibility<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::CLUB_CREATION_ELIGIBILITY).send()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn club_activity_feed<T: Payload>(
        &self,
        club_id: &str,
        include_self: bool,
        include_followees: bool,
        include_favorites: bool,
        start_after_activity_id: Option<i64>,
        limit: i32,
    ) -> CallHandle<T> {
        self.call(ep::CLUB_ACTIVITY_FEED)
            .path("clubId", club_id)
            .query("includeSelf", include_self)
            .query("includeFollowees", include_followees)
            .query("includeFavorites", include_favorites)
            .query("start_after_activity_id", start_after_activity_id)
            .query("limit", limit)
            .send()
    }

    // Partner integrations.

    pub fn connect_partner(&self, partner: &str, connection: &impl Serialize) -> CallHandle<()> {
        self.call(ep::CONNECT_PARTNER).path("partner", partner).json(connection).send()
    }

    pub fn connect_partner_oauth1(
        &self,
        partner: &str,
        connection: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::CONNECT_PARTNER_OAUTH1)
            .path("partner", partner)
            .json(connection)
            .send()
    }

    pub fn partner_user<T: Payload>(&self, partner: &str) -> CallHandle<T> {
        self.call(ep::PARTNER_USER).path("partner", partner).send()
    }

    pub fn disconnect_partner(&self, partner: &str) -> CallHandle<()> {
        self.call(ep::DISCONNECT_PARTNER).path("partner", partner).send()
    }

    pub fn partner_authorize_url<T: Payload>(&self, partner: &str) -> CallHandle<T> {
        self.call(ep::PARTNER_AUTHORIZE_URL).path("partner", partner).send()
    }

    pub fn search_partner_profiles<T: Payload>(
        &self,
        partner: &str,
        created_before: i64,
        start: i32,
        limit: i32,
        query: &impl Serialize,
    ) -> CallHandle<T> {
        self.call(ep::SEARCH_PARTNER_PROFILES)
            .path("partner", partner)
            .query("created_before", created_before)
            .query("start", start)
            .query("limit", limit)
            .json(query)
            .send()
    }

    pub fn partner_credentials<T: Payload>(&self, partner: &str) -> CallHandle<T> {
        self.call(ep::PARTNER_CREDENTIALS).path("partner", partner).send()
    }

    pub fn partner_status<T: Payload>(&self, partner: &str) -> CallHandle<T> {
        self.call(ep::PARTNER_STATUS).path("partner", partner).send()
    }

    // Meetups.

    pub fn update_meetup(&self, event_id: i64, meetup: &impl Serialize) -> CallHandle<()> {
        self.call(ep::UPDATE_MEETUP).path("eventId", event_id).json(meetup).send()
    }

    pub fn reject_meetup(&self, event_id: i64) -> CallHandle<()> {
        self.call(ep::REJECT_MEETUP).path("eventId", event_id).send()
    }

    pub fn accept_meetup(&self, event_id: i64) -> CallHandle<()> {
        self.call(ep::ACCEPT_MEETUP).path("eventId", event_id).send()
    }

    pub fn delete_meetup(&self, event_id: i64) -> CallHandle<()> {
        self.call(ep::DELETE_MEETUP).path("eventId", event_id).send()
    }

    pub fn create_meetup<T: Payload>(&self, meetup: &impl Serialize) -> CallHandle<T> {
        self.call(ep::CREATE_MEETUP).json(meetup).send()
    }

    pub fn meetup_feed<T: Payload>(
        &self,
        start_date: Option<i64>,
        end_date: Option<i64>,
        status: Option<&str>,
        organizer_only_past_events: bool,
    ) -> CallHandle<T> {
        self.call(ep::MEETUP_FEED)
            .query("start_date", start_date)
            .query("end_date", end_date)
            .query("status", status)
            .query("organizer_only_past_events", organizer_only_past_events)
            .send()
    }

    pub fn get_meetup<T: Payload>(&self, event_id: i64) -> CallHandle<T> {
        self.call(ep::GET_MEETUP).path("eventId", event_id).send()
    }

    pub fn meetup_entitlement<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::MEETUP_ENTITLEMENT).send()
    }

    // Profiles.

    pub fn update_activity_notes(
        &self,
        profile_id: i64,
        activity_id: i64,
        notes: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::UPDATE_ACTIVITY_NOTES)
            .path("profileId", profile_id)
            .path("activityId", activity_id)
            .json(notes)
            .send()
    }

    pub fn update_activity(
        &self,
        profile_id: i64,
        activity_id: i64,
        activity: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::UPDATE_ACTIVITY)
            .path("profileId", profile_id)
            .path("activityId", activity_id)
            .json(activity)
            .send()
    }

    pub fn update_my_profile<T: Payload>(
        &self,
        profile_id: i64,
        profile: &impl Serialize,
    ) -> CallHandle<T> {
        self.call(ep::UPDATE_MY_PROFILE)
            .path("profileId", profile_id)
            .json(profile)
            .send()
    }

    pub fn followers<T: Payload>(
        &self,
        profile_id: i64,
        start: i32,
        limit: i32,
        include_follow_requests: bool,
    ) -> CallHandle<T> {
        self.call(ep::FOLLOWERS)
            .path("profileId", profile_id)
            .query("start", start)
            .query("limit", limit)
            .query("include-follow-requests", include_follow_requests)
            .send()
    }

    /// Every follower of a profile, fetched page by page.
    pub async fn all_followers<T: Payload>(
        &self,
        profile_id: i64,
        include_follow_requests: bool,
        page_size: u32,
        max_pages: u32,
    ) -> Result<Vec<T>, ApiError> {
        collect_pages(page_size, max_pages, |start, limit| {
            self.followers::<Vec<T>>(
                profile_id,
                clamp(start),
                clamp(limit),
                include_follow_requests,
            )
        })
        .await
    }

    pub fn followees<T: Payload>(&self, profile_id: i64, start: i32, limit: i32) -> CallHandle<T> {
        self.call(ep::FOLLOWEES)
            .path("profileId", profile_id)
            .query("start", start)
            .query("limit", limit)
            .send()
    }

    /// Every profile followed by `profile_id`, fetched page by page.
    pub async fn all_followees<T: Payload>(
        &self,
        profile_id: i64,
        page_size: u32,
        max_pages: u32,
    ) -> Result<Vec<T>, ApiError> {
        collect_pages(page_size, max_pages, |start, limit| {
            self.followees::<Vec<T>>(profile_id, clamp(start), clamp(limit))
        })
        .await
    }

    pub fn followees_in_common<T: Payload>(
        &self,
        logged_in_profile_id: i64,
        profile_id: i64,
    ) -> CallHandle<T> {
        self.call(ep::FOLLOWEES_IN_COMMON)
            .path("loggedInProfileId", logged_in_profile_id)
            .path("profileId", profile_id)
            .send()
    }

    pub fn profile_statistics<T: Payload>(
        &self,
        profile_id: i64,
        sport: Option<Sport>,
        start_date_time: Option<&str>,
    ) -> CallHandle<T> {
        self.call(ep::PROFILE_STATISTICS)
            .path("profileId", profile_id)
            .query("sport", sport)
            .query("startDateTime", start_date_time)
            .send()
    }

    pub fn give_ride_on(
        &self,
        profile_id: i64,
        activity_id: i64,
        ride_on: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::GIVE_RIDE_ON)
            .path("profileId", profile_id)
            .path("activityId", activity_id)
            .json(ride_on)
            .send()
    }

    pub fn follow<T: Payload>(
        &self,
        from_profile_id: i64,
        to_profile_id: i64,
        relationship: &impl Serialize,
    ) -> CallHandle<T> {
        self.call(ep::FOLLOW)
            .path("fromProfileId", from_profile_id)
            .path("toProfileId", to_profile_id)
            .json(relationship)
            .send()
    }

    pub fn unfollow(&self, from_profile_id: i64, to_profile_id: i64) -> CallHandle<()> {
        self.call(ep::UNFOLLOW)
            .path("fromProfileId", from_profile_id)
            .path("toProfileId", to_profile_id)
            .send()
    }

    pub fn update_follower(
        &self,
        followee_id: i64,
        follower_id: i64,
        relationship: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::UPDATE_FOLLOWER)
            .path("followeeId", followee_id)
            .path("followerId", follower_id)
            .json(relationship)
            .send()
    }

    /// Upload a profile picture as the single `profileImage` part.
    pub fn upload_profile_photo(
        &self,
        profile_id: i64,
        content_type: &str,
        image: Vec<u8>,
    ) -> CallHandle<()> {
        self.call(ep::UPLOAD_PROFILE_PHOTO)
            .path("profileId", profile_id)
            .body(RequestBody::Multipart(vec![Part::bytes("profileImage", content_type, image)]))
            .send()
    }

    pub fn goals<T: Payload>(&self, profile_id: i64) -> CallHandle<T> {
        self.call(ep::GOALS).path("profileId", profile_id).send()
    }

    pub fn create_goal<T: Payload>(&self, profile_id: i64, goal: &impl Serialize) -> CallHandle<T> {
        self.call(ep::CREATE_GOAL).path("profileId", profile_id).json(goal).send()
    }

    pub fn update_goal(
        &self,
        profile_id: i64,
        goal_id: i64,
        goal: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::UPDATE_GOAL)
            .path("profileId", profile_id)
            .path("goalId", goal_id)
            .json(goal)
            .send()
    }

    pub fn delete_goal(&self, profile_id: i64, goal_id: i64) -> CallHandle<()> {
        self.call(ep::DELETE_GOAL)
            .path("profileId", profile_id)
            .path("goalId", goal_id)
            .send()
    }

    pub fn report_user(&self, report: &impl Serialize) -> CallHandle<()> {
        self.call(ep::REPORT_USER).json(report).send()
    }

    pub fn get_profile<T: Payload>(&self, profile_id: i64) -> CallHandle<T> {
        self.call(ep::GET_PROFILE).path("profileId", profile_id).send()
    }

    /// Like [`Self::get_profile`], but a missing profile is `Ok(None)`.
    pub async fn find_profile<T: Payload>(&self, profile_id: i64) -> Result<Option<T>, ApiError> {
        match self.get_profile(profile_id).await {
            Ok(profile) => Ok(Some(profile)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn get_profile_by_public_id<T: Payload>(&self, public_id: &str) -> CallHandle<T> {
        self.call(ep::GET_PROFILE_BY_PUBLIC_ID).path("publicId", public_id).send()
    }

    pub fn profile_activities<T: Payload>(
        &self,
        profile_id: i64,
        before: i64,
        limit: i32,
    ) -> CallHandle<T> {
        self.call(ep::PROFILE_ACTIVITIES)
            .path("profileId", profile_id)
            .query("before", before)
            .query("limit", limit)
            .send()
    }

    pub fn profile_activity_ride_ons<T: Payload>(
        &self,
        profile_id: i64,
        activity_id: i64,
        created_before: i64,
        start: i32,
        limit: i32,
    ) -> CallHandle<T> {
        self.call(ep::PROFILE_ACTIVITY_RIDE_ONS)
            .path("profileId", profile_id)
            .path("activityId", activity_id)
            .query("created_before", created_before)
            .query("start", start)
            .query("limit", limit)
            .send()
    }

    pub fn delete_activity(&self, profile_id: i64, activity_id: i64) -> CallHandle<()> {
        self.call(ep::DELETE_ACTIVITY)
            .path("profileId", profile_id)
            .path("activityId", activity_id)
            .send()
    }

    pub fn update_privacy(&self, profile_id: i64, settings: &impl Serialize) -> CallHandle<()> {
        self.call(ep::UPDATE_PRIVACY).path("profileId", profile_id).json(settings).send()
    }

    pub fn my_profile<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::MY_PROFILE).send()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn search_profiles<T: Payload>(
        &self,
        created_before: i64,
        start: i32,
        limit: i32,
        followers_only: bool,
        social_facts: bool,
        query: &impl Serialize,
    ) -> CallHandle<T> {
        self.call(ep::SEARCH_PROFILES)
            .query("created_before", created_before)
            .query("start", start)
            .query("limit", limit)
            .query("followers_only", followers_only)
            .query("social_facts", social_facts)
            .json(query)
            .send()
    }

    // Activities.

    pub fn activity_ride_ons<T: Payload>(&self, activity_id: i64, only_me: bool) -> CallHandle<T> {
        self.call(ep::ACTIVITY_RIDE_ONS)
            .path("activityId", activity_id)
            .query("only_me", only_me)
            .send()
    }

    pub fn comment_on_activity<T: Payload>(
        &self,
        activity_id: i64,
        comment: &impl Serialize,
    ) -> CallHandle<T> {
        self.call(ep::COMMENT_ON_ACTIVITY)
            .path("activityId", activity_id)
            .json(comment)
            .send()
    }

    pub fn get_activity<T: Payload>(
        &self,
        activity_id: i64,
        ride_on_times_limit: i32,
    ) -> CallHandle<T> {
        self.call(ep::GET_ACTIVITY)
            .path("activityId", activity_id)
            .query("rideOnTimesLimit", ride_on_times_limit)
            .send()
    }

    pub fn activity_comments<T: Payload>(
        &self,
        activity_id: i64,
        created_before: i64,
        start: i32,
        limit: i32,
    ) -> CallHandle<T> {
        self.call(ep::ACTIVITY_COMMENTS)
            .path("activityId", activity_id)
            .query("created_before", created_before)
            .query("start", start)
            .query("limit", limit)
            .send()
    }

    pub fn delete_activity_comment(&self, activity_id: i64, comment_id: i64) -> CallHandle<()> {
        self.call(ep::DELETE_ACTIVITY_COMMENT)
            .path("activityId", activity_id)
            .path("commentId", comment_id)
            .send()
    }

    pub fn activity_feed<T: Payload>(
        &self,
        feed_type: Option<ActivityFeedType>,
        profile_id: Option<i64>,
        start_after_activity_id: Option<i64>,
        limit: i32,
    ) -> CallHandle<T> {
        self.call(ep::ACTIVITY_FEED)
            .query("feedType", feed_type)
            .query("profile_id", profile_id)
            .query("start_after_activity_id", start_after_activity_id)
            .query("limit", limit)
            .send()
    }

    // Events.

    pub fn get_event<T: Payload>(
        &self,
        id: i64,
        event_secret: Option<&str>,
        skip_cache: bool,
    ) -> CallHandle<T> {
        self.call(ep::GET_EVENT)
            .path("id", id)
            .query("eventSecret", event_secret)
            .query("skip_cache", skip_cache)
            .send()
    }

    pub fn cancel_event_signup(&self, event_id: i64) -> CallHandle<()> {
        self.call(ep::CANCEL_EVENT_SIGNUP).path("eventId", event_id).send()
    }

    /// The body is sent as a JSON string.
    pub fn event_signup<T: Payload>(
        &self,
        subgroup_id: i64,
        event_secret: Option<&str>,
        body: &str,
    ) -> CallHandle<T> {
        self.call(ep::EVENT_SIGNUP)
            .path("subgroupId", subgroup_id)
            .query("eventSecret", event_secret)
            .json(body)
            .send()
    }

    pub fn report_event(&self, report: &impl Serialize) -> CallHandle<()> {
        self.call(ep::REPORT_EVENT).json(report).send()
    }

    pub fn delete_event(&self, id: i64) -> CallHandle<()> {
        self.call(ep::DELETE_EVENT).path("id", id).send()
    }

    pub fn invited_ride_sweepers<T: Payload>(&self, subgroup_id: i64) -> CallHandle<T> {
        self.call(ep::INVITED_RIDE_SWEEPERS).path("subgroupId", subgroup_id).send()
    }

    pub fn invited_ride_leaders<T: Payload>(&self, subgroup_id: i64) -> CallHandle<T> {
        self.call(ep::INVITED_RIDE_LEADERS).path("subgroupId", subgroup_id).send()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn subgroup_entrants<T: Payload>(
        &self,
        subgroup_id: i64,
        participation: Option<&str>,
        registered_before: i64,
        start: i32,
        limit: i32,
        entrant_type: Option<&str>,
    ) -> CallHandle<T> {
        self.call(ep::SUBGROUP_ENTRANTS)
            .path("subgroupId", subgroup_id)
            .query("participation", participation)
            .query("registered_before", registered_before)
            .query("start", start)
            .query("limit", limit)
            .query("type", entrant_type)
            .send()
    }

    pub fn race_results<T: Payload>(
        &self,
        event_subgroup_id: i64,
        start: i32,
        limit: i32,
    ) -> CallHandle<T> {
        self.call(ep::RACE_RESULTS)
            .query("event_subgroup_id", event_subgroup_id)
            .query("start", start)
            .query("limit", limit)
            .send()
    }

    pub fn create_event<T: Payload>(&self, event: &impl Serialize) -> CallHandle<T> {
        self.call(ep::CREATE_EVENT).json(event).send()
    }

    pub fn update_event(
        &self,
        event_id: i64,
        event: &impl Serialize,
    ) -> CallHandle<ApiResponse<()>> {
        self.call(ep::UPDATE_EVENT)
            .path("event_id", event_id)
            .json(event)
            .send_with_response()
    }

    pub fn event_templates<T: Payload>(
        &self,
        event_type: Option<EventTypeV2>,
        sport: Option<Sport>,
    ) -> CallHandle<T> {
        self.call(ep::EVENT_TEMPLATES)
            .query("eventType", event_type)
            .query("sport", sport)
            .send()
    }

    pub fn campaign_events<T: Payload>(
        &self,
        short_name: &str,
        from: i32,
        to: i32,
        sports: &[Sport],
    ) -> CallHandle<T> {
        self.call(ep::CAMPAIGN_EVENTS)
            .path("shortName", short_name)
            .query("from", from)
            .query("to", to)
            .query("sports", sports)
            .send()
    }

    pub fn event_feed<T: Payload>(&self, limit: i32, filter: &EventFeedQuery<'_>) -> CallHandle<T> {
        self.call(ep::EVENT_FEED)
            .query("from", filter.from)
            .query("to", filter.to)
            .query("limit", limit)
            .query("sport", filter.sports)
            .query("microservice", filter.microservice)
            .query("microserviceResourceId", filter.microservice_resource_id)
            .query("cursor", filter.cursor)
            .send()
    }

    // Campaigns.

    pub fn campaign_progress<T: Payload>(&self, short_name: &str) -> CallHandle<T> {
        self.call(ep::CAMPAIGN_PROGRESS).path("shortName", short_name).send()
    }

    pub fn profile_campaigns<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::PROFILE_CAMPAIGNS).send()
    }

    // Notifications and push.

    pub fn notifications<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::NOTIFICATIONS).send()
    }

    pub fn update_notification(
        &self,
        notification_id: i64,
        update: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::UPDATE_NOTIFICATION)
            .path("notificationId", notification_id)
            .json(update)
            .send()
    }

    pub fn register_push_token(
        &self,
        token_type: &str,
        token: &str,
        registration: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::REGISTER_PUSH_TOKEN)
            .path("type", token_type)
            .path("token", token)
            .json(registration)
            .send()
    }

    pub fn set_push_enables(
        &self,
        token_type: &str,
        token: &str,
        enables: &impl Serialize,
    ) -> CallHandle<()> {
        self.call(ep::SET_PUSH_ENABLES)
            .path("type", token_type)
            .path("token", token)
            .json(enables)
            .send()
    }

    // Platform.

    /// Opaque token, returned verbatim.
    pub fn support_portal_jwt(&self) -> CallHandle<String> {
        self.call(ep::SUPPORT_PORTAL_JWT).send()
    }

    pub fn server<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::SERVER).send()
    }

    pub fn relay_servers<T: Payload>(&self) -> CallHandle<ApiResponse<T>> {
        self.call(ep::RELAY_SERVERS).send_with_response()
    }

    pub fn game_info<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::GAME_INFO).send()
    }

    pub fn game_info_version<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::GAME_INFO_VERSION).send()
    }

    pub fn active_announcements<T: Payload>(&self) -> CallHandle<T> {
        self.call(ep::ACTIVE_ANNOUNCEMENTS).send()
    }

    pub fn reset_password(&self, new_password: &str, confirm_password: &str) -> CallHandle<()> {
        self.call(ep::RESET_PASSWORD)
            .body(RequestBody::form([
                ("password-new", new_password),
                ("password-confirm", confirm_password),
            ]))
            .send()
    }
}

fn clamp(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
