//! Analytics API vocabulary.
//!
//! Dimension, metric, and filter names accepted by `reports.query`. The
//! helpers validate their arguments against these slices before issuing a
//! request so a typo fails locally with the allowed values listed.

// ============================================================================
// Dimensions
// ============================================================================

/// Resource dimensions.
pub const RESOURCE_DIMENSIONS: &[&str] = &["video", "playlist", "channel"];

/// Geographic dimensions.
pub const GEOGRAPHIC_DIMENSIONS: &[&str] = &["country", "province", "dma", "city"];

/// Time-period dimensions.
pub const TIME_PERIOD_DIMENSIONS: &[&str] = &["day", "month"];

/// Playback-location dimensions.
pub const PLAYBACK_LOCATION_DIMENSIONS: &[&str] = &[
    "insightPlaybackLocationType",
    "insightPlaybackLocationDetail",
];

/// Playback-detail dimensions.
pub const PLAYBACK_DETAIL_DIMENSIONS: &[&str] = &[
    "creatorContentType",
    "liveOrOnDemand",
    "subscribedStatus",
    "youtubeProduct",
];

/// Traffic-source dimensions.
pub const TRAFFIC_SOURCE_DIMENSIONS: &[&str] =
    &["insightTrafficSourceType", "insightTrafficSourceDetail"];

/// Device dimensions.
pub const DEVICE_DIMENSIONS: &[&str] = &["deviceType", "operatingSystem"];

/// Demographic dimensions.
pub const DEMOGRAPHIC_DIMENSIONS: &[&str] = &["ageGroup", "gender"];

/// Content-sharing dimensions.
pub const CONTENT_SHARING_DIMENSIONS: &[&str] = &["sharingService"];

/// Audience-retention dimensions.
pub const AUDIENCE_RETENTION_DIMENSIONS: &[&str] = &["elapsedVideoTimeRatio"];

/// Live-streaming dimensions.
pub const LIVESTREAM_DIMENSIONS: &[&str] = &["liveStreamPosition"];

/// Membership-cancellation dimensions.
pub const MEMBERSHIP_CANCELLATION_DIMENSIONS: &[&str] =
    &["membershipsCancellationSurveyReason"];

/// Ad-performance dimensions.
pub const AD_PERFORMANCE_DIMENSIONS: &[&str] = &["adType"];

// ============================================================================
// Metrics
// ============================================================================

/// View metrics.
pub const VIEW_METRICS: &[&str] = &[
    "engagedViews",
    "views",
    "playlistViews",
    "redViews",
    "viewerPercentage",
];

/// Watch-time metrics.
pub const WATCH_TIME_METRICS: &[&str] = &[
    "estimatedMinutesWatched",
    "estimatedRedMinutesWatched",
    "averageViewDuration",
    "averageViewPercentage",
];

/// Engagement metrics.
pub const ENGAGEMENT_METRICS: &[&str] = &[
    "comments",
    "likes",
    "dislikes",
    "shares",
    "subscribersGained",
    "subscribersLost",
    "videosAddedToPlaylists",
    "videosRemovedFromPlaylists",
];

/// Playlist metrics.
pub const PLAYLIST_METRICS: &[&str] = &[
    "averageTimeInPlaylist",
    "playlistAverageViewDuration",
    "playlistEstimatedMinutesWatched",
    "playlistSaves",
    "playlistStarts",
    "playlistViews",
    "viewsPerPlaylistStart",
];

/// Annotation metrics.
pub const ANNOTATION_METRICS: &[&str] = &[
    "annotationImpressions",
    "annotationClickableImpressions",
    "annotationClicks",
    "annotationClickThroughRate",
    "annotationClosableImpressions",
    "annotationCloses",
    "annotationCloseRate",
];

/// Card metrics.
pub const CARD_METRICS: &[&str] = &[
    "cardImpressions",
    "cardClicks",
    "cardClickRate",
    "cardTeaserImpressions",
    "cardTeaserClicks",
    "cardTeaserClickRate",
];

/// Live-streaming metrics.
pub const LIVESTREAM_METRICS: &[&str] =
    &["averageConcurrentViewers", "peakConcurrentViewers"];

/// Audience-retention metrics.
pub const AUDIENCE_RETENTION_METRICS: &[&str] = &[
    "audienceWatchRatio",
    "relativeRetentionPerformance",
    "startedWatching",
    "stoppedWatching",
    "totalSegmentImpressions",
];

/// Membership-cancellation metrics.
pub const MEMBERSHIP_CANCELLATION_METRICS: &[&str] =
    &["membershipsCancellationSurveyResponses"];

/// Estimated-revenue metrics.
pub const ESTIMATED_REVENUE_METRICS: &[&str] = &[
    "estimatedRevenue",
    "estimatedAdRevenue",
    "estimatedRedPartnerRevenue",
];

/// Ad-performance metrics.
pub const AD_PERFORMANCE_METRICS: &[&str] = &[
    "grossRevenue",
    "cpm",
    "adImpressions",
    "monetizedPlaybacks",
    "playbackBasedCpm",
];

// ============================================================================
// Filters
// ============================================================================

/// Resource filters.
pub const RESOURCE_FILTERS: &[&str] = &["video", "playlist", "channel", "group"];

/// Geographic filters.
pub const GEOGRAPHIC_FILTERS: &[&str] = &[
    "country",
    "province",
    "dma",
    "city",
    "continent",
    "subContinent",
];

/// Audience-retention filters.
pub const AUDIENCE_RETENTION_FILTERS: &[&str] = &["audienceType"];

/// Traffic-source types accepted by the detail drill-down.
pub const TRAFFIC_DETAIL_TYPES: &[&str] = &[
    "ADVERTISING",
    "CAMPAIGN_CARD",
    "END_SCREEN",
    "EXT_URL",
    "HASHTAGS",
    "NOTIFICATION",
    "RELATED_VIDEO",
    "SOUND_PAGE",
    "SUBSCRIBER",
    "YT_CHANNEL",
    "YT_OTHER_PAGE",
    "YT_SEARCH",
    "VIDEO_REMIXES",
];

/// Audience types accepted by the retention filter.
pub const AUDIENCE_TYPES: &[&str] = &["ORGANIC", "AD_INSTREAM", "AD_INDISPLAY"];
