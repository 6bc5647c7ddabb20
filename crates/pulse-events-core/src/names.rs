// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Predefined event and parameter names common to many apps.
//!
//! Logging occurs through the `log_event` family of methods on the
//! logger; these constants name the occurrences and segments most apps
//! share so dashboards aggregate across apps consistently.

// General purpose

/// Logged when the app is activated, typically at did-become-active.
pub const EVENT_ACTIVATED_APP: &str = "activated_app";
/// Logged when a user has completed registration with the app.
pub const EVENT_COMPLETED_REGISTRATION: &str = "completed_registration";
/// Logged when a user has viewed a form of content in the app.
pub const EVENT_VIEWED_CONTENT: &str = "viewed_content";
/// Logged when a user has performed a search within the app.
pub const EVENT_SEARCHED: &str = "searched";
/// Logged when the user has rated an item; pass the rating as the
/// value-to-sum.
pub const EVENT_RATED: &str = "rated";
/// Logged when the user has completed a tutorial in the app.
pub const EVENT_COMPLETED_TUTORIAL: &str = "completed_tutorial";

// Ecommerce

/// Logged when the user adds an item to their cart; pass the item price
/// as the value-to-sum.
pub const EVENT_ADDED_TO_CART: &str = "added_to_cart";
/// Logged when the user adds an item to their wishlist.
pub const EVENT_ADDED_TO_WISHLIST: &str = "added_to_wishlist";
/// Logged when the user enters the checkout flow; pass the cart total as
/// the value-to-sum.
pub const EVENT_INITIATED_CHECKOUT: &str = "initiated_checkout";
/// Logged when the user has entered their payment info.
pub const EVENT_ADDED_PAYMENT_INFO: &str = "added_payment_info";
/// Logged when the user completes a purchase. `log_purchase` is a
/// shortcut for logging this event.
pub const EVENT_PURCHASED: &str = "purchased";

// Gaming

/// Logged when the user achieves a level in the app.
pub const EVENT_ACHIEVED_LEVEL: &str = "achieved_level";
/// Logged when the user unlocks an achievement.
pub const EVENT_UNLOCKED_ACHIEVEMENT: &str = "unlocked_achievement";
/// Logged when the user spends in-app credits; pass the credits spent as
/// the value-to-sum.
pub const EVENT_SPENT_CREDITS: &str = "spent_credits";

// Parameter keys

/// ISO-4217 currency code accompanying a monetary event, e.g. "USD".
pub const PARAM_CURRENCY: &str = "currency";
/// Method the user used to register, e.g. "email".
pub const PARAM_REGISTRATION_METHOD: &str = "registration_method";
/// Generic content type/family for the event, e.g. "music".
pub const PARAM_CONTENT_TYPE: &str = "content_type";
/// Identifier of the specific content, e.g. an EAN or article id.
pub const PARAM_CONTENT_ID: &str = "content_id";
/// The string the user searched for.
pub const PARAM_SEARCH_STRING: &str = "search_string";
/// Whether the activity succeeded; use [`VALUE_YES`] or [`VALUE_NO`].
pub const PARAM_SUCCESS: &str = "success";
/// Maximum rating available for the rated event, e.g. "5".
pub const PARAM_MAX_RATING_VALUE: &str = "max_rating_value";
/// Whether payment info is available during checkout; use [`VALUE_YES`]
/// or [`VALUE_NO`].
pub const PARAM_PAYMENT_INFO_AVAILABLE: &str = "payment_info_available";
/// Count of items being processed for a checkout or purchase event.
pub const PARAM_NUM_ITEMS: &str = "num_items";
/// The level achieved, for the achieved-level event.
pub const PARAM_LEVEL: &str = "level";
/// Free-form description appropriate to the event.
pub const PARAM_DESCRIPTION: &str = "description";

// Canonical parameter values

/// Yes-valued parameter value for yes/no parameter keys.
pub const VALUE_YES: &str = "yes";
/// No-valued parameter value for yes/no parameter keys.
pub const VALUE_NO: &str = "no";
