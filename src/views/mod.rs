//! Server-rendered views.
//!
//! DESIGN
//! ======
//! Every view is a pure function from fetched records to a view model, and
//! a leptos component from the view model to markup. Handlers compose the
//! components and render them through `layout::page`. Nothing here performs
//! I/O, so each view is tested directly against its model.

pub mod active_groups;
pub mod active_users;
pub mod device_list;
pub mod layout;
pub mod stats_nav;
pub mod stats_table;
pub mod user_stats;
