//! # Engine Operations
//!
//! Every operation is an inherent method on [`crate::Engine`], grouped by
//! aggregate: listings (posting, claiming, removal), orders (creation and
//! lifecycle), and consent records.

pub(crate) mod consent;
mod listing;
mod order;
